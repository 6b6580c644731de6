//! Protocol line splitting.
//!
//! A line has the shape `[@tags] [:prefix] COMMAND [params...] [:trailing]`.
//! [`RawLine`] only splits it into those parts; it does not interpret
//! commands. Tag values are kept raw (no IRCv3 unescaping) since the only
//! consumer looks at short flag values.

use crate::error::HandlerError;
use std::str::FromStr;

/// One inbound protocol line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Tag string without the leading `@`.
    pub tags: Option<String>,
    /// Source prefix without the leading `:`.
    pub prefix: Option<String>,
    /// Command keyword or numeric, as received.
    pub command: String,
    /// Middle parameters followed by the trailing parameter (without its `:`).
    pub params: Vec<String>,
}

impl RawLine {
    /// Parameter at position `n`.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.params.get(n).map(String::as_str)
    }

    /// Value of tag `key`. A tag present without `=` yields `""`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_deref()?.split(';').find_map(|entry| {
            let mut parts = entry.splitn(2, '=');
            match parts.next() {
                Some(k) if k == key => Some(parts.next().unwrap_or("")),
                _ => None,
            }
        })
    }

    /// Username from a `nick!user@host` prefix.
    ///
    /// Returns `None` when there is no prefix or the prefix carries no `!`
    /// (server-originated lines).
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let bang = prefix.find('!')?;
        Some(&prefix[..bang])
    }

    /// Command keyword upper-cased for table lookups.
    pub fn command_key(&self) -> String {
        self.command.to_ascii_uppercase()
    }

    /// Ordered argument view: `@tags`, `:prefix`, command, then parameters.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.params.len() + 3);
        if let Some(tags) = &self.tags {
            args.push(format!("@{tags}"));
        }
        if let Some(prefix) = &self.prefix {
            args.push(format!(":{prefix}"));
        }
        args.push(self.command.clone());
        args.extend(self.params.iter().cloned());
        args
    }
}

/// Split off the next space-delimited token, skipping leading spaces.
fn next_token(input: &str) -> (&str, &str) {
    let input = input.trim_start_matches(' ');
    match input.find(' ') {
        Some(idx) => (&input[..idx], &input[idx + 1..]),
        None => (input, ""),
    }
}

impl FromStr for RawLine {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim_end_matches(['\r', '\n']);

        let mut tags = None;
        if let Some(stripped) = rest.strip_prefix('@') {
            let (token, tail) = next_token(stripped);
            tags = Some(token.to_owned());
            rest = tail;
        }

        let mut prefix = None;
        let trimmed = rest.trim_start_matches(' ');
        if let Some(stripped) = trimmed.strip_prefix(':') {
            let (token, tail) = next_token(stripped);
            prefix = Some(token.to_owned());
            rest = tail;
        }

        let (command, mut rest) = next_token(rest);
        if command.is_empty() {
            return Err(HandlerError::Malformed("missing command"));
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_owned());
                break;
            }
            let (token, tail) = next_token(rest);
            params.push(token.to_owned());
            rest = tail;
        }

        Ok(Self {
            tags,
            prefix,
            command: command.to_owned(),
            params,
        })
    }
}
