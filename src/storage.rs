//! Per-plugin storage locations.
//!
//! Each plugin gets its own namespace derived from its identifier, so two
//! plugins asking for "database 0" never share a file. Names are the
//! upper-case hex SHA-256 of the owner id followed by the index:
//!
//! - `<root>/Databases/<NS><index>.sqlite`
//! - `<root>/Storage/<NS><index>.obf`
//!
//! Directories are created on first use.

use crate::error::BotError;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DATABASE_DIR: &str = "Databases";
const FILES_DIR: &str = "Storage";

/// Storage root shared by all plugins.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Connection acquire timeout for plugin databases.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of data file `index` owned by `owner`.
    pub fn file_path(&self, owner: &str, index: u32) -> Result<PathBuf, BotError> {
        self.path_in(FILES_DIR, owner, index, "obf")
    }

    /// Path of database `index` owned by `owner`.
    pub fn database_path(&self, owner: &str, index: u32) -> Result<PathBuf, BotError> {
        self.path_in(DATABASE_DIR, owner, index, "sqlite")
    }

    /// Open (creating if needed) database `index` owned by `owner`.
    pub async fn database(&self, owner: &str, index: u32) -> Result<SqlitePool, BotError> {
        let path = self.database_path(owner, index)?;
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        info!(owner, path = %path.display(), "plugin database opened");
        Ok(pool)
    }

    fn path_in(
        &self,
        dir: &str,
        owner: &str,
        index: u32,
        extension: &str,
    ) -> Result<PathBuf, BotError> {
        let dir = self.root.join(dir);
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join(format!("{}{index}.{extension}", namespace(owner))))
    }
}

/// Upper-case hex SHA-256 of `owner`.
fn namespace(owner: &str) -> String {
    let digest = Sha256::digest(owner.as_bytes());
    digest.iter().map(|byte| format!("{byte:02X}")).collect()
}
