//! Sliding-window rate limiter for outbound commands.
//!
//! Every command sent is recorded in an [`ExpiringWindow`] ledger. A new
//! send is admitted while the ledger holds fewer than `limit - 1` live
//! entries: one slot of the server allowance is always held back.

use crate::config::RateLimitConfig;
use crate::window::ExpiringWindow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// A command recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub payload: String,
}

/// Thread-safe admission control for outbound commands.
#[derive(Debug)]
pub struct RateLimiter {
    ledger: ExpiringWindow<SentCommand>,
    limit: AtomicUsize,
    normal_limit: usize,
    elevated_limit: usize,
    elevated_delay: Duration,
}

impl RateLimiter {
    /// Create a limiter at the normal tier.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            ledger: ExpiringWindow::new(config.window()),
            limit: AtomicUsize::new(config.normal_limit),
            normal_limit: config.normal_limit,
            elevated_limit: config.elevated_limit,
            elevated_delay: config.elevated_delay(),
        }
    }

    /// Current per-window limit.
    pub fn limit(&self) -> usize {
        self.limit.load(Ordering::Acquire)
    }

    pub fn window(&self) -> Duration {
        self.ledger.duration()
    }

    /// Number of sends still counted against the window.
    pub fn in_flight(&self) -> usize {
        self.ledger.len()
    }

    /// Snapshot of the live ledger, oldest first.
    pub fn sent(&self) -> Vec<SentCommand> {
        self.ledger.snapshot()
    }

    /// Whether one more send would be admitted right now.
    pub fn has_headroom(&self) -> bool {
        Self::admits(self.ledger.len(), self.limit())
    }

    /// Record `payload` as sent if the window has headroom.
    ///
    /// Returns `false` without touching the ledger when saturated.
    pub fn try_record_send(&self, payload: &str) -> bool {
        let limit = self.limit();
        let command = SentCommand {
            payload: payload.to_owned(),
        };
        self.ledger
            .push_if(command, |live| Self::admits(live, limit))
    }

    /// Set the per-window limit. Takes effect on the next admission check.
    pub fn set_limit(&self, limit: usize) {
        let previous = self.limit.swap(limit, Ordering::AcqRel);
        if previous != limit {
            debug!(previous, limit, "rate limit changed");
        }
    }

    /// Switch between the normal and elevated tier.
    pub fn set_elevated(&self, elevated: bool) {
        self.set_limit(if elevated {
            self.elevated_limit
        } else {
            self.normal_limit
        });
    }

    /// Minimum spacing between consecutive sends.
    ///
    /// Fixed short delay when elevated, otherwise the window spread evenly
    /// over the current limit.
    pub fn pace_delay(&self, elevated: bool) -> Duration {
        if elevated {
            return self.elevated_delay;
        }
        let limit = u32::try_from(self.limit().max(1)).unwrap_or(u32::MAX);
        self.window() / limit
    }

    #[inline]
    fn admits(live: usize, limit: usize) -> bool {
        live + 1 < limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(&RateLimitConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn admits_limit_minus_one_per_window() {
        let limiter = limiter();
        for i in 0..19 {
            assert!(limiter.try_record_send(&format!("PRIVMSG #c :{i}")));
        }
        assert!(!limiter.has_headroom());
        assert!(!limiter.try_record_send("PRIVMSG #c :overflow"));
        assert_eq!(limiter.in_flight(), 19);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(limiter.in_flight(), 0);
        assert!(limiter.try_record_send("PRIVMSG #c :again"));
    }

    #[tokio::test(start_paused = true)]
    async fn elevated_tier_admits_ninety_nine() {
        let limiter = limiter();
        limiter.set_elevated(true);
        assert_eq!(limiter.limit(), 100);
        let admitted = (0..150)
            .filter(|i| limiter.try_record_send(&i.to_string()))
            .count();
        assert_eq!(admitted, 99);
    }

    #[tokio::test(start_paused = true)]
    async fn lowering_limit_does_not_evict() {
        let limiter = limiter();
        limiter.set_elevated(true);
        for i in 0..50 {
            assert!(limiter.try_record_send(&i.to_string()));
        }
        limiter.set_elevated(false);
        assert_eq!(limiter.in_flight(), 50);
        assert!(!limiter.try_record_send("blocked"));
    }

    #[test]
    fn pace_delay_per_tier() {
        let limiter = limiter();
        assert_eq!(limiter.pace_delay(false), Duration::from_millis(1550));
        assert_eq!(limiter.pace_delay(true), Duration::from_millis(2));

        limiter.set_elevated(true);
        assert_eq!(limiter.pace_delay(false), Duration::from_millis(310));
    }

    #[test]
    fn concurrent_senders_never_exceed_threshold() {
        let limiter = std::sync::Arc::new(limiter());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let limiter = std::sync::Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|i| limiter.try_record_send(&format!("{t}:{i}")))
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 19);
        assert_eq!(limiter.in_flight(), 19);
    }

    #[test]
    fn ledger_records_payloads_in_order() {
        let limiter = limiter();
        limiter.try_record_send("first");
        limiter.try_record_send("second");
        let payloads: Vec<_> = limiter.sent().into_iter().map(|c| c.payload).collect();
        assert_eq!(payloads, vec!["first", "second"]);
    }
}
