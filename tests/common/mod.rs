//! Integration test common infrastructure.
//!
//! Provides a scripted in-memory transport and config helpers for driving a
//! [`openbot::Bot`] without a network.

pub mod transport;

#[allow(unused_imports)]
pub use transport::MockTransport;

use openbot::Config;

/// Config with no capability requests and the default pacing.
#[allow(dead_code)]
pub fn test_config() -> Config {
    toml::from_str(
        r##"
        [account]
        username = "PaceBot"

        [connection]
        channel = "#chan"
        capabilities = []
        "##,
    )
    .expect("test config parses")
}
