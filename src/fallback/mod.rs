//! Offline answers used only after every networked provider has failed.
//!
//! The data lives in TOML assets under `data/` (embedded at compile time);
//! this module only holds the matching logic.

pub mod knowledge;
pub mod phrasebook;

use thiserror::Error;

/// Provider id reported when an answer came from local data.
pub const OFFLINE_PROVIDER: &str = "offline";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse {asset}: {source}")]
    Parse {
        asset: &'static str,
        #[source]
        source: toml::de::Error,
    },

    #[error("{asset} is invalid: {message}")]
    Invalid {
        asset: &'static str,
        message: String,
    },
}
