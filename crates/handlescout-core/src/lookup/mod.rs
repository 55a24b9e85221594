//! Profile lookup trait and implementations for resolving candidate signals.

pub mod mock;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use snapshot::SnapshotLookup;

/// Signals known about one account on the target platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSignals {
    /// An entry without this field is taken to exist.
    #[serde(default = "default_exists")]
    pub exists: bool,
    #[serde(default, alias = "followers", alias = "subscribers")]
    pub popularity: u64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, alias = "bio")]
    pub text: Option<String>,
}

fn default_exists() -> bool {
    true
}

impl ProfileSignals {
    /// The signals of an account that does not exist.
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn existing(popularity: u64) -> Self {
        Self {
            exists: true,
            popularity,
            ..Self::default()
        }
    }
}

/// Failure of the lookup collaborator for one identifier.
///
/// The ranking pipeline treats every variant as "account does not exist".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("profile service unavailable: {0}")]
    Unavailable(String),
    #[error("profile lookup timed out")]
    Timeout,
    #[error("malformed profile data: {0}")]
    Malformed(String),
}

/// A source of per-account signals.
///
/// Implementations own their transport concerns (timeouts, politeness
/// delays, caching); the ranking core calls `lookup` once per unique
/// identifier.
pub trait ProfileLookup: Send + Sync {
    /// Name of this lookup, used in logs.
    fn name(&self) -> &str;

    fn lookup(&self, identifier: &str) -> Result<ProfileSignals, LookupError>;
}
