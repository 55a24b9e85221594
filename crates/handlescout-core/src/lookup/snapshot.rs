//! Lookup backed by a JSON snapshot of previously fetched profiles.

use std::collections::HashMap;
use std::path::Path;

use super::{LookupError, ProfileLookup, ProfileSignals};
use crate::CoreError;
use crate::text::normalize_identifier;

/// In-memory map of identifier → signals.
///
/// The JSON form is an object keyed by handle:
///
/// ```json
/// { "jeandupont": { "popularity": 12000, "verified": false, "text": "Député" } }
/// ```
///
/// Identifiers missing from the snapshot are reported as nonexistent.
#[derive(Debug, Clone, Default)]
pub struct SnapshotLookup {
    profiles: HashMap<String, ProfileSignals>,
}

impl SnapshotLookup {
    pub fn from_map(profiles: HashMap<String, ProfileSignals>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|(id, signals)| (normalize_identifier(&id), signals))
            .filter(|(id, _)| !id.is_empty())
            .collect();
        Self { profiles }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let profiles: HashMap<String, ProfileSignals> = serde_json::from_str(json)?;
        Ok(Self::from_map(profiles))
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let lookup = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), profiles = lookup.len(), "loaded profile snapshot");
        Ok(lookup)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileLookup for SnapshotLookup {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn lookup(&self, identifier: &str) -> Result<ProfileSignals, LookupError> {
        Ok(self
            .profiles
            .get(&normalize_identifier(identifier))
            .cloned()
            .unwrap_or_else(ProfileSignals::missing))
    }
}
