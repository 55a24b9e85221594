use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod classifier;
pub mod confidence;
pub mod config_file;
pub mod lookup;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod text;
pub mod variants;

// Re-export for convenience
pub use classifier::{AffiliationGroup, Classifier, KeywordTables, TextAnalysis};
pub use confidence::{distribute_confidence, quality_factor};
pub use lookup::{LookupError, ProfileLookup, ProfileSignals, SnapshotLookup};
pub use ranking::{MergedIdentifier, Ranker, RankingConfig, merge_sources};
pub use report::{CandidateRecord, IndividualResult, RunSummary};
pub use scoring::{RuleScore, ScoreBreakdown, raw_score, score_breakdown};
pub use text::{normalize_identifier, normalize_text};

/// Where a candidate identifier came from.
///
/// The declaration order is also the merge order used by
/// [`IndividualQuery::source_lists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Handle listed for the same person on another platform.
    CrossPlatform,
    /// Handle harvested from web search results.
    WebSearch,
    /// Handle generated from the person's name.
    NameVariant,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::CrossPlatform => "cross_platform",
            Source::WebSearch => "web_search",
            Source::NameVariant => "name_variant",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The source-tagged identifier lists gathered for one individual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualQuery {
    pub name: String,
    /// Free-form grouping label (e.g. a legislature number).
    #[serde(
        default,
        alias = "Legislature",
        deserialize_with = "deserialize_cohort",
        skip_serializing_if = "Option::is_none"
    )]
    pub cohort: Option<String>,
    #[serde(default, alias = "twitter_username")]
    pub cross_platform: Vec<String>,
    #[serde(default, alias = "websearch_username")]
    pub web_search: Vec<String>,
    #[serde(default, alias = "variant_username")]
    pub name_variant: Vec<String>,
}

impl IndividualQuery {
    /// The identifier lists in merge order.
    pub fn source_lists(&self) -> [(Source, &[String]); 3] {
        [
            (Source::CrossPlatform, self.cross_platform.as_slice()),
            (Source::WebSearch, self.web_search.as_slice()),
            (Source::NameVariant, self.name_variant.as_slice()),
        ]
    }
}

/// Render a JSON cohort value as a label.
///
/// Null and blank strings have no label; whole floats such as `16.0` print
/// as integers.
pub fn cohort_label(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{f:.0}")),
            _ => Some(n.to_string()),
        },
        other => Some(other.to_string()),
    }
}

fn deserialize_cohort<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(cohort_label))
}

/// One identifier proposed as a possible match for a queried individual.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub identifier: String,
    pub provenance: BTreeSet<Source>,
    pub exists: bool,
    pub popularity: u64,
    pub verified: bool,
    /// Only computed for candidates with a positive popularity.
    pub analysis: Option<TextAnalysis>,
    pub raw_score: u32,
    pub confidence: f64,
    pub breakdown: Option<ScoreBreakdown>,
}

impl Candidate {
    /// An existing, not yet scored candidate.
    pub fn new(identifier: impl Into<String>, provenance: BTreeSet<Source>) -> Self {
        Self {
            identifier: identifier.into(),
            provenance,
            exists: true,
            popularity: 0,
            verified: false,
            analysis: None,
            raw_score: 0,
            confidence: 0.0,
            breakdown: None,
        }
    }

    pub fn num_sources(&self) -> usize {
        self.provenance.len()
    }
}

/// Result of ranking the candidates of one individual.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOutcome {
    pub best: Option<Candidate>,
    /// Best-first, at most `shortlist_len` entries.
    pub shortlist: Vec<Candidate>,
    pub found: bool,
}

impl RankingOutcome {
    pub fn not_found() -> Self {
        Self {
            best: None,
            shortlist: vec![],
            found: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("configuration error: {0}")]
    Config(String),
}
