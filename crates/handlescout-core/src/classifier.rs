//! Keyword classification of profile text.
//!
//! A [`Classifier`] owns normalized keyword tables and turns a profile's
//! free text into a fixed-shape [`TextAnalysis`]. Matching is plain substring
//! containment on [`normalize_text`] output.

use serde::{Deserialize, Serialize};

use crate::text::normalize_text;

const ROLE_KEYWORDS: &[&str] = &["depute", "deputee", "parlementaire", "elu", "elue"];

const INSTITUTION_KEYWORDS: &[&str] = &["assemblee nationale", "assemblee", "palais bourbon"];

/// Scanned in this order; the first group with a hit provides the label.
const AFFILIATION_GROUPS: &[(&str, &[&str])] = &[
    ("LFI", &["lfi", "france insoumise", "la france insoumise", "insoumis"]),
    ("Renaissance", &["renaissance", "renew", "ensemble"]),
    ("RN", &["rn", "rassemblement national", "front national", "fn"]),
    ("LR", &["lr", "les republicains", "republicains"]),
    ("PS", &["ps", "parti socialiste", "socialiste"]),
    ("EELV", &["eelv", "ecologiste", "europe ecologie", "verts"]),
    ("PCF", &["pcf", "communiste", "parti communiste"]),
    ("Modem", &["modem", "democrate"]),
    ("Horizons", &["horizons"]),
    ("UDI", &["udi", "union des democrates"]),
];

const LOCALITY_KEYWORDS: &[&str] = &[
    "circonscription",
    "departement",
    "region",
    "territoire",
    "seine",
    "paris",
    "lyon",
    "marseille",
    "nord",
    "sud",
    "val-de-marne",
    "essonne",
    "hauts-de-seine",
    "yvelines",
];

/// A named affiliation and the keywords that indicate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliationGroup {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Keyword lists as configured, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTables {
    pub role: Vec<String>,
    pub institution: Vec<String>,
    pub affiliations: Vec<AffiliationGroup>,
    pub locality: Vec<String>,
}

impl Default for KeywordTables {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self {
            role: owned(ROLE_KEYWORDS),
            institution: owned(INSTITUTION_KEYWORDS),
            affiliations: AFFILIATION_GROUPS
                .iter()
                .map(|(label, words)| AffiliationGroup {
                    label: label.to_string(),
                    keywords: owned(words),
                })
                .collect(),
            locality: owned(LOCALITY_KEYWORDS),
        }
    }
}

/// Indicator tags derived from a profile's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// `false` when the text was absent or blank.
    pub found: bool,
    pub text: String,
    pub mentions_role: bool,
    pub mentions_institution: bool,
    pub mentions_affiliation: bool,
    pub mentions_locality: bool,
    pub affiliation_label: Option<String>,
}

/// Deterministic keyword classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    role: Vec<String>,
    institution: Vec<String>,
    affiliations: Vec<AffiliationGroup>,
    locality: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KeywordTables::default())
    }
}

impl Classifier {
    /// Build a classifier, normalizing every keyword once.
    ///
    /// Keywords that normalize to the empty string are dropped: they would
    /// otherwise match any text.
    pub fn new(tables: KeywordTables) -> Self {
        Self {
            role: normalize_keywords(&tables.role),
            institution: normalize_keywords(&tables.institution),
            affiliations: tables
                .affiliations
                .iter()
                .map(|group| AffiliationGroup {
                    label: group.label.clone(),
                    keywords: normalize_keywords(&group.keywords),
                })
                .filter(|group| !group.keywords.is_empty())
                .collect(),
            locality: normalize_keywords(&tables.locality),
        }
    }

    /// Classify a profile text. Absent or blank text yields the all-false
    /// analysis without any keyword search.
    pub fn analyze(&self, text: Option<&str>) -> TextAnalysis {
        let raw = text.map(str::trim).unwrap_or_default();
        let normalized = normalize_text(raw);
        if normalized.is_empty() {
            return TextAnalysis {
                text: raw.to_string(),
                ..TextAnalysis::default()
            };
        }

        let mentions_institution = contains_any(&normalized, &self.institution);
        let mentions_role = mentions_institution || contains_any(&normalized, &self.role);
        let affiliation_label = self
            .affiliations
            .iter()
            .find(|group| contains_any(&normalized, &group.keywords))
            .map(|group| group.label.clone());

        TextAnalysis {
            found: true,
            text: raw.to_string(),
            mentions_role,
            mentions_institution,
            mentions_affiliation: affiliation_label.is_some(),
            mentions_locality: contains_any(&normalized, &self.locality),
            affiliation_label,
        }
    }
}

fn normalize_keywords(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| normalize_text(w))
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}
