//! Serializable result records handed to persistence and display layers.

use serde::{Deserialize, Serialize};

use crate::{Candidate, IndividualQuery, RankingOutcome, Source};

pub const DEFAULT_PROFILE_URL_PREFIX: &str = "https://www.tiktok.com/@";

/// External shape of a ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub identifier: String,
    pub url: String,
    pub popularity: u64,
    pub raw_score: u32,
    pub confidence: f64,
    pub provenance: Vec<Source>,
    pub num_sources: usize,
    pub verified: bool,
    pub text: String,
    pub mentions_role: bool,
    pub mentions_institution: bool,
    pub mentions_affiliation: bool,
    pub mentions_locality: bool,
    pub affiliation_label: Option<String>,
}

impl CandidateRecord {
    pub fn from_candidate(candidate: &Candidate, url_prefix: &str) -> Self {
        let analysis = candidate.analysis.clone().unwrap_or_default();
        Self {
            identifier: candidate.identifier.clone(),
            url: format!("{url_prefix}{}", candidate.identifier),
            popularity: candidate.popularity,
            raw_score: candidate.raw_score,
            confidence: candidate.confidence,
            provenance: candidate.provenance.iter().copied().collect(),
            num_sources: candidate.num_sources(),
            verified: candidate.verified,
            text: analysis.text,
            mentions_role: analysis.mentions_role,
            mentions_institution: analysis.mentions_institution,
            mentions_affiliation: analysis.mentions_affiliation,
            mentions_locality: analysis.mentions_locality,
            affiliation_label: analysis.affiliation_label,
        }
    }
}

/// Ranking result for one queried individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohort: Option<String>,
    pub found: bool,
    pub best_match: Option<CandidateRecord>,
    pub shortlist: Vec<CandidateRecord>,
}

impl IndividualResult {
    pub fn from_outcome(query: &IndividualQuery, outcome: &RankingOutcome, url_prefix: &str) -> Self {
        Self {
            name: query.name.clone(),
            cohort: query.cohort.clone(),
            found: outcome.found,
            best_match: outcome
                .best
                .as_ref()
                .map(|c| CandidateRecord::from_candidate(c, url_prefix)),
            shortlist: outcome
                .shortlist
                .iter()
                .map(|c| CandidateRecord::from_candidate(c, url_prefix))
                .collect(),
        }
    }
}

/// Totals over a batch of individuals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub found: usize,
    /// Mean best-match confidence over found individuals; 0 when none.
    pub average_confidence: f64,
}

impl RunSummary {
    pub fn from_results(results: &[IndividualResult]) -> Self {
        let confidences: Vec<f64> = results
            .iter()
            .filter(|r| r.found)
            .filter_map(|r| r.best_match.as_ref().map(|b| b.confidence))
            .collect();
        let average_confidence = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };
        Self {
            processed: results.len(),
            found: results.iter().filter(|r| r.found).count(),
            average_confidence,
        }
    }
}

const CSV_HEADER: &str = "name,cohort,identifier,url,popularity,confidence,raw_score,sources,num_sources,verified,mentions_role,mentions_institution,mentions_affiliation,mentions_locality,affiliation_label,text\n";

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Flatten results to CSV, one row per individual.
///
/// Not-found individuals keep their name and cohort with an empty match
/// (zero counts, `false` flags).
pub fn to_csv(results: &[IndividualResult]) -> String {
    let mut out = String::from(CSV_HEADER);
    for r in results {
        let cohort = r.cohort.as_deref().unwrap_or("");
        match r.best_match.as_ref().filter(|_| r.found) {
            Some(best) => {
                let sources: Vec<&str> = best.provenance.iter().map(|s| s.as_str()).collect();
                out.push_str(&format!(
                    "{},{},{},{},{},{:.6},{},{},{},{},{},{},{},{},{},{}\n",
                    csv_escape(&r.name),
                    csv_escape(cohort),
                    csv_escape(&best.identifier),
                    csv_escape(&best.url),
                    best.popularity,
                    best.confidence,
                    best.raw_score,
                    csv_escape(&sources.join(",")),
                    best.num_sources,
                    best.verified,
                    best.mentions_role,
                    best.mentions_institution,
                    best.mentions_affiliation,
                    best.mentions_locality,
                    csv_escape(best.affiliation_label.as_deref().unwrap_or("")),
                    csv_escape(&best.text),
                ));
            }
            None => {
                out.push_str(&format!(
                    "{},{},,,0,0.000000,0,,0,false,false,false,false,false,,\n",
                    csv_escape(&r.name),
                    csv_escape(cohort),
                ));
            }
        }
    }
    out
}
