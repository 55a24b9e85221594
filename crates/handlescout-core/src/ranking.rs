use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::confidence::distribute_confidence;
use crate::lookup::ProfileLookup;
use crate::scoring::score_breakdown;
use crate::text::normalize_identifier;
use crate::{Candidate, IndividualQuery, RankingOutcome, Source};

pub const DEFAULT_SHORTLIST_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Maximum number of candidates kept in the shortlist (at least 1).
    pub shortlist_len: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            shortlist_len: DEFAULT_SHORTLIST_LEN,
        }
    }
}

/// A unique identifier and every source that proposed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedIdentifier {
    pub identifier: String,
    pub provenance: BTreeSet<Source>,
}

/// Merge source-tagged identifier lists, deduplicating on the normalized
/// identifier.
///
/// The result keeps first-seen order across all lists; a repeated
/// identifier only adds its source to the existing provenance set.
pub fn merge_sources<'a, I>(lists: I) -> Vec<MergedIdentifier>
where
    I: IntoIterator<Item = (Source, &'a [String])>,
{
    let mut merged: Vec<MergedIdentifier> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (source, identifiers) in lists {
        for raw in identifiers {
            let identifier = normalize_identifier(raw);
            if identifier.is_empty() {
                continue;
            }
            match index.get(&identifier) {
                Some(&i) => {
                    merged[i].provenance.insert(source);
                }
                None => {
                    index.insert(identifier.clone(), merged.len());
                    merged.push(MergedIdentifier {
                        identifier,
                        provenance: BTreeSet::from([source]),
                    });
                }
            }
        }
    }

    merged
}

/// Ranks the candidates of one individual at a time.
///
/// Holds no per-individual state, so one `Ranker` can serve any number of
/// individuals, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    classifier: Classifier,
    config: RankingConfig,
}

impl Ranker {
    pub fn new(classifier: Classifier, config: RankingConfig) -> Self {
        Self { classifier, config }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Merge, resolve, score and rank the candidates of one individual.
    pub fn rank(&self, query: &IndividualQuery, lookup: &dyn ProfileLookup) -> RankingOutcome {
        let merged = merge_sources(query.source_lists());
        if merged.is_empty() {
            tracing::debug!(name = %query.name, "no candidate identifiers");
            return RankingOutcome::not_found();
        }
        let candidates = self.resolve(merged, lookup);
        self.rank_candidates(candidates)
    }

    /// Look up every merged identifier once, keeping existing accounts in
    /// merge order.
    ///
    /// Lookup errors are logged and treated as nonexistent accounts. Text is
    /// only classified for accounts with a positive popularity.
    pub fn resolve(
        &self,
        merged: Vec<MergedIdentifier>,
        lookup: &dyn ProfileLookup,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(merged.len());

        for MergedIdentifier {
            identifier,
            provenance,
        } in merged
        {
            let signals = match lookup.lookup(&identifier) {
                Ok(signals) if signals.exists => signals,
                Ok(_) => {
                    tracing::debug!(lookup = lookup.name(), identifier = %identifier, "discarded: does not exist");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(lookup = lookup.name(), identifier = %identifier, error = %e, "discarded: lookup error");
                    continue;
                }
            };

            let analysis = (signals.popularity >= 1)
                .then(|| self.classifier.analyze(signals.text.as_deref()));

            candidates.push(Candidate {
                exists: true,
                popularity: signals.popularity,
                verified: signals.verified,
                analysis,
                ..Candidate::new(identifier, provenance)
            });
        }

        candidates
    }

    /// Score, sort and assign confidence to already resolved candidates.
    ///
    /// `candidates` must be in merge order; ties in raw score keep that
    /// order. When no candidate has a positive popularity, the first existing
    /// one is returned unscored as a best-effort pick.
    pub fn rank_candidates(&self, candidates: Vec<Candidate>) -> RankingOutcome {
        let (mut popular, rest): (Vec<Candidate>, Vec<Candidate>) = candidates
            .into_iter()
            .filter(|c| c.exists)
            .partition(|c| c.popularity >= 1);

        if popular.is_empty() {
            let Some(first) = rest.into_iter().next() else {
                return RankingOutcome::not_found();
            };
            tracing::debug!(identifier = %first.identifier, "no popularity signal, using first found");
            return RankingOutcome {
                best: Some(first.clone()),
                shortlist: vec![first],
                found: true,
            };
        }

        for candidate in &mut popular {
            let breakdown = score_breakdown(
                candidate.popularity,
                candidate.verified,
                candidate.analysis.as_ref(),
            );
            candidate.raw_score = breakdown.total;
            candidate.breakdown = Some(breakdown);
            tracing::trace!(identifier = %candidate.identifier, raw_score = candidate.raw_score, "scored");
        }

        // Stable sort: equal scores keep discovery order.
        popular.sort_by(|a, b| b.raw_score.cmp(&a.raw_score));

        let scores: Vec<u32> = popular.iter().map(|c| c.raw_score).collect();
        for (candidate, confidence) in popular.iter_mut().zip(distribute_confidence(&scores)) {
            candidate.confidence = confidence;
        }

        let shortlist: Vec<Candidate> = popular
            .into_iter()
            .take(self.config.shortlist_len.max(1))
            .collect();

        RankingOutcome {
            best: shortlist.first().cloned(),
            shortlist,
            found: true,
        }
    }
}
