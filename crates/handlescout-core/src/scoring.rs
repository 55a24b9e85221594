//! Additive raw scoring of a single candidate.

use serde::{Deserialize, Serialize};

use crate::Candidate;
use crate::classifier::TextAnalysis;

/// `(minimum popularity, points)`, highest threshold first. Exactly one tier
/// applies.
pub const POPULARITY_TIERS: [(u64, u32); 5] =
    [(100_000, 100), (10_000, 50), (1_000, 25), (100, 5), (1, 2)];

pub const ROLE_BONUS: u32 = 10;
pub const INSTITUTION_BONUS: u32 = 5;
pub const AFFILIATION_BONUS: u32 = 5;
pub const VERIFIED_BONUS: u32 = 50;

/// Points contributed by one scoring rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleScore {
    pub rule: String,
    pub points: u32,
    pub detail: String,
}

/// Per-rule trace of a raw score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rules: Vec<RuleScore>,
    pub total: u32,
}

pub fn popularity_bonus(popularity: u64) -> u32 {
    POPULARITY_TIERS
        .iter()
        .find(|(threshold, _)| popularity >= *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

/// Score a candidate's signals, recording every rule's contribution.
///
/// Text bonuses, including the verification bonus, only count when an
/// analysis is present and its text was found.
pub fn score_breakdown(
    popularity: u64,
    verified: bool,
    analysis: Option<&TextAnalysis>,
) -> ScoreBreakdown {
    let text = analysis.filter(|a| a.found);
    let flag = |get: fn(&TextAnalysis) -> bool| text.map(get).unwrap_or(false);

    let rules = vec![
        RuleScore {
            rule: "popularity_tier".to_string(),
            points: popularity_bonus(popularity),
            detail: format!("popularity={popularity}"),
        },
        rule_if(
            "mentions_role",
            flag(|a| a.mentions_role),
            ROLE_BONUS,
            text.is_some(),
        ),
        rule_if(
            "mentions_institution",
            flag(|a| a.mentions_institution),
            INSTITUTION_BONUS,
            text.is_some(),
        ),
        rule_if(
            "mentions_affiliation",
            flag(|a| a.mentions_affiliation),
            AFFILIATION_BONUS,
            text.is_some(),
        ),
        RuleScore {
            rule: "platform_verified".to_string(),
            points: if verified && text.is_some() {
                VERIFIED_BONUS
            } else {
                0
            },
            detail: format!("verified={verified} text_found={}", text.is_some()),
        },
    ];

    let total = rules.iter().map(|r| r.points).sum();
    ScoreBreakdown { rules, total }
}

fn rule_if(rule: &str, hit: bool, points: u32, text_found: bool) -> RuleScore {
    RuleScore {
        rule: rule.to_string(),
        points: if hit { points } else { 0 },
        detail: format!("hit={hit} text_found={text_found}"),
    }
}

/// Raw score of a candidate from its popularity, verification flag and text
/// analysis.
pub fn raw_score(candidate: &Candidate) -> u32 {
    score_breakdown(
        candidate.popularity,
        candidate.verified,
        candidate.analysis.as_ref(),
    )
    .total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(role: bool, institution: bool, affiliation: bool) -> TextAnalysis {
        TextAnalysis {
            found: true,
            text: "bio".into(),
            mentions_role: role || institution,
            mentions_institution: institution,
            mentions_affiliation: affiliation,
            mentions_locality: false,
            affiliation_label: affiliation.then(|| "X".to_string()),
        }
    }

    #[test]
    fn popularity_tiers_boundaries() {
        assert_eq!(popularity_bonus(0), 0);
        assert_eq!(popularity_bonus(1), 2);
        assert_eq!(popularity_bonus(99), 2);
        assert_eq!(popularity_bonus(100), 5);
        assert_eq!(popularity_bonus(999), 5);
        assert_eq!(popularity_bonus(1_000), 25);
        assert_eq!(popularity_bonus(9_999), 25);
        assert_eq!(popularity_bonus(10_000), 50);
        assert_eq!(popularity_bonus(99_999), 50);
        assert_eq!(popularity_bonus(100_000), 100);
        assert_eq!(popularity_bonus(u64::MAX), 100);
    }

    #[test]
    fn all_text_bonuses_add_up() {
        let a = analysis(true, true, true);
        let b = score_breakdown(150_000, true, Some(&a));
        assert_eq!(b.total, 100 + 10 + 5 + 5 + 50);
        assert_eq!(b.rules.len(), 5);
    }

    #[test]
    fn verified_needs_found_text() {
        let missing = TextAnalysis::default();
        assert_eq!(score_breakdown(500, true, Some(&missing)).total, 5);
        assert_eq!(score_breakdown(500, true, None).total, 5);
        let found = analysis(false, false, false);
        assert_eq!(score_breakdown(500, true, Some(&found)).total, 55);
    }

    #[test]
    fn text_flags_ignored_when_not_found() {
        let mut a = analysis(true, true, true);
        a.found = false;
        assert_eq!(score_breakdown(0, false, Some(&a)).total, 0);
    }

    #[test]
    fn monotonic_in_popularity() {
        let a = analysis(true, false, true);
        let pops = [0u64, 1, 50, 100, 500, 1_000, 5_000, 10_000, 60_000, 100_000, 10_000_000];
        for with_text in [None, Some(&a)] {
            let scores: Vec<u32> = pops
                .iter()
                .map(|p| score_breakdown(*p, true, with_text).total)
                .collect();
            assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{scores:?}");
        }
    }

    #[test]
    fn raw_score_matches_breakdown_total() {
        let mut c = Candidate::new("x", Default::default());
        c.popularity = 12_000;
        c.analysis = Some(analysis(true, false, false));
        assert_eq!(raw_score(&c), 60);
    }

    #[test]
    fn breakdown_names_every_rule() {
        let b = score_breakdown(0, false, None);
        let names: Vec<&str> = b.rules.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "popularity_tier",
                "mentions_role",
                "mentions_institution",
                "mentions_affiliation",
                "platform_verified"
            ]
        );
        assert_eq!(b.total, 0);
    }
}
