//! Conversion of ranked raw scores into a confidence distribution.
//!
//! Only the top candidate's confidence depends on the scores: it combines an
//! absolute quality factor (sigmoid of the best score) with the relative
//! margin over the runner-up. Every other candidate receives an equal share
//! of the remaining mass, whatever its own score.

/// Raw score at which the quality factor is exactly 0.5.
pub const QUALITY_MIDPOINT: f64 = 60.0;
/// Logistic scale of the quality factor.
pub const QUALITY_SCALE: f64 = 25.0;
/// Score gap at which the margin term saturates.
pub const DECISIVE_MARGIN: f64 = 30.0;

const SINGLE_BASE: f64 = 0.30;
const SINGLE_SPAN: f64 = 0.65;
const TOP_BASE: f64 = 0.25;
const TOP_SPAN: f64 = 0.70;

/// Logistic quality factor of a raw score, in (0, 1).
pub fn quality_factor(best_score: u32) -> f64 {
    let x = (f64::from(best_score) - QUALITY_MIDPOINT) / QUALITY_SCALE;
    1.0 / (1.0 + (-x).exp())
}

/// Distribute confidence over scores sorted in descending order.
///
/// The output has the same length as the input, element 0 belongs to the
/// top score, and the values sum to at most 1.0.
pub fn distribute_confidence(scores: &[u32]) -> Vec<f64> {
    debug_assert!(
        scores.windows(2).all(|w| w[0] >= w[1]),
        "scores must be sorted descending: {scores:?}"
    );

    let Some(&best) = scores.first() else {
        return vec![];
    };
    let quality = quality_factor(best);

    if scores.len() == 1 {
        return vec![SINGLE_BASE + SINGLE_SPAN * quality];
    }

    let margin = f64::from(best.saturating_sub(scores[1]));
    let margin_score = (margin / DECISIVE_MARGIN).min(1.0);
    let top = TOP_BASE + TOP_SPAN * quality * margin_score;

    let share = (1.0 - top) / (scores.len() - 1) as f64;
    let mut confidences = Vec::with_capacity(scores.len());
    confidences.push(top);
    confidences.extend(std::iter::repeat_n(share, scores.len() - 1));
    confidences
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn empty_input() {
        assert!(distribute_confidence(&[]).is_empty());
    }

    #[test]
    fn single_at_midpoint() {
        let c = distribute_confidence(&[60]);
        assert_eq!(c.len(), 1);
        assert!((c[0] - 0.625).abs() < EPS, "c={c:?}");
    }

    #[test]
    fn single_stays_in_open_range() {
        for score in [0u32, 1, 30, 60, 100, 200, 1_000] {
            let c = distribute_confidence(&[score])[0];
            assert!(c > 0.30 && c <= 0.95 + 1e-9, "score={score} c={c}");
        }
    }

    #[test]
    fn decisive_leader_scenario() {
        let c = distribute_confidence(&[100, 60, 0]);
        let quality = 1.0 / (1.0 + (-1.6f64).exp());
        assert!((quality - 0.832).abs() < 1e-3);
        let top = 0.25 + 0.70 * quality;
        assert!((c[0] - top).abs() < EPS);
        assert!((c[0] - 0.832).abs() < 1e-3, "c={c:?}");
        assert!((c[1] - (1.0 - top) / 2.0).abs() < EPS);
        assert!((c[1] - 0.084).abs() < 1e-3);
        assert_eq!(c[1], c[2]);
        assert!(c[0] >= c[1]);
    }

    #[test]
    fn tie_between_two_gives_floor() {
        let c = distribute_confidence(&[50, 50]);
        assert!((c[0] - 0.25).abs() < EPS);
        assert!((c[1] - 0.75).abs() < EPS);
    }

    #[test]
    fn runners_up_split_equally_regardless_of_score() {
        // Equal split is deliberate: only the top candidate's margin matters.
        let c = distribute_confidence(&[120, 80, 40, 2]);
        assert_eq!(c[1], c[2]);
        assert_eq!(c[2], c[3]);
    }

    #[test]
    fn output_is_bounded_and_sums_to_at_most_one() {
        let cases: &[&[u32]] = &[
            &[0],
            &[0, 0],
            &[2, 2, 2, 2],
            &[230, 2],
            &[100, 60, 0],
            &[75, 70, 65, 60, 55, 50, 45, 40, 35, 30],
        ];
        for scores in cases {
            let c = distribute_confidence(scores);
            assert_eq!(c.len(), scores.len());
            assert!(c.iter().all(|v| (0.0..=1.0).contains(v)), "{c:?}");
            let sum: f64 = c.iter().sum();
            assert!(sum <= 1.0 + 1e-9, "sum={sum} for {scores:?}");
        }
    }

    #[test]
    fn top_confidence_grows_with_margin() {
        let best = 90;
        let tops: Vec<f64> = (0..=30)
            .map(|gap| distribute_confidence(&[best, best - gap, 0])[0])
            .collect();
        assert!(tops.windows(2).all(|w| w[1] > w[0]), "{tops:?}");

        // Saturates once the gap reaches the decisive margin.
        let at_30 = distribute_confidence(&[best, best - 30])[0];
        let at_60 = distribute_confidence(&[best, best - 60])[0];
        assert!((at_30 - at_60).abs() < EPS);
    }

    #[test]
    fn quality_factor_is_sigmoid() {
        assert!((quality_factor(60) - 0.5).abs() < EPS);
        assert!(quality_factor(0) < 0.1);
        assert!(quality_factor(200) > 0.99);
        assert!(quality_factor(61) > quality_factor(60));
    }
}
