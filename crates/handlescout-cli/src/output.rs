use std::collections::BTreeMap;
use std::io::Write;

use handlescout_core::{
    Candidate, IndividualQuery, IndividualResult, RunSummary, Source, TextAnalysis,
};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the progress prefix before an individual is ranked.
pub fn print_progress(
    w: &mut dyn Write,
    index: usize,
    total: usize,
    name: &str,
) -> std::io::Result<()> {
    write!(w, "[{}/{}] {}... ", index + 1, total, truncate(name, 50))?;
    w.flush()
}

/// Complete the progress line with the outcome for one individual.
pub fn print_outcome(
    w: &mut dyn Write,
    result: &IndividualResult,
    color: ColorMode,
) -> std::io::Result<()> {
    match (&result.best_match, result.found) {
        (Some(best), true) => {
            let detail = format!(
                "({} followers, conf={:.0}%)",
                thousands(best.popularity),
                best.confidence * 100.0
            );
            if color.enabled() {
                writeln!(
                    w,
                    "{} {} {}",
                    "✓".green(),
                    format!("@{}", best.identifier).bold(),
                    detail
                )?;
            } else {
                writeln!(w, "✓ @{} {}", best.identifier, detail)?;
            }
        }
        _ => {
            if color.enabled() {
                writeln!(w, "{}", "✗ Not found".red())?;
            } else {
                writeln!(w, "✗ Not found")?;
            }
        }
    }
    Ok(())
}

/// Print every shortlisted candidate with its score breakdown.
pub fn print_details(
    w: &mut dyn Write,
    shortlist: &[Candidate],
    color: ColorMode,
) -> std::io::Result<()> {
    for (rank, candidate) in shortlist.iter().enumerate() {
        let sources: Vec<&str> = candidate.provenance.iter().map(|s| s.as_str()).collect();
        let header = format!(
            "#{} @{}  score={} conf={:.1}%  [{}]",
            rank + 1,
            candidate.identifier,
            candidate.raw_score,
            candidate.confidence * 100.0,
            sources.join(", ")
        );
        if color.enabled() {
            writeln!(w, "    {}", header.cyan())?;
        } else {
            writeln!(w, "    {}", header)?;
        }

        if let Some(ref breakdown) = candidate.breakdown {
            for rule in breakdown.rules.iter().filter(|r| r.points > 0) {
                let line = format!("+{:<3} {} ({})", rule.points, rule.rule, rule.detail);
                if color.enabled() {
                    writeln!(w, "        {}", line.dimmed())?;
                } else {
                    writeln!(w, "        {}", line)?;
                }
            }
        } else if color.enabled() {
            writeln!(w, "        {}", "(unscored: no popularity signal)".dimmed())?;
        } else {
            writeln!(w, "        (unscored: no popularity signal)")?;
        }
    }
    Ok(())
}

/// Print the final summary.
pub fn print_summary(
    w: &mut dyn Write,
    summary: &RunSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    let pct = if summary.processed > 0 {
        summary.found as f64 / summary.processed as f64 * 100.0
    } else {
        0.0
    };
    writeln!(w, "  Individuals processed: {}", summary.processed)?;
    if color.enabled() {
        writeln!(w, "  {} {} ({:.1}%)", "Found:".green(), summary.found, pct)?;
    } else {
        writeln!(w, "  Found: {} ({:.1}%)", summary.found, pct)?;
    }
    let missing = summary.processed - summary.found;
    if missing > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Not found:".red(), missing)?;
        } else {
            writeln!(w, "  Not found: {}", missing)?;
        }
    }
    writeln!(
        w,
        "  Average confidence: {:.1}%",
        summary.average_confidence * 100.0
    )?;
    writeln!(w)?;
    Ok(())
}

/// Print candidate counts per source after generating queries.
pub fn print_variant_stats(w: &mut dyn Write, queries: &[IndividualQuery]) -> std::io::Result<()> {
    let mut counts: BTreeMap<Source, usize> = BTreeMap::new();
    for query in queries {
        for (source, identifiers) in query.source_lists() {
            *counts.entry(source).or_default() += identifiers.len();
        }
    }
    let total: usize = counts.values().sum();

    writeln!(w, "Generated candidates for {} individuals", queries.len())?;
    for (source, count) in &counts {
        writeln!(w, "  {:<15} {}", format!("{}:", source), count)?;
    }
    writeln!(w, "  {:<15} {}", "total:", total)?;
    if !queries.is_empty() {
        writeln!(
            w,
            "  Average per individual: {:.1}",
            total as f64 / queries.len() as f64
        )?;
    }
    Ok(())
}

/// Print a text analysis as a short tag list.
pub fn print_analysis(
    w: &mut dyn Write,
    analysis: &TextAnalysis,
    color: ColorMode,
) -> std::io::Result<()> {
    if !analysis.found {
        writeln!(w, "No text to classify.")?;
        return Ok(());
    }
    let tags = [
        ("role", analysis.mentions_role),
        ("institution", analysis.mentions_institution),
        ("affiliation", analysis.mentions_affiliation),
        ("locality", analysis.mentions_locality),
    ];
    for (tag, hit) in tags {
        let mark = if hit { "yes" } else { "no" };
        if color.enabled() && hit {
            writeln!(w, "  {:<12} {}", tag, mark.green())?;
        } else {
            writeln!(w, "  {:<12} {}", tag, mark)?;
        }
    }
    if let Some(ref label) = analysis.affiliation_label {
        if color.enabled() {
            writeln!(w, "  {:<12} {}", "label", label.bold())?;
        } else {
            writeln!(w, "  {:<12} {}", "label", label)?;
        }
    }
    Ok(())
}

/// Format a count with comma thousands separators.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("Émilie", 3), "Émi...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn outcome_lines_without_color() {
        let mut buf = Vec::new();
        let result = IndividualResult {
            name: "Jean".into(),
            cohort: None,
            found: false,
            best_match: None,
            shortlist: vec![],
        };
        print_outcome(&mut buf, &result, ColorMode(false)).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "✗ Not found\n");
    }

    fn scored(id: &str, raw_score: u32, confidence: f64) -> Candidate {
        use handlescout_core::score_breakdown;
        use std::collections::BTreeSet;

        let mut c = Candidate::new(id, BTreeSet::from([Source::WebSearch, Source::NameVariant]));
        c.popularity = 20_000;
        c.verified = true;
        c.analysis = Some(TextAnalysis {
            found: true,
            text: "Député".into(),
            mentions_role: true,
            ..TextAnalysis::default()
        });
        let breakdown = score_breakdown(c.popularity, c.verified, c.analysis.as_ref());
        c.raw_score = raw_score;
        c.confidence = confidence;
        c.breakdown = Some(breakdown);
        c
    }

    #[test]
    fn details_list_nonzero_rules_only() {
        let mut buf = Vec::new();
        let unscored = Candidate::new("quiet", Default::default());
        print_details(
            &mut buf,
            &[scored("jdupont", 110, 0.9), unscored],
            ColorMode(false),
        )
        .unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "    #1 @jdupont  score=110 conf=90.0%  [web_search, name_variant]"
        );
        assert!(lines[1].contains("+50  popularity_tier (popularity=20000)"));
        assert!(lines[2].contains("+10  mentions_role"));
        assert!(lines[3].contains("+50  platform_verified"));
        assert!(!out.contains("mentions_institution"));
        assert!(lines[4].starts_with("    #2 @quiet  score=0"));
        assert_eq!(lines[5], "        (unscored: no popularity signal)");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn summary_reports_not_found_count() {
        let mut buf = Vec::new();
        let summary = RunSummary {
            processed: 4,
            found: 3,
            average_confidence: 0.5,
        };
        print_summary(&mut buf, &summary, ColorMode(false)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("SUMMARY"));
        assert!(out.contains("  Individuals processed: 4\n"));
        assert!(out.contains("  Found: 3 (75.0%)\n"));
        assert!(out.contains("  Not found: 1\n"));
        assert!(out.contains("  Average confidence: 50.0%\n"));
    }

    #[test]
    fn summary_omits_not_found_when_all_found() {
        let mut buf = Vec::new();
        let summary = RunSummary {
            processed: 2,
            found: 2,
            average_confidence: 0.8,
        };
        print_summary(&mut buf, &summary, ColorMode(false)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(!out.contains("Not found"));
    }

    #[test]
    fn variant_stats_count_each_source() {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let queries = vec![
            IndividualQuery {
                name: "A".into(),
                cross_platform: owned(&["a1", "a2"]),
                name_variant: owned(&["a3"]),
                ..IndividualQuery::default()
            },
            IndividualQuery {
                name: "B".into(),
                web_search: owned(&["b1"]),
                name_variant: owned(&["b2", "b3"]),
                ..IndividualQuery::default()
            },
        ];
        let mut buf = Vec::new();
        print_variant_stats(&mut buf, &queries).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("cross_platform: 2\n"));
        assert!(out.contains("web_search:     1\n"));
        assert!(out.contains("name_variant:   3\n"));
        assert!(out.contains("total:          6\n"));
        assert!(out.contains("Average per individual: 3.0"));
    }
}
