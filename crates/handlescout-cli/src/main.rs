use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use handlescout_core::config_file::{self, ConfigFile};
use handlescout_core::variants::{HandleExtractor, build_query};
use handlescout_core::{
    Classifier, IndividualQuery, IndividualResult, Ranker, RunSummary, SnapshotLookup,
    cohort_label, normalize_text, report,
};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt};

mod output;

use output::ColorMode;

/// Handle Scout - Rank probable social accounts for a list of named people
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the platform/CWD cascade
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate candidate identifiers for every name in a list
    Variants {
        /// JSON array of `{name, cohort?}` entries
        #[arg(long = "in", value_name = "FILE")]
        input: PathBuf,

        /// Where to write the query list
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// JSON object mapping a name to its handles on another platform
        #[arg(long, value_name = "FILE")]
        handles: Option<PathBuf>,

        /// JSON object mapping a name to search-result URLs or snippets
        #[arg(long, value_name = "FILE")]
        web: Option<PathBuf>,
    },

    /// Rank the candidates of every query against a profile snapshot
    Rank {
        /// JSON array of queries, as written by `variants`
        #[arg(long = "in", value_name = "FILE")]
        input: PathBuf,

        /// JSON object mapping an identifier to its profile signals
        #[arg(long, value_name = "FILE")]
        profiles: PathBuf,

        /// Where to write the results
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Also write the best matches as CSV, one row per individual
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Only process the first N individuals
        #[arg(long)]
        limit: Option<usize>,

        /// Override the shortlist length
        #[arg(long)]
        top: Option<usize>,

        /// Print every shortlisted candidate with its score breakdown
        #[arg(long)]
        details: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Classify a profile text and print the matched indicators
    Classify {
        text: String,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

/// One entry of the names file.
#[derive(Debug, Deserialize)]
struct NameEntry {
    name: String,
    #[serde(default, alias = "Legislature")]
    cohort: Option<serde_json::Value>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => config_file::load_required(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => config_file::load_config(),
    };

    match cli.command {
        Command::Variants {
            input,
            out,
            handles,
            web,
        } => variants(&config, &input, &out, handles.as_deref(), web.as_deref()),
        Command::Rank {
            input,
            profiles,
            out,
            csv,
            limit,
            top,
            details,
            no_color,
        } => rank(
            &config,
            &input,
            &profiles,
            &out,
            csv.as_deref(),
            limit,
            top,
            details,
            no_color,
        ),
        Command::Classify {
            text,
            json,
            no_color,
        } => classify(&config, &text, json, no_color),
    }
}

/// Log to stderr so stdout stays clean; `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read a name-keyed JSON object, re-keyed by normalized name.
fn read_name_map(path: Option<&Path>) -> anyhow::Result<HashMap<String, Vec<String>>> {
    let Some(path) = path else {
        return Ok(HashMap::new());
    };
    let raw: HashMap<String, Vec<String>> = read_json(path)?;
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (name, values) in raw {
        map.entry(normalize_text(&name)).or_default().extend(values);
    }
    Ok(map)
}

/// Keep only the first `limit` queries, when a limit is given.
fn apply_limit(queries: &mut Vec<IndividualQuery>, limit: Option<usize>) {
    if let Some(limit) = limit {
        queries.truncate(limit);
    }
}

fn variants(
    config: &ConfigFile,
    input: &Path,
    out: &Path,
    handles: Option<&Path>,
    web: Option<&Path>,
) -> anyhow::Result<()> {
    let names: Vec<NameEntry> = read_json(input)?;
    let handles = read_name_map(handles)?;
    let web = read_name_map(web)?;
    tracing::info!(
        names = names.len(),
        with_handles = handles.len(),
        with_web = web.len(),
        "loaded variant inputs"
    );
    let extractor = HandleExtractor::for_host(config.platform_host())?;

    let queries: Vec<IndividualQuery> = names
        .into_iter()
        .map(|entry| {
            let key = normalize_text(&entry.name);
            build_query(
                &entry.name,
                entry.cohort.as_ref().and_then(cohort_label),
                handles.get(&key).map(Vec::as_slice).unwrap_or_default(),
                web.get(&key).map(Vec::as_slice).unwrap_or_default(),
                &extractor,
                config.official_suffix(),
            )
        })
        .collect();

    write_json(out, &queries)?;

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    output::print_variant_stats(&mut w, &queries)?;
    writeln!(w, "Queries written to {}", out.display())?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn rank(
    config: &ConfigFile,
    input: &Path,
    profiles: &Path,
    out: &Path,
    csv: Option<&Path>,
    limit: Option<usize>,
    top: Option<usize>,
    details: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let mut queries: Vec<IndividualQuery> = read_json(input)?;
    tracing::info!(path = %input.display(), queries = queries.len(), "loaded queries");
    apply_limit(&mut queries, limit);
    let lookup = SnapshotLookup::from_path(profiles)
        .with_context(|| format!("Failed to load profiles from {}", profiles.display()))?;

    let mut ranking = config.ranking_config();
    if let Some(top) = top {
        ranking.shortlist_len = top.max(1);
    }
    let ranker = Ranker::new(Classifier::new(config.keyword_tables()), ranking);
    let url_prefix = config.profile_url_prefix();

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    writeln!(
        w,
        "Ranking {} individuals against {} profiles\n",
        queries.len(),
        lookup.len()
    )?;

    let total = queries.len();
    let mut results: Vec<IndividualResult> = Vec::with_capacity(total);
    for (index, query) in queries.iter().enumerate() {
        output::print_progress(&mut w, index, total, &query.name)?;
        let outcome = ranker.rank(query, &lookup);
        let result = IndividualResult::from_outcome(query, &outcome, url_prefix);
        output::print_outcome(&mut w, &result, color)?;
        if details && outcome.found {
            output::print_details(&mut w, &outcome.shortlist, color)?;
        }
        results.push(result);
    }

    let summary = RunSummary::from_results(&results);
    output::print_summary(&mut w, &summary, color)?;

    write_json(out, &results)?;
    writeln!(w, "Results written to {}", out.display())?;
    if let Some(csv_path) = csv {
        std::fs::write(csv_path, report::to_csv(&results))
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
        writeln!(w, "CSV also written to {}", csv_path.display())?;
    }
    Ok(())
}

fn classify(config: &ConfigFile, text: &str, json: bool, no_color: bool) -> anyhow::Result<()> {
    let classifier = Classifier::new(config.keyword_tables());
    let analysis = classifier.analyze(Some(text));

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    if json {
        writeln!(w, "{}", serde_json::to_string_pretty(&analysis)?)?;
    } else {
        output::print_analysis(&mut w, &analysis, ColorMode(!no_color))?;
    }
    Ok(())
}
