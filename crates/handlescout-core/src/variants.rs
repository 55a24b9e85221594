//! Candidate handle generation from names, cross-platform handles and
//! search-result text.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{normalize_identifier, normalize_text};
use crate::{CoreError, IndividualQuery};

pub const DEFAULT_OFFICIAL_SUFFIX: &str = "_officiel";
pub const DEFAULT_PLATFORM_HOST: &str = "tiktok.com";

/// Characters allowed in a handle on the default platform.
const HANDLE_CHARS: &str = r"[A-Za-z0-9._\-]+";

static DEFAULT_HANDLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&handle_pattern(DEFAULT_PLATFORM_HOST)).unwrap()
});

fn handle_pattern(host: &str) -> String {
    format!(
        r"(?i)(?:https?://)?(?:www\.)?{}/@({})",
        regex::escape(host),
        HANDLE_CHARS
    )
}

/// Order-preserving dedup.
fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Common handle patterns built from a full name.
///
/// The first word is the first name and every following word is joined into
/// the last name, with hyphens treated as word breaks: `"Jean-Émile Dupont"`
/// gives `jean` + `emiledupont`.
pub fn pattern_variants(full_name: &str, official_suffix: &str) -> Vec<String> {
    let name = normalize_text(full_name).replace('-', " ");
    let parts: Vec<&str> = name.split_whitespace().collect();

    match parts.as_slice() {
        [] => vec![],
        [only] => vec![only.to_string()],
        [first, rest @ ..] => {
            let last = rest.concat();
            let initial = &first[..1];
            dedup([
                format!("{first}{last}"),
                format!("{first}.{last}"),
                format!("{first}_{last}"),
                format!("{initial}{last}"),
                format!("{last}{first}"),
                format!("{last}.{first}"),
                format!("{last}_{first}"),
                format!("{first}{last}{official_suffix}"),
                format!("{initial}{last}{official_suffix}"),
            ])
        }
    }
}

/// Handles from another platform, plus their usual spelling shifts.
///
/// Each handle is cleaned (`@` stripped, lowercased) and kept when longer
/// than one character; underscore-free and dotted spellings follow it.
pub fn cross_platform_variants(handles: &[String]) -> Vec<String> {
    let mut variants = Vec::new();
    for handle in handles {
        let clean = normalize_identifier(handle);
        if clean.len() <= 1 {
            continue;
        }
        let no_underscore = clean.replace('_', "");
        let with_dots = clean.replace('_', ".");
        variants.push(clean.clone());
        if no_underscore != clean && no_underscore.len() > 1 {
            variants.push(no_underscore);
        }
        if with_dots != clean && with_dots.len() > 1 {
            variants.push(with_dots);
        }
    }
    dedup(variants)
}

/// Extracts `host/@handle` profile links from URLs or page text.
#[derive(Debug, Clone)]
pub struct HandleExtractor {
    re: Regex,
}

impl Default for HandleExtractor {
    fn default() -> Self {
        Self {
            re: DEFAULT_HANDLE_RE.clone(),
        }
    }
}

impl HandleExtractor {
    pub fn for_host(host: &str) -> Result<Self, CoreError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(CoreError::Config("platform host is empty".to_string()));
        }
        Ok(Self {
            re: Regex::new(&handle_pattern(host))?,
        })
    }

    /// Every distinct handle linked in `text`, lowercased, longer than two
    /// characters, in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<String> {
        dedup(
            self.re
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| normalize_identifier(m.as_str()))
                .filter(|handle| handle.len() > 2),
        )
    }
}

/// Assemble the source lists for one individual.
///
/// `cross_platform_handles` are expanded with [`cross_platform_variants`];
/// `search_texts` are URLs or page snippets scanned with `extractor`.
pub fn build_query(
    name: &str,
    cohort: Option<String>,
    cross_platform_handles: &[String],
    search_texts: &[String],
    extractor: &HandleExtractor,
    official_suffix: &str,
) -> IndividualQuery {
    let keep = |items: Vec<String>| -> Vec<String> {
        dedup(items.into_iter().filter(|v| v.len() > 1))
    };

    IndividualQuery {
        name: name.to_string(),
        cohort,
        cross_platform: keep(cross_platform_variants(cross_platform_handles)),
        web_search: keep(
            search_texts
                .iter()
                .flat_map(|text| extractor.extract(text))
                .collect(),
        ),
        name_variant: keep(pattern_variants(name, official_suffix)),
    }
}
