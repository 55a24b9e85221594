use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::classifier::{AffiliationGroup, KeywordTables};
use crate::ranking::{DEFAULT_SHORTLIST_LEN, RankingConfig};
use crate::report::DEFAULT_PROFILE_URL_PREFIX;
use crate::variants::{DEFAULT_OFFICIAL_SUFFIX, DEFAULT_PLATFORM_HOST};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub classifier: Option<ClassifierConfig>,
    pub ranking: Option<RankingSection>,
    pub variants: Option<VariantsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub role_keywords: Option<Vec<String>>,
    pub institution_keywords: Option<Vec<String>>,
    pub locality_keywords: Option<Vec<String>>,
    /// Ordered; the first matching group labels the text.
    pub affiliations: Option<Vec<AffiliationGroup>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingSection {
    pub shortlist_len: Option<usize>,
    pub profile_url_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantsConfig {
    pub official_suffix: Option<String>,
    pub platform_host: Option<String>,
}

/// Platform config directory path: `<config_dir>/handlescout/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("handlescout").join("config.toml"))
}

/// Load config by cascading CWD `.handlescout.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".handlescout.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Load a config the user asked for explicitly; unlike [`load_from_path`],
/// a missing or malformed file is an error.
pub fn load_required(path: &Path) -> Result<ConfigFile, CoreError> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_cls = base.classifier.unwrap_or_default();
    let over_cls = overlay.classifier.unwrap_or_default();
    let base_rank = base.ranking.unwrap_or_default();
    let over_rank = overlay.ranking.unwrap_or_default();
    let base_var = base.variants.unwrap_or_default();
    let over_var = overlay.variants.unwrap_or_default();

    ConfigFile {
        classifier: Some(ClassifierConfig {
            role_keywords: over_cls.role_keywords.or(base_cls.role_keywords),
            institution_keywords: over_cls
                .institution_keywords
                .or(base_cls.institution_keywords),
            locality_keywords: over_cls.locality_keywords.or(base_cls.locality_keywords),
            affiliations: over_cls.affiliations.or(base_cls.affiliations),
        }),
        ranking: Some(RankingSection {
            shortlist_len: over_rank.shortlist_len.or(base_rank.shortlist_len),
            profile_url_prefix: over_rank
                .profile_url_prefix
                .or(base_rank.profile_url_prefix),
        }),
        variants: Some(VariantsConfig {
            official_suffix: over_var.official_suffix.or(base_var.official_suffix),
            platform_host: over_var.platform_host.or(base_var.platform_host),
        }),
    }
}

impl ConfigFile {
    /// Keyword tables with built-in defaults for every list left unset.
    pub fn keyword_tables(&self) -> KeywordTables {
        let defaults = KeywordTables::default();
        let Some(cls) = &self.classifier else {
            return defaults;
        };
        KeywordTables {
            role: cls.role_keywords.clone().unwrap_or(defaults.role),
            institution: cls
                .institution_keywords
                .clone()
                .unwrap_or(defaults.institution),
            affiliations: cls.affiliations.clone().unwrap_or(defaults.affiliations),
            locality: cls.locality_keywords.clone().unwrap_or(defaults.locality),
        }
    }

    pub fn ranking_config(&self) -> RankingConfig {
        let shortlist_len = self
            .ranking
            .as_ref()
            .and_then(|r| r.shortlist_len)
            .unwrap_or(DEFAULT_SHORTLIST_LEN)
            .max(1);
        RankingConfig { shortlist_len }
    }

    pub fn profile_url_prefix(&self) -> &str {
        self.ranking
            .as_ref()
            .and_then(|r| r.profile_url_prefix.as_deref())
            .unwrap_or(DEFAULT_PROFILE_URL_PREFIX)
    }

    pub fn official_suffix(&self) -> &str {
        self.variants
            .as_ref()
            .and_then(|v| v.official_suffix.as_deref())
            .unwrap_or(DEFAULT_OFFICIAL_SUFFIX)
    }

    pub fn platform_host(&self) -> &str {
        self.variants
            .as_ref()
            .and_then(|v| v.platform_host.as_deref())
            .unwrap_or(DEFAULT_PLATFORM_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.keyword_tables(), KeywordTables::default());
        assert_eq!(config.ranking_config().shortlist_len, 3);
        assert_eq!(config.profile_url_prefix(), "https://www.tiktok.com/@");
        assert_eq!(config.official_suffix(), "_officiel");
        assert_eq!(config.platform_host(), "tiktok.com");
    }

    #[test]
    fn parses_all_sections() {
        let toml_str = r#"
[classifier]
role_keywords = ["senator"]
institution_keywords = ["senate"]

[[classifier.affiliations]]
label = "Blue"
keywords = ["blue party"]

[[classifier.affiliations]]
label = "Red"
keywords = ["red party", "reds"]

[ranking]
shortlist_len = 5

[variants]
official_suffix = "_official"
platform_host = "example.org"
"#;
        let config: ConfigFile = toml::from_str(toml_str).unwrap();
        let tables = config.keyword_tables();
        assert_eq!(tables.role, vec!["senator"]);
        assert_eq!(tables.affiliations.len(), 2);
        assert_eq!(tables.affiliations[1].label, "Red");
        // Unset list falls back to the built-in one.
        assert_eq!(tables.locality, KeywordTables::default().locality);
        assert_eq!(config.ranking_config().shortlist_len, 5);
        assert_eq!(config.official_suffix(), "_official");
        assert_eq!(config.platform_host(), "example.org");
    }

    #[test]
    fn zero_shortlist_len_is_clamped() {
        let config: ConfigFile = toml::from_str("[ranking]\nshortlist_len = 0\n").unwrap();
        assert_eq!(config.ranking_config().shortlist_len, 1);
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            ranking: Some(RankingSection {
                shortlist_len: Some(2),
                profile_url_prefix: Some("https://base/@".into()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            ranking: Some(RankingSection {
                shortlist_len: Some(7),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.ranking_config().shortlist_len, 7);
        assert_eq!(merged.profile_url_prefix(), "https://base/@");
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            variants: Some(VariantsConfig {
                official_suffix: Some("_off".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.official_suffix(), "_off");
        assert_eq!(merged.platform_host(), "tiktok.com");
    }

    #[test]
    fn load_from_path_handles_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[ranking\nshortlist_len = ").unwrap();
        assert!(load_from_path(&bad).is_none());
        assert!(load_required(&bad).is_err());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[variants]\nplatform_host = \"x.test\"\n").unwrap();
        assert_eq!(load_from_path(&good).unwrap().platform_host(), "x.test");
        assert_eq!(load_required(&good).unwrap().platform_host(), "x.test");
    }
}
