//! Configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, else `./pubmed-fetcher.toml`, else
//!    `<config dir>/pubmed-fetcher/config.toml`)
//! 3. `PUBMED_FETCHER_*` environment variables, with `__` between section
//!    and key (e.g. `PUBMED_FETCHER_EUTILS__RETMAX=100`)
//!
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! [eutils]
//! base_url = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//! retmax = 50
//! timeout_secs = 30
//!
//! [classifier]
//! academic_keywords = ["university", "college", "institute", "school",
//!                      "department", "faculty", "hospital"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::{AffiliationClassifier, ACADEMIC_KEYWORDS};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PUBMED_FETCHER";

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pubmed-fetcher.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// E-utilities endpoint settings
    #[serde(default)]
    pub eutils: EutilsConfig,

    /// Affiliation classifier settings
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// NCBI E-utilities settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EutilsConfig {
    /// Base URL; `esearch.fcgi` and `efetch.fcgi` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum number of IDs requested from esearch
    #[serde(default = "default_retmax")]
    pub retmax: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EutilsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            retmax: default_retmax(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EutilsConfig {
    /// Full URL of an E-utilities endpoint, e.g. `endpoint("esearch.fcgi")`
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}

fn default_base_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}

fn default_retmax() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

/// Affiliation classifier settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Case-insensitive substrings that mark an affiliation as academic
    #[serde(default = "default_academic_keywords")]
    pub academic_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            academic_keywords: default_academic_keywords(),
        }
    }
}

impl ClassifierConfig {
    /// Build the classifier described by this section
    pub fn classifier(&self) -> AffiliationClassifier {
        AffiliationClassifier::with_keywords(&self.academic_keywords)
    }
}

fn default_academic_keywords() -> Vec<String> {
    ACADEMIC_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build(Some(path))
}

/// Configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    build(None)
}

fn build(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("classifier.academic_keywords")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// Find a config file in the default locations
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("pubmed-fetcher").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.eutils.retmax, 50);
        assert_eq!(config.eutils.timeout_secs, 30);
        assert_eq!(
            config.eutils.endpoint("esearch.fcgi"),
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"
        );
        assert_eq!(config.classifier.academic_keywords.len(), 7);
        assert_eq!(
            config.classifier.classifier(),
            AffiliationClassifier::default()
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let eutils = EutilsConfig {
            base_url: "http://127.0.0.1:1234/".to_string(),
            ..Default::default()
        };
        assert_eq!(eutils.endpoint("efetch.fcgi"), "http://127.0.0.1:1234/efetch.fcgi");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[eutils]
retmax = 100

[classifier]
academic_keywords = ["university", "cnrs"]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.eutils.retmax, 100);
        assert_eq!(config.eutils.timeout_secs, 30);
        assert_eq!(config.classifier.academic_keywords, vec!["university", "cnrs"]);
    }

    #[test]
    fn test_load_config_nonexistent() {
        let result = load_config(Path::new("/nonexistent/pubmed-fetcher.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(&path).is_err());
    }
}
