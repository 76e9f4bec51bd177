//! Affiliation classification and contact email extraction.
//!
//! The classifier is a plain keyword heuristic: an affiliation is academic
//! when its lowercase form contains one of the academic keywords, and
//! non-academic otherwise. An empty affiliation therefore counts as
//! non-academic, and any company name that happens to contain a keyword
//! (e.g. "University Ave Biotech Inc") counts as academic.

use regex::Regex;
use std::sync::OnceLock;

/// Keywords that mark an affiliation as academic.
pub const ACADEMIC_KEYWORDS: [&str; 7] = [
    "university",
    "college",
    "institute",
    "school",
    "department",
    "faculty",
    "hospital",
];

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Keyword-based affiliation classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationClassifier {
    keywords: Vec<String>,
}

impl AffiliationClassifier {
    /// Create a classifier with a custom keyword list.
    ///
    /// Keywords are lowercased; blank entries are dropped.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// The keywords this classifier matches against.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether the affiliation contains none of the academic keywords.
    pub fn is_non_academic(&self, affiliation: &str) -> bool {
        let lower = affiliation.to_lowercase();
        !self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::with_keywords(ACADEMIC_KEYWORDS)
    }
}

/// Classify an affiliation with the default keyword set.
pub fn is_non_academic(affiliation: &str) -> bool {
    let lower = affiliation.to_lowercase();
    !ACADEMIC_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Return the first email address found in `text`.
///
/// Only the first match is returned; later addresses in the same string
/// are ignored.
pub fn extract_email(text: &str) -> Option<&str> {
    email_regex().find(text).map(|m| m.as_str())
}
