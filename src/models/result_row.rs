//! Flattened output row for one qualifying article.

use serde::{Deserialize, Serialize};

/// Separator used for the author and affiliation sub-lists.
pub const LIST_SEPARATOR: &str = "; ";

/// One article with at least one non-academic author, ready for CSV or
/// terminal output.
///
/// Field names serialize to the CSV header columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Publication Date")]
    pub publication_date: String,

    /// Non-academic author names in author-list order, "; "-joined
    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,

    /// Distinct non-academic affiliations, "; "-joined
    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,

    /// Email of a non-academic author, empty when none was found
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

impl ResultRow {
    /// Column headers in output order
    pub const HEADERS: [&'static str; 6] = [
        "PubmedID",
        "Title",
        "Publication Date",
        "Non-academic Author(s)",
        "Company Affiliation(s)",
        "Corresponding Author Email",
    ];

    /// Returns the non-academic author names as a vector
    pub fn author_list(&self) -> Vec<&str> {
        split_list(&self.non_academic_authors)
    }

    /// Returns the company affiliations as a vector
    pub fn affiliation_list(&self) -> Vec<&str> {
        split_list(&self.company_affiliations)
    }

    /// Field values in header order
    pub fn fields(&self) -> [&str; 6] {
        [
            self.pubmed_id.as_str(),
            self.title.as_str(),
            self.publication_date.as_str(),
            self.non_academic_authors.as_str(),
            self.company_affiliations.as_str(),
            self.corresponding_email.as_str(),
        ]
    }
}

fn split_list(joined: &str) -> Vec<&str> {
    joined
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}
