//! Article and author records parsed from PubMed.

use serde::{Deserialize, Serialize};

use crate::classify::extract_email;

/// Placeholder used when an article has no PMID or publication date.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder used when an article has no title.
pub const NO_TITLE: &str = "No Title";

/// One author of one article.
///
/// All fields are trimmed and default to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// "ForeName LastName", or the collective name for group authors
    pub name: String,

    /// First affiliation listed for this author
    pub affiliation: String,

    /// First email address found in the affiliation
    pub email: String,
}

impl Author {
    /// Create an author, extracting the email from the affiliation.
    pub fn new(name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        let affiliation = affiliation.into().trim().to_string();
        let email = extract_email(&affiliation).unwrap_or_default().to_string();
        Self {
            name,
            affiliation,
            email,
        }
    }

    /// Whether an email address was found for this author
    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }
}

/// A PubMed article with its ordered author list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// PubMed identifier (PMID)
    pub id: String,

    /// Article title
    pub title: String,

    /// Free-form publication date (e.g. "2023 Jan 05" or "2019 Spring")
    pub publication_date: String,

    /// Authors in the order PubMed lists them
    pub authors: Vec<Author>,
}

/// Builder for constructing Article objects
///
/// Missing id, title, or date fall back to the "N/A" / "No Title"
/// placeholders when the article is built.
#[derive(Debug, Clone, Default)]
pub struct ArticleBuilder {
    id: Option<String>,
    title: Option<String>,
    publication_date: Option<String>,
    authors: Vec<Author>,
}

impl ArticleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the PMID
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = non_blank(id.into());
        self
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = non_blank(title.into());
        self
    }

    /// Set the publication date
    pub fn publication_date(mut self, date: impl Into<String>) -> Self {
        self.publication_date = non_blank(date.into());
        self
    }

    /// Append an author
    pub fn author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    /// Build the Article
    pub fn build(self) -> Article {
        Article {
            id: self.id.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            title: self.title.unwrap_or_else(|| NO_TITLE.to_string()),
            publication_date: self
                .publication_date
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            authors: self.authors,
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
