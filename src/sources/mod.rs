//! Remote lookups against the PubMed E-utilities.
//!
//! Retrieval is split in two stages, each behind its own trait:
//!
//! - [`SearchClient`]: free-text query to a capped list of PubMed IDs (`esearch`)
//! - [`FetchClient`]: list of IDs to one raw XML batch document (`efetch`)
//!
//! [`PubMedSource`] implements both against NCBI; [`MockSource`] implements
//! both from canned data for tests. The two calls are made strictly one
//! after the other by the pipeline, never concurrently.

pub mod mock;
mod pubmed;

pub use mock::MockSource;
pub use pubmed::PubMedSource;

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::Article;
use crate::parser::{parse_article_set, ParseError};

/// Search stage: query string to PubMed identifiers.
#[async_trait]
pub trait SearchClient: Send + Sync + std::fmt::Debug {
    /// Return up to the configured maximum number of PMIDs for `query`
    async fn search(&self, query: &str) -> Result<Vec<String>, SourceError>;
}

/// Fetch stage: PubMed identifiers to a raw batch document.
#[async_trait]
pub trait FetchClient: Send + Sync + std::fmt::Debug {
    /// Fetch all records for `ids` in a single request.
    ///
    /// An empty `ids` slice must short-circuit to [`RawBatch::Empty`]
    /// without any network traffic.
    async fn fetch_details(&self, ids: &[String]) -> Result<RawBatch, SourceError>;
}

#[async_trait]
impl<T: SearchClient + ?Sized> SearchClient for Arc<T> {
    async fn search(&self, query: &str) -> Result<Vec<String>, SourceError> {
        (**self).search(query).await
    }
}

#[async_trait]
impl<T: FetchClient + ?Sized> FetchClient for Arc<T> {
    async fn fetch_details(&self, ids: &[String]) -> Result<RawBatch, SourceError> {
        (**self).fetch_details(ids).await
    }
}

/// Raw result of the fetch stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBatch {
    /// No identifiers were requested
    Empty,

    /// `efetch` XML response body
    Xml(String),
}

impl RawBatch {
    /// Parse the batch into articles, skipping malformed records.
    pub fn into_articles(self) -> Result<Vec<Article>, ParseError> {
        match self {
            RawBatch::Empty => Ok(Vec::new()),
            RawBatch::Xml(xml) => parse_article_set(&xml),
        }
    }
}

/// Errors talking to a remote endpoint
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status from the API
    #[error("API error: {0}")]
    Api(String),

    /// Unreadable or malformed response body
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
