//! PubMed source using the NCBI E-utilities API.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EutilsConfig;
use crate::sources::{FetchClient, RawBatch, SearchClient, SourceError};
use crate::utils::HttpClient;

/// PubMed research source
///
/// `esearch` for identifiers, then one batch `efetch` for the records.
/// No retries, no rate limiting, no API key.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    esearch_url: String,
    efetch_url: String,
    retmax: usize,
}

/// esearch JSON envelope; missing keys read as an empty id list
#[derive(Debug, Default, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

impl PubMedSource {
    /// Create a new PubMed source from endpoint settings
    pub fn new(config: &EutilsConfig) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_client(Arc::new(client), config))
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: Arc<HttpClient>, config: &EutilsConfig) -> Self {
        Self {
            client,
            esearch_url: config.endpoint("esearch.fcgi"),
            efetch_url: config.endpoint("efetch.fcgi"),
            retmax: config.retmax,
        }
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &str) -> String {
        let params = [
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmax", self.retmax.to_string()),
            ("retmode", "json".to_string()),
        ];
        format!("{}?{}", self.esearch_url, encode_params(&params))
    }

    /// Build E-utilities fetch URL for specific PubMed IDs
    fn build_fetch_url(&self, ids: &[String]) -> String {
        let params = [
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        format!("{}?{}", self.efetch_url, encode_params(&params))
    }

    /// Parse E-utilities search response JSON
    fn parse_search_response(body: &str) -> Result<Vec<String>, SourceError> {
        let response: ESearchResponse = serde_json::from_str(body)?;
        Ok(response.esearchresult.idlist)
    }

    /// GET `url` and return the body, failing on any non-success status
    async fn get_text(&self, url: &str, what: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to {} PubMed: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "PubMed {} returned status: {}",
                what, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }
}

fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl SearchClient for PubMedSource {
    async fn search(&self, query: &str) -> Result<Vec<String>, SourceError> {
        let url = self.build_search_url(query);
        debug!(%url, "PubMed esearch");

        let body = self.get_text(&url, "search").await?;
        let ids = Self::parse_search_response(&body)?;

        debug!(count = ids.len(), "PubMed esearch returned PMIDs");
        Ok(ids)
    }
}

#[async_trait]
impl FetchClient for PubMedSource {
    async fn fetch_details(&self, ids: &[String]) -> Result<RawBatch, SourceError> {
        if ids.is_empty() {
            warn!("No PubMed IDs to fetch, skipping efetch request");
            return Ok(RawBatch::Empty);
        }

        let url = self.build_fetch_url(ids);
        debug!(count = ids.len(), "PubMed efetch");

        let xml = self.get_text(&url, "fetch").await?;
        Ok(RawBatch::Xml(xml))
    }
}
