//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::sources::{FetchClient, RawBatch, SearchClient, SourceError};

/// A mock source that returns predefined responses and records fetch calls.
#[derive(Debug, Default)]
pub struct MockSource {
    ids: Mutex<Vec<String>>,
    document: Mutex<Option<String>>,
    fetch_calls: Mutex<Vec<Vec<String>>>,
}

impl MockSource {
    /// Create a new mock source with no ids and no document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ids returned by `search`.
    pub fn set_search_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.ids.lock().unwrap();
        *guard = ids.into_iter().map(Into::into).collect();
    }

    /// Set the XML document returned by `fetch_details`.
    pub fn set_document(&self, xml: impl Into<String>) {
        let mut guard = self.document.lock().unwrap();
        *guard = Some(xml.into());
    }

    /// Id lists passed to every `fetch_details` call that reached the "network".
    pub fn fetch_calls(&self) -> Vec<Vec<String>> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for MockSource {
    async fn search(&self, _query: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.ids.lock().unwrap().clone())
    }
}

#[async_trait]
impl FetchClient for MockSource {
    async fn fetch_details(&self, ids: &[String]) -> Result<RawBatch, SourceError> {
        if ids.is_empty() {
            return Ok(RawBatch::Empty);
        }
        self.fetch_calls.lock().unwrap().push(ids.to_vec());

        match &*self.document.lock().unwrap() {
            Some(xml) => Ok(RawBatch::Xml(xml.clone())),
            None => Err(SourceError::Api("no mock document configured".to_string())),
        }
    }
}
