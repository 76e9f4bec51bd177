//! # pubmed-fetcher
//!
//! Search PubMed and keep the papers that have at least one author with a
//! non-academic (company, biotech, pharma) affiliation.
//!
//! ## Architecture
//!
//! - [`classify`]: keyword-based academic/non-academic classifier and email extraction
//! - [`parser`]: PubMed `efetch` XML to [`models::Article`] records
//! - [`sources`]: `esearch` / `efetch` clients behind the [`SearchClient`] and [`FetchClient`] traits
//! - [`pipeline`]: search, fetch, parse, and filter into [`models::ResultRow`]s
//! - [`output`]: CSV, JSON, plain text, and table output
//! - [`config`]: layered configuration
//! - [`utils`]: HTTP client and display helpers

pub mod classify;
pub mod config;
pub mod models;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use classify::{extract_email, is_non_academic, AffiliationClassifier};
pub use models::{Article, Author, ResultRow};
pub use pipeline::{Pipeline, PipelineError};
pub use sources::{FetchClient, PubMedSource, SearchClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
