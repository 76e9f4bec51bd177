//! Search, fetch, parse, and filter in one straight-line run.

use std::collections::HashSet;
use tracing::info;

use crate::classify::AffiliationClassifier;
use crate::models::{Article, ResultRow, LIST_SEPARATOR};
use crate::parser::ParseError;
use crate::sources::{FetchClient, SearchClient, SourceError};

/// A run failed before any rows could be produced
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Query PubMed and keep the articles with at least one non-academic author.
#[derive(Debug)]
pub struct Pipeline<S, F> {
    search: S,
    fetch: F,
    classifier: AffiliationClassifier,
}

impl<S: SearchClient, F: FetchClient> Pipeline<S, F> {
    /// Create a pipeline using the default affiliation keywords
    pub fn new(search: S, fetch: F) -> Self {
        Self {
            search,
            fetch,
            classifier: AffiliationClassifier::default(),
        }
    }

    /// Use a custom classifier
    pub fn with_classifier(mut self, classifier: AffiliationClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run one query end to end.
    ///
    /// Rows come back in the order PubMed returned the articles. With
    /// `debug` set, progress counts are reported through `tracing`.
    pub async fn run(&self, query: &str, debug: bool) -> Result<Vec<ResultRow>, PipelineError> {
        let ids = self.search.search(query).await?;
        if debug {
            info!(query, count = ids.len(), "Found PubMed IDs");
        }

        let articles = self.fetch.fetch_details(&ids).await?.into_articles()?;

        let rows: Vec<ResultRow> = articles
            .iter()
            .filter_map(|article| summarize_article(article, &self.classifier))
            .inspect(|row| {
                if debug {
                    info!(pmid = %row.pubmed_id, "Non-academic authors found");
                }
            })
            .collect();

        if debug {
            info!(
                fetched = articles.len(),
                qualifying = rows.len(),
                "Filtered articles"
            );
        }

        Ok(rows)
    }
}

/// Project an article to a result row if any author is non-academic.
///
/// Names keep author-list order. Affiliations are deduplicated and keep
/// first-seen order. The email is the first non-empty one among the
/// non-academic authors.
pub fn summarize_article(
    article: &Article,
    classifier: &AffiliationClassifier,
) -> Option<ResultRow> {
    let mut names = Vec::new();
    let mut affiliations = Vec::new();
    let mut seen = HashSet::new();
    let mut email: Option<&str> = None;

    for author in article
        .authors
        .iter()
        .filter(|a| classifier.is_non_academic(&a.affiliation))
    {
        names.push(author.name.as_str());
        if seen.insert(author.affiliation.as_str()) {
            affiliations.push(author.affiliation.as_str());
        }
        if email.is_none() && author.has_email() {
            email = Some(author.email.as_str());
        }
    }

    if names.is_empty() {
        return None;
    }

    Some(ResultRow {
        pubmed_id: article.id.clone(),
        title: article.title.clone(),
        publication_date: article.publication_date.clone(),
        non_academic_authors: names.join(LIST_SEPARATOR),
        company_affiliations: affiliations.join(LIST_SEPARATOR),
        corresponding_email: email.unwrap_or_default().to_string(),
    })
}
