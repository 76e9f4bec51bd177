//! Core data models for parsed articles and output rows.

mod article;
mod result_row;

pub use article::{Article, ArticleBuilder, Author, NOT_AVAILABLE, NO_TITLE};
pub use result_row::{ResultRow, LIST_SEPARATOR};
