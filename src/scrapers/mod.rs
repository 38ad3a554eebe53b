//! Article sources for the metadata pipeline.
//!
//! A source turns an [`ArticleId`] into the raw HTML of its print page. The
//! only production source is [`archive::PrintArchive`]; tests substitute their
//! own [`DocumentSource`] so the pipeline runs without the network.
//!
//! # Common Patterns
//!
//! - `fetch(id)`: returns the raw page, or a [`FetchError`]
//! - [`archive::extract`]: pulls header fields and body text out of a page
//!
//! Extraction never fails; missing regions are logged and left empty.

use crate::models::ArticleId;
use thiserror::Error;

pub mod archive;

/// Errors raised while fetching one article page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid article url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Something that can produce the raw print page of an article.
pub trait DocumentSource {
    /// Fetch the raw HTML for `id`.
    async fn fetch(&self, id: ArticleId) -> Result<String, FetchError>;
}
