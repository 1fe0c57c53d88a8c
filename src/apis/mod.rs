pub mod arxiv;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Entry is missing required field: {0}")]
    MissingField(&'static str),
}

/// A remote catalog that answers queries with an Atom feed.
#[async_trait]
pub trait Catalog: Send + Sync {
    fn name(&self) -> &str;

    /// Number of entries matching `query`.
    async fn total_results(&self, query: &str) -> Result<u32, SourceError>;

    /// Raw feed for the first `max_results` entries, newest submissions first.
    async fn fetch_feed(&self, query: &str, max_results: u32) -> Result<String, SourceError>;
}
