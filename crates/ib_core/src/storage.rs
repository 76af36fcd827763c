use async_trait::async_trait;

use crate::types::{Article, Source};
use crate::Result;

/// Append-only article collection.
///
/// The pipeline never updates or deletes articles; uniqueness of
/// `original_url` is maintained by calling `find_by_url` before `insert_article`.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article under its generated id.
    async fn insert_article(&self, article: &Article) -> Result<()>;

    /// Equality-predicate lookup on the dedup key.
    async fn find_by_url(&self, original_url: &str) -> Result<Option<Article>>;

    /// Lookup by generated id.
    async fn get_article(&self, id: &str) -> Result<Option<Article>>;

    /// Most recently aggregated articles, newest first.
    async fn list_articles(&self, limit: usize) -> Result<Vec<Article>>;
}

/// The configured feed sources, seeded administratively.
#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn list_sources(&self) -> Result<Vec<Source>>;

    async fn add_source(&self, source: &Source) -> Result<()>;
}
