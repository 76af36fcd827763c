use async_trait::async_trait;
use tokio::sync::RwLock;

use ib_core::{Article, ArticleStore, Error, Result, Source, SourceStore};

/// In-memory document collections. The default backend for development and
/// the storage double in tests; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStorage {
    articles: RwLock<Vec<Article>>,
    sources: RwLock<Vec<Source>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn insert_article(&self, article: &Article) -> Result<()> {
        let mut articles = self.articles.write().await;
        if articles.iter().any(|a| a.id == article.id) {
            return Err(Error::Storage(format!(
                "article id {} already exists",
                article.id
            )));
        }
        articles.push(article.clone());
        Ok(())
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<Article>> {
        let articles = self.articles.read().await;
        Ok(articles
            .iter()
            .find(|a| a.original_url == original_url)
            .cloned())
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>> {
        let articles = self.articles.read().await;
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }

    async fn list_articles(&self, limit: usize) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut listed: Vec<Article> = articles.clone();
        listed.sort_by(|a, b| b.aggregated_at.cmp(&a.aggregated_at));
        listed.truncate(limit);
        Ok(listed)
    }
}

#[async_trait]
impl SourceStore for MemoryStorage {
    async fn list_sources(&self) -> Result<Vec<Source>> {
        Ok(self.sources.read().await.clone())
    }

    async fn add_source(&self, source: &Source) -> Result<()> {
        let mut sources = self.sources.write().await;
        if sources.iter().any(|s| s.id == source.id) {
            return Err(Error::Storage(format!(
                "source id {} already exists",
                source.id
            )));
        }
        sources.push(source.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use ib_core::{AnalysisResult, RelevanceFlags};

    use super::*;

    fn article(url: &str, title: &str) -> Article {
        Article::assemble(
            title.to_string(),
            url.to_string(),
            Utc::now(),
            AnalysisResult {
                summary: "- point".to_string(),
                why_it_matters: "Matters.".to_string(),
                flags: RelevanceFlags::default(),
                provider: "gemini".to_string(),
            },
            None,
            "src-1",
        )
    }

    #[tokio::test]
    async fn insert_and_find_by_url() {
        let storage = MemoryStorage::new();
        let a = article("https://x/1", "One");
        storage.insert_article(&a).await.unwrap();

        let found = storage.find_by_url("https://x/1").await.unwrap().unwrap();
        assert_eq!(found.id, a.id);
        assert!(storage.find_by_url("https://x/2").await.unwrap().is_none());
        assert!(storage.get_article(&a.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_id_insert_is_a_storage_error() {
        let storage = MemoryStorage::new();
        let a = article("https://x/1", "One");
        storage.insert_article(&a).await.unwrap();
        assert!(storage.insert_article(&a).await.is_err());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_bounded() {
        let storage = MemoryStorage::new();
        for i in 0..4 {
            let a = article(&format!("https://x/{}", i), &format!("Story {}", i));
            storage.insert_article(&a).await.unwrap();
        }
        let listed = storage.list_articles(2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].aggregated_at >= listed[1].aggregated_at);
    }

    #[tokio::test]
    async fn sources_round_trip() {
        let storage = MemoryStorage::new();
        let source = Source {
            id: "gh".to_string(),
            name: "GhanaWeb".to_string(),
            feed_url: "https://www.ghanaweb.com/feed".to_string(),
            website_url: "https://www.ghanaweb.com".to_string(),
        };
        storage.add_source(&source).await.unwrap();
        assert!(storage.add_source(&source).await.is_err());

        let sources = storage.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "GhanaWeb");
    }
}
