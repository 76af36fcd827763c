use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use tracing::info;

use ib_core::{Article, ArticleStore, Error, RelevanceFlags, Result, Source, SourceStore};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL,
        title TEXT NOT NULL,
        original_url TEXT NOT NULL,
        published_at TEXT NOT NULL,
        aggregated_at TEXT NOT NULL,
        summary TEXT NOT NULL,
        why_it_matters TEXT NOT NULL,
        image_url TEXT,
        flags TEXT NOT NULL,
        provider TEXT NOT NULL,
        source_ids TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_articles_original_url ON articles(original_url)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sources (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        feed_url TEXT NOT NULL,
        website_url TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

/// File-backed document store on SQLite. Same append-only discipline as the
/// memory backend; relevance flags and source ids ride along as JSON text.
pub struct SqliteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStorage {
    pub async fn new() -> Result<Self> {
        Self::new_with_path(Path::new("intelbrief.db")).await
    }

    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // mode=rwc creates the database file on first run.
        let pool = SqlitePool::connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
            .await
            .map_err(|e| Error::Storage(format!("failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("failed to run migration {}: {}", i, e)))?;
        }

        info!("SQLite storage ready at {}", db_path.display());
        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let flags: RelevanceFlags = serde_json::from_str(row.get("flags"))?;
    let source_ids: Vec<String> = serde_json::from_str(row.get("source_ids"))?;
    Ok(Article {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        original_url: row.get("original_url"),
        published_at: parse_timestamp(row.get("published_at"))?,
        aggregated_at: parse_timestamp(row.get("aggregated_at"))?,
        summary: row.get("summary"),
        why_it_matters: row.get("why_it_matters"),
        image_url: row.get("image_url"),
        flags,
        provider: row.get("provider"),
        source_ids,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("bad timestamp in row: {}", e)))
}

#[async_trait]
impl ArticleStore for SqliteStorage {
    async fn insert_article(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles
            (id, slug, title, original_url, published_at, aggregated_at,
             summary, why_it_matters, image_url, flags, provider, source_ids)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.id)
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.original_url)
        .bind(article.published_at.to_rfc3339())
        .bind(article.aggregated_at.to_rfc3339())
        .bind(&article.summary)
        .bind(&article.why_it_matters)
        .bind(article.image_url.as_deref())
        .bind(serde_json::to_string(&article.flags)?)
        .bind(&article.provider)
        .bind(serde_json::to_string(&article.source_ids)?)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("failed to insert article: {}", e)))?;

        Ok(())
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE original_url = ? LIMIT 1")
            .bind(original_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to query by url: {}", e)))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to query by id: {}", e)))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn list_articles(&self, limit: usize) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT * FROM articles ORDER BY aggregated_at DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to list articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }
}

#[async_trait]
impl SourceStore for SqliteStorage {
    async fn list_sources(&self) -> Result<Vec<Source>> {
        let rows = sqlx::query("SELECT * FROM sources ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to list sources: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| Source {
                id: row.get("id"),
                name: row.get("name"),
                feed_url: row.get("feed_url"),
                website_url: row.get("website_url"),
            })
            .collect())
    }

    async fn add_source(&self, source: &Source) -> Result<()> {
        sqlx::query("INSERT INTO sources (id, name, feed_url, website_url) VALUES (?, ?, ?, ?)")
            .bind(&source.id)
            .bind(&source.name)
            .bind(&source.feed_url)
            .bind(&source.website_url)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to add source: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use ib_core::{AnalysisResult, RelevanceFlags};

    use super::*;

    fn article(url: &str) -> Article {
        Article::assemble(
            "Cedi steadies".to_string(),
            url.to_string(),
            Utc::now(),
            AnalysisResult {
                summary: "- holds firm".to_string(),
                why_it_matters: "Currency stability.".to_string(),
                flags: RelevanceFlags {
                    money: true,
                    ..Default::default()
                },
                provider: "gemini".to_string(),
            },
            Some("https://cdn.example.com/cedi.jpg".to_string()),
            "gh",
        )
    }

    #[tokio::test]
    async fn round_trips_articles_and_sources() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(&dir.path().join("test.db"))
            .await
            .unwrap();

        let a = article("https://x/1");
        storage.insert_article(&a).await.unwrap();

        let found = storage.find_by_url("https://x/1").await.unwrap().unwrap();
        assert_eq!(found.id, a.id);
        assert_eq!(found.flags, a.flags);
        assert_eq!(found.image_url, a.image_url);
        assert_eq!(found.source_ids, a.source_ids);
        assert!(storage.find_by_url("https://x/2").await.unwrap().is_none());

        let source = Source {
            id: "gh".to_string(),
            name: "GhanaWeb".to_string(),
            feed_url: "https://www.ghanaweb.com/feed".to_string(),
            website_url: "https://www.ghanaweb.com".to_string(),
        };
        storage.add_source(&source).await.unwrap();
        let sources = storage.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].feed_url, source.feed_url);
    }

    #[tokio::test]
    async fn listing_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(&dir.path().join("test.db"))
            .await
            .unwrap();

        for i in 0..3 {
            storage
                .insert_article(&article(&format!("https://x/{}", i)))
                .await
                .unwrap();
        }
        let listed = storage.list_articles(2).await.unwrap();
        assert_eq!(listed.len(), 2);
    }
}
