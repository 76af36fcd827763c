use std::sync::Arc;

use tracing::{debug, info, warn};

use ib_analysis::{analyze_with_chain, AnalysisProvider};
use ib_core::{extract_text, Article, ArticleStore, Result, RunSummary, Source, SourceStore};

use crate::feed::{FeedFetcher, FeedItem};
use crate::gate::is_publishable;
use crate::image::ImageResolver;

/// Per-run limits bounding external API usage and wall-clock time.
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// Stop analyzing new articles once this many have been persisted.
    pub max_per_run: usize,
    /// Items with less extracted text than this carry too little signal to
    /// analyze.
    pub min_content_chars: usize,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            max_per_run: 5,
            min_content_chars: 200,
        }
    }
}

/// Drives one end-to-end curation run: per source, fetch the feed; per new
/// item, extract text, analyze, resolve an image, gate, persist.
///
/// All collaborators are injected at construction and owned by the process
/// entry point. Sources and items are processed sequentially, which keeps
/// the dedup check free of races within a run. Overlapping runs are not
/// mutually excluded: two concurrent invocations can both pass the dedup
/// check for the same URL before either writes. Schedulers should not
/// overlap triggers.
pub struct Curator {
    articles: Arc<dyn ArticleStore>,
    sources: Arc<dyn SourceStore>,
    fetcher: Arc<dyn FeedFetcher>,
    providers: Vec<Box<dyn AnalysisProvider>>,
    images: ImageResolver,
    config: CuratorConfig,
}

impl Curator {
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        sources: Arc<dyn SourceStore>,
        fetcher: Arc<dyn FeedFetcher>,
        providers: Vec<Box<dyn AnalysisProvider>>,
    ) -> Self {
        Self {
            articles,
            sources,
            fetcher,
            providers,
            images: ImageResolver::new(),
            config: CuratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CuratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the pipeline over every configured source and returns what was
    /// added. Feed and per-item failures are logged skips; only storage
    /// failures abort the run.
    pub async fn run(&self) -> Result<RunSummary> {
        let sources = self.sources.list_sources().await?;
        info!("🗞️  Curation run started: {} sources", sources.len());

        let mut summary = RunSummary::default();

        for source in &sources {
            if summary.added() >= self.config.max_per_run {
                info!(
                    "per-run cap of {} reached, skipping remaining sources",
                    self.config.max_per_run
                );
                break;
            }
            if source.feed_url.is_empty() {
                debug!("skipping source \"{}\": no feed URL", source.name);
                continue;
            }

            let items = match self.fetcher.fetch(source).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("⚠️  Skipping source \"{}\": {}", source.name, e);
                    continue;
                }
            };
            debug!("{}: {} feed items", source.name, items.len());

            for item in items {
                if self.articles.find_by_url(&item.link).await?.is_some() {
                    continue;
                }
                if summary.added() >= self.config.max_per_run {
                    // Cap reached: the dedup scan over this source stays
                    // cheap, but nothing further gets analyzed or persisted.
                    continue;
                }
                if let Some(article) = self.process_item(source, &item).await? {
                    info!("✅ Curated \"{}\" via {}", article.title, article.provider);
                    summary.record(&article.title);
                }
            }
        }

        info!("Curation run finished: {}", summary.message());
        Ok(summary)
    }

    /// Takes one unseen feed item through extract, analyze, resolve-image,
    /// gate, persist. Returns the article, or None when a gate skipped it.
    async fn process_item(&self, source: &Source, item: &FeedItem) -> Result<Option<Article>> {
        let text = extract_text(&item.content_html);
        if text.chars().count() < self.config.min_content_chars {
            debug!(
                "skipping \"{}\": {} chars of content is below the floor",
                item.title,
                text.chars().count()
            );
            return Ok(None);
        }

        let analysis = analyze_with_chain(&self.providers, &text).await;
        let image_url = self.images.resolve(item).await;

        if !is_publishable(&item.title, &analysis) {
            info!("🚫 Quality gate rejected \"{}\"", item.title);
            return Ok(None);
        }

        let article = Article::assemble(
            item.title.clone(),
            item.link.clone(),
            item.published_at,
            analysis,
            image_url,
            &source.id,
        );
        self.articles.insert_article(&article).await?;
        Ok(Some(article))
    }
}
