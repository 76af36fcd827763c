use std::sync::Arc;

use ib_core::{ArticleStore, SourceStore};
use ib_ingest::Curator;

pub struct AppState {
    pub curator: Curator,
    pub articles: Arc<dyn ArticleStore>,
    pub sources: Arc<dyn SourceStore>,
    /// Shared secret for the curation trigger and seed endpoints.
    pub cron_secret: String,
}
