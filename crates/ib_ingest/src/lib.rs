pub mod curator;
pub mod feed;
pub mod gate;
pub mod image;
pub mod sources;

pub use curator::{Curator, CuratorConfig};
pub use feed::{FeedFetcher, FeedItem, ImageHints, RssFetcher};
pub use gate::is_publishable;
pub use image::ImageResolver;
pub use sources::default_sources;

/// Descriptive user agent sent on feed fetches and page scrapes so
/// publishers can identify the crawler.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; IntelBrief/1.0; +https://intelbrief.app)";

pub mod prelude {
    pub use super::curator::{Curator, CuratorConfig};
    pub use super::feed::{FeedFetcher, FeedItem, RssFetcher};
    pub use ib_core::{Article, Error, Result, RunSummary, Source};
}
