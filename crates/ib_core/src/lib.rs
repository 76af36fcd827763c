pub mod error;
pub mod slug;
pub mod storage;
pub mod text;
pub mod types;

pub use error::Error;
pub use slug::slugify;
pub use storage::{ArticleStore, SourceStore};
pub use text::extract_text;
pub use types::{AnalysisResult, Article, RelevanceFlags, RunSummary, Source};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::error::Error;
    pub use super::storage::{ArticleStore, SourceStore};
    pub use super::types::{AnalysisResult, Article, RelevanceFlags, RunSummary, Source};
    pub use super::Result;
}
