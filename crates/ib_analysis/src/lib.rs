pub mod chain;
pub mod fallback;
pub mod providers;
pub mod quota;

pub use chain::analyze_with_chain;
pub use fallback::{fallback_analysis, FALLBACK_EXPLANATION, FALLBACK_PROVIDER};
pub use providers::{create_providers, AnalysisProvider, ProviderConfig};
pub use quota::is_quota_error;

pub mod prelude {
    pub use super::chain::analyze_with_chain;
    pub use super::providers::{create_providers, AnalysisProvider, ProviderConfig};
    pub use ib_core::{AnalysisResult, Error, RelevanceFlags, Result};
}
