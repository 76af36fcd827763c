use async_trait::async_trait;
use serde::Deserialize;

use ib_core::{AnalysisResult, Error, RelevanceFlags, Result};

use crate::quota::is_quota_error;

pub mod gemini;
pub mod huggingface;
pub mod openai;

pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use openai::OpenAiProvider;

/// An analysis backend: text in, structured analysis out, or a typed failure
/// the chain runner knows how to step past.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce a structured analysis of the extracted article text.
    ///
    /// Fails with `Error::Config` when the provider has no credentials,
    /// `Error::Quota` when the backend reports quota/rate-limit exhaustion,
    /// and `Error::Transient` for any other network or parse failure.
    async fn analyze(&self, text: &str) -> Result<AnalysisResult>;
}

/// Per-provider API keys, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: non_empty_env("GEMINI_API_KEY"),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            huggingface_api_key: non_empty_env("HUGGINGFACE_API_KEY"),
        }
    }
}

// Treats unset, empty and template values ("your_..._here") as missing.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty() && !v.starts_with("your_"))
}

/// The provider chain in fixed priority order: Gemini, then OpenAI, then
/// Hugging Face. Unconfigured providers still appear in the list; they skip
/// themselves with `Error::Config` so the priority order stays visible in
/// one place.
pub fn create_providers(config: &ProviderConfig) -> Vec<Box<dyn AnalysisProvider>> {
    vec![
        Box::new(GeminiProvider::new(config.gemini_api_key.clone())),
        Box::new(OpenAiProvider::new(config.openai_api_key.clone())),
        Box::new(HuggingFaceProvider::new(config.huggingface_api_key.clone())),
    ]
}

/// The JSON object every backend is prompted to return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalysisPayload {
    summary: String,
    why_this_matters_explanation: String,
    #[serde(default)]
    is_relevant_money: bool,
    #[serde(default)]
    is_relevant_policy: bool,
    #[serde(default)]
    is_relevant_opportunity: bool,
    #[serde(default)]
    is_relevant_growth: bool,
}

impl AnalysisPayload {
    pub(crate) fn into_result(self, provider: &str) -> AnalysisResult {
        AnalysisResult {
            summary: self.summary,
            why_it_matters: self.why_this_matters_explanation,
            flags: RelevanceFlags {
                money: self.is_relevant_money,
                policy: self.is_relevant_policy,
                opportunity: self.is_relevant_opportunity,
                growth: self.is_relevant_growth,
            },
            provider: provider.to_string(),
        }
    }
}

/// Pulls the JSON object out of a free-text completion by brace matching:
/// first `{` through last `}`. Models routinely wrap their JSON in prose or
/// code fences.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Maps a non-success API status to the chain's error taxonomy, using the
/// shared quota vocabulary on both the status line and the error body.
pub(crate) fn classify_api_error(provider: &str, status: u16, body: &str) -> Error {
    if status == 429 || is_quota_error(body) {
        Error::Quota(format!("{}: status {}", provider, status))
    } else {
        Error::Transient(format!("{} API error: status {} {}", provider, status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_from_fenced_completion() {
        let text = "Sure, here you go:\n```json\n{\"summary\": \"- a\"}\n```";
        assert_eq!(extract_json_object(text), Some("{\"summary\": \"- a\"}"));
    }

    #[test]
    fn no_object_when_braces_missing_or_reversed() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn payload_maps_to_result() {
        let payload: AnalysisPayload = serde_json::from_str(
            r#"{
                "summary": "- one\n- two",
                "whyThisMattersExplanation": "Big for Ghana.",
                "isRelevantMoney": true,
                "isRelevantGrowth": true
            }"#,
        )
        .unwrap();
        let result = payload.into_result("gemini");
        assert_eq!(result.provider, "gemini");
        assert!(result.flags.money);
        assert!(result.flags.growth);
        assert!(!result.flags.policy);
        assert_eq!(result.why_it_matters, "Big for Ghana.");
    }

    #[test]
    fn status_429_classifies_as_quota() {
        assert!(matches!(
            classify_api_error("gemini", 429, ""),
            Error::Quota(_)
        ));
        assert!(matches!(
            classify_api_error("gemini", 500, "RESOURCE_EXHAUSTED"),
            Error::Quota(_)
        ));
        assert!(matches!(
            classify_api_error("gemini", 500, "internal"),
            Error::Transient(_)
        ));
    }
}
