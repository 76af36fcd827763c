use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ib_core::{AnalysisResult, Error, Result};

use super::{classify_api_error, extract_json_object, AnalysisPayload, AnalysisProvider};
use crate::fallback::truncate_chars;

const BASE_URL: &str = "https://router.huggingface.co/models";
const MODEL: &str = "meta-llama/Llama-2-7b-chat-hf";
// Small context model; the prompt only carries the article's opening.
const PROMPT_CONTENT_CHARS: usize = 2_000;

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: String,
}

/// Tertiary provider: Llama-2 chat through the Hugging Face inference
/// router, prompted in `[INST]` format and brace-matched for JSON.
pub struct HuggingFaceProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl HuggingFaceProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    fn prompt(text: &str) -> String {
        format!(
            "<s>[INST] You are an expert analyst for news related to Ghana. Analyze the \
             article and return ONLY a valid JSON object (no other text) with these fields: \
             summary (string with 5 bullet points), whyThisMattersExplanation (2-3 sentences), \
             isRelevantMoney (boolean), isRelevantPolicy (boolean), isRelevantOpportunity \
             (boolean), isRelevantGrowth (boolean).\n\nArticle: {} [/INST]",
            truncate_chars(text, PROMPT_CONTENT_CHARS)
        )
    }
}

impl fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl AnalysisProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("Hugging Face API key not configured".to_string()))?;

        let request = InferenceRequest {
            inputs: Self::prompt(text),
            parameters: InferenceParameters {
                max_new_tokens: 800,
                temperature: 0.7,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, MODEL))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transient(format!("huggingface request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(self.name(), status.as_u16(), &body));
        }

        let body: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| Error::Transient(format!("huggingface response body: {}", e)))?;

        let completion = body
            .first()
            .map(|g| g.generated_text.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Transient("no content in Hugging Face response".to_string()))?;

        let json = extract_json_object(completion).ok_or_else(|| {
            Error::Transient("no JSON found in Hugging Face response".to_string())
        })?;
        let payload: AnalysisPayload = serde_json::from_str(json).map_err(|e| {
            Error::Transient(format!("huggingface returned malformed JSON: {}", e))
        })?;

        Ok(payload.into_result(self.name()))
    }
}
