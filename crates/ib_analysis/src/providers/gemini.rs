use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ib_core::{AnalysisResult, Error, Result};

use super::{classify_api_error, extract_json_object, AnalysisPayload, AnalysisProvider};
use crate::fallback::truncate_chars;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash";
const PROMPT_CONTENT_CHARS: usize = 10_000;

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Primary provider: Gemini via the direct generateContent API. The model
/// is asked for a bare JSON object; the response is still brace-matched
/// because it routinely arrives wrapped in prose or code fences.
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    fn prompt(text: &str) -> String {
        format!(
            "You are an expert analyst for news related to Ghana.\n\
             Analyze this article and return ONLY a valid JSON object with these fields:\n\
             - summary: A concise, 5-bullet point summary (string with bullet points separated by newlines)\n\
             - whyThisMattersExplanation: 2-3 sentences explaining significance for Ghana\n\
             - isRelevantMoney: boolean\n\
             - isRelevantPolicy: boolean\n\
             - isRelevantOpportunity: boolean\n\
             - isRelevantGrowth: boolean\n\n\
             Article: {}\n\n\
             Return ONLY the JSON object, no other text.",
            truncate_chars(text, PROMPT_CONTENT_CHARS)
        )
    }
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("Gemini API key not configured".to_string()))?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::prompt(text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 1000,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, MODEL, api_key
            ))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transient(format!("gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(self.name(), status.as_u16(), &body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Transient(format!("gemini response body: {}", e)))?;

        let completion = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Transient("no content in Gemini response".to_string()))?;

        let json = extract_json_object(completion)
            .ok_or_else(|| Error::Transient("no JSON found in Gemini response".to_string()))?;
        let payload: AnalysisPayload = serde_json::from_str(json)
            .map_err(|e| Error::Transient(format!("gemini returned malformed JSON: {}", e)))?;

        Ok(payload.into_result(self.name()))
    }
}
