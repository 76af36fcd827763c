use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// A configured feed the curation run polls. Seeded administratively and
/// read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub name: String,
    pub feed_url: String,
    pub website_url: String,
}

/// Independent relevance classifications. Not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceFlags {
    pub money: bool,
    pub policy: bool,
    pub opportunity: bool,
    pub growth: bool,
}

impl RelevanceFlags {
    pub fn any(&self) -> bool {
        self.money || self.policy || self.opportunity || self.growth
    }
}

/// Structured analysis produced once per item by the provider chain.
///
/// `summary` is a newline-delimited bullet list; `why_it_matters` is a short
/// prose explanation. `provider` names the backend that produced the result
/// ("fallback" for the local heuristic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub why_it_matters: String,
    pub flags: RelevanceFlags,
    pub provider: String,
}

/// A curated article as persisted in the document collection.
///
/// `original_url` is the dedup key: unique across the collection, enforced by
/// an existence check before insert. Articles are created once and never
/// mutated by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub original_url: String,
    pub published_at: DateTime<Utc>,
    pub aggregated_at: DateTime<Utc>,
    pub summary: String,
    pub why_it_matters: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub flags: RelevanceFlags,
    pub provider: String,
    pub source_ids: Vec<String>,
}

impl Article {
    /// Assembles a new article record with a fresh id, a slug derived from
    /// the title, and the current time as the aggregation timestamp.
    pub fn assemble(
        title: String,
        original_url: String,
        published_at: DateTime<Utc>,
        analysis: AnalysisResult,
        image_url: Option<String>,
        source_id: &str,
    ) -> Self {
        let slug = slugify(&title);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            slug,
            title,
            original_url,
            published_at,
            aggregated_at: Utc::now(),
            summary: analysis.summary,
            why_it_matters: analysis.why_it_matters,
            image_url,
            flags: analysis.flags,
            provider: analysis.provider,
            source_ids: vec![source_id.to_string()],
        }
    }
}

/// Outcome of one curation run, returned to the trigger caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub titles: Vec<String>,
}

impl RunSummary {
    pub fn added(&self) -> usize {
        self.titles.len()
    }

    pub fn record(&mut self, title: &str) {
        self.titles.push(title.to_string());
    }

    /// Human-readable outcome. Never empty: a run that found nothing says so
    /// explicitly.
    pub fn message(&self) -> String {
        match self.added() {
            0 => "No new articles found.".to_string(),
            1 => format!("Curated 1 new article: {}", self.titles[0]),
            n => format!("Curated {} new articles.", n),
        }
    }
}
