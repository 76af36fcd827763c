use ib_core::{AnalysisResult, RelevanceFlags};

pub const FALLBACK_PROVIDER: &str = "fallback";

/// Fixed placeholder explanation emitted when no AI backend was available.
/// The quality gate keys on this text to tell "never analyzed" apart from a
/// genuine all-negative classification.
pub const FALLBACK_EXPLANATION: &str = "This article covers important developments in \
Ghana's business and policy landscape. Check back for detailed AI analysis.";

const FALLBACK_WINDOW_CHARS: usize = 800;
const FALLBACK_SENTENCES: usize = 3;

/// Deterministic local analysis used when every provider in the chain has
/// failed: the first three sentences of the opening 800 characters become
/// bullet points, the explanation is a fixed placeholder, and every
/// relevance flag is false.
pub fn fallback_analysis(text: &str) -> AnalysisResult {
    let window = truncate_chars(text, FALLBACK_WINDOW_CHARS);
    let bullets: Vec<String> = window
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(FALLBACK_SENTENCES)
        .map(|s| format!("- {}", s))
        .collect();

    let summary = if bullets.is_empty() {
        "- Article content will be available soon".to_string()
    } else {
        bullets.join("\n")
    };

    AnalysisResult {
        summary,
        why_it_matters: FALLBACK_EXPLANATION.to_string(),
        flags: RelevanceFlags::default(),
        provider: FALLBACK_PROVIDER.to_string(),
    }
}

/// Truncates on a character boundary, never mid-codepoint.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
