use ib_core::AnalysisResult;
use ib_analysis::FALLBACK_PROVIDER;

/// Gossip and entertainment column markers that have no place in the brief,
/// whatever the analysis said about them.
const TITLE_DENYLIST: &[&str] = &[
    "useless column",
    "wifee",
    "wife is dangerous",
    "how to make your wife",
];

/// Decides whether a curated item is worth publishing.
///
/// Rejects on a denylisted title, or on a fallback-heuristic result that
/// carries no signal at all (no flags, placeholder explanation). A real
/// provider's all-negative classification is informative and passes: the
/// article was judged and found neutral, not left unjudged.
pub fn is_publishable(title: &str, analysis: &AnalysisResult) -> bool {
    let title = title.to_lowercase();
    if TITLE_DENYLIST.iter().any(|k| title.contains(k)) {
        return false;
    }

    let is_unjudged_fallback = analysis.provider == FALLBACK_PROVIDER
        && !analysis.flags.any()
        && analysis
            .why_it_matters
            .to_lowercase()
            .contains(PLACEHOLDER_MARKER);

    !is_unjudged_fallback
}

// The distinctive tail of FALLBACK_EXPLANATION, matched case-insensitively.
const PLACEHOLDER_MARKER: &str = "check back for detailed ai analysis";
