use tracing::{debug, info, warn};

use ib_core::{AnalysisResult, Error};

use crate::fallback::{fallback_analysis, truncate_chars};
use crate::providers::AnalysisProvider;

/// Hard cap on the text handed to any provider.
const MAX_ANALYSIS_CHARS: usize = 15_000;

/// Runs the provider chain over the extracted article text.
///
/// Providers are tried in the order given; the first success wins and the
/// result carries that provider's name. Unconfigured providers, quota
/// exhaustion and transient failures all step to the next entry; a single
/// malformed response must not abort the chain. When every provider fails
/// the deterministic local heuristic answers, so this function never errors.
pub async fn analyze_with_chain(
    providers: &[Box<dyn AnalysisProvider>],
    text: &str,
) -> AnalysisResult {
    let text = truncate_chars(text, MAX_ANALYSIS_CHARS);

    for provider in providers {
        match provider.analyze(text).await {
            Ok(result) => {
                info!("analysis succeeded with provider {}", provider.name());
                return result;
            }
            Err(Error::Config(msg)) => {
                debug!("skipping unconfigured provider {}: {}", provider.name(), msg);
            }
            Err(Error::Quota(msg)) => {
                warn!("quota exhausted for provider {}: {}", provider.name(), msg);
            }
            Err(e) => {
                warn!("provider {} failed: {}", provider.name(), e);
            }
        }
    }

    warn!("all analysis providers failed, using local fallback");
    fallback_analysis(text)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use ib_core::{RelevanceFlags, Result};

    use super::*;
    use crate::fallback::FALLBACK_PROVIDER;

    enum Outcome {
        Succeed,
        NotConfigured,
        Quota,
        Transient,
    }

    struct ScriptedProvider {
        name: &'static str,
        outcome: Outcome,
        seen_len: Arc<Mutex<Option<usize>>>,
    }

    impl ScriptedProvider {
        fn new(name: &'static str, outcome: Outcome) -> Box<dyn AnalysisProvider> {
            Box::new(Self {
                name,
                outcome,
                seen_len: Arc::new(Mutex::new(None)),
            })
        }
    }

    #[async_trait]
    impl AnalysisProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
            *self.seen_len.lock().unwrap() = Some(text.chars().count());
            match self.outcome {
                Outcome::Succeed => Ok(AnalysisResult {
                    summary: "- a point".to_string(),
                    why_it_matters: "Real analysis.".to_string(),
                    flags: RelevanceFlags {
                        money: true,
                        ..Default::default()
                    },
                    provider: self.name.to_string(),
                }),
                Outcome::NotConfigured => Err(Error::Config("no key".to_string())),
                Outcome::Quota => Err(Error::Quota("429".to_string())),
                Outcome::Transient => Err(Error::Transient("boom".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn first_success_wins_and_is_tagged() {
        let providers = vec![
            ScriptedProvider::new("first", Outcome::Succeed),
            ScriptedProvider::new("second", Outcome::Succeed),
        ];
        let result = analyze_with_chain(&providers, "text").await;
        assert_eq!(result.provider, "first");
    }

    #[tokio::test]
    async fn skips_unconfigured_and_quota_providers() {
        let providers = vec![
            ScriptedProvider::new("unconfigured", Outcome::NotConfigured),
            ScriptedProvider::new("exhausted", Outcome::Quota),
            ScriptedProvider::new("healthy", Outcome::Succeed),
        ];
        let result = analyze_with_chain(&providers, "text").await;
        assert_eq!(result.provider, "healthy");
    }

    #[tokio::test]
    async fn transient_failure_does_not_abort_the_chain() {
        let providers = vec![
            ScriptedProvider::new("flaky", Outcome::Transient),
            ScriptedProvider::new("healthy", Outcome::Succeed),
        ];
        let result = analyze_with_chain(&providers, "text").await;
        assert_eq!(result.provider, "healthy");
    }

    #[tokio::test]
    async fn falls_back_when_every_provider_fails() {
        let providers = vec![
            ScriptedProvider::new("a", Outcome::Quota),
            ScriptedProvider::new("b", Outcome::Transient),
        ];
        let result = analyze_with_chain(&providers, "One sentence. Two sentences.").await;
        assert_eq!(result.provider, FALLBACK_PROVIDER);
        assert!(!result.flags.any());
        assert!(result.summary.starts_with("- "));
    }

    #[tokio::test]
    async fn empty_chain_still_produces_a_result() {
        let providers: Vec<Box<dyn AnalysisProvider>> = vec![];
        let result = analyze_with_chain(&providers, "Some text here.").await;
        assert_eq!(result.provider, FALLBACK_PROVIDER);
    }

    #[tokio::test]
    async fn input_is_capped_before_transmission() {
        let seen = Arc::new(Mutex::new(None));
        let providers: Vec<Box<dyn AnalysisProvider>> = vec![Box::new(ScriptedProvider {
            name: "measuring",
            outcome: Outcome::Succeed,
            seen_len: seen.clone(),
        })];
        let text = "x".repeat(40_000);
        analyze_with_chain(&providers, &text).await;
        assert_eq!(*seen.lock().unwrap(), Some(15_000));
    }
}
