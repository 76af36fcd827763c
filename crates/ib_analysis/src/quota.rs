/// Vocabulary shared by every provider for spotting quota and rate-limit
/// failures in an error message or serialized error body.
const QUOTA_INDICATORS: &[&str] = &[
    "quota",
    "rate limit",
    "too many requests",
    "429",
    "resource_exhausted",
    "resource exhausted",
    "insufficient_quota",
    "insufficient quota",
];

/// Returns true when the message looks quota-related. Case-insensitive
/// substring match against a fixed vocabulary so every provider classifies
/// the same way.
pub fn is_quota_error(message: &str) -> bool {
    let message = message.to_lowercase();
    QUOTA_INDICATORS.iter().any(|i| message.contains(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_indicators() {
        assert!(is_quota_error("Quota exceeded for this project"));
        assert!(is_quota_error("HTTP 429 Too Many Requests"));
        assert!(is_quota_error("error: RESOURCE_EXHAUSTED"));
        assert!(is_quota_error("You exceeded your insufficient_quota limit"));
        assert!(is_quota_error("Rate Limit reached"));
    }

    #[test]
    fn ignores_unrelated_messages() {
        assert!(!is_quota_error("connection reset by peer"));
        assert!(!is_quota_error("invalid JSON in response"));
        assert!(!is_quota_error(""));
    }
}
