const MAX_SLUG_LEN: usize = 80;

/// Converts an article title into a URL-safe slug.
///
/// e.g. "Ghana's 24-Hour Economy: What it Means" →
/// "ghanas-24-hour-economy-what-it-means"
///
/// Deterministic function of the title: lowercase ASCII alphanumerics and
/// hyphens only, apostrophes removed rather than treated as separators, no
/// leading or trailing hyphens, at most 80 characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else if matches!(c, '\'' | '\u{2019}' | '`') {
            // apostrophes vanish so "Ghana's" stays one word
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
