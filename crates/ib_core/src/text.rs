use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BLOCK_CLOSERS: Regex = Regex::new(r"(?i)</(p|div|li|h[1-6])>").unwrap();
    static ref TAGS: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Strips markup from raw feed/HTML content into plain text.
///
/// Closing block-level tags become a space so words on either side of a
/// paragraph boundary don't run together; everything else in angle brackets
/// is dropped. This is a heuristic, not an HTML parser: the output feeds a
/// length gate and a summarizer, not a renderer.
pub fn extract_text(html: &str) -> String {
    let text = BLOCK_CLOSERS.replace_all(html, " ");
    let text = TAGS.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
