use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::feed::FeedItem;
use crate::USER_AGENT;

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(5);

lazy_static! {
    static ref IMG_SRC: Regex = Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).unwrap();
    // Publishers order meta attributes both ways; match both.
    static ref OG_PROP_FIRST: Regex =
        Regex::new(r#"(?i)<meta[^>]+property=["']og:image["'][^>]+content=["']([^"']+)["']"#)
            .unwrap();
    static ref OG_CONTENT_FIRST: Regex =
        Regex::new(r#"(?i)<meta[^>]+content=["']([^"']+)["'][^>]+property=["']og:image["']"#)
            .unwrap();
    static ref TW_NAME_FIRST: Regex =
        Regex::new(r#"(?i)<meta[^>]+name=["']twitter:image["'][^>]+content=["']([^"']+)["']"#)
            .unwrap();
    static ref TW_CONTENT_FIRST: Regex =
        Regex::new(r#"(?i)<meta[^>]+content=["']([^"']+)["'][^>]+name=["']twitter:image["']"#)
            .unwrap();
}

/// Resolves a representative thumbnail for a feed item through ordered
/// fallback tiers, ending with a bounded scrape of the article page itself.
/// Absence of an image is an expected outcome, never an error.
pub struct ImageResolver {
    client: Client,
}

impl ImageResolver {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn resolve(&self, item: &FeedItem) -> Option<String> {
        if let Some(url) = image_from_feed_metadata(item) {
            return Some(url);
        }
        self.scrape_page_image(&item.link).await
    }

    /// Last resort: fetch the article page and look for social-card meta
    /// tags. Every failure mode here collapses to "no image".
    async fn scrape_page_image(&self, url: &str) -> Option<String> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .timeout(SCRAPE_TIMEOUT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            debug!("page scrape for {} returned {}", url, response.status());
            return None;
        }
        let html = response.text().await.ok()?;
        meta_image_from_html(&html)
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Tiers 1–7: everything answerable from the feed entry alone, first match
/// wins.
fn image_from_feed_metadata(item: &FeedItem) -> Option<String> {
    let hints = &item.hints;

    // 1. Enclosure declared as an image
    if let Some(enclosure) = &hints.enclosure {
        if enclosure.mime_type.starts_with("image/") {
            return Some(enclosure.url.clone());
        }
    }

    // 2. media:content of medium/type image
    if let Some(media) = hints.media_content.iter().find(|m| {
        m.medium.as_deref() == Some("image")
            || m.mime_type
                .as_deref()
                .map(|t| t.starts_with("image/"))
                .unwrap_or(false)
    }) {
        return Some(media.url.clone());
    }

    // 3. media:thumbnail
    if let Some(url) = &hints.media_thumbnail {
        return Some(url.clone());
    }

    // 4. Podcast-style itunes image
    if let Some(url) = &hints.itunes_image {
        return Some(url.clone());
    }

    // 5. First <img> in the rich content
    if let Some(url) = first_img_src(&item.content_html) {
        return Some(url);
    }

    // 6. Plain image field
    if let Some(url) = &hints.image {
        return Some(url.clone());
    }

    // 7. First <img> in the description
    first_img_src(&item.description_html)
}

fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Matches `og:image` then `twitter:image` meta tags in untrusted page HTML.
pub(crate) fn meta_image_from_html(html: &str) -> Option<String> {
    for pattern in [&*OG_PROP_FIRST, &*OG_CONTENT_FIRST, &*TW_NAME_FIRST, &*TW_CONTENT_FIRST] {
        if let Some(caps) = pattern.captures(html) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    None
}
