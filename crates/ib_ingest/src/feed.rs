use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::debug;

use ib_core::{Error, Result, Source};

use crate::USER_AGENT;

const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry parsed from a source's feed. Ephemeral: produced per fetch,
/// discarded after processing, never persisted.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    /// Canonical article URL, the dedup key.
    pub link: String,
    pub published_at: DateTime<Utc>,
    /// Rich content when the feed carries it (content:encoded), otherwise
    /// the description.
    pub content_html: String,
    pub description_html: String,
    pub hints: ImageHints,
}

/// Structured image metadata lifted from the feed entry, consumed by the
/// image resolver tiers.
#[derive(Debug, Clone, Default)]
pub struct ImageHints {
    pub enclosure: Option<EnclosureHint>,
    pub media_content: Vec<MediaHint>,
    pub media_thumbnail: Option<String>,
    pub itunes_image: Option<String>,
    /// A plain image field on the item, for fetchers that carry one.
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnclosureHint {
    pub url: String,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct MediaHint {
    pub url: String,
    pub medium: Option<String>,
    pub mime_type: Option<String>,
}

/// Produces one finite batch of feed items per call. A fresh call re-reads
/// from the network; there is no resumable stream.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<Vec<FeedItem>>;
}

/// Fetches a source's feed over HTTP and parses it as RSS, falling back to
/// Atom. The whole fetch-and-parse is raced against a fixed timeout so one
/// hung feed server cannot stall a run.
pub struct RssFetcher {
    client: Client,
    timeout: Duration,
}

impl RssFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: FEED_TIMEOUT,
        }
    }

    async fn fetch_inner(&self, source: &Source) -> Result<Vec<FeedItem>> {
        let response = self
            .client
            .get(&source.feed_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::FeedUnreachable(format!("{}: {}", source.feed_url, e)))?;

        if !response.status().is_success() {
            return Err(Error::FeedUnreachable(format!(
                "{}: status {}",
                source.feed_url,
                response.status()
            )));
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| Error::FeedUnreachable(format!("{}: {}", source.feed_url, e)))?;

        if let Ok(channel) = rss::Channel::read_from(&content[..]) {
            let items = parse_rss_channel(&channel);
            debug!("parsed {} RSS items from {}", items.len(), source.feed_url);
            return Ok(items);
        }

        if let Ok(feed) = atom_syndication::Feed::read_from(&content[..]) {
            let items = parse_atom_feed(&feed);
            debug!("parsed {} Atom entries from {}", items.len(), source.feed_url);
            return Ok(items);
        }

        Err(Error::FeedUnreachable(format!(
            "{}: body is neither RSS nor Atom",
            source.feed_url
        )))
    }
}

impl Default for RssFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for RssFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<FeedItem>> {
        tokio::time::timeout(self.timeout, self.fetch_inner(source))
            .await
            .map_err(|_| {
                Error::FeedUnreachable(format!("timed out fetching {}", source.feed_url))
            })?
    }
}

fn parse_rss_channel(channel: &rss::Channel) -> Vec<FeedItem> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            // No link means no dedup key; the item is unusable.
            let link = item.link()?.to_string();
            let title = item.title().unwrap_or("No Title").to_string();

            let published_at = item
                .pub_date()
                .and_then(parse_feed_date)
                .unwrap_or_else(Utc::now);

            let description_html = item.description().unwrap_or_default().to_string();
            let content_html = item
                .content()
                .unwrap_or_else(|| item.description().unwrap_or_default())
                .to_string();

            Some(FeedItem {
                title,
                link,
                published_at,
                content_html,
                description_html,
                hints: rss_image_hints(item),
            })
        })
        .collect()
}

fn parse_atom_feed(feed: &atom_syndication::Feed) -> Vec<FeedItem> {
    feed.entries()
        .iter()
        .filter_map(|entry| {
            let link = entry.links().first().map(|l| l.href().to_string())?;
            let title = entry.title().to_string();

            let published_at = entry
                .published()
                .copied()
                .unwrap_or_else(|| *entry.updated())
                .with_timezone(&Utc);

            let description_html = entry
                .summary()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default();
            let content_html = entry
                .content()
                .and_then(|c| c.value())
                .map(str::to_string)
                .unwrap_or_else(|| description_html.clone());

            Some(FeedItem {
                title,
                link,
                published_at,
                content_html,
                description_html,
                hints: ImageHints::default(),
            })
        })
        .collect()
}

// Feeds disagree on date formats; RFC 2822 is the RSS norm, RFC 3339 shows
// up in practice, anything else falls back to ingestion time.
fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

fn rss_image_hints(item: &rss::Item) -> ImageHints {
    let enclosure = item.enclosure().map(|e| EnclosureHint {
        url: e.url().to_string(),
        mime_type: e.mime_type().to_string(),
    });

    let mut media_content = Vec::new();
    let mut media_thumbnail = None;
    if let Some(media) = item.extensions().get("media") {
        if let Some(contents) = media.get("content") {
            for content in contents {
                if let Some(url) = content.attrs().get("url") {
                    media_content.push(MediaHint {
                        url: url.clone(),
                        medium: content.attrs().get("medium").cloned(),
                        mime_type: content.attrs().get("type").cloned(),
                    });
                }
            }
        }
        if let Some(thumbnails) = media.get("thumbnail") {
            media_thumbnail = thumbnails
                .iter()
                .find_map(|t| t.attrs().get("url").cloned());
        }
    }

    ImageHints {
        enclosure,
        media_content,
        media_thumbnail,
        itunes_image: item.itunes_ext().and_then(|e| e.image().map(str::to_string)),
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:content="http://purl.org/rss/1.0/modules/content/"
     xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Ghana Business News</title>
    <link>https://www.ghanabusinessnews.com</link>
    <description>Business news</description>
    <item>
      <title>Cedi steadies against the dollar</title>
      <link>https://www.ghanabusinessnews.com/cedi-steadies</link>
      <pubDate>Mon, 03 Aug 2026 09:15:00 +0000</pubDate>
      <description>&lt;p&gt;Short teaser&lt;/p&gt;</description>
      <content:encoded>&lt;p&gt;The cedi held firm this week.&lt;/p&gt;</content:encoded>
      <media:content url="https://cdn.example.com/cedi.jpg" medium="image" type="image/jpeg"/>
      <media:thumbnail url="https://cdn.example.com/cedi-thumb.jpg"/>
    </item>
    <item>
      <title>Item without a link</title>
      <description>dropped</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_FIXTURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Policy Watch</title>
  <id>urn:uuid:policy-watch</id>
  <updated>2026-08-01T10:00:00Z</updated>
  <entry>
    <title>New levy announced</title>
    <id>urn:uuid:entry-1</id>
    <link href="https://example.com/levy"/>
    <updated>2026-08-01T10:00:00Z</updated>
    <summary>&lt;p&gt;A new levy was announced.&lt;/p&gt;</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_items_and_drops_linkless_ones() {
        let channel = rss::Channel::read_from(RSS_FIXTURE.as_bytes()).unwrap();
        let items = parse_rss_channel(&channel);
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.title, "Cedi steadies against the dollar");
        assert_eq!(item.link, "https://www.ghanabusinessnews.com/cedi-steadies");
        assert!(item.content_html.contains("held firm"));
        assert!(item.description_html.contains("Short teaser"));
        assert_eq!(item.published_at.to_rfc3339(), "2026-08-03T09:15:00+00:00");
    }

    #[test]
    fn lifts_media_hints_from_rss_extensions() {
        let channel = rss::Channel::read_from(RSS_FIXTURE.as_bytes()).unwrap();
        let items = parse_rss_channel(&channel);
        let hints = &items[0].hints;

        assert_eq!(hints.media_content.len(), 1);
        assert_eq!(hints.media_content[0].url, "https://cdn.example.com/cedi.jpg");
        assert_eq!(hints.media_content[0].medium.as_deref(), Some("image"));
        assert_eq!(
            hints.media_thumbnail.as_deref(),
            Some("https://cdn.example.com/cedi-thumb.jpg")
        );
        assert!(hints.enclosure.is_none());
    }

    #[test]
    fn parses_atom_entries() {
        let feed = atom_syndication::Feed::read_from(ATOM_FIXTURE.as_bytes()).unwrap();
        let items = parse_atom_feed(&feed);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "New levy announced");
        assert_eq!(items[0].link, "https://example.com/levy");
        assert!(items[0].content_html.contains("new levy"));
    }

    #[test]
    fn unparseable_dates_fall_back_to_now() {
        assert!(parse_feed_date("not a date").is_none());
        assert!(parse_feed_date("Mon, 03 Aug 2026 09:15:00 +0000").is_some());
        assert!(parse_feed_date("2026-08-03T09:15:00Z").is_some());
    }
}
