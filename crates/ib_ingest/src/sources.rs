use ib_core::Source;

/// The curated Ghana press list the service launches with. Seeded through
/// the source store by the seed endpoint or `ib sources seed`; runs read
/// whatever the store holds, so operators can add to this set without a
/// deploy.
pub fn default_sources() -> Vec<Source> {
    [
        (
            "ghanaweb",
            "GhanaWeb",
            "https://www.ghanaweb.com/feed/category/general",
            "https://www.ghanaweb.com",
        ),
        (
            "joy-online",
            "Joy Online",
            "https://www.myjoyonline.com/feed/",
            "https://www.myjoyonline.com",
        ),
        (
            "citi-newsroom",
            "Citi Newsroom",
            "https://citinewsroom.com/feed/",
            "https://citinewsroom.com",
        ),
        (
            "ghana-business-news",
            "Ghana Business News",
            "https://www.ghanabusinessnews.com/feed/",
            "https://www.ghanabusinessnews.com",
        ),
        (
            "bft-online",
            "The Business & Financial Times",
            "https://thebftonline.com/feed/",
            "https://thebftonline.com",
        ),
        (
            "citi-business-news",
            "Citi Business News",
            "https://citibusinessnews.com/feed/",
            "https://citibusinessnews.com",
        ),
        (
            "ghana-news-agency",
            "Ghana News Agency",
            "https://www.ghananewsagency.org/feed/",
            "https://www.ghananewsagency.org",
        ),
        (
            "asaase-radio",
            "Asaase Radio",
            "https://asaaseradio.com/feed/",
            "https://asaaseradio.com",
        ),
    ]
    .into_iter()
    .map(|(id, name, feed_url, website_url)| Source {
        id: id.to_string(),
        name: name.to_string(),
        feed_url: feed_url.to_string(),
        website_url: website_url.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_set_is_well_formed() {
        let sources = default_sources();
        assert!(!sources.is_empty());
        for source in &sources {
            assert!(!source.id.is_empty());
            assert!(source.feed_url.starts_with("https://"));
            assert!(source.website_url.starts_with("https://"));
        }
        // Ids are the seed identity; duplicates would collide in the store.
        let mut ids: Vec<_> = sources.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), sources.len());
    }
}
