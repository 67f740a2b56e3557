//! RSS feed filter.
//!
//! Produces an RSS 2.0 document listing the site's published pages of the
//! configured kind. The input text is ignored: the feed is built entirely from
//! the [`SiteIndex`](kiln_core::SiteIndex), which only ever holds pages the
//! build actually writes.

use kiln_core::{FilterOptions, PageEntry};
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use tracing::debug;

use crate::{Filter, FilterContext, Result};

/// Builds an RSS feed of published pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedFilter;

impl FeedFilter {
    /// Generate feed XML.
    pub fn generate(&self, ctx: &FilterContext<'_>) -> String {
        let config = ctx.config;
        let pages: Vec<_> = ctx
            .site
            .of_kind(&config.feed.kind)
            .into_iter()
            .take(config.feed.limit)
            .collect();

        debug!(count = pages.len(), kind = %config.feed.kind, "generating feed");

        let items: Vec<Item> = pages.iter().map(|page| page_to_item(ctx, page)).collect();
        let last_build = pages
            .first()
            .and_then(|p| p.metadata.created_at())
            .map(|d| d.to_rfc2822());

        let channel = ChannelBuilder::default()
            .title(&config.site.title)
            .link(&config.site.base_url)
            .description(
                config
                    .site
                    .description
                    .as_deref()
                    .unwrap_or(&config.site.title),
            )
            .last_build_date(last_build)
            .items(items)
            .build();

        channel.to_string()
    }
}

fn page_to_item(ctx: &FilterContext<'_>, page: &PageEntry) -> Item {
    let url = ctx.config.url_for(&page.url);
    let guid = GuidBuilder::default().value(&url).permalink(true).build();

    let mut builder = ItemBuilder::default();
    builder.title(Some(page.title().to_string()));
    builder.link(Some(url));
    builder.guid(Some(guid));

    if let Some(date) = page.metadata.created_at() {
        builder.pub_date(Some(date.to_rfc2822()));
    }

    let summary = page
        .metadata
        .get_str("summary")
        .or_else(|| page.metadata.get_str("description"));
    if let Some(summary) = summary {
        builder.description(Some(summary.to_string()));
    }

    if let Some(author) = &ctx.config.site.author {
        builder.author(Some(author.clone()));
    }

    builder.build()
}

impl Filter for FeedFilter {
    fn name(&self) -> &'static str {
        "feed"
    }

    fn apply(
        &self,
        _input: &str,
        _options: FilterOptions,
        ctx: &FilterContext<'_>,
    ) -> Result<String> {
        Ok(self.generate(ctx))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use kiln_core::{Config, Metadata, SiteIndex};

    use super::*;

    fn page(slug: &str, kind: &str, day: u32) -> PageEntry {
        PageEntry {
            identifier: format!("/articles/{slug}.md"),
            url: format!("/articles/{slug}/"),
            metadata: Metadata::new()
                .with("title", slug)
                .with("kind", kind)
                .with("summary", format!("About {slug}"))
                .with(
                    "created_at",
                    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
                ),
        }
    }

    fn test_config() -> Config {
        let mut config = Config::new("Test Blog", "https://example.com");
        config.site.description = Some("A test blog".to_string());
        config.site.author = Some("Test Author".to_string());
        config
    }

    #[test]
    fn test_generate_feed() {
        let config = test_config();
        let metadata = Metadata::new();
        let site = SiteIndex::new(vec![
            page("older", "article", 1),
            page("newer", "article", 9),
            page("about", "page", 20),
        ]);
        let ctx = FilterContext::new("/feed.erb", &metadata, &config, &site);

        let xml = FeedFilter.generate(&ctx);

        assert!(xml.contains("<title>Test Blog</title>"));
        assert!(xml.contains("<description>A test blog</description>"));
        assert!(xml.contains("https://example.com/articles/newer/"));
        assert!(xml.contains("About older"));
        assert!(!xml.contains("/articles/about/"));

        let newer = xml.find("<title>newer</title>").expect("newer");
        let older = xml.find("<title>older</title>").expect("older");
        assert!(newer < older);
    }

    #[test]
    fn test_feed_limit() {
        let mut config = test_config();
        config.feed.limit = 1;
        let metadata = Metadata::new();
        let site = SiteIndex::new(vec![page("first", "article", 1), page("second", "article", 2)]);
        let ctx = FilterContext::new("/feed.erb", &metadata, &config, &site);

        let xml = FeedFilter.generate(&ctx);

        assert!(xml.contains("<title>second</title>"));
        assert!(!xml.contains("<title>first</title>"));
    }

    #[test]
    fn test_empty_feed() {
        let config = test_config();
        let metadata = Metadata::new();
        let site = SiteIndex::default();
        let ctx = FilterContext::new("/feed.erb", &metadata, &config, &site);

        let xml = FeedFilter.generate(&ctx);

        assert!(xml.contains("<rss"));
        assert!(!xml.contains("<item>"));
    }
}
