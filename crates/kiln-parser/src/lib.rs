//! Kiln Parser Library
//!
//! Content filters and the registry the compilation pipeline renders through.
//!
//! A filter is a pure transform from text to text. It receives the item's
//! metadata and the site configuration through a [`FilterContext`], never
//! touches the filesystem, and is looked up by name in a [`FilterRegistry`].

pub mod blocks;
pub mod feed;
pub mod hidden;
pub mod markdown;
pub mod notes;
pub mod syntax;
pub mod template;

use std::collections::HashMap;

pub use feed::FeedFilter;
pub use hidden::HiddenFilter;
use kiln_core::{Config, FilterOptions, Metadata, SiteIndex};
pub use markdown::MarkdownFilter;
pub use notes::NotesFilter;
pub use syntax::SyntaxHighlighter;
pub use template::{Template, TemplateContext, TemplateError, TemplateFilter};
use thiserror::Error;

/// Filter errors.
#[derive(Debug, Error)]
pub enum FilterError {
    /// No filter registered under this name.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// Template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A `:::` container was opened but never closed.
    #[error("unclosed :::{kind} container opened on line {line}")]
    UnclosedContainer { kind: String, line: usize },
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Everything a filter may read besides its input.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Identifier of the item being compiled.
    pub identifier: &'a str,

    /// Public URL of the item, when it has one.
    pub url: Option<&'a str>,

    /// Item metadata.
    pub metadata: &'a Metadata,

    /// Site configuration.
    pub config: &'a Config,

    /// Pages published by this build.
    pub site: &'a SiteIndex,

    /// Inner content when rendering a layout.
    pub content: Option<&'a str>,

    /// Identifier of the layout being rendered, if any.
    pub layout: Option<&'a str>,
}

impl<'a> FilterContext<'a> {
    /// Create a context for an item.
    #[must_use]
    pub fn new(
        identifier: &'a str,
        metadata: &'a Metadata,
        config: &'a Config,
        site: &'a SiteIndex,
    ) -> Self {
        Self {
            identifier,
            url: None,
            metadata,
            config,
            site,
            content: None,
            layout: None,
        }
    }

    /// Set the item URL.
    #[must_use]
    pub fn with_url(mut self, url: Option<&'a str>) -> Self {
        self.url = url;
        self
    }

    /// Set the inner content for layout rendering.
    #[must_use]
    pub fn with_content(mut self, content: &'a str) -> Self {
        self.content = Some(content);
        self
    }

    /// Mark the context as rendering the given layout.
    #[must_use]
    pub fn with_layout(mut self, layout: &'a str) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Name of the source being rendered: the layout when there is one,
    /// otherwise the item.
    #[must_use]
    pub fn source_name(&self) -> &'a str {
        self.layout.unwrap_or(self.identifier)
    }
}

/// A named content transform.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Name the filter is registered under.
    fn name(&self) -> &'static str;

    /// Transform `input`.
    fn apply(&self, input: &str, options: FilterOptions, ctx: &FilterContext<'_>)
    -> Result<String>;
}

/// Registry of filters, addressed by name.
#[derive(Debug, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Box<dyn Filter>>,
}

impl FilterRegistry {
    /// Create a registry with the built-in filters.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let mut registry = Self::default();
        registry.register(MarkdownFilter::with_theme(&config.build.syntax_theme));
        registry.register(NotesFilter);
        registry.register(HiddenFilter);
        registry.register(TemplateFilter);
        registry.register(FeedFilter);
        registry
    }

    /// Register a filter, replacing any filter with the same name.
    pub fn register(&mut self, filter: impl Filter + 'static) {
        self.filters
            .insert(filter.name().to_string(), Box::new(filter));
    }

    /// Whether a filter is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filter names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the named filter over `content`.
    pub fn render(
        &self,
        content: &str,
        name: &str,
        options: FilterOptions,
        ctx: &FilterContext<'_>,
    ) -> Result<String> {
        let filter = self
            .filters
            .get(name)
            .ok_or_else(|| FilterError::UnknownFilter(name.to_string()))?;
        filter.apply(content, options, ctx)
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Shout;

    impl Filter for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn apply(&self, input: &str, _: FilterOptions, _: &FilterContext<'_>) -> Result<String> {
            Ok(input.to_uppercase())
        }
    }

    #[test]
    fn test_builtin_filters_registered() {
        let registry = FilterRegistry::new(&Config::new("Test", "https://example.com"));
        assert_eq!(
            registry.names(),
            vec!["feed", "hidden", "markdown", "notes", "template"]
        );
    }

    #[test]
    fn test_register_custom_filter() {
        let config = Config::new("Test", "https://example.com");
        let metadata = Metadata::new();
        let site = SiteIndex::default();
        let ctx = FilterContext::new("/a.txt", &metadata, &config, &site);

        let mut registry = FilterRegistry::default();
        registry.register(Shout);

        let out = registry
            .render("hi", "shout", FilterOptions::default(), &ctx)
            .expect("render");
        assert_eq!(out, "HI");
    }

    #[test]
    fn test_unknown_filter() {
        let config = Config::new("Test", "https://example.com");
        let metadata = Metadata::new();
        let site = SiteIndex::default();
        let ctx = FilterContext::new("/a.md", &metadata, &config, &site);

        let result = FilterRegistry::default().render("x", "kramdown", FilterOptions::default(), &ctx);
        assert!(matches!(result, Err(FilterError::UnknownFilter(name)) if name == "kramdown"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("\"q\""), "&quot;q&quot;");
    }
}
