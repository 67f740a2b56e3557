//! Site configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    rule::{LayoutRuleDecl, RuleDecl},
};

/// Main configuration structure for Kiln.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Compilation rules. When empty, the built-in blog rules apply.
    #[serde(default)]
    pub rules: Vec<RuleDecl>,

    /// Layout rules. When empty, every layout is rendered with `template`.
    #[serde(default)]
    pub layout_rules: Vec<LayoutRuleDecl>,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Site description for meta tags and the feed.
    #[serde(default)]
    pub description: Option<String>,

    /// Site author name.
    #[serde(default)]
    pub author: Option<String>,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding content items, relative to the site root.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Directory holding layouts, relative to the site root.
    #[serde(default = "default_layouts_dir")]
    pub layouts_dir: String,

    /// Output directory for generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Remove the output directory before writing.
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Syntax highlighting theme name.
    #[serde(default = "default_syntax_theme")]
    pub syntax_theme: String,

    /// Extensions read as text (frontmatter is parsed); everything else is binary.
    #[serde(default = "default_text_extensions")]
    pub text_extensions: Vec<String>,
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Maximum number of items in the feed.
    #[serde(default = "default_feed_limit")]
    pub limit: usize,

    /// Metadata `kind` of the items listed in the feed.
    #[serde(default = "default_feed_kind")]
    pub kind: String,
}

// Default value functions
fn default_content_dir() -> String {
    "content".to_string()
}

fn default_layouts_dir() -> String {
    "layouts".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_syntax_theme() -> String {
    "base16-ocean.dark".to_string()
}

fn default_true() -> bool {
    true
}

fn default_text_extensions() -> Vec<String> {
    [
        "md", "markdown", "html", "erb", "xml", "txt", "css", "js", "json", "svg",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_feed_limit() -> usize {
    20
}

fn default_feed_kind() -> String {
    "article".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            layouts_dir: default_layouts_dir(),
            output_dir: default_output_dir(),
            clean: true,
            syntax_theme: default_syntax_theme(),
            text_extensions: default_text_extensions(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            limit: default_feed_limit(),
            kind: default_feed_kind(),
        }
    }
}

impl Config {
    /// Create a configuration with default build settings and no custom rules.
    #[must_use]
    pub fn new(title: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                title: title.into(),
                base_url: base_url.into(),
                description: None,
                author: None,
            },
            build: BuildConfig::default(),
            feed: FeedConfig::default(),
            rules: Vec::new(),
            layout_rules: Vec::new(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration, letting `KILN__SECTION__KEY` environment variables
    /// override file values.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("KILN").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        if self.feed.limit == 0 {
            return Err(CoreError::config("feed.limit must be at least 1"));
        }

        Ok(())
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
