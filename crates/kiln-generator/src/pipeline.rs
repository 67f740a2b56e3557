//! Pipeline execution.
//!
//! Runs a matched rule against one item: guard first, then filter steps in
//! order, then layouts innermost first.

use kiln_core::{Config, ContentItem, SiteIndex};
use kiln_parser::{FilterContext, FilterError, FilterRegistry};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    artifact::{CompiledArtifact, url_for_output},
    layout::{LayoutError, LayoutStore},
    matcher::Rule,
    router::output_path,
};

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A filter or layout was asked to process binary content.
    #[error("{identifier}: `{stage}` cannot process binary content")]
    BinaryInput { identifier: String, stage: String },

    /// A text file could not be decoded or its frontmatter is malformed.
    #[error("{identifier}: cannot read as text: {reason}")]
    Unreadable { identifier: String, reason: String },

    /// A filter step failed.
    #[error("{identifier}: filter `{filter}` failed: {source}")]
    Filter {
        identifier: String,
        filter: String,
        #[source]
        source: FilterError,
    },

    /// A layout wrap failed.
    #[error("{identifier}: {source}")]
    Layout {
        identifier: String,
        #[source]
        source: LayoutError,
    },
}

/// Why an item produced no artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// The rule's guard held against the item's metadata.
    Guard,
    /// The rule's output policy writes nothing.
    OutputSkipped,
}

/// Result of running a rule against an item.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The item compiled to an artifact.
    Written(CompiledArtifact),
    /// Nothing is written for the item.
    Suppressed(SuppressReason),
}

impl Outcome {
    /// The artifact, if one was produced.
    #[must_use]
    pub fn artifact(&self) -> Option<&CompiledArtifact> {
        match self {
            Self::Written(artifact) => Some(artifact),
            Self::Suppressed(_) => None,
        }
    }
}

/// Executes rules against items.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
    filters: &'a FilterRegistry,
    layouts: &'a LayoutStore,
    config: &'a Config,
    site: &'a SiteIndex,
}

impl<'a> Executor<'a> {
    /// Create an executor. Every layout referenced by the rules it runs must
    /// already be resolved in `layouts`.
    #[must_use]
    pub fn new(
        filters: &'a FilterRegistry,
        layouts: &'a LayoutStore,
        config: &'a Config,
        site: &'a SiteIndex,
    ) -> Self {
        Self {
            filters,
            layouts,
            config,
            site,
        }
    }

    /// Run `rule` against `item`.
    pub fn execute(&self, item: &ContentItem, rule: &Rule) -> Result<Outcome, PipelineError> {
        let identifier = item.identifier();

        if rule
            .guard()
            .is_some_and(|guard| guard.suppresses(item.metadata()))
        {
            debug!(identifier, rule = rule.pattern(), "suppressed by guard");
            return Ok(Outcome::Suppressed(SuppressReason::Guard));
        }

        let Some(output) = output_path(identifier, rule.output()) else {
            debug!(identifier, rule = rule.pattern(), "output skipped");
            return Ok(Outcome::Suppressed(SuppressReason::OutputSkipped));
        };

        if rule.steps().is_empty() && rule.layouts().is_empty() {
            return Ok(Outcome::Written(CompiledArtifact::new(
                output,
                item.body().as_bytes(),
                identifier,
            )));
        }

        if let Some(reason) = item.text_error() {
            return Err(PipelineError::Unreadable {
                identifier: identifier.to_string(),
                reason: reason.to_string(),
            });
        }

        let Some(text) = item.body().as_text() else {
            let stage = rule
                .steps()
                .first()
                .map(|step| step.filter.clone())
                .or_else(|| rule.layouts().first().cloned())
                .unwrap_or_default();
            return Err(PipelineError::BinaryInput {
                identifier: identifier.to_string(),
                stage,
            });
        };

        let url = url_for_output(&output);
        let ctx = FilterContext::new(identifier, item.metadata(), self.config, self.site)
            .with_url(Some(&url));

        let mut content = text.to_string();
        for step in rule.steps() {
            trace!(identifier, filter = %step.filter, "applying filter");
            content = self
                .filters
                .render(&content, &step.filter, step.options, &ctx)
                .map_err(|source| PipelineError::Filter {
                    identifier: identifier.to_string(),
                    filter: step.filter.clone(),
                    source,
                })?;
        }

        for layout in rule.layouts() {
            trace!(identifier, layout = %layout, "applying layout");
            content = self
                .layouts
                .wrap(&content, layout, &ctx, self.filters)
                .map_err(|source| PipelineError::Layout {
                    identifier: identifier.to_string(),
                    source,
                })?;
        }

        debug!(identifier, output = %output, "compiled");
        Ok(Outcome::Written(CompiledArtifact::new(
            output,
            content.into_bytes(),
            identifier,
        )))
    }
}

#[cfg(test)]
mod tests {
    use kiln_core::{FilterOptions, Guard, Metadata, OutputPolicy, RuleDecl, Step};

    use super::*;

    struct Fixture {
        config: Config,
        filters: FilterRegistry,
        layouts: LayoutStore,
        site: SiteIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let config = Config::new("Blog", "https://example.com");
            let filters = FilterRegistry::new(&config);
            let mut layouts = LayoutStore::new(
                vec![
                    ContentItem::text(
                        "/default.html",
                        "<main>{{ content }}</main>",
                        Metadata::new(),
                    ),
                    ContentItem::text(
                        "/article.html",
                        "<article><h1>{{ title }}</h1>{{ content }}</article>",
                        Metadata::new(),
                    ),
                ],
                &[],
            )
            .expect("layouts");
            layouts.resolve("/default.*", &filters).expect("default");
            layouts.resolve("/article.*", &filters).expect("article");

            Self {
                config,
                filters,
                layouts,
                site: SiteIndex::default(),
            }
        }

        fn executor(&self) -> Executor<'_> {
            Executor::new(&self.filters, &self.layouts, &self.config, &self.site)
        }
    }

    fn article_rule() -> Rule {
        Rule::compile(
            RuleDecl::new("/articles/**/*.md")
                .guard(Guard::Draft)
                .step(Step::new("notes"))
                .step(Step::new("hidden"))
                .step(Step::with_options(
                    "markdown",
                    FilterOptions {
                        parse_block_html: true,
                    },
                ))
                .layout("/article.*")
                .layout("/default.*"),
        )
        .expect("rule")
    }

    #[test]
    fn test_draft_is_suppressed() {
        let fixture = Fixture::new();
        let item = ContentItem::text(
            "/articles/post-2.md",
            "# Draft",
            Metadata::new().with("status", "draft"),
        );

        let outcome = fixture.executor().execute(&item, &article_rule()).expect("execute");
        assert_eq!(outcome, Outcome::Suppressed(SuppressReason::Guard));
    }

    #[test]
    fn test_guard_runs_before_filters() {
        let fixture = Fixture::new();
        // The unclosed container would fail the notes filter if it ran.
        let item = ContentItem::text(
            "/articles/post-2.md",
            ":::note\nnever closed",
            Metadata::new().with("status", "draft"),
        );

        let outcome = fixture.executor().execute(&item, &article_rule()).expect("execute");
        assert!(outcome.artifact().is_none());
    }

    #[test]
    fn test_missing_status_is_published() {
        let fixture = Fixture::new();
        let item = ContentItem::text(
            "/articles/post-1.md",
            "Hello",
            Metadata::new().with("title", "Untagged"),
        );

        let outcome = fixture.executor().execute(&item, &article_rule()).expect("execute");
        assert!(outcome.artifact().is_some());
    }

    #[test]
    fn test_steps_then_layouts_innermost_first() {
        let fixture = Fixture::new();
        let item = ContentItem::text(
            "/articles/post-1.md",
            "Intro\n\n:::note\nRemember *this*.\n:::\n",
            Metadata::new().with("title", "Post One").with("status", "published"),
        );

        let outcome = fixture.executor().execute(&item, &article_rule()).expect("execute");
        let artifact = outcome.artifact().expect("artifact");
        let html = String::from_utf8(artifact.bytes.clone()).expect("utf8");

        assert_eq!(artifact.output_path, "/articles/post-1/index.html");
        assert_eq!(artifact.source, "/articles/post-1.md");
        assert!(html.starts_with("<main><article><h1>Post One</h1>"));
        assert!(html.ends_with("</article></main>"));
        assert!(html.contains("<aside class=\"note\">"));
        assert!(html.contains("<em>this</em>"));
    }

    #[test]
    fn test_skip_policy() {
        let fixture = Fixture::new();
        let rule = Rule::compile(RuleDecl::new("/**/*.md").output(OutputPolicy::Skip)).expect("rule");
        let item = ContentItem::text("/notes.md", "x", Metadata::new());

        let outcome = fixture.executor().execute(&item, &rule).expect("execute");
        assert_eq!(outcome, Outcome::Suppressed(SuppressReason::OutputSkipped));
    }

    #[test]
    fn test_binary_input_rejected() {
        let fixture = Fixture::new();
        let rule = Rule::compile(RuleDecl::new("/**/*").step(Step::new("markdown"))).expect("rule");
        let item = ContentItem::binary("/logo.png", vec![0u8, 1, 2]);

        let err = fixture.executor().execute(&item, &rule).unwrap_err();
        assert!(matches!(err, PipelineError::BinaryInput { ref stage, .. } if stage == "markdown"));
    }

    #[test]
    fn test_copy_rule_keeps_binary() {
        let fixture = Fixture::new();
        let rule = Rule::compile(RuleDecl::new("/**/*.png").output(OutputPolicy::Identity))
            .expect("rule");
        let item = ContentItem::binary("/logo.png", vec![0u8, 1, 2]);

        let outcome = fixture.executor().execute(&item, &rule).expect("execute");
        let artifact = outcome.artifact().expect("artifact");
        assert_eq!(artifact.output_path, "/logo.png");
        assert_eq!(artifact.bytes, [0u8, 1, 2]);
    }

    #[test]
    fn test_unreadable_text_fails_when_filtered() {
        let fixture = Fixture::new();
        let item = ContentItem::unreadable(
            "/articles/broken.md",
            "---\n- a\n---\nbody",
            "frontmatter must be a mapping of keys to values",
        );

        let err = fixture.executor().execute(&item, &article_rule()).unwrap_err();
        assert!(matches!(err, PipelineError::Unreadable { ref identifier, .. } if identifier == "/articles/broken.md"));
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_filter_failure_names_item() {
        let fixture = Fixture::new();
        let item = ContentItem::text("/articles/bad.md", ":::note\nopen", Metadata::new());

        let err = fixture.executor().execute(&item, &article_rule()).unwrap_err();
        assert!(err.to_string().contains("/articles/bad.md"));
        assert!(matches!(err, PipelineError::Filter { ref filter, .. } if filter == "notes"));
    }
}
