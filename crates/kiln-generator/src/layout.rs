//! Layouts.
//!
//! A layout is an item from the layouts directory. Rules refer to layouts by
//! glob (`/default.*`); layout rules pick the filter a layout is rendered
//! with. References are resolved once, before compilation starts.

use std::collections::HashMap;

use kiln_core::{ContentItem, FilterOptions, LayoutRuleDecl};
use kiln_parser::{FilterContext, FilterError, FilterRegistry};
use thiserror::Error;
use tracing::debug;

use crate::matcher::{LayoutRule, PatternError, compile_pattern};

/// Layout errors.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Malformed layout reference or layout rule pattern.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// No layout matches the reference.
    #[error("layout not found: {0}")]
    NotFound(String),

    /// The layout file is not text.
    #[error("layout {0} is not a text file")]
    Binary(String),

    /// No layout rule covers the layout.
    #[error("no layout rule matches layout {0}")]
    NoLayoutRule(String),

    /// The layout rule names a filter that is not registered.
    #[error("layout {layout} uses unknown filter `{filter}`")]
    UnknownFilter { layout: String, filter: String },

    /// Rendering the layout failed.
    #[error("failed to render layout {layout}: {source}")]
    Render {
        layout: String,
        #[source]
        source: FilterError,
    },
}

/// A resolved layout.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Layout identifier, e.g. `/default.html`.
    pub identifier: String,

    /// Template source.
    pub source: String,

    /// Filter the layout is rendered with.
    pub filter: String,
}

/// Layouts available to a build.
#[derive(Debug)]
pub struct LayoutStore {
    items: Vec<ContentItem>,
    rules: Vec<LayoutRule>,
    resolved: HashMap<String, Layout>,
}

impl LayoutStore {
    /// Create a store. With no layout rules declared every layout is
    /// rendered with the `template` filter.
    pub fn new(mut items: Vec<ContentItem>, decls: &[LayoutRuleDecl]) -> Result<Self, LayoutError> {
        let rules = if decls.is_empty() {
            vec![LayoutRule::compile(LayoutRuleDecl::new("/**/*", "template"))?]
        } else {
            decls
                .iter()
                .cloned()
                .map(LayoutRule::compile)
                .collect::<Result<Vec<_>, _>>()?
        };

        items.sort_by(|a, b| a.identifier().cmp(b.identifier()));

        Ok(Self {
            items,
            rules,
            resolved: HashMap::new(),
        })
    }

    /// Resolve a layout reference, checking that the layout is text and that
    /// its rendering filter exists.
    pub fn resolve(
        &mut self,
        reference: &str,
        filters: &FilterRegistry,
    ) -> Result<&Layout, LayoutError> {
        if !self.resolved.contains_key(reference) {
            let layout = self.lookup(reference, filters)?;
            debug!(reference, layout = %layout.identifier, filter = %layout.filter, "resolved layout");
            self.resolved.insert(reference.to_string(), layout);
        }
        Ok(&self.resolved[reference])
    }

    fn lookup(&self, reference: &str, filters: &FilterRegistry) -> Result<Layout, LayoutError> {
        let matcher = compile_pattern(reference)?;
        let item = self
            .items
            .iter()
            .find(|item| matcher.is_match(item.identifier()))
            .ok_or_else(|| LayoutError::NotFound(reference.to_string()))?;

        let identifier = item.identifier().to_string();
        let source = item
            .body()
            .as_text()
            .ok_or_else(|| LayoutError::Binary(identifier.clone()))?
            .to_string();

        let filter = self
            .rules
            .iter()
            .find(|rule| rule.is_match(&identifier))
            .map(|rule| rule.filter().to_string())
            .ok_or_else(|| LayoutError::NoLayoutRule(identifier.clone()))?;

        if !filters.contains(&filter) {
            return Err(LayoutError::UnknownFilter {
                layout: identifier,
                filter,
            });
        }

        Ok(Layout {
            identifier,
            source,
            filter,
        })
    }

    /// A previously resolved layout.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<&Layout> {
        self.resolved.get(reference)
    }

    /// Wrap `content` in the referenced layout.
    pub fn wrap(
        &self,
        content: &str,
        reference: &str,
        ctx: &FilterContext<'_>,
        filters: &FilterRegistry,
    ) -> Result<String, LayoutError> {
        let layout = self
            .get(reference)
            .ok_or_else(|| LayoutError::NotFound(reference.to_string()))?;

        let ctx = ctx.with_content(content).with_layout(&layout.identifier);
        filters
            .render(&layout.source, &layout.filter, FilterOptions::default(), &ctx)
            .map_err(|source| LayoutError::Render {
                layout: layout.identifier.clone(),
                source,
            })
    }
}
