//! Lightweight `{{ variable }}` templates.
//!
//! Used for layouts and for any item that opts into the `template` filter.
//! Values coming from metadata and site settings are HTML-escaped; the
//! `content` variable (the inner page of a layout) is inserted raw.

use std::collections::HashMap;

use kiln_core::FilterOptions;
use thiserror::Error;

use crate::{Filter, FilterContext, escape_html};

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable `{variable}` in {template}")]
    MissingVariable { template: String, variable: String },

    /// Invalid template syntax.
    #[error("invalid template syntax in {template}: {message}")]
    InvalidSyntax { template: String, message: String },
}

/// Variables available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable verbatim.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Insert a variable, HTML-escaping its value.
    pub fn insert_escaped(&mut self, key: impl Into<String>, value: &str) {
        self.insert(key, escape_html(value));
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Build the context a filter invocation sees: site settings, the item's
    /// identifier, URL and metadata, and the layout content if any.
    #[must_use]
    pub fn from_filter(ctx: &FilterContext<'_>) -> Self {
        let site = &ctx.config.site;
        let mut context = Self::new();

        context.insert_escaped("site_title", &site.title);
        context.insert_escaped("site_url", &site.base_url);
        if let Some(author) = &site.author {
            context.insert_escaped("site_author", author);
        }
        if let Some(description) = &site.description {
            context.insert_escaped("site_description", description);
        }

        context.insert_escaped("identifier", ctx.identifier);
        if let Some(url) = ctx.url {
            context.insert_escaped("url", url);
        }

        for (key, value) in ctx.metadata.iter() {
            context.insert_escaped(key, &value.to_string());
        }

        if let Some(content) = ctx.content {
            context.insert("content", content);
        }

        context
    }
}

/// A template with `{{ variable }}` placeholders.
///
/// `{{ variable? }}` renders as empty when the variable is missing.
#[derive(Debug, Clone)]
pub struct Template<'a> {
    name: &'a str,
    source: &'a str,
}

impl<'a> Template<'a> {
    /// Create a template. The name is only used in error messages.
    #[must_use]
    pub fn new(name: &'a str, source: &'a str) -> Self {
        Self { name, source }
    }

    /// Render the template with the given context.
    ///
    /// Substituted values are never scanned for further placeholders.
    pub fn render(&self, context: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or_else(|| TemplateError::InvalidSyntax {
                    template: self.name.to_string(),
                    message: "unclosed {{ delimiter".to_string(),
                })?;

            let var_name = after_open[..end].trim();
            let (var_name, optional) = match var_name.strip_suffix('?') {
                Some(stripped) => (stripped.trim_end(), true),
                None => (var_name, false),
            };

            match context.get(var_name) {
                Some(value) => out.push_str(value),
                None if optional => {}
                None => {
                    return Err(TemplateError::MissingVariable {
                        template: self.name.to_string(),
                        variable: var_name.to_string(),
                    });
                }
            }

            rest = &after_open[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Renders its input as a template against the filter context.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateFilter;

impl Filter for TemplateFilter {
    fn name(&self) -> &'static str {
        "template"
    }

    fn apply(
        &self,
        input: &str,
        _options: FilterOptions,
        ctx: &FilterContext<'_>,
    ) -> crate::Result<String> {
        let context = TemplateContext::from_filter(ctx);
        Ok(Template::new(ctx.source_name(), input).render(&context)?)
    }
}
