//! Declarative compilation rules.
//!
//! These are plain data: they can be built in code or deserialized from the
//! `[[rules]]` and `[[layout_rules]]` tables of the site configuration. The
//! generator compiles them into matchers.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// Predicate over item metadata that suppresses output when it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Guard {
    /// Suppress items whose `status` is `"draft"`.
    Draft,
    /// Suppress items where `key` renders to exactly `value`.
    Equals { key: String, value: String },
}

impl Guard {
    /// Evaluate the guard. Absent keys never suppress.
    #[must_use]
    pub fn suppresses(&self, metadata: &Metadata) -> bool {
        match self {
            Self::Draft => metadata.is_draft(),
            Self::Equals { key, value } => metadata
                .get(key)
                .is_some_and(|actual| actual.to_string() == *value),
        }
    }
}

/// Options recognized by filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Render Markdown found inside block-level raw HTML.
    #[serde(default)]
    pub parse_block_html: bool,
}

/// One filter invocation in a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Registered filter name.
    pub filter: String,

    /// Filter options.
    #[serde(default)]
    pub options: FilterOptions,
}

impl Step {
    /// Create a step with default options.
    #[must_use]
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            options: FilterOptions::default(),
        }
    }

    /// Create a step with the given options.
    #[must_use]
    pub fn with_options(filter: impl Into<String>, options: FilterOptions) -> Self {
        Self {
            filter: filter.into(),
            options,
        }
    }
}

/// Where a compiled item is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Clean URL routing: `foo/bar.md` to `foo/bar/index.html`.
    #[default]
    Routed,
    /// A fixed output path.
    Fixed { path: String },
    /// Keep the identifier as the output path.
    Identity,
    /// Compile nothing and write nothing.
    Skip,
}

/// A compilation rule as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDecl {
    /// Glob pattern over identifiers.
    pub pattern: String,

    /// Optional suppression guard.
    #[serde(default)]
    pub guard: Option<Guard>,

    /// Filters applied in order.
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Layout references, applied innermost first.
    #[serde(default)]
    pub layouts: Vec<String>,

    /// Output policy.
    #[serde(default)]
    pub output: OutputPolicy,
}

impl RuleDecl {
    /// Create a rule with no steps or layouts and routed output.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            guard: None,
            steps: Vec::new(),
            layouts: Vec::new(),
            output: OutputPolicy::default(),
        }
    }

    /// Set the guard.
    #[must_use]
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Append a filter step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a layout.
    #[must_use]
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layouts.push(layout.into());
        self
    }

    /// Set the output policy.
    #[must_use]
    pub fn output(mut self, output: OutputPolicy) -> Self {
        self.output = output;
        self
    }
}

/// Selects the templating filter used to render layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRuleDecl {
    /// Glob pattern over layout identifiers.
    pub pattern: String,

    /// Filter that renders matching layouts.
    pub filter: String,
}

impl LayoutRuleDecl {
    /// Create a layout rule.
    #[must_use]
    pub fn new(pattern: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            filter: filter.into(),
        }
    }
}
