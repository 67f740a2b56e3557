//! Whole-site compilation.
//!
//! Rules, filters and layouts are validated when the compiler is created, so
//! configuration mistakes surface before any item is processed. Items are then
//! compiled in parallel and their outputs checked for collisions; nothing here
//! touches the output directory.

use std::collections::BTreeMap;

use kiln_core::{Config, ContentItem, PageEntry, SiteIndex};
use kiln_parser::FilterRegistry;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    artifact::{CompiledArtifact, url_for_output},
    build::{BuildError, Result},
    layout::LayoutStore,
    matcher::{MatchResult, RuleSet},
    pipeline::{Executor, Outcome, SuppressReason},
    router::{output_path, passthrough},
};

/// What happens to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Compiled by a rule to this output path.
    Compiled(String),
    /// Copied unchanged to this output path.
    Passthrough(String),
    /// Nothing is written.
    Suppressed(SuppressReason),
}

/// Routing decision for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Item identifier.
    pub identifier: String,

    /// Pattern of the matched rule, `None` for passthrough.
    pub rule: Option<String>,

    /// Outcome for the item.
    pub disposition: Disposition,
}

impl RouteEntry {
    /// Output path, if the item is written.
    #[must_use]
    pub fn output_path(&self) -> Option<&str> {
        match &self.disposition {
            Disposition::Compiled(path) | Disposition::Passthrough(path) => Some(path),
            Disposition::Suppressed(_) => None,
        }
    }
}

/// Result of compiling a site.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Artifacts to write, in item order.
    pub artifacts: Vec<CompiledArtifact>,

    /// One entry per item, in item order.
    pub entries: Vec<RouteEntry>,
}

impl Compilation {
    /// Number of items compiled by a rule.
    #[must_use]
    pub fn compiled(&self) -> usize {
        self.count(|d| matches!(d, Disposition::Compiled(_)))
    }

    /// Number of items copied unchanged.
    #[must_use]
    pub fn passthrough(&self) -> usize {
        self.count(|d| matches!(d, Disposition::Passthrough(_)))
    }

    /// Number of items that produced no output.
    #[must_use]
    pub fn suppressed(&self) -> usize {
        self.count(|d| matches!(d, Disposition::Suppressed(_)))
    }

    fn count(&self, predicate: impl Fn(&Disposition) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.disposition))
            .count()
    }
}

/// Validated compiler for one build.
#[derive(Debug)]
pub struct Compiler<'a> {
    config: &'a Config,
    rules: RuleSet,
    filters: FilterRegistry,
    layouts: LayoutStore,
}

impl<'a> Compiler<'a> {
    /// Create a compiler with the built-in filters.
    pub fn new(config: &'a Config, rules: RuleSet, layouts: Vec<ContentItem>) -> Result<Self> {
        Self::with_filters(config, rules, layouts, FilterRegistry::new(config))
    }

    /// Create a compiler with a custom filter registry.
    ///
    /// Every filter a rule names must be registered and every layout a rule
    /// references must resolve.
    pub fn with_filters(
        config: &'a Config,
        rules: RuleSet,
        layouts: Vec<ContentItem>,
        filters: FilterRegistry,
    ) -> Result<Self> {
        let mut layouts =
            LayoutStore::new(layouts, &config.layout_rules).map_err(BuildError::LayoutRules)?;

        for rule in rules.rules() {
            for step in rule.steps() {
                if !filters.contains(&step.filter) {
                    return Err(BuildError::UnknownFilter {
                        rule: rule.pattern().to_string(),
                        filter: step.filter.clone(),
                    });
                }
            }

            for reference in rule.layouts() {
                layouts
                    .resolve(reference, &filters)
                    .map_err(|source| BuildError::Layout {
                        rule: rule.pattern().to_string(),
                        source,
                    })?;
            }
        }

        debug!(rules = rules.len(), "rules validated");

        Ok(Self {
            config,
            rules,
            filters,
            layouts,
        })
    }

    /// The rules in use.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decide, without running any filter, what happens to each item.
    #[must_use]
    pub fn plan(&self, items: &[ContentItem]) -> Vec<RouteEntry> {
        items.iter().map(|item| self.plan_item(item)).collect()
    }

    fn plan_item(&self, item: &ContentItem) -> RouteEntry {
        let identifier = item.identifier().to_string();

        match self.rules.match_identifier(item.identifier()) {
            MatchResult::Unmatched => RouteEntry {
                disposition: Disposition::Passthrough(identifier.clone()),
                identifier,
                rule: None,
            },
            MatchResult::Matched(rule) => {
                let disposition = if rule
                    .guard()
                    .is_some_and(|guard| guard.suppresses(item.metadata()))
                {
                    Disposition::Suppressed(SuppressReason::Guard)
                } else {
                    match output_path(&identifier, rule.output()) {
                        Some(path) => Disposition::Compiled(path),
                        None => Disposition::Suppressed(SuppressReason::OutputSkipped),
                    }
                };

                RouteEntry {
                    identifier,
                    rule: Some(rule.pattern().to_string()),
                    disposition,
                }
            }
        }
    }

    /// Index of the HTML pages this build publishes.
    #[must_use]
    pub fn site_index(&self, items: &[ContentItem]) -> SiteIndex {
        let pages = items
            .iter()
            .zip(self.plan(items))
            .filter_map(|(item, entry)| match entry.disposition {
                Disposition::Compiled(path) if path.ends_with(".html") => Some(PageEntry {
                    identifier: entry.identifier,
                    url: url_for_output(&path),
                    metadata: item.metadata().clone(),
                }),
                _ => None,
            })
            .collect();

        SiteIndex::new(pages)
    }

    /// Compile every item.
    ///
    /// Fails on the first item error (in item order) or when two items share
    /// an output path.
    pub fn compile(&self, items: &[ContentItem]) -> Result<Compilation> {
        let site = self.site_index(items);
        let executor = Executor::new(&self.filters, &self.layouts, self.config, &site);

        info!(items = items.len(), pages = site.len(), "compiling");

        let results: Vec<_> = items
            .par_iter()
            .map(|item| match self.rules.match_identifier(item.identifier()) {
                MatchResult::Matched(rule) => executor
                    .execute(item, rule)
                    .map(|outcome| (Some(rule.pattern()), outcome)),
                MatchResult::Unmatched => Ok((None, Outcome::Written(passthrough(item)))),
            })
            .collect();

        let mut compilation = Compilation::default();
        for (item, result) in items.iter().zip(results) {
            let (rule, outcome) = result?;

            let disposition = match &outcome {
                Outcome::Written(artifact) if rule.is_some() => {
                    Disposition::Compiled(artifact.output_path.clone())
                }
                Outcome::Written(artifact) => {
                    Disposition::Passthrough(artifact.output_path.clone())
                }
                Outcome::Suppressed(reason) => Disposition::Suppressed(*reason),
            };

            compilation.entries.push(RouteEntry {
                identifier: item.identifier().to_string(),
                rule: rule.map(str::to_string),
                disposition,
            });

            if let Outcome::Written(artifact) = outcome {
                compilation.artifacts.push(artifact);
            }
        }

        check_conflicts(&compilation.artifacts)?;
        Ok(compilation)
    }
}

/// Fail if two artifacts share an output path, or if one artifact's path is
/// a directory that another artifact is written into.
pub fn check_conflicts(artifacts: &[CompiledArtifact]) -> Result<()> {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

    for artifact in artifacts {
        if let Some(first) = seen.insert(&artifact.output_path, &artifact.source) {
            return Err(BuildError::OutputConflict {
                path: artifact.output_path.clone(),
                first: first.to_string(),
                second: artifact.source.clone(),
            });
        }
    }

    // Paths below `dir/` sort contiguously, starting at `dir/` itself.
    for (&path, &source) in &seen {
        let dir = format!("{path}/");
        if let Some((&nested, &nested_source)) = seen.range::<&str, _>(dir.as_str()..).next()
            && nested.starts_with(&dir)
        {
            return Err(BuildError::NestedOutput {
                path: path.to_string(),
                first: source.to_string(),
                nested: nested.to_string(),
                second: nested_source.to_string(),
            });
        }
    }

    Ok(())
}
