//! Rule matching.
//!
//! Rules are compiled once into glob matchers and tried top to bottom; the
//! first match wins and later rules are never consulted.

use globset::{GlobBuilder, GlobMatcher};
use kiln_core::{Guard, LayoutRuleDecl, OutputPolicy, RuleDecl, Step};
use thiserror::Error;

/// Pattern compilation errors.
#[derive(Debug, Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    /// The offending pattern.
    pub pattern: String,
    #[source]
    source: globset::Error,
}

/// Compile a glob pattern. `*` stays within one path segment and `**` spans
/// segments.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher, PatternError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })
}

/// A compiled compilation rule.
#[derive(Debug, Clone)]
pub struct Rule {
    decl: RuleDecl,
    matcher: GlobMatcher,
}

impl Rule {
    /// Compile a declared rule.
    pub fn compile(decl: RuleDecl) -> Result<Self, PatternError> {
        let matcher = compile_pattern(&decl.pattern)?;
        Ok(Self { decl, matcher })
    }

    /// Whether the rule's pattern matches the identifier.
    #[must_use]
    pub fn is_match(&self, identifier: &str) -> bool {
        self.matcher.is_match(identifier)
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.decl.pattern
    }

    /// The guard, if any.
    #[must_use]
    pub fn guard(&self) -> Option<&Guard> {
        self.decl.guard.as_ref()
    }

    /// Filter steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.decl.steps
    }

    /// Layout references, innermost first.
    #[must_use]
    pub fn layouts(&self) -> &[String] {
        &self.decl.layouts
    }

    /// Output policy.
    #[must_use]
    pub fn output(&self) -> &OutputPolicy {
        &self.decl.output
    }
}

/// Outcome of matching an identifier against the rules.
#[derive(Debug, Clone, Copy)]
pub enum MatchResult<'a> {
    /// The first rule whose pattern matched.
    Matched(&'a Rule),
    /// No rule matched; the item is passed through.
    Unmatched,
}

impl<'a> MatchResult<'a> {
    /// The matched rule, if any.
    #[must_use]
    pub fn rule(self) -> Option<&'a Rule> {
        match self {
            Self::Matched(rule) => Some(rule),
            Self::Unmatched => None,
        }
    }
}

/// Select the first rule matching `identifier`.
pub fn match_rule<'a>(identifier: &str, rules: &'a [Rule]) -> MatchResult<'a> {
    rules
        .iter()
        .find(|rule| rule.is_match(identifier))
        .map_or(MatchResult::Unmatched, MatchResult::Matched)
}

/// An ordered list of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile declared rules, keeping their order.
    pub fn compile(decls: impl IntoIterator<Item = RuleDecl>) -> Result<Self, PatternError> {
        let rules = decls
            .into_iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Match an identifier.
    #[must_use]
    pub fn match_identifier(&self, identifier: &str) -> MatchResult<'_> {
        match_rule(identifier, &self.rules)
    }

    /// All rules in order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A compiled layout rule.
#[derive(Debug, Clone)]
pub struct LayoutRule {
    matcher: GlobMatcher,
    filter: String,
}

impl LayoutRule {
    /// Compile a declared layout rule.
    pub fn compile(decl: LayoutRuleDecl) -> Result<Self, PatternError> {
        Ok(Self {
            matcher: compile_pattern(&decl.pattern)?,
            filter: decl.filter,
        })
    }

    /// Whether the rule applies to a layout identifier.
    #[must_use]
    pub fn is_match(&self, identifier: &str) -> bool {
        self.matcher.is_match(identifier)
    }

    /// Filter used to render matching layouts.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }
}
