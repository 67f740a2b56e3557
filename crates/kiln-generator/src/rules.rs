//! Built-in rule set for a blog.

use kiln_core::{FilterOptions, Guard, OutputPolicy, RuleDecl, Step};

use crate::matcher::{PatternError, RuleSet};

/// Rules used when the site configuration declares none.
///
/// Order matters: articles are matched before the generic Markdown rule.
#[must_use]
pub fn blog_rules() -> Vec<RuleDecl> {
    vec![
        RuleDecl::new("/feed.erb")
            .step(Step::new("feed"))
            .output(OutputPolicy::Fixed {
                path: "/feed.xml".to_string(),
            }),
        RuleDecl::new("/**/*.html").layout("/default.*"),
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
        RuleDecl::new("/**/*.md")
            .step(Step::new("markdown"))
            .layout("/default.*"),
    ]
}

impl RuleSet {
    /// The built-in blog rules, compiled.
    pub fn blog() -> Result<Self, PatternError> {
        Self::compile(blog_rules())
    }

    /// Compile `decls`, or the built-in blog rules when `decls` is empty.
    pub fn from_config(decls: &[RuleDecl]) -> Result<Self, PatternError> {
        if decls.is_empty() {
            Self::blog()
        } else {
            Self::compile(decls.iter().cloned())
        }
    }
}
