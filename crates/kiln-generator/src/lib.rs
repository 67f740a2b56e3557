//! Kiln Generator Library
//!
//! Rule-based compilation of a site's content items.
//!
//! # Modules
//!
//! - [`matcher`] - Glob rule matching, first match wins
//! - [`rules`] - Built-in blog rule set
//! - [`pipeline`] - Guarded filter and layout execution for one item
//! - [`layout`] - Layout resolution and wrapping
//! - [`router`] - Output paths and passthrough
//! - [`compiler`] - Parallel whole-site compilation and conflict detection
//! - [`writer`] - Artifact persistence
//! - [`build`] - Build orchestration

pub mod artifact;
pub mod build;
pub mod compiler;
pub mod layout;
pub mod matcher;
pub mod pipeline;
pub mod router;
pub mod rules;
pub mod writer;

pub use artifact::CompiledArtifact;
pub use build::{BuildError, BuildStats, Builder};
pub use compiler::{Compilation, Compiler, Disposition, RouteEntry};
pub use layout::{Layout, LayoutError, LayoutStore};
pub use matcher::{MatchResult, Rule, RuleSet, match_rule};
pub use pipeline::{Executor, Outcome, PipelineError, SuppressReason};
pub use router::{output_path, passthrough, route};
pub use rules::blog_rules;
pub use writer::{ArtifactWriter, FsWriter};
