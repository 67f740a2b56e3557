//! Build orchestration.
//!
//! Loads content and layouts, compiles everything, and only then touches the
//! output directory.

use std::{
    env, io,
    path::{Component, Path, PathBuf},
    time::Instant,
};

use kiln_core::{Config, ContentItem, CoreError, ItemSource};
use thiserror::Error;
use tracing::info;

use crate::{
    compiler::{Compilation, Compiler, RouteEntry},
    layout::LayoutError,
    matcher::{PatternError, RuleSet},
    pipeline::PipelineError,
    writer::{ArtifactWriter, FsWriter},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Malformed rule pattern.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A rule names a filter that is not registered.
    #[error("rule `{rule}` uses unknown filter `{filter}`")]
    UnknownFilter { rule: String, filter: String },

    /// A rule references a layout that cannot be used.
    #[error("rule `{rule}`: {source}")]
    Layout {
        rule: String,
        #[source]
        source: LayoutError,
    },

    /// The layout rules are invalid.
    #[error("layout rules: {0}")]
    LayoutRules(#[source] LayoutError),

    /// Compiling an item failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Two items routed to the same output path.
    #[error("output conflict: {path} is produced by both {first} and {second}")]
    OutputConflict {
        path: String,
        first: String,
        second: String,
    },

    /// One item is written where another needs a directory.
    #[error("output conflict: {path} (from {first}) is a directory of {nested} (from {second})")]
    NestedOutput {
        path: String,
        first: String,
        nested: String,
        second: String,
    },

    /// The output directory overlaps the site's sources.
    #[error("output directory {0} overlaps the content or layouts directory")]
    UnsafeOutputDir(PathBuf),
}

impl BuildError {
    /// Whether this error stems from configuration rather than content.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Pattern(_)
                | Self::UnknownFilter { .. }
                | Self::Layout { .. }
                | Self::LayoutRules(_)
                | Self::UnsafeOutputDir(_)
                | Self::Core(CoreError::Config { .. } | CoreError::ConfigCrate(_))
        )
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Items compiled by a rule.
    pub compiled: usize,

    /// Items suppressed by a guard or skip policy.
    pub suppressed: usize,

    /// Items copied unchanged.
    pub passthrough: usize,

    /// Files written.
    pub written: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildStats {
    fn from_compilation(compilation: &Compilation) -> Self {
        Self {
            compiled: compilation.compiled(),
            suppressed: compilation.suppressed(),
            passthrough: compilation.passthrough(),
            written: 0,
            duration_ms: 0,
        }
    }
}

/// Site builder that orchestrates the build process.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    root: PathBuf,
    output_dir: PathBuf,
    clean: bool,
}

impl Builder {
    /// Create a builder for the site rooted at `root`. Content, layout and
    /// output directories from the configuration are relative to it.
    #[must_use]
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let output_dir = root.join(&config.build.output_dir);
        let clean = config.build.clean;

        Self {
            config,
            root,
            output_dir,
            clean,
        }
    }

    /// Override the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Whether to empty the output directory before writing.
    #[must_use]
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn content_dir(&self) -> PathBuf {
        self.root.join(&self.config.build.content_dir)
    }

    fn layouts_dir(&self) -> PathBuf {
        self.root.join(&self.config.build.layouts_dir)
    }

    /// Refuse an output directory that contains, equals or sits inside the
    /// content or layouts directory. Paths are compared after resolving
    /// symlinks and `..`.
    fn check_output_dir(&self) -> Result<()> {
        let output = resolve_dir(&self.output_dir)?;

        for source in [self.content_dir(), self.layouts_dir()] {
            let source = resolve_dir(&source)?;
            if source.starts_with(&output) || output.starts_with(&source) {
                return Err(BuildError::UnsafeOutputDir(self.output_dir.clone()));
            }
        }

        Ok(())
    }

    fn load(&self) -> Result<(Compiler<'_>, Vec<ContentItem>)> {
        let extensions = &self.config.build.text_extensions;

        let rules = RuleSet::from_config(&self.config.rules)?;
        let layouts = ItemSource::new(self.layouts_dir(), extensions).load()?;
        let compiler = Compiler::new(&self.config, rules, layouts)?;

        let items = ItemSource::new(self.content_dir(), extensions).load()?;
        Ok((compiler, items))
    }

    /// Compile the site without writing anything.
    pub fn check(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let (compiler, items) = self.load()?;
        let compilation = compiler.compile(&items)?;

        let mut stats = BuildStats::from_compilation(&compilation);
        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    /// Routing decision for every content item.
    pub fn routes(&self) -> Result<Vec<RouteEntry>> {
        let (compiler, items) = self.load()?;
        Ok(compiler.plan(&items))
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();

        info!(
            content = %self.content_dir().display(),
            output = %self.output_dir.display(),
            "starting build"
        );

        self.check_output_dir()?;

        let (compiler, items) = self.load()?;
        let compilation = compiler.compile(&items)?;

        let writer = FsWriter::new(&self.output_dir);
        if self.clean {
            writer.clean()?;
        }

        for artifact in &compilation.artifacts {
            writer.write(artifact)?;
        }

        let mut stats = BuildStats::from_compilation(&compilation);
        stats.written = compilation.artifacts.len();
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            compiled = stats.compiled,
            suppressed = stats.suppressed,
            passthrough = stats.passthrough,
            written = stats.written,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }
}

/// Absolute, symlink-free form of a directory that may not exist yet. The
/// deepest existing ancestor is canonicalized and the rest is applied
/// lexically.
fn resolve_dir(path: &Path) -> io::Result<PathBuf> {
    let components: Vec<Component<'_>> = path.components().collect();

    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        if prefix.exists() {
            return Ok(apply_lexically(prefix.canonicalize()?, &components[split..]));
        }
    }

    Ok(apply_lexically(env::current_dir()?.canonicalize()?, &components))
}

fn apply_lexically(mut base: PathBuf, components: &[Component<'_>]) -> PathBuf {
    for component in components {
        match component {
            Component::ParentDir => {
                base.pop();
            }
            Component::Normal(part) => base.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    base
}
