//! Artifact persistence.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use tracing::debug;

use crate::artifact::CompiledArtifact;

/// Persists compiled artifacts.
pub trait ArtifactWriter {
    /// Write one artifact.
    fn write(&self, artifact: &CompiledArtifact) -> io::Result<()>;
}

/// Writes artifacts below an output directory.
#[derive(Debug, Clone)]
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    /// Create a writer rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for an output path. Paths that would leave the output
    /// directory are rejected.
    pub fn resolve(&self, output_path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(output_path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes || relative.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid output path: {output_path}"),
            ));
        }

        Ok(self.root.join(relative))
    }

    /// Remove the output directory and recreate it empty.
    pub fn clean(&self) -> io::Result<()> {
        if self.root.exists() {
            debug!(dir = %self.root.display(), "cleaning output directory");
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)
    }
}

impl ArtifactWriter for FsWriter {
    fn write(&self, artifact: &CompiledArtifact) -> io::Result<()> {
        let path = self.resolve(&artifact.output_path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &artifact.bytes)?;

        debug!(path = %path.display(), source = %artifact.source, "wrote artifact");
        Ok(())
    }
}
