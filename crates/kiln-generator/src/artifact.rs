//! Compiled output.

/// Final bytes bound for one output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    /// Output path relative to the output root, with a leading `/`.
    pub output_path: String,

    /// Bytes to write.
    pub bytes: Vec<u8>,

    /// Identifier of the item that produced the artifact.
    pub source: String,
}

impl CompiledArtifact {
    /// Create an artifact.
    #[must_use]
    pub fn new(
        output_path: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            output_path: output_path.into(),
            bytes: bytes.into(),
            source: source.into(),
        }
    }

    /// Public URL of the artifact: `index.html` is dropped so pages get
    /// directory-style URLs.
    #[must_use]
    pub fn url(&self) -> String {
        url_for_output(&self.output_path)
    }
}

/// Public URL for an output path.
#[must_use]
pub fn url_for_output(output_path: &str) -> String {
    match output_path.strip_suffix("index.html") {
        Some(dir) if dir.is_empty() || dir.ends_with('/') => dir.to_string(),
        _ => output_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_output() {
        assert_eq!(url_for_output("/articles/post-1/index.html"), "/articles/post-1/");
        assert_eq!(url_for_output("/index.html"), "/");
        assert_eq!(url_for_output("/feed.xml"), "/feed.xml");
        assert_eq!(url_for_output("/notindex.html"), "/notindex.html");
    }
}
