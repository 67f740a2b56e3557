//! Content items.

use std::path::{Component, Path, PathBuf};

use crate::metadata::Metadata;

/// Raw content of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Text content with any frontmatter already removed.
    Text(String),
    /// Binary content, copied verbatim.
    Binary(Vec<u8>),
}

impl Body {
    /// Get the body as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Get the body as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// Whether this is a binary body.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

/// One unit of source content.
///
/// The identifier is a `/`-separated logical path with a leading slash, e.g.
/// `/articles/hello.md`. Items are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    identifier: String,
    body: Body,
    metadata: Metadata,
    source_path: Option<PathBuf>,
    /// File bytes as read, when they differ from the body.
    raw: Option<Vec<u8>>,
    /// Why a text file could not be read as text.
    text_error: Option<String>,
}

impl ContentItem {
    /// Create a new item. A leading slash is added to the identifier if missing.
    #[must_use]
    pub fn new(identifier: impl Into<String>, body: Body, metadata: Metadata) -> Self {
        let identifier = identifier.into();
        let identifier = if identifier.starts_with('/') {
            identifier
        } else {
            format!("/{identifier}")
        };

        Self {
            identifier,
            body,
            metadata,
            source_path: None,
            raw: None,
            text_error: None,
        }
    }

    /// Create a text item.
    #[must_use]
    pub fn text(identifier: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self::new(identifier, Body::Text(text.into()), metadata)
    }

    /// Create a binary item with no metadata.
    #[must_use]
    pub fn binary(identifier: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(identifier, Body::Binary(bytes.into()), Metadata::default())
    }

    /// Create an item for a text file that could not be decoded or whose
    /// frontmatter is malformed. The bytes are kept as a binary body so the
    /// file can still be copied; `reason` is reported if a rule needs text.
    #[must_use]
    pub fn unreadable(
        identifier: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        reason: impl Into<String>,
    ) -> Self {
        let mut item = Self::binary(identifier, bytes);
        item.text_error = Some(reason.into());
        item
    }

    /// Keep the original file bytes alongside the parsed body.
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<Vec<u8>>) -> Self {
        let raw = raw.into();
        self.raw = (raw.as_slice() != self.body.as_bytes()).then_some(raw);
        self
    }

    /// Record the file this item was loaded from.
    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// The item identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The item body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The item metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The bytes of the source file exactly as read, frontmatter included.
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        self.raw.as_deref().unwrap_or_else(|| self.body.as_bytes())
    }

    /// Why the item could not be read as text, if it is a text file that
    /// failed to decode or parse.
    #[must_use]
    pub fn text_error(&self) -> Option<&str> {
        self.text_error.as_deref()
    }

    /// The source file, if loaded from disk.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Extension of the last identifier segment, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let file = self.identifier.rsplit('/').next()?;
        match file.rfind('.') {
            Some(0) | None => None,
            Some(pos) => Some(&file[pos + 1..]),
        }
    }
}

/// Build an identifier from a path relative to a content root.
///
/// Returns `None` for paths containing anything other than normal components
/// or components that are not valid UTF-8.
pub fn identifier_from_path(relative: &Path) -> Option<String> {
    let mut identifier = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                identifier.push('/');
                identifier.push_str(part.to_str()?);
            }
            Component::CurDir => {}
            _ => return None,
        }
    }

    if identifier.is_empty() {
        None
    } else {
        Some(identifier)
    }
}
