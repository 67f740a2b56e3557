//! Loading content items from disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{
    error::{CoreError, Result},
    frontmatter::parse_frontmatter,
    item::{Body, ContentItem, identifier_from_path},
};

/// Enumerates content items below a root directory.
#[derive(Debug, Clone)]
pub struct ItemSource {
    root: PathBuf,
    text_extensions: Vec<String>,
}

impl ItemSource {
    /// Create a source for `root`. Files whose extension is listed in
    /// `text_extensions` are read as text and have frontmatter split off.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, text_extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            text_extensions: text_extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load all items, sorted by identifier. Hidden files and directories are skipped.
    ///
    /// A missing root yields no items.
    pub fn load(&self) -> Result<Vec<ContentItem>> {
        if !self.root.exists() {
            warn!(dir = %self.root.display(), "source directory does not exist");
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            items.push(self.load_item(entry.path())?);
        }

        items.sort_by(|a, b| a.identifier().cmp(b.identifier()));

        info!(dir = %self.root.display(), count = items.len(), "loaded items");
        Ok(items)
    }

    /// Load a single file.
    fn load_item(&self, path: &Path) -> Result<ContentItem> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let identifier = identifier_from_path(relative)
            .ok_or_else(|| CoreError::InvalidIdentifier(path.to_path_buf()))?;

        let is_text = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.text_extensions.contains(&ext.to_lowercase()));

        let bytes = fs::read(path)?;
        let item = if is_text {
            text_item(identifier.clone(), bytes, path)
        } else {
            ContentItem::binary(identifier.clone(), bytes)
        };

        debug!(identifier = %identifier, text = is_text, "loaded item");
        Ok(item.with_source_path(path))
    }
}

/// Decode a text file and split off its frontmatter. Failures are recorded
/// on the item instead of failing the load, so unmatched files still copy.
fn text_item(identifier: String, bytes: Vec<u8>, path: &Path) -> ContentItem {
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            let reason = format!("{} is not valid UTF-8: {}", path.display(), e.utf8_error());
            debug!(identifier = %identifier, %reason, "kept as bytes");
            return ContentItem::unreadable(identifier, e.into_bytes(), reason);
        }
    };

    match parse_frontmatter(&content, path) {
        Ok((metadata, body)) => {
            ContentItem::new(identifier, Body::Text(body), metadata).with_raw(content)
        }
        Err(e) => {
            let reason = e.to_string();
            debug!(identifier = %identifier, %reason, "kept as bytes");
            ContentItem::unreadable(identifier, content, reason)
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
