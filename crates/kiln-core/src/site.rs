//! Index of the pages a build will publish.
//!
//! Listings (such as the feed) read from this index so they only ever see
//! items that are actually written; suppressed drafts never show up here.

use std::cmp::Ordering;

use crate::metadata::Metadata;

/// A published page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    /// Source item identifier.
    pub identifier: String,

    /// Public URL path, e.g. `/articles/hello/`.
    pub url: String,

    /// Item metadata.
    pub metadata: Metadata,
}

impl PageEntry {
    /// Title from metadata, falling back to the identifier.
    #[must_use]
    pub fn title(&self) -> &str {
        self.metadata.title().unwrap_or(&self.identifier)
    }
}

/// All pages of a build.
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    pages: Vec<PageEntry>,
}

impl SiteIndex {
    /// Create an index from entries.
    #[must_use]
    pub fn new(pages: Vec<PageEntry>) -> Self {
        Self { pages }
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages whose `kind` matches, newest `created_at` first.
    ///
    /// Undated pages sort after dated ones, by title.
    #[must_use]
    pub fn of_kind(&self, kind: &str) -> Vec<&PageEntry> {
        let mut pages: Vec<_> = self
            .pages
            .iter()
            .filter(|p| p.metadata.kind() == Some(kind))
            .collect();

        pages.sort_by(|a, b| {
            match (b.metadata.created_at(), a.metadata.created_at()) {
                (Some(b_date), Some(a_date)) => b_date.cmp(&a_date),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.title().cmp(b.title()))
        });
        pages
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn entry(id: &str, kind: &str, day: Option<u32>) -> PageEntry {
        let mut metadata = Metadata::new().with("kind", kind).with("title", id);
        if let Some(day) = day {
            metadata.insert(
                "created_at",
                Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            );
        }
        PageEntry {
            identifier: id.to_string(),
            url: format!("{id}/"),
            metadata,
        }
    }

    #[test]
    fn test_of_kind_sorted_newest_first() {
        let index = SiteIndex::new(vec![
            entry("/a", "article", Some(1)),
            entry("/b", "article", Some(20)),
            entry("/c", "page", Some(25)),
            entry("/d", "article", None),
            entry("/e", "article", Some(10)),
        ]);

        let ids: Vec<_> = index
            .of_kind("article")
            .iter()
            .map(|p| p.identifier.as_str())
            .collect();

        assert_eq!(ids, vec!["/b", "/e", "/a", "/d"]);
    }

    #[test]
    fn test_title_fallback() {
        let entry = PageEntry {
            identifier: "/x.md".to_string(),
            url: "/x/".to_string(),
            metadata: Metadata::new(),
        };
        assert_eq!(entry.title(), "/x.md");
    }
}
