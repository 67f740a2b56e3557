//! Frontmatter parsing for content files.

use std::path::Path;

use crate::{
    error::{CoreError, Result},
    metadata::Metadata,
};

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split content into frontmatter and body.
///
/// Both delimiters must sit on their own line and the opening one must be the
/// very first line. Returns `None` when there is no complete header, in which
/// case the whole content is body.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };
    let delimiter = format.delimiter();

    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != delimiter {
        return None;
    }

    let rest = &content[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let header = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((format, header, body));
        }
        offset += line.len();
    }

    None
}

/// Parse frontmatter from a string into typed metadata and the remaining body.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Metadata, String)> {
    let Some((format, header, body)) = split_frontmatter(content) else {
        return Ok((Metadata::default(), content.to_string()));
    };

    if header.trim().is_empty() {
        return Ok((Metadata::default(), body.to_string()));
    }

    let metadata = match format {
        FrontmatterFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(header)
                .map_err(|e| CoreError::frontmatter(path, e.to_string()))?;
            match value {
                serde_yaml::Value::Null => Metadata::default(),
                serde_yaml::Value::Mapping(mapping) => Metadata::from_yaml(&mapping),
                _ => {
                    return Err(CoreError::frontmatter(
                        path,
                        "frontmatter must be a mapping of keys to values",
                    ));
                }
            }
        }
        FrontmatterFormat::Toml => {
            let table: toml::Table =
                toml::from_str(header).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;
            Metadata::from_toml(&table)
        }
    };

    Ok((metadata, body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_yaml_frontmatter() {
        let content = "---\ntitle: \"Hello World\"\nstatus: draft\n---\n\nThis is the body content.";

        let (format, fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(format, FrontmatterFormat::Yaml);
        assert!(fm.contains("title:"));
        assert_eq!(body, "This is the body content.");
    }

    #[test]
    fn test_split_toml_frontmatter() {
        let content = "+++\ntitle = \"Hello World\"\n+++\nThis is the body content.";

        let (format, fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(format, FrontmatterFormat::Toml);
        assert!(fm.contains("title ="));
        assert_eq!(body, "This is the body content.");
    }

    #[test]
    fn test_no_frontmatter() {
        assert!(split_frontmatter("Just some content without frontmatter.").is_none());
    }

    #[test]
    fn test_unterminated_frontmatter_is_body() {
        let content = "---\n\nA thematic break, not a header.";
        assert!(split_frontmatter(content).is_none());
    }

    #[test]
    fn test_delimiter_must_be_own_line() {
        let content = "--- not a header\ntitle: x\n---\nbody";
        assert!(split_frontmatter(content).is_none());
    }

    #[test]
    fn test_body_keeps_indentation() {
        let content = "---\ntitle: x\n---\n\n    indented code\n";
        let (_, _, body) = split_frontmatter(content).expect("split");
        assert_eq!(body, "    indented code\n");
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: "Test Post"
kind: article
status: draft
created_at: 2024-01-14T10:00:00Z
---

Content here."#;

        let (meta, body) = parse_frontmatter(content, Path::new("test.md")).expect("parse");

        assert_eq!(meta.title(), Some("Test Post"));
        assert_eq!(meta.kind(), Some("article"));
        assert!(meta.is_draft());
        assert!(meta.created_at().is_some());
        assert_eq!(body, "Content here.");
    }

    #[test]
    fn test_parse_toml_frontmatter() {
        let content = r#"+++
title = "Test Post"
kind = "article"
+++

Content here."#;

        let (meta, body) = parse_frontmatter(content, Path::new("test.md")).expect("parse");

        assert_eq!(meta.title(), Some("Test Post"));
        assert!(!meta.is_draft());
        assert_eq!(body, "Content here.");
    }

    #[test]
    fn test_empty_header() {
        let (meta, body) =
            parse_frontmatter("---\n---\nBody", Path::new("test.md")).expect("parse");
        assert!(meta.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_non_mapping_header_is_error() {
        let result = parse_frontmatter("---\n- a\n- b\n---\nBody", Path::new("list.md"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("list.md"));
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let result = parse_frontmatter("---\ntitle: [unclosed\n---\nBody", Path::new("bad.md"));
        assert!(matches!(result, Err(CoreError::Frontmatter { .. })));
    }

    #[test]
    fn test_content_without_header_unchanged() {
        let content = "body { color: red; }\n";
        let (meta, body) = parse_frontmatter(content, Path::new("style.css")).expect("parse");
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }
}
