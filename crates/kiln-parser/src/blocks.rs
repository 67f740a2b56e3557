//! Line-level block helpers shared by the container filters and Markdown.

use crate::{FilterError, Result};

/// Block-level HTML elements whose contents may hold Markdown.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "header",
    "main",
    "nav",
    "section",
    "summary",
];

/// Tracks fenced code blocks while scanning lines.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feed a line. Returns `true` if the line belongs to a fenced code block,
    /// fence markers included.
    ///
    /// A fence closes on a run of the opening character at least as long as
    /// the opening run, with nothing but whitespace after it.
    pub(crate) fn in_fence(&mut self, line: &str) -> bool {
        let Some((marker, len, rest)) = fence_run(line) else {
            return self.open.is_some();
        };

        match self.open {
            Some((open_marker, open_len)) => {
                if marker == open_marker && len >= open_len && rest.trim().is_empty() {
                    self.open = None;
                }
                true
            }
            None => {
                // Backtick fences may not carry backticks in the info string.
                if marker == '`' && rest.contains('`') {
                    return false;
                }
                self.open = Some((marker, len));
                true
            }
        }
    }
}

/// Split a potential fence line into its marker, run length and remainder.
/// Lines indented four or more spaces are code, not fences.
fn fence_run(line: &str) -> Option<(char, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let trimmed = &line[indent..];
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then_some((marker, len, &trimmed[len..]))
}

/// Whether a line is a lone opening or closing block-level HTML tag, such as
/// `<div class="x">` or `</aside>`.
pub fn is_block_tag_line(line: &str) -> bool {
    let line = line.trim();
    let Some(inner) = line.strip_prefix('<').and_then(|l| l.strip_suffix('>')) else {
        return false;
    };
    if inner.contains(['<', '>']) {
        return false;
    }

    let name: String = inner
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    BLOCK_TAGS.contains(&name.to_ascii_lowercase().as_str())
}

/// Surround lone block-level tags with blank lines so that CommonMark ends the
/// raw HTML block right after the tag and parses what follows as Markdown.
pub fn open_html_blocks(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 64);
    let mut fences = FenceTracker::default();

    for line in input.lines() {
        if !fences.in_fence(line) && is_block_tag_line(line) {
            out.push('\n');
            out.push_str(line);
            out.push_str("\n\n");
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// Expand `:::kind label` ... `:::` containers whose kind is in `kinds`.
///
/// `open` receives the kind and optional label and returns the opening markup;
/// `close` replaces the closing marker. Containers of other kinds are copied
/// through untouched, and nesting is tracked so their closing markers stay
/// paired. Fenced code blocks are never inspected.
pub(crate) fn expand_containers(
    input: &str,
    kinds: &[&str],
    open: impl Fn(&str, Option<&str>) -> String,
    close: &str,
) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut fences = FenceTracker::default();
    // (is one of ours, kind, 1-based line number)
    let mut stack: Vec<(bool, String, usize)> = Vec::new();

    for (index, line) in input.lines().enumerate() {
        if fences.in_fence(line) {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let Some(marker) = line.trim().strip_prefix(":::") else {
            out.push_str(line);
            out.push('\n');
            continue;
        };
        let marker = marker.trim();

        if marker.is_empty() {
            match stack.pop() {
                Some((true, _, _)) => out.push_str(close),
                _ => out.push_str(line),
            }
            out.push('\n');
            continue;
        }

        let (kind, label) = match marker.split_once(char::is_whitespace) {
            Some((kind, label)) => (kind, Some(label.trim()).filter(|l| !l.is_empty())),
            None => (marker, None),
        };

        let ours = kinds.contains(&kind);
        stack.push((ours, kind.to_string(), index + 1));
        if ours {
            out.push_str(&open(kind, label));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    if let Some((_, kind, line)) = stack.into_iter().find(|(ours, _, _)| *ours) {
        return Err(FilterError::UnclosedContainer { kind, line });
    }

    Ok(out)
}
