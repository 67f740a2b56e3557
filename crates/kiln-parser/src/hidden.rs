//! Collapsible hidden blocks.
//!
//! `:::hidden Summary` ... `:::` becomes a collapsed block with a toggle
//! button. The page script flips `data-state` and the `hidden` attribute.

use kiln_core::FilterOptions;

use crate::{Filter, FilterContext, Result, blocks::expand_containers, escape_html};

/// Label used when a hidden block has no summary.
pub const DEFAULT_SUMMARY: &str = "Show hidden content";

/// Marks `:::hidden` containers as collapsible blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenFilter;

impl HiddenFilter {
    /// Expand all hidden containers in `input`.
    pub fn expand(&self, input: &str) -> Result<String> {
        expand_containers(
            input,
            &["hidden"],
            |_, label| {
                let summary = escape_html(label.unwrap_or(DEFAULT_SUMMARY));
                format!(
                    "\n<div class=\"hidden-block\" data-state=\"collapsed\">\
                     <button type=\"button\" class=\"hidden-toggle\" aria-expanded=\"false\">{summary}</button>\n\
                     <div class=\"hidden-content\" hidden>\n\n"
                )
            },
            "\n</div>\n</div>\n",
        )
    }
}

impl Filter for HiddenFilter {
    fn name(&self) -> &'static str {
        "hidden"
    }

    fn apply(
        &self,
        input: &str,
        _options: FilterOptions,
        _ctx: &FilterContext<'_>,
    ) -> Result<String> {
        self.expand(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkdownFilter;

    #[test]
    fn test_expand_with_summary() {
        let out = HiddenFilter
            .expand(":::hidden Spoilers\nThe butler did it.\n:::")
            .expect("expand");

        assert!(out.contains("<div class=\"hidden-block\" data-state=\"collapsed\">"));
        assert!(out.contains("aria-expanded=\"false\">Spoilers</button>"));
        assert!(out.contains("<div class=\"hidden-content\" hidden>"));
        assert!(out.contains("The butler did it."));
        assert!(out.ends_with("</div>\n</div>\n\n"));
    }

    #[test]
    fn test_default_summary() {
        let out = HiddenFilter.expand(":::hidden\nx\n:::").expect("expand");
        assert!(out.contains(DEFAULT_SUMMARY));
    }

    #[test]
    fn test_note_inside_hidden_left_for_notes_filter() {
        let out = HiddenFilter
            .expand(":::hidden\n:::note\nx\n:::\n:::")
            .expect("expand");

        assert!(out.contains(":::note\nx\n:::\n"));
        assert_eq!(out.matches("hidden-block").count(), 1);
    }

    #[test]
    fn test_hidden_renders_markdown_inside() {
        let expanded = HiddenFilter.expand(":::hidden More\n**bold** move\n:::").expect("expand");
        let html = MarkdownFilter::new().render(&expanded, true);

        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("hidden-toggle"));
        assert!(!html.contains("<p><button"));
    }
}
