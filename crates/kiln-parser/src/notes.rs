//! Note and aside expansion.
//!
//! ```text
//! :::note Optional title
//! Some *markdown*.
//! :::
//! ```
//!
//! becomes an `<aside class="note">` block. `:::aside` works the same way with
//! class `aside`. Blank lines are emitted around the content so a later
//! Markdown pass renders it.

use kiln_core::FilterOptions;

use crate::{Filter, FilterContext, Result, blocks::expand_containers, escape_html};

/// Expands `:::note` and `:::aside` containers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotesFilter;

impl NotesFilter {
    /// Expand all note containers in `input`.
    pub fn expand(&self, input: &str) -> Result<String> {
        expand_containers(
            input,
            &["note", "aside"],
            |kind, label| {
                let title = label
                    .map(|l| format!("<p class=\"{kind}-title\">{}</p>\n\n", escape_html(l)))
                    .unwrap_or_default();
                format!("\n<aside class=\"{kind}\">\n\n{title}")
            },
            "\n</aside>\n",
        )
    }
}

impl Filter for NotesFilter {
    fn name(&self) -> &'static str {
        "notes"
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
