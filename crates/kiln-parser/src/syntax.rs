//! Syntax highlighting for code blocks.

use syntect::{highlighting::ThemeSet, html::highlighted_html_for_string, parsing::SyntaxSet};

use crate::escape_html;

/// Syntax highlighter using syntect.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter. Unknown themes fall back to the first bundled theme.
    pub fn new(theme: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        if !theme_set.themes.contains_key(theme) {
            tracing::warn!(theme, "unknown syntax theme, using a bundled default");
        }

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme: theme.to_string(),
        }
    }

    /// Highlight code in the given language.
    ///
    /// Unknown languages, or a highlighting failure, produce a plain escaped
    /// `<pre><code>` block.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang.and_then(|l| self.syntax_set.find_syntax_by_token(l));
        let theme = self
            .theme_set
            .themes
            .get(&self.theme)
            .or_else(|| self.theme_set.themes.values().next());

        if let (Some(syntax), Some(theme)) = (syntax, theme)
            && let Ok(html) = highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
        {
            return html;
        }

        let lang_class = lang
            .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
            .unwrap_or_default();
        format!("<pre><code{lang_class}>{}</code></pre>\n", escape_html(code))
    }
}
