//! Markdown filter using pulldown-cmark.

use std::borrow::Cow;

use kiln_core::FilterOptions;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use crate::{Filter, FilterContext, Result, blocks::open_html_blocks, syntax::SyntaxHighlighter};

/// Renders Markdown to HTML, highlighting fenced code blocks.
#[derive(Debug)]
pub struct MarkdownFilter {
    highlighter: SyntaxHighlighter,
    options: Options,
}

impl Default for MarkdownFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownFilter {
    /// Create a filter with the default highlighting theme.
    pub fn new() -> Self {
        Self::with_highlighter(SyntaxHighlighter::default())
    }

    /// Create a filter with a custom syntax theme.
    pub fn with_theme(theme: &str) -> Self {
        Self::with_highlighter(SyntaxHighlighter::new(theme))
    }

    fn with_highlighter(highlighter: SyntaxHighlighter) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            highlighter,
            options,
        }
    }

    /// Render Markdown to HTML.
    ///
    /// With `parse_block_html`, Markdown nested inside block-level raw HTML
    /// (`<div>`, `<aside>`, ...) is rendered too; otherwise such blocks are
    /// passed through as-is up to the next blank line.
    pub fn render(&self, input: &str, parse_block_html: bool) -> String {
        let source = if parse_block_html {
            Cow::Owned(open_html_blocks(input))
        } else {
            Cow::Borrowed(input)
        };

        let mut events = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(&source, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlighter.highlight(&code, lang.as_deref());
                        events.push(Event::Html(highlighted.into()));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

impl Filter for MarkdownFilter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn apply(
        &self,
        input: &str,
        options: FilterOptions,
        _ctx: &FilterContext<'_>,
    ) -> Result<String> {
        Ok(self.render(input, options.parse_block_html))
    }
}
