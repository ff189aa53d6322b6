//! Converts post sources from Markdown to HTML. Raw HTML embedded in a post is
//! passed through untouched, and headings keep their own levels (a leading `#`
//! becomes an `<h1>`), which [`crate::derive`] relies on.

use pulldown_cmark::{html, Options, Parser};

/// Converts `markdown` to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, Parser::new_ext(markdown, options));
    output
}
