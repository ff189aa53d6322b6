//! Derives display metadata from a post's rendered HTML and raw Markdown. The
//! HTML always comes from [`crate::markdown::to_html`], so its structure is
//! predictable and plain regular expressions anchored at the start of the
//! document do the job of an HTML parser.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// An `<h1>` that opens the document. Nothing may precede it.
    static ref INITIAL_HEADING_REGEX: Regex = Regex::new(r"^<h1>(.+?)</h1>").unwrap();

    /// Everything up to the first heading that does not open the document.
    static ref INNER_HEADING_REGEX: Regex = Regex::new(r"(?s)^(.+?)<h[1-6]>").unwrap();
}

/// Returns the text of the `<h1>` opening `html`, or `fallback` if the
/// document doesn't begin with one.
pub fn title<'a>(html: &'a str, fallback: &'a str) -> &'a str {
    match INITIAL_HEADING_REGEX.captures(html) {
        Some(caps) => caps.get(1).map_or(fallback, |m| m.as_str()),
        None => fallback,
    }
}

/// Cuts `html` off before its first inner heading (any heading after the first
/// character) and appends a "Read more" link to `permalink`. Documents without
/// an inner heading are returned unchanged.
pub fn shortened_html(html: &str, permalink: &str) -> String {
    match INNER_HEADING_REGEX.captures(html) {
        Some(caps) => format!(
            "{}<p class=\"more\"><a href=\"{}\">Read more...</a></p>",
            &caps[1], permalink,
        ),
        None => html.to_owned(),
    }
}

/// Returns the first paragraph of `markdown` that isn't a heading: the first
/// run of non-blank lines whose first line doesn't start with `#`, trimmed.
pub fn description(markdown: &str) -> String {
    let mut block: Vec<&str> = Vec::new();
    for line in markdown.lines().chain(std::iter::once("")) {
        if !line.trim().is_empty() {
            block.push(line);
            continue;
        }
        match block.first() {
            Some(first) if !first.trim_start().starts_with('#') => {
                return block.join("\n").trim().to_owned();
            }
            _ => block.clear(),
        }
    }
    String::new()
}

/// Prepends a `[l]` permalink anchor to the `<h1>` opening `html`, keeping the
/// heading's own text. Documents without an opening `<h1>` are unchanged.
pub fn inject_permalink(html: &str, permalink: &str) -> String {
    INITIAL_HEADING_REGEX
        .replace(html, |caps: &Captures| {
            format!(
                "<h1><a href=\"{}\" title=\"Permalink\">[l]</a> {}</h1>",
                permalink, &caps[1]
            )
        })
        .into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    const LINK: &str = "posts/hello.html";

    #[test]
    fn test_title_from_initial_heading() {
        assert_eq!(title("<h1>Hello <em>you</em></h1>\n<p>x</p>", "slug"), "Hello <em>you</em>");
    }

    #[test]
    fn test_title_falls_back_without_initial_heading() {
        assert_eq!(title("<p>intro</p>\n<h1>Late</h1>", "slug"), "slug");
        assert_eq!(title("<h2>Not top level</h2>", "slug"), "slug");
        assert_eq!(title(" <h1>Indented</h1>", "slug"), "slug");
        assert_eq!(title("", "slug"), "slug");
    }

    #[test]
    fn test_title_fallback_iff_no_leading_heading() {
        let cases = [
            ("<h1>A</h1>", false),
            ("<h1>A</h1><h1>B</h1>", false),
            ("<p>A</p><h1>B</h1>", true),
            ("text", true),
        ];
        for (html, falls_back) in cases.iter() {
            assert_eq!(title(html, "fallback") == "fallback", *falls_back, "{}", html);
        }
    }

    #[test]
    fn test_shortened_html_cuts_before_inner_heading() {
        let html = "<h1>Title</h1>\n<p>First paragraph.</p>\n<h2>Sub</h2>\n<p>more text</p>\n";
        assert_eq!(
            shortened_html(html, LINK),
            "<h1>Title</h1>\n<p>First paragraph.</p>\n\
             <p class=\"more\"><a href=\"posts/hello.html\">Read more...</a></p>"
        );
    }

    #[test]
    fn test_shortened_html_ignores_leading_heading() {
        let html = "<h1>Only</h1>\n<p>body</p>\n";
        assert_eq!(shortened_html(html, LINK), html);
    }

    #[test]
    fn test_shortened_html_spans_lines() {
        let html = "<p>one</p>\n<p>two</p>\n<h3>Three</h3>";
        assert!(shortened_html(html, LINK).starts_with("<p>one</p>\n<p>two</p>\n<p class=\"more\">"));
    }

    #[test]
    fn test_shortened_html_idempotent_without_inner_heading() {
        for html in &["<h1>Only</h1>\n<p>body</p>\n", "<p>no headings</p>", ""] {
            let once = shortened_html(html, LINK);
            assert_eq!(shortened_html(&once, LINK), once);
        }
    }

    #[test]
    fn test_description_skips_headings() {
        let markdown = "# Title\n\nFirst paragraph\ncontinues.\n\n## Sub\n\nmore text";
        assert_eq!(description(markdown), "First paragraph\ncontinues.");
    }

    #[test]
    fn test_description_trims_and_handles_trailing_block() {
        assert_eq!(description("# Title\n\n   last words   "), "last words");
    }

    #[test]
    fn test_description_empty_without_prose() {
        assert_eq!(description("# Title\n\n## Another\n"), "");
        assert_eq!(description(""), "");
    }

    #[test]
    fn test_inject_permalink() {
        assert_eq!(
            inject_permalink("<h1>Hello</h1>\n<p>x</p>", LINK),
            "<h1><a href=\"posts/hello.html\" title=\"Permalink\">[l]</a> Hello</h1>\n<p>x</p>"
        );
        assert_eq!(inject_permalink("<p>x</p><h1>Late</h1>", LINK), "<p>x</p><h1>Late</h1>");
    }
}
