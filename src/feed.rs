//! Support for creating the RSS 2.0 feed from a list of posts. The document is
//! assembled line by line rather than through an XML serializer so that the
//! element set and order stay exactly what feed readers have been fed so far.

use crate::listing::recent;
use crate::post::Post;
use chrono::{DateTime, Utc};
use std::io::Write;
use url::Url;

/// `Mon, 02 Jan 2006 15:04:05 -0700`
const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Bundled channel-level configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub link: &'a Url,
    pub description: &'a str,
}

/// Renders the feed for the most recent `posts` (ordered most recent first).
/// `build_time` becomes the channel's `lastBuildDate`.
///
/// The channel title and description are plain text and get escaped. Item
/// titles are inserted as is since the Markdown renderer already escaped them.
pub fn feed(config: &FeedConfig, posts: &[Post], build_time: DateTime<Utc>) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();
    lines.push(r#"<?xml version="1.0"?>"#.to_owned());
    lines.push(r#"<rss version="2.0"><channel>"#.to_owned());
    lines.push(format!("  <title>{}</title>", escape_html(config.title)));
    lines.push(format!("  <link>{}</link>", config.link));
    lines.push(format!(
        "  <description>{}</description>",
        escape_html(config.description)
    ));
    lines.push("  <language>en</language>".to_owned());
    lines.push(format!(
        "  <lastBuildDate>{}</lastBuildDate>",
        build_time.format(RFC1123Z)
    ));
    for post in recent(posts) {
        let permalink = config.link.join(&post.output_file_name())?;
        lines.push("  <item>".to_owned());
        lines.push(format!("    <title>{}</title>", post.title()));
        lines.push(format!(
            "    <description>{}</description>",
            escape_html(&post.shortened_html())
        ));
        lines.push(format!("    <link>{}</link>", permalink));
        lines.push(format!("    <guid>{}</guid>", permalink));
        lines.push(format!(
            "    <pubDate>{}</pubDate>",
            post.creation_time().format(RFC1123Z)
        ));
        lines.push("  </item>".to_owned());
    }
    lines.push("</channel></rss>\n".to_owned());
    Ok(lines.join("\n"))
}

/// Creates the feed and writes the result to a [`std::io::Write`].
pub fn write_feed<W: Write>(
    config: &FeedConfig,
    posts: &[Post],
    build_time: DateTime<Utc>,
    mut w: W,
) -> Result<()> {
    w.write_all(feed(config, posts, build_time)?.as_bytes())?;
    tracing::info!(items = recent(posts).len(), "wrote feed");
    Ok(())
}

/// Escapes the five XML-significant characters. `&` goes first so the
/// entities introduced for the others aren't escaped again.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when a post's link can't be built.
    Url(url::ParseError),
}

impl std::fmt::Display for Error {
    /// Implements [`std::fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}
