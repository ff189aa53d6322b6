//! Defines the [`Post`] type. A post is built once per source file at the start
//! of a run; its Markdown and rendered HTML never change afterwards, only its
//! slug may be rewritten by [`crate::dedup`]. Titles, excerpts and
//! descriptions are derived on demand (see [`crate::derive`]).

use crate::derive;
use crate::identity::Identity;
use crate::markdown;
use crate::write::{Metadata, Result, Writer};
use chrono::{DateTime, Utc};
use url::Url;

/// `Mon, 02 Jan 2006 15:04:05 UTC`
const DISPLAY_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// A blog post. Collections of posts are ordered by
/// [`Post::creation_timestamp`].
#[derive(Clone, Debug)]
pub struct Post {
    pub creation_timestamp: u64,
    pub last_edited_timestamp: u64,
    pub slug: String,
    markdown: String,
    html: String,
}

impl Post {
    /// Builds a post from its resolved identity and Markdown source, rendering
    /// the HTML right away.
    pub fn new(identity: Identity, markdown: String) -> Post {
        Post {
            html: markdown::to_html(&markdown),
            creation_timestamp: identity.creation_timestamp,
            last_edited_timestamp: identity.last_edited_timestamp,
            slug: identity.slug,
            markdown,
        }
    }

    /// The raw Markdown source.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// The rendered HTML.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The output path of this post relative to the site root, which doubles
    /// as its relative link from root-level pages.
    pub fn output_file_name(&self) -> String {
        format!("posts/{}.html", self.slug)
    }

    /// The absolute URL of this post below `target_url`.
    pub fn permalink(&self, target_url: &Url) -> Result<Url> {
        Ok(target_url.join(&self.output_file_name())?)
    }

    /// The contents of the opening `<h1>`, or the slug.
    pub fn title(&self) -> &str {
        derive::title(&self.html, &self.slug)
    }

    /// The HTML cut off before the second heading, with a "Read more" link.
    pub fn shortened_html(&self) -> String {
        derive::shortened_html(&self.html, &self.output_file_name())
    }

    /// The first prose paragraph of the Markdown source.
    pub fn description(&self) -> String {
        derive::description(&self.markdown)
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        to_datetime(self.creation_timestamp)
    }

    pub fn last_edited_time(&self) -> DateTime<Utc> {
        to_datetime(self.last_edited_timestamp)
    }

    /// The page contents: the post HTML followed by a footer with the creation
    /// and (if different) last-edited times. The last-edited time links to the
    /// post's history below `source_url`.
    pub fn content(&self, source_url: &Url) -> Result<String> {
        let ctime = self.creation_time().format(DISPLAY_TIME_FORMAT).to_string();
        let mtime = self.last_edited_time().format(DISPLAY_TIME_FORMAT).to_string();

        let footer = if ctime == mtime {
            format!("<p><i>Created: {}</i></p>", ctime)
        } else {
            let history_url = source_url.join(&format!("posts/{}.md", self.slug))?;
            format!(
                "<p><i>Created: {}</i><br><i>Last edited: <a href=\"{}\" \
                 title=\"Commit history\">{}</a></i></p>",
                ctime, history_url, mtime
            )
        };
        Ok(format!("{}{}", self.html, footer))
    }

    /// Writes the post page to [`Post::output_file_name`].
    pub fn render(&self, writer: &Writer, source_url: &Url, target_url: &Url) -> Result<()> {
        let mut metadata = Metadata::new();
        metadata.insert("og:title".to_owned(), self.title().to_owned());
        metadata.insert("og:type".to_owned(), "article".to_owned());
        metadata.insert("og:url".to_owned(), self.permalink(target_url)?.into());
        let description = self.description();
        if !description.is_empty() {
            metadata.insert("og:description".to_owned(), description);
        }

        writer.write(
            &self.output_file_name(),
            self.title(),
            &self.content(source_url)?,
            &metadata,
        )
    }
}

// Timestamps are range-checked when resolved; the epoch fallback is only
// reachable for posts built by hand.
fn to_datetime(timestamp: u64) -> DateTime<Utc> {
    use std::convert::TryFrom;
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}
