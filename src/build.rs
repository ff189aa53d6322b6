//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::parser`]), deduplicating their slugs ([`crate::dedup`]), rendering
//! the post pages ([`crate::post`]), the index and sitemap
//! ([`crate::listing`]), the RSS feed ([`crate::feed`]) and finally the static
//! assets ([`crate::assets`]).

use crate::assets;
use crate::config::Config;
use crate::dedup::dedup_slugs;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::identity::{self, Resolver};
use crate::listing;
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::write::{load_template, Error as WriteError, Writer};
use chrono::Utc;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Builds the site from a [`Config`], resolving post identities with the
/// strategy the config selects.
pub fn build_site(config: &Config) -> Result<()> {
    let resolver = identity::resolver(config);
    build_site_with(config, resolver.as_ref())
}

/// Builds the site from a [`Config`] with an explicit identity [`Resolver`].
/// The first error aborts the build.
pub fn build_site_with(config: &Config, resolver: &dyn Resolver) -> Result<()> {
    // collect all posts, oldest first
    let mut posts = PostParser::new(resolver).parse_posts(&config.posts_source_directory())?;
    dedup_slugs(&mut posts);

    let template = load_template(config.template.as_deref())?;

    // Blow away the old posts and static directories so pages of deleted or
    // renamed posts don't linger. We don't clear the whole target directory
    // in case it's passed by mistake.
    let posts_output_directory = config.target_path("posts");
    let static_output_directory = config.target_path("static");
    rmdir(&posts_output_directory)?;
    rmdir(&static_output_directory)?;
    std::fs::create_dir_all(&posts_output_directory)?;

    let writer = Writer {
        template: &template,
        target_directory: &config.target_directory,
        page_name: &config.page_name,
    };
    for post in &posts {
        post.render(&writer, &config.source_url, &config.target_url)?;
    }
    tracing::info!(posts = posts.len(), "wrote post pages");

    // listings show the most recent posts first
    posts.reverse();
    listing::write_index(&writer, &posts, &config.target_url)?;
    listing::write_sitemap(&writer, &posts)?;
    write_feed(
        &FeedConfig {
            title: &config.page_name,
            link: &config.target_url,
            description: &config.page_description,
        },
        &posts,
        Utc::now(),
        File::create(config.target_path("rss.xml"))?,
    )?;

    assets::write_static(&config.source_path("static"), &static_output_directory)?;
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors templating or writing pages.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identity::test::{git, FakeHistory};
    use crate::identity::HistoryResolver;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// A source tree with a `posts/` directory and a config targeting a
    /// sibling output directory.
    fn site(identity: &str) -> (TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/posts")).unwrap();
        let config: Config = format!(
            "source-dir {}\nsource-url https://git.example.org/blog\n\
             target-dir {}\ntarget-url https://blog.example.org\n\
             page-name Test Blog\npage-desc A blog for tests\nidentity {}\n",
            dir.path().join("src").display(),
            dir.path().join("out").display(),
            identity,
        )
        .parse()
        .unwrap();
        (dir, config)
    }

    fn write_post(config: &Config, name: &str, markdown: &str) {
        fs::write(config.posts_source_directory().join(name), markdown).unwrap();
    }

    fn read(config: &Config, path: &str) -> String {
        fs::read_to_string(config.target_path(path)).unwrap()
    }

    #[test]
    fn test_duplicate_slugs_end_to_end() -> Result<()> {
        let (_dir, config) = site("filename");
        write_post(&config, "1000000000-a.md", "# Hello\n");
        write_post(&config, "1000000001-a.md", "# World\n");
        build_site(&config)?;

        assert!(read(&config, "posts/a.html").contains("<h1>Hello</h1>"));
        assert!(read(&config, "posts/a-1.html").contains("<h1>World</h1>"));

        let index = read(&config, "index.html");
        let world = index.find("World").unwrap();
        let hello = index.find("Hello").unwrap();
        assert!(world < hello);
        assert!(index.contains("<a href=\"posts/a-1.html\" title=\"Permalink\">[l]</a> World"));
        assert!(index.contains("<meta property=\"og:type\" content=\"website\" />"));
        Ok(())
    }

    #[test]
    fn test_shortened_post_end_to_end() -> Result<()> {
        let (_dir, config) = site("filename");
        write_post(
            &config,
            "1000000000-post.md",
            "# Title\n\nFirst paragraph.\n\n## Sub\n\nmore text",
        );
        build_site(&config)?;

        let index = read(&config, "index.html");
        assert!(index.contains(
            "<p>First paragraph.</p>\n\
             <p class=\"more\"><a href=\"posts/post.html\">Read more...</a></p></article>"
        ));
        assert!(!index.contains("<h2>Sub</h2>"));

        let page = read(&config, "posts/post.html");
        assert!(page.contains("<h2>Sub</h2>"));
        assert!(page.contains("<title>Title &ndash; Test Blog</title>"));
        assert!(page.contains("href=\"../static/style.css\""));
        assert!(page.contains(
            "<meta property=\"og:description\" content=\"First paragraph.\" />"
        ));
        Ok(())
    }

    #[test]
    fn test_all_outputs_written() -> Result<()> {
        let (_dir, config) = site("filename");
        write_post(&config, "1000000000-one.md", "# One\n");
        build_site(&config)?;

        let sitemap = read(&config, "sitemap.html");
        assert!(sitemap.contains("<h2>Sep 2001</h2><ul><li><a href=\"posts/one.html\">One</a></li></ul>"));
        assert!(sitemap.contains("<title>Article list &ndash; Test Blog</title>"));

        let rss = read(&config, "rss.xml");
        assert!(rss.starts_with("<?xml version=\"1.0\"?>\n<rss version=\"2.0\"><channel>\n"));
        assert!(rss.contains("<link>https://blog.example.org/posts/one.html</link>"));
        assert!(rss.contains("<description>A blog for tests</description>"));

        assert_eq!(read(&config, "static/style.css"), assets::STYLESHEET);
        Ok(())
    }

    #[test]
    fn test_stale_pages_removed() -> Result<()> {
        let (_dir, config) = site("filename");
        write_post(&config, "1000000000-old.md", "# Old\n");
        build_site(&config)?;
        assert!(config.target_path("posts/old.html").exists());

        fs::remove_file(config.posts_source_directory().join("1000000000-old.md"))?;
        write_post(&config, "1000000000-new.md", "# New\n");
        build_site(&config)?;
        assert!(!config.target_path("posts/old.html").exists());
        assert!(config.target_path("posts/new.html").exists());
        Ok(())
    }

    #[test]
    fn test_history_strategy_end_to_end() -> Result<()> {
        let (_dir, config) = site("history");
        write_post(&config, "hello.md", "# Hello\n");

        let mut table = HashMap::new();
        table.insert("hello.md".to_owned(), vec![1000086400, 1000000000]);
        build_site_with(&config, &HistoryResolver::new(FakeHistory(table)))?;

        let page = read(&config, "posts/hello.html");
        assert!(page.contains("Created: Sun, 09 Sep 2001 01:46:40 UTC"));
        assert!(page.contains(
            "<a href=\"https://git.example.org/blog/posts/hello.md\" title=\"Commit history\">\
             Mon, 10 Sep 2001 01:46:40 UTC</a>"
        ));
        Ok(())
    }

    #[test]
    fn test_bad_post_aborts_without_output() {
        let (_dir, config) = site("filename");
        write_post(&config, "1000000000-good.md", "# Good\n");
        write_post(&config, "bad.md", "# Bad\n");
        assert!(matches!(build_site(&config), Err(Error::Parse(_))));
        assert!(!config.target_path("index.html").exists());
    }

    #[test]
    fn test_empty_site() -> Result<()> {
        let (_dir, config) = site("filename");
        build_site(&config)?;
        assert!(read(&config, "sitemap.html").contains("<section class=\"sitemap\"></section>"));
        assert!(!read(&config, "rss.xml").contains("<item>"));
        Ok(())
    }

    #[test]
    fn test_git_history_end_to_end() -> Result<()> {
        let (_dir, config) = site("history");
        let repo = config.source_directory.clone();
        write_post(&config, "draft.md", "# Hello\n");
        git(&repo, 0, &["init", "-q"]);
        git(&repo, 0, &["add", "posts/draft.md"]);
        git(&repo, 1000000000, &["commit", "-q", "-m", "draft"]);
        git(&repo, 0, &["mv", "posts/draft.md", "posts/hello.md"]);
        git(&repo, 1000086400, &["commit", "-q", "-m", "publish"]);
        build_site(&config)?;

        let page = read(&config, "posts/hello.html");
        assert!(page.contains("Created: Sun, 09 Sep 2001 01:46:40 UTC"));
        assert!(page.contains("title=\"Commit history\">Mon, 10 Sep 2001 01:46:40 UTC</a>"));
        Ok(())
    }

    #[test]
    fn test_untracked_post_aborts_build() {
        let (_dir, config) = site("history");
        write_post(&config, "new.md", "# New\n");
        git(&config.source_directory, 0, &["init", "-q"]);

        let err = build_site(&config).err().unwrap();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("git log for 'posts/new.md' failed"), "{}", err);
        assert!(!config.target_path("index.html").exists());
    }
}
