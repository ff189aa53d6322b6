//! Defines the [`Config`] type and the logic for loading it from a directive
//! file. A directive file has one `key value` pair per line; blank lines and
//! lines starting with `#` are ignored:
//!
//! ```text
//! # where the posts live
//! source-dir   /home/me/blog-data
//! source-url   https://github.com/me/blog-data/commits/master
//! target-dir   /var/www/blog
//! target-url   https://blog.example.org
//! page-name    My Blog
//! page-desc    Thoughts on things
//! identity     history
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::value::{Error as DeError, MapDeserializer};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Selects how a post's slug and timestamps are derived from its source file.
/// See [`crate::identity`] for the two strategies.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityPolicy {
    /// `<slug>.md`, timestamps from the version-control history.
    History,

    /// `<10-digit-timestamp>-<slug>.md`, timestamps from the file name.
    Filename,
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        IdentityPolicy::History
    }
}

/// The raw directives as they appear in the file.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Directives {
    source_dir: PathBuf,
    source_url: String,
    target_dir: PathBuf,
    target_url: String,
    page_name: String,
    page_desc: String,

    #[serde(default)]
    identity: IdentityPolicy,

    #[serde(default, deserialize_with = "present")]
    template: Option<PathBuf>,
}

// Directive values are plain strings, which `Option`'s own impl rejects, so a
// directive that is present at all is `Some`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The configuration for a single run. It's passed by reference into every
/// stage of the build; there is no global configuration state.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory containing `posts/` (and optionally `static/`).
    pub source_directory: PathBuf,

    /// The URL under which the source repository is browsable. Post pages
    /// link to `{source_url}/posts/{slug}.md` for their edit history. Always
    /// ends in `/`.
    pub source_url: Url,

    /// The directory into which the site is written.
    pub target_directory: PathBuf,

    /// The public URL of the site. Always ends in `/`.
    pub target_url: Url,

    /// The site title.
    pub page_name: String,

    /// The site description, used for the RSS channel.
    pub page_description: String,

    /// How post identities are resolved.
    pub identity: IdentityPolicy,

    /// An optional custom page template. `None` selects the built-in one.
    pub template: Option<PathBuf>,
}

impl Config {
    /// Reads and parses the directive file at `path`.
    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        contents.parse()
    }

    /// Returns a path below [`Config::source_directory`].
    pub fn source_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.source_directory.join(path)
    }

    /// Returns a path below [`Config::target_directory`].
    pub fn target_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.target_directory.join(path)
    }

    /// The directory from which post source files are read.
    pub fn posts_source_directory(&self) -> PathBuf {
        self.source_path("posts")
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(input: &str) -> Result<Config> {
        let directives = Directives::deserialize(MapDeserializer::<_, DeError>::new(
            parse_directives(input)?.into_iter(),
        ))?;

        let source_dir = &directives.source_dir;
        let template = directives.template.map(|template| {
            if template.is_relative() {
                source_dir.join(template)
            } else {
                template
            }
        });

        Ok(Config {
            source_url: parse_base_url("source-url", &directives.source_url)?,
            target_url: parse_base_url("target-url", &directives.target_url)?,
            source_directory: directives.source_dir,
            target_directory: directives.target_dir,
            page_name: directives.page_name,
            page_description: directives.page_desc,
            identity: directives.identity,
            template,
        })
    }
}

/// Splits the input into `(key, value)` pairs. A repeated key overrides the
/// earlier occurrence.
fn parse_directives(input: &str) -> Result<BTreeMap<String, String>> {
    lazy_static! {
        static ref DIRECTIVE_REGEX: Regex = Regex::new(r"^(\S+)\s*(.+)$").unwrap();
    }

    let mut directives = BTreeMap::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match DIRECTIVE_REGEX.captures(line) {
            Some(caps) => {
                directives.insert(caps[1].to_owned(), caps[2].to_owned());
            }
            None => return Err(Error::InvalidDirective(line.to_owned())),
        }
    }
    Ok(directives)
}

// A trailing slash is significant for [`Url::join`]: without it the last path
// segment is treated as a file name and replaced.
fn parse_base_url(key: &'static str, value: &str) -> Result<Url> {
    let value = if value.ends_with('/') {
        value.to_owned()
    } else {
        format!("{}/", value)
    };
    Url::parse(&value).map_err(|err| Error::InvalidUrl { key, err })
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the directive file can't be read.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned for a non-empty, non-comment line that isn't `key value`.
    InvalidDirective(String),

    /// Returned when a URL directive doesn't parse.
    InvalidUrl {
        key: &'static str,
        err: url::ParseError,
    },

    /// Returned for missing required directives and bad directive values.
    Directive(DeError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening config file '{}': {}", path.display(), err)
            }
            Error::InvalidDirective(line) => write!(f, "invalid directive: {}", line),
            Error::InvalidUrl { key, err } => write!(f, "invalid {}: {}", key, err),
            Error::Directive(err) => write!(f, "config: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::InvalidDirective(_) => None,
            Error::InvalidUrl { key: _, err } => Some(err),
            Error::Directive(err) => Some(err),
        }
    }
}

impl From<DeError> for Error {
    /// Converts a [`DeError`] into an [`Error`]. This allows us to use the `?`
    /// operator when deserializing directives.
    fn from(err: DeError) -> Error {
        Error::Directive(err)
    }
}
