//! Resolves a post's [`Identity`] (slug plus timestamps) from its source file
//! name. There are two strategies, selected by
//! [`crate::config::IdentityPolicy`]:
//!
//! * [`FilenameResolver`] reads everything from names like
//!   `1457810516-hello-world.md`.
//! * [`HistoryResolver`] takes the slug from names like `hello-world.md` and
//!   the timestamps from the file's version-control [`History`].

use crate::config::{Config, IdentityPolicy};
use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::convert::TryFrom;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// The extension of post source files.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// The identity of a post as derived from its source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub slug: String,
    pub creation_timestamp: u64,
    pub last_edited_timestamp: u64,
}

/// Derives an [`Identity`] from the name of a file in the posts directory.
pub trait Resolver {
    fn resolve(&self, file_name: &str) -> Result<Identity>;
}

/// Returns the [`Resolver`] selected by `config`.
pub fn resolver(config: &Config) -> Box<dyn Resolver> {
    match config.identity {
        IdentityPolicy::Filename => Box::new(FilenameResolver),
        IdentityPolicy::History => Box::new(HistoryResolver::new(GitHistory::new(
            &config.source_directory,
        ))),
    }
}

/// Resolves `<10-digit unix timestamp>-<slug>.md`. Creation and last-edited
/// timestamps are both the encoded one.
pub struct FilenameResolver;

impl Resolver for FilenameResolver {
    fn resolve(&self, file_name: &str) -> Result<Identity> {
        lazy_static! {
            static ref FILE_NAME_REGEX: Regex = Regex::new(r"^(\d{10})-(.+)\.md$").unwrap();
        }

        let caps = FILE_NAME_REGEX
            .captures(file_name)
            .ok_or_else(|| Error::MalformedFileName(file_name.to_owned()))?;
        let timestamp = caps[1]
            .parse::<u64>()
            .map_err(|_| Error::MalformedFileName(file_name.to_owned()))?;
        Ok(Identity {
            slug: caps[2].to_owned(),
            creation_timestamp: timestamp,
            last_edited_timestamp: timestamp,
        })
    }
}

/// A file's commit timestamps (Unix epoch seconds), newest first, following
/// renames.
pub trait History {
    /// `path` is relative to the repository root.
    fn timestamps(&self, path: &Path) -> Result<Vec<u64>>;
}

/// Resolves `<slug>.md`, taking the timestamps from a [`History`].
///
/// The last-edited timestamp is the largest one in the history. The creation
/// timestamp is the *last* one the traversal returns, i.e. the hierarchically
/// lowest commit. With merges or rewritten history that entry need not be the
/// smallest timestamp, and the creation time can then come out later than
/// some of the post's edits.
pub struct HistoryResolver<H> {
    history: H,
}

impl<H: History> HistoryResolver<H> {
    pub fn new(history: H) -> HistoryResolver<H> {
        HistoryResolver { history }
    }
}

impl<H: History> Resolver for HistoryResolver<H> {
    fn resolve(&self, file_name: &str) -> Result<Identity> {
        let slug = file_name
            .strip_suffix(MARKDOWN_EXTENSION)
            .filter(|slug| !slug.is_empty())
            .ok_or_else(|| Error::MalformedFileName(file_name.to_owned()))?;

        let path = Path::new("posts").join(file_name);
        let timestamps = self.history.timestamps(&path)?;
        let creation_timestamp = *timestamps.last().ok_or(Error::NoHistory(path))?;
        let last_edited_timestamp = timestamps.iter().copied().max().unwrap_or(creation_timestamp);

        Ok(Identity {
            slug: slug.to_owned(),
            creation_timestamp,
            last_edited_timestamp,
        })
    }
}

/// Reads a file's history with
/// `git -C <repository> log --pretty=%at -M --follow -- <path>`.
pub struct GitHistory {
    repository: PathBuf,
}

impl GitHistory {
    pub fn new(repository: &Path) -> GitHistory {
        GitHistory {
            repository: repository.to_owned(),
        }
    }
}

impl History for GitHistory {
    fn timestamps(&self, path: &Path) -> Result<Vec<u64>> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repository)
            .args(&["log", "--pretty=%at", "-M", "--follow", "--"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(Error::Spawn)?;

        if !output.status.success() {
            return Err(Error::Git {
                path: path.to_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        parse_timestamps(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses whitespace-separated epoch timestamps, keeping their order. Values
/// that don't map to a representable date are rejected.
fn parse_timestamps(output: &str) -> Result<Vec<u64>> {
    output
        .split_whitespace()
        .map(|field| {
            field
                .parse::<u64>()
                .ok()
                .filter(|&timestamp| {
                    i64::try_from(timestamp)
                        .ok()
                        .and_then(|secs| DateTime::from_timestamp(secs, 0))
                        .is_some()
                })
                .ok_or_else(|| Error::InvalidTimestamp(field.to_owned()))
        })
        .collect()
}

/// The result of resolving an [`Identity`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem resolving a post's [`Identity`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a post file name doesn't follow the active strategy's
    /// naming scheme.
    MalformedFileName(String),

    /// Returned when `git` can't be started.
    Spawn(std::io::Error),

    /// Returned when `git log` exits unsuccessfully.
    Git { path: PathBuf, stderr: String },

    /// Returned when the history contains something other than a timestamp.
    InvalidTimestamp(String),

    /// Returned when a post has no commits at all.
    NoHistory(PathBuf),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedFileName(name) => write!(f, "malformed post file name: {}", name),
            Error::Spawn(err) => write!(f, "running git: {}", err),
            Error::Git { path, stderr } => {
                write!(f, "git log for '{}' failed: {}", path.display(), stderr)
            }
            Error::InvalidTimestamp(field) => write!(f, "invalid timestamp in history: {}", field),
            Error::NoHistory(path) => write!(f, "no commits found for '{}'", path.display()),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn(err) => Some(err),
            _ => None,
        }
    }
}
