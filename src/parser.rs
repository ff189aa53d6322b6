//! Discovers post source files and parses them into [`Post`]s.

use crate::identity::{self, Resolver, MARKDOWN_EXTENSION};
use crate::post::Post;
use std::fmt;
use std::fs::read_dir;
use std::path::{Path, PathBuf};

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// Derives each post's slug and timestamps from its file name.
    resolver: &'a dyn Resolver,
}

impl<'a> Parser<'a> {
    pub fn new(resolver: &'a dyn Resolver) -> Parser<'a> {
        Parser { resolver }
    }

    /// Searches `source_directory` for post files (regular files with the
    /// `.md` extension) and returns them as [`Post`]s sorted by creation time,
    /// oldest first. Posts created at the same second keep file-name order so
    /// the result doesn't depend on directory iteration order.
    ///
    /// Any failure aborts the whole parse; there are no partial results.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut file_names = Vec::new();
        let entries = read_dir(source_directory).map_err(|err| Error::ReadDir {
            path: source_directory.to_owned(),
            err,
        })?;
        for result in entries {
            let entry = result?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let os_file_name = entry.file_name();
            let file_name = os_file_name
                .to_str()
                .ok_or_else(|| Error::InvalidFileName(entry.path()))?;
            if file_name.ends_with(MARKDOWN_EXTENSION) {
                file_names.push(file_name.to_owned());
            }
        }
        file_names.sort();

        let mut posts = file_names
            .iter()
            .map(|file_name| self.parse_post(source_directory, file_name))
            .collect::<Result<Vec<Post>>>()?;
        posts.sort_by_key(|post| post.creation_timestamp);

        tracing::info!(
            directory = %source_directory.display(),
            posts = posts.len(),
            "parsed posts"
        );
        Ok(posts)
    }

    /// Parses a single [`Post`] from `source_directory/file_name`, annotating
    /// any error with the file name.
    fn parse_post(&self, source_directory: &Path, file_name: &str) -> Result<Post> {
        match self._parse_post(source_directory, file_name) {
            Ok(post) => Ok(post),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", file_name),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, source_directory: &Path, file_name: &str) -> Result<Post> {
        let identity = self.resolver.resolve(file_name)?;
        let markdown = std::fs::read_to_string(source_directory.join(file_name))?;
        tracing::debug!(
            file = file_name,
            slug = %identity.slug,
            created = identity.creation_timestamp,
            last_edited = identity.last_edited_timestamp,
            "resolved post"
        );
        Ok(Post::new(identity, markdown))
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing [`Post`] objects.
#[derive(Debug)]
pub enum Error {
    /// Returned when the posts directory can't be listed.
    ReadDir { path: PathBuf, err: std::io::Error },

    /// Returned when a post's identity can't be resolved.
    Identity(identity::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadDir { path, err } => {
                write!(f, "Listing posts directory '{}': {}", path.display(), err)
            }
            Error::Identity(err) => err.fmt(f),
            Error::InvalidFileName(path) => write!(f, "invalid file name: {:?}", path),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", &annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadDir { path: _, err } => Some(err),
            Error::Identity(err) => Some(err),
            Error::InvalidFileName(_) => None,
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<identity::Error> for Error {
    fn from(err: identity::Error) -> Error {
        Error::Identity(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
