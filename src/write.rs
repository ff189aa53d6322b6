//! The page writer: applies the page template to a content fragment and writes
//! the result below the target directory.

use crate::assets;
use gtmpl::{Context, Template, Value};
use pulldown_cmark::escape::escape_html;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Open Graph properties (`og:title` etc.) rendered as `<meta>` tags. Sorted
/// so output is reproducible.
pub type Metadata = BTreeMap<String, String>;

/// Loads the page template from `path`, or the built-in one if `path` is
/// `None`.
pub fn load_template(path: Option<&Path>) -> Result<Template> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?,
        None => assets::PAGE_TEMPLATE.to_owned(),
    };

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The template shared by all pages. It receives the fields `title`,
    /// `page_name`, `content`, `meta` and `path_to_root`.
    pub template: &'a Template,

    /// The directory below which pages are written.
    pub target_directory: &'a Path,

    /// The site title, used on its own or as the suffix of page titles.
    pub page_name: &'a str,
}

impl Writer<'_> {
    /// Templates `content` and writes it to `{target_directory}/{path}`.
    /// `path` uses `/` separators; its depth determines the relative path back
    /// to the site root. An empty `title` falls back to the site title.
    pub fn write(&self, path: &str, title: &str, content: &str, metadata: &Metadata) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(self.full_title(title)));
        m.insert("page_name".to_owned(), Value::String(self.page_name.to_owned()));
        m.insert("content".to_owned(), Value::String(content.to_owned()));
        m.insert("meta".to_owned(), Value::String(meta_tags(metadata)?));
        m.insert("path_to_root".to_owned(), Value::String(path_to_root(path)));

        let mut output: Vec<u8> = Vec::new();
        self.template
            .execute(&mut output, &Context::from(Value::Object(m)).map_err(Error::Template)?)?;

        let file_path = self.target_directory.join(path);
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&file_path, output).map_err(|err| Error::WriteFile {
            path: file_path.clone(),
            err,
        })?;
        tracing::debug!(path = %file_path.display(), "wrote page");
        Ok(())
    }

    fn full_title(&self, title: &str) -> String {
        if title.is_empty() {
            self.page_name.to_owned()
        } else {
            format!("{} &ndash; {}", title, self.page_name)
        }
    }
}

/// `.` for pages at the site root, otherwise one `..` per directory level.
fn path_to_root(path: &str) -> String {
    match path.matches('/').count() {
        0 => String::from("."),
        depth => vec![".."; depth].join("/"),
    }
}

/// Formats `metadata` according to <http://ogp.me/>.
fn meta_tags(metadata: &Metadata) -> Result<String> {
    let mut tags = String::new();
    for (property, content) in metadata {
        tags.push_str("<meta property=\"");
        escape_html(&mut tags, property)?;
        tags.push_str("\" content=\"");
        escape_html(&mut tags, content)?;
        tags.push_str("\" />");
    }
    Ok(tags)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening the template file.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing the template.
    ParseTemplate(String),

    /// An error during templating.
    Template(String),

    /// Returned when an output file can't be written.
    WriteFile { path: PathBuf, err: io::Error },

    /// Returned when a page URL can't be built.
    Url(url::ParseError),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Template(err) => err.fmt(f),
            Error::WriteFile { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Url(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::WriteFile { path: _, err } => Some(err),
            Error::Url(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
