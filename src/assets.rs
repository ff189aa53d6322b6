//! Assets compiled into the binary, and the copying of a site's own static
//! files.

use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// The built-in page template (see [`crate::write::Writer`] for its fields).
pub const PAGE_TEMPLATE: &str = include_str!("../assets/page.html");

/// The built-in stylesheet, written to `static/style.css`.
pub const STYLESHEET: &str = include_str!("../assets/style.css");

/// Writes the built-in stylesheet into `output_directory` and then copies the
/// tree at `source_directory` (if it exists) on top, so a site can override
/// `style.css` or add files of its own.
pub fn write_static(source_directory: &Path, output_directory: &Path) -> io::Result<()> {
    std::fs::create_dir_all(output_directory)?;
    std::fs::write(output_directory.join("style.css"), STYLESHEET)?;

    if !source_directory.is_dir() {
        return Ok(());
    }

    let mut copied = 0usize;
    for result in WalkDir::new(source_directory) {
        let entry = result?;
        // strip_prefix() can't fail; every entry is below `source_directory`
        let relative = match entry.path().strip_prefix(source_directory) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let destination = output_directory.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &destination)?;
            copied += 1;
        }
    }
    tracing::debug!(files = copied, source = %source_directory.display(), "copied static files");
    Ok(())
}
