//! Input loaders
//!
//! Everything read from disk besides configuration: the XMLTV source itself,
//! the channel allow-list (plain list or playlist `tvg-id`s) and exclusion
//! range files. Missing files surface as [`AppError::InputNotFound`].

use std::path::Path;

use tracing::debug;

use crate::diagnostics::{Diagnostics, Warning};
use crate::errors::{AppError, AppResult, InputKind};

pub mod channel_list;
pub mod exclusion_file;
pub mod playlist;
pub mod xmltv_file;

pub use channel_list::read_channel_ids;
pub use exclusion_file::read_exclusion_expressions;
pub use playlist::read_playlist_ids;
pub use xmltv_file::read_source_document;

/// Read a whole file as text, decoding invalid UTF-8 lossily with a warning
pub(crate) fn read_text(
    kind: InputKind,
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> AppResult<String> {
    let bytes = std::fs::read(path).map_err(|e| AppError::from_io(kind, path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            diagnostics.warn(Warning::Document {
                message: format!("File '{}' may not be UTF-8 encoded", path.display()),
            });
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Non-empty lines that are not `#` comments, trimmed
pub(crate) fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
