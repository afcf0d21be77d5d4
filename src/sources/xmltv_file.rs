//! XMLTV source file loading

use std::path::Path;

use crate::diagnostics::{Diagnostics, Warning};
use crate::errors::{AppError, AppResult, InputKind};
use crate::sources::read_text;
use crate::xmltv::{parse_document, Document};

/// Read and parse the source document
///
/// A missing file and a document that cannot be parsed even leniently are
/// fatal. A first line that looks like neither an XML declaration nor a
/// `<tv>` root only produces a warning.
pub fn read_source_document(path: &Path, diagnostics: &mut Diagnostics) -> AppResult<Document> {
    if !path.exists() {
        return Err(AppError::input_not_found(InputKind::Source, path));
    }
    let content = read_text(InputKind::Source, path, diagnostics)?;

    let first_line = content.lines().next().unwrap_or_default().trim_start_matches('\u{feff}').trim();
    if !(first_line.starts_with("<?xml") || first_line.starts_with("<tv")) {
        diagnostics.warn(Warning::Document {
            message: format!(
                "File '{}' doesn't start with XML declaration or <tv> tag",
                path.display()
            ),
        });
    }

    Ok(parse_document(&content, diagnostics)?)
}
