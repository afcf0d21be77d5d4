//! Exclusion range files
//!
//! Each non-comment line holds one or more range expressions in the same
//! syntax accepted on the command line. Lines are returned untouched so the
//! compiler sees exactly what it would have seen from `-x`.

use std::path::Path;

use tracing::info;

use crate::diagnostics::Diagnostics;
use crate::errors::{AppResult, InputKind};
use crate::sources::{content_lines, read_text};

pub fn read_exclusion_expressions(
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> AppResult<Vec<String>> {
    let content = read_text(InputKind::ExclusionList, path, diagnostics)?;
    let expressions: Vec<String> = content_lines(&content).map(str::to_string).collect();
    info!(
        "Read {} exclusion expressions from {}",
        expressions.len(),
        path.display()
    );
    Ok(expressions)
}
