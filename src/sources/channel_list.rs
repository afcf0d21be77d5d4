//! Plain channel id list: one id per line, `#` comments allowed

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::diagnostics::Diagnostics;
use crate::errors::{AppError, AppResult, InputKind};
use crate::sources::{content_lines, read_text};

/// Read the ids from a channel list file; an empty list is an error
pub fn read_channel_ids(path: &Path, diagnostics: &mut Diagnostics) -> AppResult<HashSet<String>> {
    let content = read_text(InputKind::ChannelList, path, diagnostics)?;
    let ids = parse_channel_ids(&content);
    info!("Read {} channel IDs from channel file", ids.len());

    if ids.is_empty() {
        return Err(AppError::validation(format!(
            "No channel IDs found in the channel file '{}'",
            path.display()
        )));
    }
    Ok(ids)
}

pub fn parse_channel_ids(content: &str) -> HashSet<String> {
    content_lines(content).map(str::to_string).collect()
}
