//! Playlist scanner collecting `tvg-id` values from `#EXTINF` lines

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use tracing::info;

use crate::diagnostics::Diagnostics;
use crate::errors::{AppError, AppResult, InputKind};
use crate::sources::read_text;

const EXTINF_PREFIX: &str = "#EXTINF:";

/// Read the non-empty `tvg-id`s of a playlist; a playlist without any is an error
pub fn read_playlist_ids(path: &Path, diagnostics: &mut Diagnostics) -> AppResult<HashSet<String>> {
    let content = read_text(InputKind::Playlist, path, diagnostics)?;
    let ids = parse_playlist_ids(&content)?;
    info!("Found {} channel IDs in M3U file", ids.len());

    if ids.is_empty() {
        return Err(AppError::validation(format!(
            "No tvg-id attributes found in M3U file '{}'",
            path.display()
        )));
    }
    Ok(ids)
}

pub fn parse_playlist_ids(content: &str) -> AppResult<HashSet<String>> {
    let tvg_id = Regex::new(r#"tvg-id="([^"]*)""#)
        .map_err(|e| AppError::validation(format!("Invalid regex: {e}")))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(EXTINF_PREFIX))
        .filter_map(|line| tvg_id.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect())
}
