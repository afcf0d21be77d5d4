//! End-to-end run: read inputs, filter, write, report
//!
//! The binary is a thin wrapper around [`run`]; everything it does is
//! reachable (and testable) from here.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::config::defaults::MAX_DAYS;
use crate::config::Config;
use crate::diagnostics::{report_missing, Diagnostics, MissingReport, Warning};
use crate::errors::{AppError, AppResult};
use crate::filter::{FilterEngine, FilterRequest, TimeWindow};
use crate::sources::{
    read_channel_ids, read_exclusion_expressions, read_playlist_ids, read_source_document,
};
use crate::xmltv::write_file;

/// Where the allow-list of channel ids comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSource {
    /// Plain list, one id per line
    List(PathBuf),
    /// Playlist whose `tvg-id`s also drive the missing-channel report
    Playlist(PathBuf),
}

/// Per-run options, usually straight from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub channels: Option<ChannelSource>,
    pub days_future: Option<i64>,
    pub days_past: Option<i64>,
    pub start: Option<NaiveDate>,
    pub exclude: Vec<String>,
    pub exclude_files: Vec<PathBuf>,
    pub strip_descriptions: bool,
    pub basic_mode: bool,
}

/// What a successful run produced
#[derive(Debug)]
pub struct RunSummary {
    pub channels: usize,
    pub programmes: usize,
    pub window: Option<TimeWindow>,
    pub descriptions_removed: usize,
    /// Only present when a playlist supplied the channel universe
    pub missing: Option<MissingReport>,
    pub warnings: Vec<Warning>,
}

/// Run one filter job with `now` as the reference time
pub fn run(options: &RunOptions, config: &Config, now: NaiveDateTime) -> AppResult<RunSummary> {
    validate_days("days-future", options.days_future)?;
    validate_days("days-past", options.days_past)?;

    let mut diagnostics = Diagnostics::new();
    if options.start.is_some() && options.days_future.is_none() {
        diagnostics.warn(Warning::Usage {
            message: "--start given without --days-future; the window end falls back to the default span"
                .to_string(),
        });
    }

    let mut document = read_source_document(&options.input, &mut diagnostics)?;

    let (inclusion, universe) = match &options.channels {
        None => (None, None),
        Some(ChannelSource::List(path)) => (Some(read_channel_ids(path, &mut diagnostics)?), None),
        Some(ChannelSource::Playlist(path)) => {
            let ids = read_playlist_ids(path, &mut diagnostics)?;
            (Some(ids.clone()), Some(ids))
        }
    };

    let exclusion_expressions = collect_exclusions(options, config, &mut diagnostics)?;

    let request = FilterRequest {
        inclusion,
        exclusion_expressions,
        days_future: options.days_future,
        days_past: options.days_past,
        explicit_start: options.start,
        strip_descriptions: options.strip_descriptions,
        basic_mode: options.basic_mode,
        now,
    };
    let outcome = FilterEngine::new(config).filter(&mut document, &request, &mut diagnostics);

    if outcome.channels.is_empty() {
        diagnostics.warn(Warning::Usage {
            message: "No channels found matching the criteria".to_string(),
        });
    }

    write_file(
        &options.output,
        &outcome.channels,
        &outcome.programmes,
        config.output.indent_size,
    )?;

    let missing = report_missing(universe.as_ref(), &outcome.found_ids, &config.report);

    Ok(RunSummary {
        channels: outcome.channels.len(),
        programmes: outcome.programmes.len(),
        window: outcome.window,
        descriptions_removed: outcome.descriptions_removed,
        missing,
        warnings: diagnostics.into_warnings(),
    })
}

fn validate_days(flag: &str, days: Option<i64>) -> AppResult<()> {
    match days {
        Some(days) if days < 0 => Err(AppError::validation(format!(
            "--{flag} must not be negative (got {days})"
        ))),
        Some(days) if days > MAX_DAYS => Err(AppError::validation(format!(
            "--{flag} must be at most {MAX_DAYS} (got {days})"
        ))),
        _ => Ok(()),
    }
}

/// Config expressions first, then command line, then every exclusion file
fn collect_exclusions(
    options: &RunOptions,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> AppResult<Vec<String>> {
    let mut expressions: Vec<String> = config.exclude.clone();
    expressions.extend(options.exclude.iter().cloned());

    let mut seen = HashSet::new();
    for path in config.exclude_files.iter().chain(&options.exclude_files) {
        if !seen.insert(path) {
            debug!("Skipping duplicate exclusion file {}", path.display());
            continue;
        }
        expressions.extend(read_exclusion_expressions(path, diagnostics)?);
    }

    if !expressions.is_empty() {
        info!("Excluding channels matching {} expressions", expressions.len());
    }
    Ok(expressions)
}
