use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_filter::{
    config::Config,
    diagnostics::MissingReport,
    pipeline::{run, ChannelSource, RunOptions},
};

#[derive(Parser)]
#[command(name = "epg-filter")]
#[command(version)]
#[command(about = "Filter an XMLTV guide by channel, id range and time window")]
#[command(long_about = None)]
struct Cli {
    /// Source XMLTV file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Filtered XMLTV file to write
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// File with one channel id per line
    #[arg(short, long, value_name = "FILE", conflicts_with = "m3u")]
    channels: Option<PathBuf>,

    /// M3U playlist whose tvg-id values select channels
    #[arg(short, long, value_name = "FILE")]
    m3u: Option<PathBuf>,

    /// Keep programmes starting up to N days from now
    #[arg(long, visible_alias = "df", value_name = "N", allow_negative_numbers = true)]
    days_future: Option<i64>,

    /// Keep programmes starting up to N days ago
    #[arg(long, visible_alias = "dp", value_name = "N", allow_negative_numbers = true)]
    days_past: Option<i64>,

    /// First day of the window (YYYY-MM-DD), used when --days-past is absent
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Channel ids or ranges to exclude, e.g. "100-200,305"
    #[arg(short = 'x', long, value_name = "RANGES")]
    exclude: Vec<String>,

    /// File with exclusion ranges, one or more per line
    #[arg(long, visible_alias = "xf", value_name = "FILE")]
    exclude_file: Vec<PathBuf>,

    /// Remove all description elements
    #[arg(long)]
    nodesc: bool,

    /// Keep only programme attributes and titles
    #[arg(long)]
    basic: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("epg_filter={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EPG filter v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    let channels = match (cli.channels, cli.m3u) {
        (Some(path), _) => Some(ChannelSource::List(path)),
        (None, Some(path)) => Some(ChannelSource::Playlist(path)),
        (None, None) => None,
    };

    let options = RunOptions {
        input: cli.input,
        output: cli.output,
        channels,
        days_future: cli.days_future,
        days_past: cli.days_past,
        start: cli.start,
        exclude: cli.exclude,
        exclude_files: cli.exclude_file,
        strip_descriptions: cli.nodesc,
        basic_mode: cli.basic,
    };

    let summary = run(&options, &config, Local::now().naive_local())?;

    match &summary.missing {
        Some(MissingReport::AllFound) => info!("{}", MissingReport::AllFound),
        Some(report) => warn!("{}", report),
        None => {}
    }
    if !summary.warnings.is_empty() {
        info!("Finished with {} warnings", summary.warnings.len());
    }

    Ok(())
}
