pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod filter;
pub mod pipeline;
pub mod sources;
pub mod xmltv;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use pipeline::{run, ChannelSource, RunOptions, RunSummary};
