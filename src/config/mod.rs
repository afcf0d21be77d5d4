use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{AppError, AppResult, InputKind};

pub mod defaults;

use defaults::*;

/// Layered runtime configuration
///
/// Sources are merged in order: built-in defaults, an optional TOML file,
/// then `EPG_FILTER__*` environment variables. Command-line flags are
/// applied on top by the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub reducer: ReducerConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Range expressions applied on every run
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Exclusion files read on every run
    #[serde(default)]
    pub exclude_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Span used for whichever window bound was not supplied
    #[serde(default = "default_span_days")]
    pub default_span_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReducerConfig {
    #[serde(default = "default_description_tag")]
    pub description_tag: String,
    #[serde(default = "default_basic_keep_tag")]
    pub basic_keep_tag: String,
    /// Subtrees nested deeper than this are skipped by the reducer passes
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Missing ids up to this count are listed in full
    #[serde(default = "default_full_list_limit")]
    pub full_list_limit: usize,
    /// Number of ids shown at each end of a truncated list
    #[serde(default = "default_edge_count")]
    pub edge_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
}

fn default_span_days() -> i64 {
    DEFAULT_WINDOW_SPAN_DAYS
}

fn default_description_tag() -> String {
    DEFAULT_DESCRIPTION_TAG.to_string()
}

fn default_basic_keep_tag() -> String {
    DEFAULT_BASIC_KEEP_TAG.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_full_list_limit() -> usize {
    DEFAULT_FULL_LIST_LIMIT
}

fn default_edge_count() -> usize {
    DEFAULT_EDGE_COUNT
}

fn default_indent_size() -> usize {
    DEFAULT_INDENT_SIZE
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_span_days: default_span_days(),
        }
    }
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            description_tag: default_description_tag(),
            basic_keep_tag: default_basic_keep_tag(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            full_list_limit: default_full_list_limit(),
            edge_count: default_edge_count(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
        }
    }
}

impl Config {
    /// Load defaults merged with environment overrides only
    pub fn load() -> AppResult<Self> {
        Self::build(None)
    }

    /// Load from a TOML file (which must exist) merged with environment overrides
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let path = config_file.as_ref();
        if !path.exists() {
            return Err(AppError::input_not_found(InputKind::Config, path));
        }
        let config = Self::build(Some(path))?;
        info!("Configuration loaded from: {}", path.display());
        Ok(config)
    }

    fn build(file: Option<&Path>) -> AppResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path.to_path_buf()).format(config::FileFormat::Toml),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: Config = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::configuration(e.to_string()))?;
        config.validate()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Reject settings that would make the engine misbehave
    pub fn validate(&self) -> AppResult<()> {
        if !(0..=MAX_DAYS).contains(&self.window.default_span_days) {
            return Err(AppError::configuration(format!(
                "window.default_span_days must be between 0 and {MAX_DAYS}"
            )));
        }
        if self.reducer.description_tag.trim().is_empty() {
            return Err(AppError::configuration(
                "reducer.description_tag must not be empty",
            ));
        }
        if self.reducer.basic_keep_tag.trim().is_empty() {
            return Err(AppError::configuration(
                "reducer.basic_keep_tag must not be empty",
            ));
        }
        if self.reducer.max_depth == 0 {
            return Err(AppError::configuration("reducer.max_depth must be at least 1"));
        }
        if self.report.edge_count * 2 > self.report.full_list_limit {
            return Err(AppError::configuration(format!(
                "report.edge_count ({}) must be at most half of report.full_list_limit ({})",
                self.report.edge_count, self.report.full_list_limit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.default_span_days, 365);
        assert_eq!(config.reducer.description_tag, "desc");
        assert_eq!(config.reducer.basic_keep_tag, "title");
        assert_eq!(config.report.full_list_limit, 10);
        assert_eq!(config.report.edge_count, 5);
    }

    #[test]
    fn test_load_from_file_partial_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "exclude = [\"100-105\"]\n\n[reducer]\nmax_depth = 32\n\n[window]\ndefault_span_days = 30"
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.reducer.max_depth, 32);
        assert_eq!(config.reducer.description_tag, "desc");
        assert_eq!(config.window.default_span_days, 30);
        assert_eq!(config.exclude, vec!["100-105".to_string()]);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validate_rejects_out_of_range_span() {
        let mut config = Config::default();
        config.window.default_span_days = -1;
        assert!(config.validate().is_err());
        config.window.default_span_days = MAX_DAYS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_report_limits() {
        let mut config = Config::default();
        config.report.edge_count = 6;
        assert!(config.validate().is_err());
    }
}
