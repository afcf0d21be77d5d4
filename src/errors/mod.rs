//! Centralized error handling for the EPG filter
//!
//! # Error Categories
//!
//! - **Missing input**: source document, channel list, playlist or exclusion file
//! - **Source errors**: XMLTV documents that cannot be parsed or written
//! - **Validation errors**: bad arguments and empty inclusion inputs
//! - **Configuration errors**: unreadable or invalid layered configuration
//!
//! # Usage
//!
//! ```rust
//! use epg_filter::errors::{AppError, AppResult};
//!
//! fn example_function(days: i64) -> AppResult<i64> {
//!     if days < 0 {
//!         return Err(AppError::validation("days must not be negative"));
//!     }
//!     Ok(days)
//! }
//! # assert!(example_function(-1).is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
