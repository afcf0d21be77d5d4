/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.

// Environment overrides, e.g. EPG_FILTER__REDUCER__MAX_DEPTH=64
pub const ENV_PREFIX: &str = "EPG_FILTER";
pub const ENV_SEPARATOR: &str = "__";

// Time window defaults
pub const DEFAULT_WINDOW_SPAN_DAYS: i64 = 365;
// Upper bound for any day count, keeps date arithmetic in range
pub const MAX_DAYS: i64 = 36_500;

// Exclusion compiler
pub const DEFAULT_ID_PREFIXES: [&str; 3] = ["channel", "ch", "id"];
pub const MAX_RANGE_SPAN: u64 = 1_000_000;

// Reducer defaults
pub const DEFAULT_DESCRIPTION_TAG: &str = "desc";
pub const DEFAULT_BASIC_KEEP_TAG: &str = "title";
pub const DEFAULT_MAX_DEPTH: usize = 256;

// Missing channel report defaults
pub const DEFAULT_FULL_LIST_LIMIT: usize = 10;
pub const DEFAULT_EDGE_COUNT: usize = 5;

// Output defaults
pub const DEFAULT_INDENT_SIZE: usize = 2;
pub const DEFAULT_ROOT_TAG: &str = "tv";
