//! Run diagnostics: recoverable warnings and the missing-channel report
//!
//! Nothing in the engine writes to global state. Each component that can hit
//! a recoverable condition takes a `&mut Diagnostics` and records a
//! [`Warning`] there; the warning is also emitted through `tracing`.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::config::ReportConfig;
use crate::errors::RangeParseError;

/// A recoverable condition hit during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An exclusion sub-term could not be read as a numeric range
    MalformedRange {
        term: String,
        reason: RangeParseError,
    },
    /// A programme's `start` attribute was missing or unparsable while a time window was active
    UnparsableTimestamp {
        channel: String,
        value: Option<String>,
    },
    /// A reducer pass skipped a subtree it could not process
    SubtreeSkipped {
        pass: &'static str,
        element: String,
        depth: usize,
    },
    /// The requested time window ran past the supported calendar and was saturated
    WindowClamped {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Anything odd about the source document that did not stop parsing
    Document { message: String },
    /// Argument combinations that are allowed but probably unintended
    Usage { message: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MalformedRange { term, reason } => {
                write!(f, "Invalid range format '{term}': {reason}")
            }
            Warning::UnparsableTimestamp { channel, value } => match value {
                Some(value) => write!(
                    f,
                    "Could not parse timestamp '{value}' for programme on channel '{channel}'"
                ),
                None => write!(f, "Programme on channel '{channel}' has no start timestamp"),
            },
            Warning::SubtreeSkipped {
                pass,
                element,
                depth,
            } => write!(
                f,
                "Skipped <{element}> at depth {depth} during {pass}: nesting too deep"
            ),
            Warning::WindowClamped { start, end } => write!(
                f,
                "Date range clamped to the supported calendar: {start} to {end}"
            ),
            Warning::Document { message } | Warning::Usage { message } => f.write_str(message),
        }
    }
}

/// Collected warnings for one run
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it
    pub fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Outcome of comparing an identifier universe with the ids actually found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReport {
    AllFound,
    /// Every missing id, sorted
    Missing { ids: Vec<String> },
    /// The first and last few missing ids, sorted, plus the total count
    Truncated {
        total: usize,
        head: Vec<String>,
        tail: Vec<String>,
    },
}

impl MissingReport {
    pub fn missing_count(&self) -> usize {
        match self {
            MissingReport::AllFound => 0,
            MissingReport::Missing { ids } => ids.len(),
            MissingReport::Truncated { total, .. } => *total,
        }
    }
}

impl fmt::Display for MissingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReport::AllFound => f.write_str("All M3U channels found in XMLTV file"),
            MissingReport::Missing { ids } => {
                write!(f, "Missing channels ({}): {}", ids.len(), ids.join(", "))
            }
            MissingReport::Truncated { total, head, tail } => write!(
                f,
                "Missing channels ({}): {}, ..., {}",
                total,
                head.join(", "),
                tail.join(", ")
            ),
        }
    }
}

/// Compare `universe` against `found`; `None` when no universe was supplied
pub fn report_missing(
    universe: Option<&HashSet<String>>,
    found: &HashSet<String>,
    limits: &ReportConfig,
) -> Option<MissingReport> {
    let universe = universe?;

    let mut missing: Vec<String> = universe.difference(found).cloned().collect();
    if missing.is_empty() {
        return Some(MissingReport::AllFound);
    }
    missing.sort();

    if missing.len() <= limits.full_list_limit {
        return Some(MissingReport::Missing { ids: missing });
    }

    let total = missing.len();
    let edge = limits.edge_count.min(total);
    let tail = missing.split_off(total - edge);
    missing.truncate(edge);
    Some(MissingReport::Truncated {
        total,
        head: missing,
        tail,
    })
}
