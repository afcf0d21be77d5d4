//! Time window resolution and XMLTV timestamp parsing
//!
//! All instants are naive wall-clock times. XMLTV start times carry an offset
//! suffix (`20240101120000 +0100`) which is ignored: only the leading
//! `YYYYMMDDHHMMSS` is read.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const XMLTV_TIMESTAMP_LEN: usize = 14;
const XMLTV_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Inclusive `[start, end]` interval; an inverted window admits nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Window covering whole days from the start of `first` to the start of `last`
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> Self {
        Self::new(start_of_day(first), start_of_day(last))
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Whether a bound ran off the end of the calendar and was saturated
    pub fn is_clamped(&self) -> bool {
        self.start == NaiveDateTime::MIN || self.end == NaiveDateTime::MAX
    }
}

/// Inputs for [`resolve`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSpec {
    pub days_future: Option<i64>,
    pub days_past: Option<i64>,
    pub explicit_start: Option<NaiveDate>,
}

/// Turn partial day offsets into a concrete window
///
/// `days_past` wins over `explicit_start` for the lower bound. A missing
/// bound is filled in `default_span_days` away: forward from the start, or
/// backward from `now`. Bounds outside the representable calendar saturate
/// at `NaiveDateTime::MIN`/`MAX` instead of overflowing.
pub fn resolve(spec: &WindowSpec, now: NaiveDateTime, default_span_days: i64) -> Option<TimeWindow> {
    let start = match (spec.days_past, spec.explicit_start) {
        (Some(days), _) => Some(shift_days(now, days.saturating_neg())),
        (None, Some(date)) => Some(start_of_day(date)),
        (None, None) => None,
    };
    let end = spec.days_future.map(|days| shift_days(now, days));

    match (start, end) {
        (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
        (Some(start), None) => Some(TimeWindow::new(start, shift_days(start, default_span_days))),
        (None, Some(end)) => Some(TimeWindow::new(
            shift_days(now, default_span_days.saturating_neg()),
            end,
        )),
        (None, None) => None,
    }
}

fn shift_days(base: NaiveDateTime, days: i64) -> NaiveDateTime {
    Duration::try_days(days)
        .and_then(|delta| base.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        })
}

/// Parse the leading `YYYYMMDDHHMMSS` of an XMLTV timestamp
pub fn parse_xmltv_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    let prefix = timestamp.get(..XMLTV_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(prefix, XMLTV_TIMESTAMP_FORMAT).ok()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
