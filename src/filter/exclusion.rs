//! Exclusion pattern compiler
//!
//! Expressions such as `100`, `100-200` or `news05,300-310` compile into one
//! flat token set. Ranges expand to every number in the range plus the common
//! `channel{n}`, `ch{n}` and `id{n}` identifier spellings.
//!
//! Matching is deliberately loose: besides exact membership, an identifier is
//! excluded when its digits form a token, or when any purely numeric token
//! occurs anywhere inside it. A token `5` therefore also excludes `news05`
//! and `channel502`.

use std::collections::HashSet;

use crate::config::defaults::{DEFAULT_ID_PREFIXES, MAX_RANGE_SPAN};
use crate::diagnostics::{Diagnostics, Warning};
use crate::errors::RangeParseError;

const TERM_SEPARATOR: char = ',';
const RANGE_SEPARATOR: char = '-';

/// Compiled exclusion tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    tokens: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every expression into a single set
    pub fn compile<S: AsRef<str>>(expressions: &[S], diagnostics: &mut Diagnostics) -> Self {
        let mut set = Self::new();
        for expression in expressions {
            set.add_expression(expression.as_ref(), diagnostics);
        }
        set
    }

    /// Add the tokens of one comma separated expression
    ///
    /// Malformed range terms are reported and skipped; the rest of the
    /// expression is still compiled.
    pub fn add_expression(&mut self, expression: &str, diagnostics: &mut Diagnostics) {
        for term in expression.split(TERM_SEPARATOR).map(str::trim) {
            if term.is_empty() {
                continue;
            }
            if term.contains(RANGE_SEPARATOR) {
                match parse_range(term) {
                    Ok((low, high)) => self.add_range(low, high),
                    Err(reason) => diagnostics.warn(Warning::MalformedRange {
                        term: term.to_string(),
                        reason,
                    }),
                }
            } else {
                self.tokens.insert(term.to_string());
                let digits = digits_of(term);
                if !digits.is_empty() {
                    self.tokens.insert(digits);
                }
            }
        }
    }

    fn add_range(&mut self, low: u64, high: u64) {
        for n in low..=high {
            self.tokens.insert(n.to_string());
            for prefix in DEFAULT_ID_PREFIXES {
                self.tokens.insert(format!("{prefix}{n}"));
            }
        }
    }

    /// Whether `identifier` matches any compiled token
    pub fn is_excluded(&self, identifier: &str) -> bool {
        if self.tokens.is_empty() {
            return false;
        }
        if self.tokens.contains(identifier) {
            return true;
        }

        let digits = digits_of(identifier);
        if !digits.is_empty() && self.tokens.contains(&digits) {
            return true;
        }

        self.tokens
            .iter()
            .any(|token| is_numeric(token) && identifier.contains(token.as_str()))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl Extend<String> for ExclusionSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.tokens.extend(iter);
    }
}

/// Split `low-high` and read the digits of each side; no digits counts as 0
fn parse_range(term: &str) -> Result<(u64, u64), RangeParseError> {
    let bounds: Vec<&str> = term.split(RANGE_SEPARATOR).map(str::trim).collect();
    if bounds.len() != 2 {
        return Err(RangeParseError::TooManyBoundaries {
            count: bounds.len(),
        });
    }
    let (low, high) = (parse_bound(bounds[0])?, parse_bound(bounds[1])?);
    // high - low + 1 numbers, compared without overflowing at u64::MAX
    if high >= low && high - low >= MAX_RANGE_SPAN - 1 {
        return Err(RangeParseError::TooWide {
            low,
            high,
            limit: MAX_RANGE_SPAN,
        });
    }
    Ok((low, high))
}

fn parse_bound(bound: &str) -> Result<u64, RangeParseError> {
    let digits = digits_of(bound);
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<u64>()
        .map_err(|source| RangeParseError::InvalidBoundary {
            boundary: bound.to_string(),
            source,
        })
}

fn digits_of(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
