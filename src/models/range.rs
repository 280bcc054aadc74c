//! Closed millisecond interval used to select expenses

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ExpenseError, ExpenseResult};

/// A closed interval `[start, end]` in epoch milliseconds
///
/// Both bounds are inclusive; `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: i64,
    end: i64,
}

impl TimeRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: i64, end: i64) -> ExpenseResult<Self> {
        if start > end {
            return Err(ExpenseError::Validation(format!(
                "Range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Range between two instants given in either order
    pub fn ordered(a: i64, b: i64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Every representable instant
    pub const fn all() -> Self {
        Self {
            start: i64::MIN,
            end: i64::MAX,
        }
    }

    /// First included millisecond
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Last included millisecond
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Check if an instant falls within the range (inclusive)
    pub const fn contains(&self, epoch_ms: i64) -> bool {
        epoch_ms >= self.start && epoch_ms <= self.end
    }

    /// Length in milliseconds (`end - start`)
    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Smallest range covering both
    pub fn span(&self, other: &TimeRange) -> TimeRange {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
