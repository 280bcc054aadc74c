//! Reports module for the expense tracker
//!
//! Provides the rolling seven-day report: a dense daily series and a
//! per-category breakdown.

pub mod weekly;

pub use weekly::{CategoryBreakdown, DailyTotal, LiveWeeklyReport, ReportComposer, WeeklyReport};
