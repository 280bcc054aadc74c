//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod expense;
pub mod export;
pub mod report;

pub use expense::{handle_add_command, handle_list_command, handle_show_command, AddArgs, ListArgs};
pub use export::{handle_export_command, ExportArgs};
pub use report::{handle_report_command, ReportArgs};

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::config::{ExpensePaths, Settings};
use crate::error::{ExpenseError, ExpenseResult};
use crate::services::ranges;
use crate::storage::ExpenseStore;

/// Everything a command handler needs
pub struct CliContext<'a, Tz: TimeZone> {
    pub store: &'a dyn ExpenseStore,
    pub paths: &'a ExpensePaths,
    pub settings: &'a Settings,
    /// Zone used for calendar days and displayed times
    pub tz: Tz,
}

impl<Tz: TimeZone> CliContext<'_, Tz> {
    /// Current instant in the configured zone
    pub fn now(&self) -> DateTime<Tz> {
        ranges::now_in(&self.tz)
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency_symbol
    }
}

/// Parse a `YYYY-MM-DD` command line date
pub(crate) fn parse_date(s: &str) -> ExpenseResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        ExpenseError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s))
    })
}
