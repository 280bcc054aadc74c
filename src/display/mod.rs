//! Display formatting for terminal output
//!
//! Provides utilities for formatting expenses and reports for terminal
//! display.

pub mod expense;
pub mod report;

pub use expense::{
    format_expense_details, format_expense_list, format_expense_row, format_grouped_list,
};
pub use report::format_weekly_report;
