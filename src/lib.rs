//! Expense Tracker - record daily expenses and report on them
//!
//! This library provides the core of the `expenses` command line tool: a
//! durable expense ledger, calendar-day time ranges, sums and groupings over
//! those ranges that follow the ledger as it changes, a rolling seven-day
//! report and CSV export.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, money, time ranges)
//! - `storage`: The expense store contract and its JSON file implementation
//! - `services`: Range utilities, aggregation, live queries and entry validation
//! - `reports`: The seven-day report
//! - `export`: CSV export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use expense_tracker::reports::ReportComposer;
//! use expense_tracker::services::{ExpenseDraft, ExpenseService};
//! use expense_tracker::storage::ExpenseRepository;
//!
//! let store = ExpenseRepository::in_memory();
//! let service = ExpenseService::new(&store, Utc, "Food");
//! let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
//!
//! service
//!     .record(ExpenseDraft::new("Lunch", "12.50"), now.timestamp_millis())
//!     .unwrap();
//!
//! let report = ReportComposer::new(&store).weekly_report(&now).unwrap();
//! assert_eq!(report.daily_series.last().unwrap().total, 12);
//! assert_eq!(report.category_breakdown["Food"], 12);
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ExpenseError, ExpenseResult};
