//! Service layer for the expense tracker
//!
//! The service layer provides the calendar ranges, aggregations and entry
//! validation on top of the storage layer.

pub mod aggregation;
pub mod expense;
pub mod live;
pub mod ranges;

pub use aggregation::{AggregationEngine, ExpenseGroup, GroupBy, GroupTotal};
pub use expense::{EntryOutcome, ExpenseDraft, ExpenseService, Rejection};
pub use live::{LiveQuery, Snapshot};
pub use ranges::DayBucket;
