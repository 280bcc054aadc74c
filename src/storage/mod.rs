//! Storage layer for the expense tracker
//!
//! The aggregation and report code only depends on the [`ExpenseStore`]
//! contract. [`ExpenseRepository`] is the JSON-file implementation used by
//! the command line application.

pub mod expenses;
pub mod file_io;
pub mod notify;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use notify::StoreEvent;

use std::sync::mpsc::Receiver;

use crate::error::ExpenseResult;
use crate::models::{Expense, Money, NewExpense, TimeRange};

/// Durable, keyed collection of expenses with change notification
pub trait ExpenseStore: Send + Sync {
    /// Insert an expense, returning it with its assigned id
    ///
    /// The expense is durable once this returns `Ok`.
    fn insert(&self, expense: NewExpense) -> ExpenseResult<Expense>;

    /// All expenses with `range.start() <= occurred_at <= range.end()`,
    /// newest first
    fn query_by_range(&self, range: TimeRange) -> ExpenseResult<Vec<Expense>>;

    /// Sum of amounts over the range; zero when nothing matches
    fn sum_by_range(&self, range: TimeRange) -> ExpenseResult<Money> {
        Ok(self
            .query_by_range(range)?
            .iter()
            .map(|e| e.amount)
            .sum())
    }

    /// Register for change notifications
    ///
    /// Every mutation after this call is delivered, in order, until the
    /// receiver is dropped.
    fn subscribe(&self) -> Receiver<StoreEvent>;

    /// Counter bumped on every mutation
    fn revision(&self) -> u64;
}
