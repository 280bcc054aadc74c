//! Core data models for the expense tracker
//!
//! Expenses, the money amounts they carry, and the time ranges used to
//! select them.

pub mod expense;
pub mod money;
pub mod range;

pub use expense::{Expense, ExpenseId, NewExpense};
pub use money::{Money, MoneyParseError};
pub use range::TimeRange;
