//! Expense model
//!
//! A single recorded spending event. Records are immutable once stored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// Store-assigned surrogate key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(i64);

impl ExpenseId {
    /// Wrap a raw id
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw id
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpenseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().trim_start_matches('#').parse()?))
    }
}

/// A stored expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier, assigned on insert
    pub id: ExpenseId,

    /// Display title (non-empty)
    pub title: String,

    /// Amount spent (positive)
    pub amount: Money,

    /// Free-text category label
    pub category: String,

    /// Optional notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the expense happened, epoch milliseconds
    pub occurred_at: i64,

    /// Opaque reference to a receipt image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_path: Option<String>,
}

/// Insert payload: an expense that has not been given an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub title: String,
    pub amount: Money,
    pub category: String,
    pub notes: Option<String>,
    pub occurred_at: i64,
    pub receipt_path: Option<String>,
}

impl NewExpense {
    /// Create an expense payload without notes or receipt
    pub fn new(
        title: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
        occurred_at: i64,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            category: category.into(),
            notes: None,
            occurred_at,
            receipt_path: None,
        }
    }

    /// Attach notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach a receipt reference
    pub fn with_receipt(mut self, receipt_path: impl Into<String>) -> Self {
        self.receipt_path = Some(receipt_path.into());
        self
    }

    /// Turn into a stored expense with the given id
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            title: self.title,
            amount: self.amount,
            category: self.category,
            notes: self.notes,
            occurred_at: self.occurred_at,
            receipt_path: self.receipt_path,
        }
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {} ({})", self.id, self.title, self.amount, self.category)
    }
}
