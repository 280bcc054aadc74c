//! Expense service
//!
//! Turns raw entry input into stored expenses and answers the list and
//! running-total questions of the entry and list views.

use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt;
use tracing::debug;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, ExpenseId, Money, NewExpense, TimeRange};
use crate::storage::ExpenseStore;

use super::live::LiveQuery;
use super::ranges;

/// Raw input from the entry form, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: String,
    pub category: String,
    pub notes: String,
    pub receipt_path: Option<String>,
}

impl ExpenseDraft {
    /// Create a draft with a title and amount
    pub fn new(title: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn receipt(mut self, receipt_path: impl Into<String>) -> Self {
        self.receipt_path = Some(receipt_path.into());
        self
    }
}

/// Why a draft was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BlankTitle,
    NonPositiveAmount,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "Title must not be blank"),
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
        }
    }
}

/// Result of submitting a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Recorded(Expense),
    Rejected(Rejection),
}

impl EntryOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Service for recording and listing expenses
pub struct ExpenseService<'a, Tz: TimeZone> {
    store: &'a dyn ExpenseStore,
    tz: Tz,
    default_category: String,
}

impl<'a, Tz: TimeZone> ExpenseService<'a, Tz> {
    /// Create a new expense service
    pub fn new(store: &'a dyn ExpenseStore, tz: Tz, default_category: impl Into<String>) -> Self {
        Self {
            store,
            tz,
            default_category: default_category.into(),
        }
    }

    /// Validate a draft and store it
    ///
    /// A blank title or an amount that is not a positive number rejects the
    /// draft without touching the store. Store failures are returned as
    /// errors and never retried.
    pub fn record(&self, draft: ExpenseDraft, occurred_at: i64) -> ExpenseResult<EntryOutcome> {
        let title = draft.title.trim();
        if title.is_empty() {
            debug!("draft rejected: blank title");
            return Ok(EntryOutcome::Rejected(Rejection::BlankTitle));
        }

        let amount = Money::parse(&draft.amount).unwrap_or_default();
        if !amount.is_positive() {
            debug!(amount = %draft.amount, "draft rejected: amount not positive");
            return Ok(EntryOutcome::Rejected(Rejection::NonPositiveAmount));
        }

        let category = match draft.category.trim() {
            "" => self.default_category.as_str(),
            category => category,
        };

        let mut expense = NewExpense::new(title, amount, category, occurred_at);
        if let Some(notes) = non_blank(&draft.notes) {
            expense = expense.with_notes(notes);
        }
        if let Some(receipt) = draft.receipt_path.as_deref().and_then(non_blank) {
            expense = expense.with_receipt(receipt);
        }

        let saved = self.store.insert(expense)?;
        Ok(EntryOutcome::Recorded(saved))
    }

    /// Find an expense by id
    pub fn find(&self, id: ExpenseId) -> ExpenseResult<Expense> {
        self.store
            .query_by_range(TimeRange::all())?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))
    }

    /// Expenses in a range, newest first
    pub fn list(&self, range: TimeRange) -> ExpenseResult<Vec<Expense>> {
        self.store.query_by_range(range)
    }

    /// Total spent in a range
    pub fn total(&self, range: TimeRange) -> ExpenseResult<Money> {
        self.store.sum_by_range(range)
    }

    /// Running total for the day containing `now`
    pub fn watch_total_today(&self, now: &DateTime<Tz>) -> ExpenseResult<LiveQuery<'a, Money>> {
        LiveQuery::new(self.store, ranges::today_range(now), |expenses: &[Expense]| {
            expenses.iter().map(|e| e.amount).sum()
        })
    }

    /// Full-day range for a picked calendar date
    pub fn day_range(&self, date: NaiveDate) -> TimeRange {
        ranges::day_range(&self.tz, date)
    }

    pub fn time_zone(&self) -> &Tz {
        &self.tz
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
