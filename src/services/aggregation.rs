//! Aggregation engine
//!
//! Sums and groupings over the expenses matched by a time range. The free
//! functions work on any slice; [`AggregationEngine`] runs them against a
//! store, either once or as a [`LiveQuery`] that follows store changes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, Money, TimeRange};
use crate::storage::ExpenseStore;

use super::live::LiveQuery;
use super::ranges::{local_date, DAY_LABEL_FORMAT};

/// Key of the single group produced by [`GroupBy::None`]
pub const ALL_EXPENSES_LABEL: &str = "All expenses";

/// Dimension used to partition expenses before summing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Everything in one group
    #[default]
    None,
    /// One group per distinct category label
    Category,
    /// One group per local calendar day
    Date,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Category => write!(f, "category"),
            Self::Date => write!(f, "date"),
        }
    }
}

impl FromStr for GroupBy {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "category" => Ok(Self::Category),
            "date" => Ok(Self::Date),
            other => Err(ExpenseError::Validation(format!(
                "Unknown grouping '{}'. Use none, category or date",
                other
            ))),
        }
    }
}

/// Partial sum and entry count of one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub sum: Money,
    pub count: usize,
}

impl GroupTotal {
    fn add(&mut self, amount: Money) {
        self.sum += amount;
        self.count += 1;
    }
}

/// A group of expenses as shown in a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseGroup {
    pub key: String,
    pub total: GroupTotal,
    pub expenses: Vec<Expense>,
}

/// Sum of all amounts; zero for an empty slice
pub fn sum_total(expenses: &[Expense]) -> Money {
    expenses.iter().map(|e| e.amount).sum()
}

/// Key of the group an expense belongs to
pub fn group_key<Tz: TimeZone>(expense: &Expense, by: GroupBy, tz: &Tz) -> String {
    match by {
        GroupBy::None => ALL_EXPENSES_LABEL.to_string(),
        GroupBy::Category => expense.category.clone(),
        GroupBy::Date => local_date(tz, expense.occurred_at)
            .map(|date| date.format(DAY_LABEL_FORMAT).to_string())
            .unwrap_or_default(),
    }
}

/// Map of group key to (sum, count)
///
/// Groups are derived from the data. [`GroupBy::None`] always yields its one
/// group, with a zero total when nothing matched.
pub fn group_totals<Tz: TimeZone>(
    expenses: &[Expense],
    by: GroupBy,
    tz: &Tz,
) -> BTreeMap<String, GroupTotal> {
    let mut totals: BTreeMap<String, GroupTotal> = BTreeMap::new();
    if by == GroupBy::None {
        totals.insert(ALL_EXPENSES_LABEL.to_string(), GroupTotal::default());
    }

    for expense in expenses {
        totals
            .entry(group_key(expense, by, tz))
            .or_default()
            .add(expense.amount);
    }

    totals
}

/// Partition expenses into groups for display
///
/// Groups appear in order of first appearance and items keep their input
/// order; fed with store output that means newest first on both levels.
pub fn group_expenses<Tz: TimeZone>(
    expenses: &[Expense],
    by: GroupBy,
    tz: &Tz,
) -> Vec<ExpenseGroup> {
    let mut groups: Vec<ExpenseGroup> = Vec::new();

    for expense in expenses {
        let key = group_key(expense, by, tz);
        let index = match groups.iter().position(|g| g.key == key) {
            Some(index) => index,
            None => {
                groups.push(ExpenseGroup {
                    key,
                    total: GroupTotal::default(),
                    expenses: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        group.total.add(expense.amount);
        group.expenses.push(expense.clone());
    }

    groups
}

/// Runs aggregations against an expense store
pub struct AggregationEngine<'a> {
    store: &'a dyn ExpenseStore,
}

impl<'a> AggregationEngine<'a> {
    /// Create a new aggregation engine
    pub fn new(store: &'a dyn ExpenseStore) -> Self {
        Self { store }
    }

    /// Sum of amounts over the range
    pub fn sum_total(&self, range: TimeRange) -> ExpenseResult<Money> {
        self.store.sum_by_range(range)
    }

    /// Group totals over the range
    pub fn group_totals<Tz: TimeZone>(
        &self,
        range: TimeRange,
        by: GroupBy,
        tz: &Tz,
    ) -> ExpenseResult<BTreeMap<String, GroupTotal>> {
        let expenses = self.store.query_by_range(range)?;
        Ok(group_totals(&expenses, by, tz))
    }

    /// Grouped expenses over the range
    pub fn group_expenses<Tz: TimeZone>(
        &self,
        range: TimeRange,
        by: GroupBy,
        tz: &Tz,
    ) -> ExpenseResult<Vec<ExpenseGroup>> {
        let expenses = self.store.query_by_range(range)?;
        Ok(group_expenses(&expenses, by, tz))
    }

    /// Live total over a range
    pub fn watch_total(&self, range: TimeRange) -> ExpenseResult<LiveQuery<'a, Money>> {
        LiveQuery::new(self.store, range, sum_total)
    }

    /// Live list of the expenses in a range
    pub fn watch_expenses(&self, range: TimeRange) -> ExpenseResult<LiveQuery<'a, Vec<Expense>>> {
        LiveQuery::new(self.store, range, |expenses: &[Expense]| expenses.to_vec())
    }

    /// Live group totals over a range
    pub fn watch_group_totals<Tz>(
        &self,
        range: TimeRange,
        by: GroupBy,
        tz: Tz,
    ) -> ExpenseResult<LiveQuery<'a, BTreeMap<String, GroupTotal>>>
    where
        Tz: TimeZone + 'a,
    {
        LiveQuery::new(self.store, range, move |expenses: &[Expense]| {
            group_totals(expenses, by, &tz)
        })
    }
}
