//! Rolling seven-day report
//!
//! Combines the day buckets and the seven-day window from
//! [`crate::services::ranges`] into a dense daily series and a per-category
//! breakdown. Both figures are whole currency units, truncated toward zero.
//!
//! The two halves use different windows: the daily series covers seven full
//! calendar days while the breakdown stops at the current instant. Anything
//! dated later today shows up in the series but not in the breakdown.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

use crate::error::ExpenseResult;
use crate::models::{Expense, Money, TimeRange};
use crate::services::ranges::{last_7_day_buckets, last_7_days_range, DayBucket};
use crate::services::LiveQuery;
use crate::storage::ExpenseStore;

/// Whole-unit total of one day in the series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub label: String,
    pub date: NaiveDate,
    pub total: i64,
}

/// Category label to whole-unit total
pub type CategoryBreakdown = BTreeMap<String, i64>;

/// One entry per bucket, zero for days without expenses
///
/// Each bucket's sum is truncated once, after adding up its expenses.
pub fn daily_series(buckets: &[DayBucket], expenses: &[Expense]) -> Vec<DailyTotal> {
    buckets
        .iter()
        .map(|bucket| {
            let sum: Money = expenses
                .iter()
                .filter(|e| bucket.range.contains(e.occurred_at))
                .map(|e| e.amount)
                .sum();
            DailyTotal {
                label: bucket.label.clone(),
                date: bucket.date,
                total: sum.units(),
            }
        })
        .collect()
}

/// Per-category totals
///
/// Every amount is truncated before it is added, so a category of many
/// fractional expenses can come out lower than its truncated sum.
pub fn category_breakdown(expenses: &[Expense]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::new();
    for expense in expenses {
        let total = breakdown.entry(expense.category.clone()).or_insert(0);
        *total = total.saturating_add(expense.amount.units());
    }
    breakdown
}

/// Snapshot of the seven-day report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyReport {
    /// Instant the report was computed for, epoch milliseconds
    pub generated_at: i64,
    /// Window of the category breakdown
    pub range: TimeRange,
    pub daily_series: Vec<DailyTotal>,
    pub category_breakdown: CategoryBreakdown,
    /// Exact total over `range`
    pub total: Money,
}

/// Builds reports from an expense store
pub struct ReportComposer<'a> {
    store: &'a dyn ExpenseStore,
}

impl<'a> ReportComposer<'a> {
    /// Create a new report composer
    pub fn new(store: &'a dyn ExpenseStore) -> Self {
        Self { store }
    }

    /// Seven daily totals ending with today, oldest first
    pub fn daily_series<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ExpenseResult<Vec<DailyTotal>> {
        last_7_day_buckets(now)
            .into_iter()
            .map(|bucket| -> ExpenseResult<DailyTotal> {
                Ok(DailyTotal {
                    total: self.store.sum_by_range(bucket.range)?.units(),
                    label: bucket.label,
                    date: bucket.date,
                })
            })
            .collect()
    }

    /// Category totals from six days ago up to `now`
    pub fn category_breakdown<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> ExpenseResult<CategoryBreakdown> {
        let expenses = self.store.query_by_range(last_7_days_range(now))?;
        Ok(category_breakdown(&expenses))
    }

    /// Expenses to feed the CSV codec, newest first
    pub fn expenses_for_export(&self, range: TimeRange) -> ExpenseResult<Vec<Expense>> {
        self.store.query_by_range(range)
    }

    /// Build the full report
    pub fn weekly_report<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ExpenseResult<WeeklyReport> {
        let range = last_7_days_range(now);
        let expenses = self.store.query_by_range(range)?;

        Ok(WeeklyReport {
            generated_at: now.timestamp_millis(),
            range,
            daily_series: self.daily_series(now)?,
            category_breakdown: category_breakdown(&expenses),
            total: expenses.iter().map(|e| e.amount).sum(),
        })
    }

    /// Live version of the report
    pub fn watch<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ExpenseResult<LiveWeeklyReport<'a>> {
        let buckets = last_7_day_buckets(now);
        let covered = match (buckets.first(), buckets.last()) {
            (Some(first), Some(last)) => first.range.span(&last.range),
            _ => last_7_days_range(now),
        };

        let daily = LiveQuery::new(self.store, covered, move |expenses: &[Expense]| {
            daily_series(&buckets, expenses)
        })?;
        let categories = LiveQuery::new(self.store, last_7_days_range(now), category_breakdown)?;

        Ok(LiveWeeklyReport { daily, categories })
    }
}

/// The two report halves, each following the store on its own
pub struct LiveWeeklyReport<'a> {
    daily: LiveQuery<'a, Vec<DailyTotal>>,
    categories: LiveQuery<'a, CategoryBreakdown>,
}

impl LiveWeeklyReport<'_> {
    pub fn daily_series(&self) -> &[DailyTotal] {
        self.daily.value()
    }

    pub fn category_breakdown(&self) -> &CategoryBreakdown {
        self.categories.value()
    }

    /// Apply pending store changes; true if either half was recomputed
    pub fn refresh(&mut self) -> ExpenseResult<bool> {
        let daily = self.daily.refresh()?.is_some();
        let categories = self.categories.refresh()?.is_some();
        Ok(daily || categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewExpense;
    use crate::storage::ExpenseRepository;
    use chrono::Utc;

    fn at(day: u32, hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn spend(repo: &ExpenseRepository, title: &str, cents: i64, category: &str, when: i64) {
        repo.insert(NewExpense::new(title, Money::from_cents(cents), category, when))
            .unwrap();
    }

    fn seed(repo: &ExpenseRepository) {
        spend(repo, "Coffee", 500, "Food", at(10, 9, 0));
        spend(repo, "Bus", 200, "Travel", at(10, 12, 0));
        spend(repo, "Snack", 300, "Food", at(11, 8, 0));
    }

    fn totals(series: &[DailyTotal]) -> Vec<i64> {
        series.iter().map(|d| d.total).collect()
    }

    #[test]
    fn test_daily_series_is_dense() {
        let repo = ExpenseRepository::in_memory();
        seed(&repo);
        let composer = ReportComposer::new(&repo);
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 20, 0, 0).unwrap();

        let series = composer.daily_series(&now).unwrap();

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].label, "2025-01-05");
        assert_eq!(series[6].label, "2025-01-11");
        assert_eq!(totals(&series), vec![0, 0, 0, 0, 0, 7, 3]);
    }

    #[test]
    fn test_category_breakdown_over_window() {
        let repo = ExpenseRepository::in_memory();
        seed(&repo);
        // Outside the window
        spend(&repo, "Old", 10_000, "Food", at(4, 23, 59));
        let composer = ReportComposer::new(&repo);
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 20, 0, 0).unwrap();

        let breakdown = composer.category_breakdown(&now).unwrap();

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown["Food"], 8);
        assert_eq!(breakdown["Travel"], 2);
    }

    #[test]
    fn test_breakdown_of_huge_amounts_saturates() {
        let huge = Money::from_cents(i64::MAX);
        let expenses: Vec<_> = (1..=2)
            .map(|id| {
                NewExpense::new("Huge", huge, "Food", at(11, 7, 0))
                    .into_expense(crate::models::ExpenseId::new(id))
            })
            .collect();

        assert_eq!(category_breakdown(&expenses)["Food"], i64::MAX);
    }

    #[test]
    fn test_truncation_differs_between_halves() {
        let repo = ExpenseRepository::in_memory();
        spend(&repo, "Tea", 275, "Food", at(11, 7, 0));
        spend(&repo, "Tea", 275, "Food", at(11, 8, 0));
        let composer = ReportComposer::new(&repo);
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 20, 0, 0).unwrap();

        let report = composer.weekly_report(&now).unwrap();

        assert_eq!(report.daily_series[6].total, 5);
        assert_eq!(report.category_breakdown["Food"], 4);
        assert_eq!(report.total, Money::from_cents(550));
    }

    #[test]
    fn test_later_today_only_in_daily_series() {
        let repo = ExpenseRepository::in_memory();
        spend(&repo, "Dinner", 1_200, "Food", at(11, 21, 0));
        let composer = ReportComposer::new(&repo);
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 8, 30, 0).unwrap();

        let report = composer.weekly_report(&now).unwrap();

        assert_eq!(report.daily_series[6].total, 12);
        assert!(report.category_breakdown.is_empty());
        assert!(report.total.is_zero());
        assert_eq!(report.range.end(), now.timestamp_millis());
    }

    #[test]
    fn test_empty_store_report() {
        let repo = ExpenseRepository::in_memory();
        let composer = ReportComposer::new(&repo);
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 8, 30, 0).unwrap();

        let report = composer.weekly_report(&now).unwrap();

        assert_eq!(totals(&report.daily_series), vec![0; 7]);
        assert!(report.category_breakdown.is_empty());
    }

    #[test]
    fn test_expenses_for_export_newest_first() {
        let repo = ExpenseRepository::in_memory();
        seed(&repo);
        let composer = ReportComposer::new(&repo);

        let titles: Vec<_> = composer
            .expenses_for_export(TimeRange::all())
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();

        assert_eq!(titles, vec!["Snack", "Bus", "Coffee"]);
    }

    #[test]
    fn test_live_report_matches_plain_report() {
        let repo = ExpenseRepository::in_memory();
        let composer = ReportComposer::new(&repo);
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 20, 0, 0).unwrap();
        let mut live = composer.watch(&now).unwrap();
        assert_eq!(totals(live.daily_series()), vec![0; 7]);

        seed(&repo);
        assert!(live.refresh().unwrap());

        let report = composer.weekly_report(&now).unwrap();
        assert_eq!(live.daily_series(), report.daily_series.as_slice());
        assert_eq!(live.category_breakdown(), &report.category_breakdown);
        assert!(!live.refresh().unwrap());
    }

    #[test]
    fn test_live_daily_series_sees_later_today() {
        let repo = ExpenseRepository::in_memory();
        let composer = ReportComposer::new(&repo);
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 8, 0, 0).unwrap();
        let mut live = composer.watch(&now).unwrap();

        spend(&repo, "Dinner", 900, "Food", at(11, 21, 0));

        assert!(live.refresh().unwrap());
        assert_eq!(live.daily_series()[6].total, 9);
        assert!(live.category_breakdown().is_empty());
    }
}
