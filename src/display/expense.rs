//! Expense display formatting
//!
//! Register rows, grouped lists and the detail view for expenses.

use std::fmt::Display;

use chrono::TimeZone;

use crate::models::Expense;
use crate::services::ranges::to_zoned;
use crate::services::ExpenseGroup;

use super::report::truncate;

const ROW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_when<Tz>(tz: &Tz, epoch_ms: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    to_zoned(tz, epoch_ms)
        .map(|dt| dt.format(ROW_DATE_FORMAT).to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Format a single expense for display (register row)
pub fn format_expense_row<Tz>(expense: &Expense, tz: &Tz, symbol: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let notes_indicator = if expense.notes.is_some() { " ✎" } else { "" };

    format!(
        "{:>5} {} {:<24} {:>12}  {}{}",
        format!("#{}", expense.id),
        format_when(tz, expense.occurred_at),
        truncate(&expense.title, 24),
        expense.amount.format_with_symbol(symbol),
        expense.category,
        notes_indicator
    )
}

fn list_header() -> String {
    let mut output = format!(
        "{:>5} {:16} {:<24} {:>12}  {}\n",
        "ID", "When", "Title", "Amount", "Category"
    );
    output.push_str(&"-".repeat(72));
    output.push('\n');
    output
}

/// Format a list of expenses as a register
pub fn format_expense_list<Tz>(expenses: &[Expense], tz: &Tz, symbol: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = list_header();
    for expense in expenses {
        output.push_str(&format_expense_row(expense, tz, symbol));
        output.push('\n');
    }
    output
}

/// Format grouped expenses, each group headed by its total
pub fn format_grouped_list<Tz>(groups: &[ExpenseGroup], tz: &Tz, symbol: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if groups.iter().all(|g| g.expenses.is_empty()) {
        return "No expenses found.\n".to_string();
    }

    let mut output = list_header();
    for group in groups {
        output.push_str(&format!(
            "\n{} ({} {}) {}\n",
            group.key,
            group.total.count,
            if group.total.count == 1 { "item" } else { "items" },
            group.total.sum.format_with_symbol(symbol)
        ));
        for expense in &group.expenses {
            output.push_str(&format_expense_row(expense, tz, symbol));
            output.push('\n');
        }
    }
    output
}

/// Format expense details for display
pub fn format_expense_details<Tz>(expense: &Expense, tz: &Tz, symbol: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut output = String::new();

    output.push_str(&format!("Expense:  #{}\n", expense.id));
    output.push_str(&format!("Title:    {}\n", expense.title));
    output.push_str(&format!(
        "Amount:   {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Category: {}\n", expense.category));
    output.push_str(&format!("When:     {}\n", format_when(tz, expense.occurred_at)));

    if let Some(notes) = &expense.notes {
        output.push_str(&format!("Notes:    {}\n", notes));
    }
    if let Some(receipt) = &expense.receipt_path {
        output.push_str(&format!("Receipt:  {}\n", receipt));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseId, Money, NewExpense};
    use crate::services::aggregation::group_expenses;
    use crate::services::GroupBy;
    use chrono::Utc;

    fn lunch() -> Expense {
        let at = Utc
            .with_ymd_and_hms(2025, 1, 15, 13, 5, 0)
            .unwrap()
            .timestamp_millis();
        NewExpense::new("Lunch", Money::from_cents(1250), "Food", at)
            .with_notes("team")
            .into_expense(ExpenseId::new(3))
    }

    #[test]
    fn test_row_contains_fields() {
        let row = format_expense_row(&lunch(), &Utc, "₹");
        assert!(row.contains("#3"));
        assert!(row.contains("2025-01-15 13:05"));
        assert!(row.contains("₹12.50"));
        assert!(row.contains("Food"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_expense_list(&[], &Utc, "₹"), "No expenses found.\n");
        assert_eq!(format_grouped_list(&[], &Utc, "₹"), "No expenses found.\n");
    }

    #[test]
    fn test_grouped_list_shows_group_totals() {
        let groups = group_expenses(&[lunch()], GroupBy::Category, &Utc);
        let output = format_grouped_list(&groups, &Utc, "$");
        assert!(output.contains("Food (1 item) $12.50"));
        assert!(output.contains("Lunch"));
    }

    #[test]
    fn test_details_include_optional_fields() {
        let output = format_expense_details(&lunch(), &Utc, "₹");
        assert!(output.contains("Notes:    team"));
        assert!(!output.contains("Receipt"));
    }
}
