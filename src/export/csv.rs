//! CSV export of expenses
//!
//! Produces `title,amount,category,date,notes` documents. Title and notes are
//! quoted when they contain a comma, a double quote or a newline; embedded
//! quotes are doubled. Amounts are plain decimals without a currency symbol.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeZone;
use tracing::info;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;
use crate::services::ranges::to_zoned;

/// First line of every export
pub const CSV_HEADER: &str = "title,amount,category,date,notes";

/// Date and time pattern of the `date` column
pub const CSV_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

pub const CSV_MIME_TYPE: &str = "text/csv";

/// Quote a field if it would otherwise break the row
pub fn escape_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Encode expenses as a CSV document, one row per expense in input order
pub fn encode<Tz>(expenses: &[Expense], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + expenses.len() * 48);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for expense in expenses {
        let date = to_zoned(tz, expense.occurred_at)
            .map(|dt| dt.format(CSV_DATE_FORMAT).to_string())
            .unwrap_or_default();

        out.push_str(&format!(
            "{},{},{},{},{}\n",
            escape_field(&expense.title),
            expense.amount,
            expense.category,
            date,
            escape_field(expense.notes.as_deref().unwrap_or_default()),
        ));
    }

    out
}

/// Suggested file name for an export made at `now_ms`
pub fn export_file_name(now_ms: i64) -> String {
    format!("expenses_{}.csv", now_ms)
}

/// Write an encoded document into `dir`, returning the file path
pub fn write_export(dir: &Path, csv: &str, now_ms: i64) -> ExpenseResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| {
        ExpenseError::Export(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(export_file_name(now_ms));
    fs::write(&path, csv).map_err(|e| {
        ExpenseError::Export(format!("Failed to write {}: {}", path.display(), e))
    })?;

    info!(path = %path.display(), bytes = csv.len(), "export written");
    Ok(path)
}
