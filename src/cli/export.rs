//! CLI commands for data export
//!
//! Writes the selected expenses as CSV, either to a file in the export
//! directory or to stdout.

use std::fmt::Display;
use std::path::PathBuf;

use chrono::TimeZone;
use clap::{Args, ValueEnum};
use tracing::debug;

use crate::error::{ExpenseError, ExpenseResult};
use crate::export::{encode, write_export, CSV_MIME_TYPE};
use crate::models::TimeRange;
use crate::reports::ReportComposer;
use crate::services::ranges;

use super::{parse_date, CliContext};

/// Which expenses to export
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportRange {
    /// Today's expenses
    Today,
    /// The last seven days up to now
    Week,
    /// Everything
    All,
    /// One day, given with --date
    Date,
}

/// Arguments for `export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Which expenses to export
    #[arg(short, long, value_enum, default_value = "all")]
    pub range: ExportRange,

    /// Day to export with --range date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Directory to write the file to (defaults to the configured export dir)
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the CSV instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Handle `export`
pub fn handle_export_command<Tz>(ctx: &CliContext<'_, Tz>, args: ExportArgs) -> ExpenseResult<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let now = ctx.now();
    let range = match args.range {
        ExportRange::Today => ranges::today_range(&now),
        ExportRange::Week => ranges::last_7_days_range(&now),
        ExportRange::All => TimeRange::all(),
        ExportRange::Date => {
            let date = args.date.as_deref().ok_or_else(|| {
                ExpenseError::Validation("--range date needs --date YYYY-MM-DD".into())
            })?;
            ranges::day_range(&ctx.tz, parse_date(date)?)
        }
    };

    let expenses = ReportComposer::new(ctx.store).expenses_for_export(range)?;
    let csv = encode(&expenses, &ctx.tz);
    debug!(%range, rows = expenses.len(), "encoded export");

    if args.stdout {
        print!("{}", csv);
        return Ok(());
    }

    let dir = args
        .output
        .unwrap_or_else(|| ctx.settings.export_dir(ctx.paths));
    let path = write_export(&dir, &csv, now.timestamp_millis())?;

    println!(
        "Exported {} expense{} to: {}",
        expenses.len(),
        if expenses.len() == 1 { "" } else { "s" },
        path.display()
    );
    println!("Content type: {}", CSV_MIME_TYPE);
    Ok(())
}
