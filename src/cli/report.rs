//! CLI commands for reports

use clap::{Args, ValueEnum};
use chrono::TimeZone;

use crate::display::format_weekly_report;
use crate::error::{ExpenseError, ExpenseResult};
use crate::reports::ReportComposer;

use super::CliContext;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    /// Bar chart and category table
    Text,
    /// Machine-readable JSON
    Json,
    /// Human-readable YAML
    Yaml,
}

/// Arguments for `report`
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

/// Handle `report`: the rolling seven-day report
pub fn handle_report_command<Tz: TimeZone>(
    ctx: &CliContext<'_, Tz>,
    args: ReportArgs,
) -> ExpenseResult<()> {
    let report = ReportComposer::new(ctx.store).weekly_report(&ctx.now())?;

    match args.format {
        ReportFormat::Text => print!("{}", format_weekly_report(&report, ctx.currency())),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        ReportFormat::Yaml => {
            let yaml = serde_yaml::to_string(&report)
                .map_err(|e| ExpenseError::Export(format!("YAML serialization failed: {}", e)))?;
            print!("{}", yaml);
        }
    }

    Ok(())
}
