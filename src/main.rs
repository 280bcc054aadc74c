use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use expense_tracker::cli::{
    handle_add_command, handle_export_command, handle_list_command, handle_report_command,
    handle_show_command, AddArgs, CliContext, ExportArgs, ListArgs, ReportArgs,
};
use expense_tracker::config::{ExpensePaths, Settings};
use expense_tracker::storage::ExpenseRepository;

#[derive(Parser)]
#[command(
    name = "expenses",
    version,
    about = "Track daily expenses from the terminal",
    long_about = "Record expenses, browse them by day, category or date, \
                  see a rolling seven-day report and export everything as CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new expense
    Add(AddArgs),

    /// List expenses, optionally grouped
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one expense in detail
    Show {
        /// Expense ID, e.g. 3 or #3
        id: String,
    },

    /// Daily totals and category breakdown for the last seven days
    Report(ReportArgs),

    /// Export expenses as CSV
    Export(ExportArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    // Logs go to stderr so exported CSV on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = ExpensePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let store = ExpenseRepository::new(paths.expenses_file());
    store.load()?;

    match settings.time_zone()? {
        Some(tz) => run(
            cli.command,
            &CliContext {
                store: &store,
                paths: &paths,
                settings: &settings,
                tz,
            },
        ),
        None => run(
            cli.command,
            &CliContext {
                store: &store,
                paths: &paths,
                settings: &settings,
                tz: Local,
            },
        ),
    }
}

fn run<Tz>(command: Option<Commands>, ctx: &CliContext<'_, Tz>) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match command {
        Some(Commands::Add(args)) => handle_add_command(ctx, args)?,
        Some(Commands::List(args)) => handle_list_command(ctx, args)?,
        Some(Commands::Show { id }) => handle_show_command(ctx, &id)?,
        Some(Commands::Report(args)) => handle_report_command(ctx, args)?,
        Some(Commands::Export(args)) => handle_export_command(ctx, args)?,
        Some(Commands::Config) => show_config(ctx)?,
        None => {
            println!("expenses - track daily expenses from the terminal");
            println!();
            println!("Run 'expenses --help' for usage information.");
        }
    }

    Ok(())
}

fn show_config<Tz: TimeZone>(ctx: &CliContext<'_, Tz>) -> Result<()> {
    let paths = ctx.paths;
    let settings = ctx.settings;

    if !paths.settings_file().exists() {
        settings.save(paths)?;
        println!("Created default settings.");
        println!();
    }

    println!("Expense Tracker Configuration");
    println!("=============================");
    println!("Base directory:   {}", paths.base_dir().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!("Expenses file:    {}", paths.expenses_file().display());
    println!("Export directory: {}", settings.export_dir(paths).display());
    println!();
    println!("Settings:");
    println!("  Currency symbol:  {}", settings.currency_symbol);
    println!("  Default category: {}", settings.default_category);
    println!(
        "  Categories:       {}",
        settings.category_suggestions.join(", ")
    );
    println!(
        "  Time zone:        {}",
        settings.timezone.as_deref().unwrap_or("system local")
    );

    Ok(())
}
