//! CLI commands for recording and browsing expenses

use std::fmt::Display;

use chrono::{NaiveDate, TimeZone};
use clap::{Args, ValueEnum};

use crate::display::{format_expense_details, format_expense_list, format_grouped_list};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{ExpenseId, TimeRange};
use crate::services::aggregation::sum_total;
use crate::services::{
    ranges, AggregationEngine, EntryOutcome, ExpenseDraft, ExpenseService, GroupBy,
};

use super::{parse_date, CliContext};

/// Arguments for `add`
#[derive(Args, Debug)]
pub struct AddArgs {
    /// What the money was spent on
    pub title: String,

    /// Amount, e.g. 12.50
    pub amount: String,

    /// Category label (defaults to the configured default category)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Free-text notes
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Path to a receipt image
    #[arg(long)]
    pub receipt: Option<String>,
}

/// Grouping options for `list`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupArg {
    /// A single list
    None,
    /// One section per category
    Category,
    /// One section per day
    Date,
}

impl From<GroupArg> for GroupBy {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::None => GroupBy::None,
            GroupArg::Category => GroupBy::Category,
            GroupArg::Date => GroupBy::Date,
        }
    }
}

/// Arguments for `list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only today's expenses
    #[arg(long, conflicts_with_all = ["date", "from", "to"])]
    pub today: bool,

    /// Only expenses on this day (YYYY-MM-DD)
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    pub date: Option<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// How to group the listed expenses
    #[arg(short, long, value_enum, default_value = "none")]
    pub group: GroupArg,
}

/// Handle `add`
pub fn handle_add_command<Tz>(ctx: &CliContext<'_, Tz>, args: AddArgs) -> ExpenseResult<()>
where
    Tz: TimeZone,
{
    let service = ExpenseService::new(
        ctx.store,
        ctx.tz.clone(),
        ctx.settings.default_category.as_str(),
    );

    let mut draft = ExpenseDraft::new(args.title, args.amount);
    if let Some(category) = args.category {
        draft = draft.category(category);
    }
    if let Some(notes) = args.notes {
        draft = draft.notes(notes);
    }
    if let Some(receipt) = args.receipt {
        draft = draft.receipt(receipt);
    }

    let now = ctx.now();
    match service.record(draft, now.timestamp_millis())? {
        EntryOutcome::Recorded(expense) => {
            println!(
                "Recorded #{}: {} {} ({})",
                expense.id,
                expense.title,
                expense.amount.format_with_symbol(ctx.currency()),
                expense.category
            );
            let today = service.total(ranges::today_range(&now))?;
            println!("Spent today: {}", today.format_with_symbol(ctx.currency()));
            Ok(())
        }
        EntryOutcome::Rejected(reason) => Err(ExpenseError::Validation(reason.to_string())),
    }
}

/// Handle `list`
pub fn handle_list_command<Tz>(ctx: &CliContext<'_, Tz>, args: ListArgs) -> ExpenseResult<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let range = list_range(ctx, &args)?;
    let by = GroupBy::from(args.group);

    if by == GroupBy::None {
        let expenses = ctx.store.query_by_range(range)?;
        print!("{}", format_expense_list(&expenses, &ctx.tz, ctx.currency()));
        if !expenses.is_empty() {
            println!();
            println!(
                "Total: {}",
                sum_total(&expenses).format_with_symbol(ctx.currency())
            );
        }
    } else {
        let groups = AggregationEngine::new(ctx.store).group_expenses(range, by, &ctx.tz)?;
        print!("{}", format_grouped_list(&groups, &ctx.tz, ctx.currency()));
    }

    Ok(())
}

fn list_range<Tz: TimeZone>(ctx: &CliContext<'_, Tz>, args: &ListArgs) -> ExpenseResult<TimeRange> {
    if args.today {
        return Ok(ranges::today_range(&ctx.now()));
    }
    if let Some(date) = &args.date {
        return Ok(ranges::day_range(&ctx.tz, parse_date(date)?));
    }

    let from = args.from.as_deref().map(parse_date).transpose()?;
    let to = args.to.as_deref().map(parse_date).transpose()?;
    days_between(&ctx.tz, from, to)
}

/// Inclusive range from the start of `from` to the end of `to`; open ends are unbounded
fn days_between<Tz: TimeZone>(
    tz: &Tz,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ExpenseResult<TimeRange> {
    let start = from.map_or(i64::MIN, |d| ranges::day_range(tz, d).start());
    let end = to.map_or(i64::MAX, |d| ranges::day_range(tz, d).end());
    TimeRange::new(start, end)
}

/// Handle `show`
pub fn handle_show_command<Tz>(ctx: &CliContext<'_, Tz>, id: &str) -> ExpenseResult<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let id: ExpenseId = id
        .parse()
        .map_err(|_| ExpenseError::Validation(format!("Invalid expense id '{}'", id)))?;
    let service = ExpenseService::new(
        ctx.store,
        ctx.tz.clone(),
        ctx.settings.default_category.as_str(),
    );
    let expense = service.find(id)?;

    print!("{}", format_expense_details(&expense, &ctx.tz, ctx.currency()));
    Ok(())
}
