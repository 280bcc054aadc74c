//! Report formatting utilities for terminal output

use crate::reports::WeeklyReport;

const BAR_WIDTH: usize = 30;

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Format the seven-day report: a bar per day, then totals per category
pub fn format_weekly_report(report: &WeeklyReport, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str("Last 7 days\n");
    output.push_str(&separator(50));
    output.push('\n');

    let max = report
        .daily_series
        .iter()
        .map(|d| d.total)
        .max()
        .unwrap_or(0);

    for day in &report.daily_series {
        output.push_str(&format!(
            "{} {} {}{}\n",
            day.label,
            format_bar(day.total as f64, max as f64, BAR_WIDTH),
            symbol,
            day.total
        ));
    }

    output.push_str("\nBy category\n");
    output.push_str(&separator(50));
    output.push('\n');

    if report.category_breakdown.is_empty() {
        output.push_str("No expenses in the last 7 days.\n");
    } else {
        let mut categories: Vec<_> = report.category_breakdown.iter().collect();
        // Largest first, ties alphabetical
        categories.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (category, total) in categories {
            output.push_str(&format!(
                "{:<24} {:>12}\n",
                truncate(category, 24),
                format!("{}{}", symbol, total)
            ));
        }
    }

    output.push_str(&separator(50));
    output.push('\n');
    output.push_str(&format!(
        "{:<24} {:>12}\n",
        "Total",
        report.total.format_with_symbol(symbol)
    ));

    output
}
