//! Console rendering: fixed-width text tables for listings and the import
//! report. Renderers return `String`s; the binary prints them.

use std::fmt::Write;

use crate::import::ImportReport;
use crate::store::{Category, CategoryTotal, ExpenseRow};

const ID_WIDTH: usize = 5;
const AMOUNT_WIDTH: usize = 12;
const DATE_WIDTH: usize = 12;
const CATEGORY_WIDTH: usize = 18;
const DESCRIPTION_WIDTH: usize = 40;

/// Truncate long cell content so it cannot break the table layout.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}

pub fn render_expense_table(rows: &[ExpenseRow]) -> String {
    if rows.is_empty() {
        return "The expense log is empty.\n".to_string();
    }

    let header = format!(
        "{:<ID_WIDTH$} | {:<AMOUNT_WIDTH$} | {:<DATE_WIDTH$} | {:<CATEGORY_WIDTH$} | {:<DESCRIPTION_WIDTH$}",
        "ID", "Amount", "Date", "Category", "Description",
    );
    let separator = "=".repeat(header.chars().count());

    let mut out = String::new();
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{separator}");

    for row in rows {
        let description = row.description.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "{:<ID_WIDTH$} | {:<AMOUNT_WIDTH$} | {:<DATE_WIDTH$} | {:<CATEGORY_WIDTH$} | {:<DESCRIPTION_WIDTH$}",
            row.id,
            format_amount(row.amount),
            row.date.to_string(),
            truncate(&row.category, CATEGORY_WIDTH),
            truncate(description, DESCRIPTION_WIDTH),
        );
    }

    let _ = writeln!(out, "{separator}");
    out
}

pub fn render_category_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<ID_WIDTH$} | Name", "ID");
    let _ = writeln!(out, "{}", "-".repeat(ID_WIDTH + 3 + CATEGORY_WIDTH));
    for category in categories {
        let _ = writeln!(out, "{:<ID_WIDTH$} | {}", category.id, category.name);
    }
    out
}

pub fn render_summary_table(totals: &[CategoryTotal]) -> String {
    if totals.is_empty() {
        return "No categories yet.\n".to_string();
    }

    let header = format!(
        "{:<CATEGORY_WIDTH$} | {:>8} | {:>AMOUNT_WIDTH$}",
        "Category", "Count", "Total",
    );
    let separator = "-".repeat(header.chars().count());

    let mut out = String::new();
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{separator}");

    let mut grand_total = 0.0;
    for total in totals {
        grand_total += total.total;
        let _ = writeln!(
            out,
            "{:<CATEGORY_WIDTH$} | {:>8} | {:>AMOUNT_WIDTH$}",
            truncate(&total.category, CATEGORY_WIDTH),
            total.count,
            format_amount(total.total),
        );
    }

    let _ = writeln!(out, "{separator}");
    let _ = writeln!(
        out,
        "{:<CATEGORY_WIDTH$} | {:>8} | {:>AMOUNT_WIDTH$}",
        "Total",
        totals.iter().map(|t| t.count).sum::<i64>(),
        format_amount(grand_total),
    );
    out
}

pub fn render_import_report(report: &ImportReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "✓ Imported: {} expense(s)", report.imported);
    if report.duplicates > 0 {
        let _ = writeln!(out, "✓ Skipped duplicates: {}", report.duplicates);
    }
    if !report.categories_created.is_empty() {
        let _ = writeln!(
            out,
            "✓ New categories: {}",
            report.categories_created.join(", ")
        );
    }

    if report.failures.is_empty() {
        let _ = writeln!(out, "✓ Rejected: 0 row(s)");
    } else {
        let _ = writeln!(out, "✗ Rejected: {} row(s)", report.rejected());
        for failure in &report.failures {
            if failure.content.is_empty() {
                let _ = writeln!(out, "  row {}: {}", failure.row, failure.error);
            } else {
                let _ = writeln!(
                    out,
                    "  row {}: {} [{}]",
                    failure.row,
                    failure.error,
                    truncate(&failure.content, 60)
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::import::RowFailure;
    use chrono::NaiveDate;

    fn sample_row(id: i64, amount: f64, category: &str, description: Option<&str>) -> ExpenseRow {
        ExpenseRow {
            id,
            date: NaiveDate::from_ymd_opt(2023, 11, 20).unwrap(),
            amount,
            category: category.to_string(),
            description: description.map(String::from),
        }
    }

    #[test]
    fn test_expense_table_contains_fields() {
        let rows = vec![
            sample_row(1, 25.50, "Food", Some("Big weekend food shop")),
            sample_row(2, -12.99, "Food", Some("refund")),
        ];

        let table = render_expense_table(&rows);
        assert!(table.contains("$25.50"));
        assert!(table.contains("-$12.99"));
        assert!(table.contains("2023-11-20"));
        assert!(table.contains("Food"));
        assert!(table.contains("Big weekend food shop"));
        assert!(table.contains("ID"));
    }

    #[test]
    fn test_expense_table_truncates_long_descriptions() {
        let long = "x".repeat(100);
        let rows = vec![sample_row(1, 1.0, "Misc", Some(long.as_str()))];

        let table = render_expense_table(&rows);
        assert!(!table.contains(&long));
        assert!(table.contains("..."));
    }

    #[test]
    fn test_empty_expense_table() {
        assert_eq!(render_expense_table(&[]), "The expense log is empty.\n");
    }

    #[test]
    fn test_summary_table_has_grand_total() {
        let totals = vec![
            CategoryTotal {
                category: "Food".to_string(),
                count: 2,
                total: 38.49,
            },
            CategoryTotal {
                category: "Transport".to_string(),
                count: 1,
                total: 5.20,
            },
        ];

        let table = render_summary_table(&totals);
        assert!(table.contains("Food"));
        assert!(table.contains("$38.49"));
        assert!(table.contains("$43.69"));
    }

    #[test]
    fn test_import_report_lists_failures() {
        let report = ImportReport {
            imported: 4,
            duplicates: 1,
            categories_created: vec!["Utilities".to_string()],
            failures: vec![RowFailure {
                row: 3,
                content: "2023-11-21, abc, Food, lunch".to_string(),
                error: Error::malformed_amount("abc", "not a number"),
            }],
        };

        let text = render_import_report(&report);
        assert!(text.contains("Imported: 4"));
        assert!(text.contains("Skipped duplicates: 1"));
        assert!(text.contains("Utilities"));
        assert!(text.contains("Rejected: 1"));
        assert!(text.contains("row 3"));
        assert!(text.contains("invalid amount 'abc'"));
    }
}
