use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::{Error, Result};

/// Date format used everywhere: in the CSV input, in the CLI, and in the
/// `expenses.date` column (TEXT, sorts chronologically).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Open (or create) the database file and make sure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema, for tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    setup_database(&conn)?;
    Ok(conn)
}

/// Create the schema. Idempotent: safe to run against an existing file,
/// never drops or rewrites existing data.
pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery; a no-op for in-memory connections.
    let _ = conn.pragma_update(None, "journal_mode", "WAL");

    // Foreign keys are off by default in SQLite and per-connection.
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Categories Table
    // ==========================================================================
    // NOCASE collation makes name matching case-insensitive on every query
    // path (lookup, UNIQUE constraint) without normalizing the stored value.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE
        )",
        [],
    )?;

    // ==========================================================================
    // Expenses Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id),
            description TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id)",
        [],
    )?;

    Ok(())
}

/// Parse a calendar date in the fixed `YYYY-MM-DD` format.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| Error::MalformedDate {
        input: trimmed.to_string(),
    })
}

/// Parse a monetary amount.
///
/// Accepted: plain decimals with `.` separator, an optional leading `-`
/// (refunds), and an optional `$` before the digits (`12.34`, `-12.34`,
/// `$12.34`, `-$12.34`, `$-5`). Non-finite and zero values are rejected,
/// never coerced.
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();

    let (negated, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);

    let value: f64 = rest
        .parse()
        .map_err(|_| Error::malformed_amount(trimmed, "not a number"))?;
    let value = if negated { -value } else { value };

    if !value.is_finite() {
        return Err(Error::malformed_amount(trimmed, "not a finite number"));
    }
    if value == 0.0 {
        return Err(Error::malformed_amount(trimmed, "must be non-zero"));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    #[test]
    fn test_setup_is_idempotent() {
        let conn = open_in_memory().unwrap();

        conn.execute("INSERT INTO categories (name) VALUES (?1)", params!["Food"])
            .unwrap();
        conn.execute(
            "INSERT INTO expenses (date, amount, category_id, description)
             VALUES (?1, ?2, ?3, ?4)",
            params!["2023-11-20", 25.50, 1, "groceries"],
        )
        .unwrap();

        // Re-running setup must not duplicate tables or lose rows.
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();

        let categories: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .unwrap();
        let expenses: i64 = conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
            .unwrap();
        assert_eq!(categories, 1);
        assert_eq!(expenses, 1);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let conn = open_in_memory().unwrap();

        let result = conn.execute(
            "INSERT INTO expenses (date, amount, category_id) VALUES (?1, ?2, ?3)",
            params!["2023-11-20", 10.0, 42],
        );
        assert!(result.is_err(), "insert with dangling category_id must fail");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2023-11-20").unwrap(),
            NaiveDate::from_ymd_opt(2023, 11, 20).unwrap()
        );
        assert_eq!(parse_date(" 2023-01-02 ").unwrap().to_string(), "2023-01-02");

        assert!(matches!(
            parse_date("20/11/2023"),
            Err(Error::MalformedDate { .. })
        ));
        assert!(matches!(
            parse_date("2023-13-01"),
            Err(Error::MalformedDate { .. })
        ));
        assert!(matches!(parse_date(""), Err(Error::MalformedDate { .. })));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.34").unwrap(), 12.34);
        assert_eq!(parse_amount("-12.34").unwrap(), -12.34);
        assert_eq!(parse_amount("$12.34").unwrap(), 12.34);
        assert_eq!(parse_amount("-$5").unwrap(), -5.0);
        assert_eq!(parse_amount("$-5").unwrap(), -5.0);
        assert_eq!(parse_amount(" 7 ").unwrap(), 7.0);
    }

    #[test]
    fn test_parse_amount_rejects_junk() {
        assert!(matches!(
            parse_amount("abc"),
            Err(Error::MalformedAmount { .. })
        ));
        assert!(matches!(
            parse_amount(""),
            Err(Error::MalformedAmount { .. })
        ));
        assert!(matches!(
            parse_amount("NaN"),
            Err(Error::MalformedAmount { .. })
        ));
        assert!(matches!(
            parse_amount("inf"),
            Err(Error::MalformedAmount { .. })
        ));
        assert!(matches!(
            parse_amount("0.00"),
            Err(Error::MalformedAmount { .. })
        ));
    }
}
