//! Expense Store - the ordered log of recorded transactions.
//!
//! Dates live in the `date` column as `YYYY-MM-DD` TEXT so lexicographic
//! order is chronological order. Every row references an existing category
//! (`PRAGMA foreign_keys = ON` backs the invariant at the storage layer).

use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DATE_FORMAT;
use crate::error::{Error, Result};

/// A stored expense as it sits in the `expenses` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category_id: i64,
    pub description: Option<String>,
}

/// Fields for a new expense. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: f64,
    pub category_id: i64,
    pub description: Option<String>,
}

/// Partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

/// One row of the expense listing, joined with its category name.
#[derive(Debug, Clone)]
pub struct ExpenseRow {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
}

/// Per-category aggregate for the summary report.
#[derive(Debug, Clone)]
pub struct CategoryTotal {
    pub category: String,
    pub count: i64,
    pub total: f64,
}

pub struct ExpenseStore<'c> {
    conn: &'c Connection,
}

fn date_from_row(index: usize, text: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl<'c> ExpenseStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        ExpenseStore { conn }
    }

    /// Persist a new expense and return it with its assigned id.
    pub fn create(&self, new: &NewExpense) -> Result<Expense> {
        self.conn.execute(
            "INSERT INTO expenses (date, amount, category_id, description)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                new.date.format(DATE_FORMAT).to_string(),
                new.amount,
                new.category_id,
                new.description,
            ],
        )?;

        Ok(Expense {
            id: self.conn.last_insert_rowid(),
            date: new.date,
            amount: new.amount,
            category_id: new.category_id,
            description: new.description.clone(),
        })
    }

    pub fn get(&self, id: i64) -> Result<Expense> {
        self.conn
            .query_row(
                "SELECT id, date, amount, category_id, description
                 FROM expenses WHERE id = ?1",
                params![id],
                |row| {
                    let date_text: String = row.get(1)?;
                    Ok(Expense {
                        id: row.get(0)?,
                        date: date_from_row(1, date_text)?,
                        amount: row.get(2)?,
                        category_id: row.get(3)?,
                        description: row.get(4)?,
                    })
                },
            )
            .optional()?
            .ok_or(Error::not_found("expense", id))
    }

    /// Every expense joined with its category name, newest first.
    pub fn list(&self) -> Result<Vec<ExpenseRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.date, e.amount, c.name, e.description
             FROM expenses e
             JOIN categories c ON e.category_id = c.id
             ORDER BY e.date DESC, e.id DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let date_text: String = row.get(1)?;
                Ok(ExpenseRow {
                    id: row.get(0)?,
                    date: date_from_row(1, date_text)?,
                    amount: row.get(2)?,
                    category: row.get(3)?,
                    description: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Apply a partial update to one expense. Only the provided fields
    /// change; an update naming no fields is a no-op on an existing row.
    pub fn update(&self, id: i64, update: &ExpenseUpdate) -> Result<()> {
        // Uniform NotFound for unknown ids, even for empty updates.
        self.get(id)?;

        let date_text = update.date.map(|d| d.format(DATE_FORMAT).to_string());

        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(ref text) = date_text {
            assignments.push("date = ?");
            values.push(text);
        }
        if let Some(ref amount) = update.amount {
            assignments.push("amount = ?");
            values.push(amount);
        }
        if let Some(ref category_id) = update.category_id {
            assignments.push("category_id = ?");
            values.push(category_id);
        }
        if let Some(ref description) = update.description {
            assignments.push("description = ?");
            values.push(description);
        }

        if assignments.is_empty() {
            return Ok(());
        }

        let sql = format!("UPDATE expenses SET {} WHERE id = ?", assignments.join(", "));
        values.push(&id);
        self.conn.execute(&sql, values.as_slice())?;

        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(Error::not_found("expense", id));
        }
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Spending totals grouped by category, including categories with no
    /// expenses yet.
    pub fn totals_by_category(&self) -> Result<Vec<CategoryTotal>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                c.name,
                COUNT(e.id) as count,
                COALESCE(SUM(e.amount), 0.0) as total
             FROM categories c
             LEFT JOIN expenses e ON e.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name",
        )?;

        let totals = stmt
            .query_map([], |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    count: row.get(1)?,
                    total: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }
}
