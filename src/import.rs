//! CSV batch import with row-level fault isolation.
//!
//! Input format: a header row naming at least `date`, `amount` and
//! `category` (any casing, any column order); `description` is optional.
//! Dates are `YYYY-MM-DD`, amounts are `.`-separated decimals with optional
//! `-` and `$`. One malformed row never aborts the batch: it becomes a
//! report entry and processing continues in file order.
//!
//! Each accepted row commits inside its own scoped transaction, so category
//! auto-provisioning and the expense insert land together or not at all.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rusqlite::Connection;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::db::{parse_amount, parse_date, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::store::{CategoryStore, ExpenseStore, NewExpense};

/// Columns that must be present in the header.
const REQUIRED_COLUMNS: [&str; 3] = ["date", "amount", "category"];

/// One candidate row as it comes off the file, still untyped.
#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    amount: String,
    category: String,
    #[serde(default)]
    description: Option<String>,
}

/// A rejected row: where it was, what it said, why it failed.
#[derive(Debug)]
pub struct RowFailure {
    /// 1-based data row number (header excluded).
    pub row: usize,
    /// Original row content, for the report.
    pub content: String,
    pub error: Error,
}

/// Aggregate result of one import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    /// Exact repeats of rows already committed earlier in this batch.
    pub duplicates: usize,
    /// Names of categories auto-provisioned during this run.
    pub categories_created: Vec<String>,
    /// Rejected rows, in file order.
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn rejected(&self) -> usize {
        self.failures.len()
    }
}

enum RowOutcome {
    Imported { new_category: Option<String> },
    Duplicate,
}

/// Row-level faults become report entries; anything else (storage, I/O)
/// aborts the batch.
fn is_row_fault(error: &Error) -> bool {
    matches!(
        error,
        Error::MalformedDate { .. }
            | Error::MalformedAmount { .. }
            | Error::MalformedRow { .. }
            | Error::EmptyCategory
            | Error::UnknownCategory { .. }
    )
}

/// Fingerprint for duplicate detection, over the normalized row values.
fn row_fingerprint(date: NaiveDate, amount: f64, category: &str, description: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}|{}|{}|{}",
        date.format(DATE_FORMAT),
        amount,
        category.to_lowercase(),
        description.unwrap_or("")
    ));
    format!("{:x}", hasher.finalize())
}

pub struct Importer<'c> {
    conn: &'c Connection,
    create_categories: bool,
}

impl<'c> Importer<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Importer {
            conn,
            create_categories: true,
        }
    }

    /// Disable category auto-provisioning: rows naming a category that does
    /// not exist are rejected instead of creating it.
    pub fn with_auto_create(mut self, create_categories: bool) -> Self {
        self.create_categories = create_categories;
        self
    }

    pub fn import_file(&self, path: &Path) -> Result<ImportReport> {
        let rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)
            .map_err(Error::Csv)?;
        self.import_reader(rdr)
    }

    /// Run the import against an already-open CSV reader.
    pub fn import_reader<R: Read>(&self, mut rdr: csv::Reader<R>) -> Result<ImportReport> {
        // Header names are matched case-insensitively; a missing required
        // column fails the whole file, not row by row.
        let headers = StringRecord::from(
            rdr.headers()?
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect::<Vec<_>>(),
        );
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(Error::InvalidHeader {
                    column: column.to_string(),
                });
            }
        }

        let mut report = ImportReport::default();
        let mut seen = HashSet::new();

        for (index, result) in rdr.records().enumerate() {
            let row = index + 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    // The CSV layer rejected the row itself; keep going.
                    report.failures.push(RowFailure {
                        row,
                        content: String::new(),
                        error: Error::MalformedRow {
                            message: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            match self.import_row(&record, &headers, &mut seen) {
                Ok(RowOutcome::Imported { new_category }) => {
                    report.imported += 1;
                    if let Some(name) = new_category {
                        report.categories_created.push(name);
                    }
                }
                Ok(RowOutcome::Duplicate) => report.duplicates += 1,
                Err(error) if is_row_fault(&error) => {
                    log::debug!("rejecting row {row}: {error}");
                    report.failures.push(RowFailure {
                        row,
                        content: record.iter().collect::<Vec<_>>().join(", "),
                        error,
                    });
                }
                Err(fatal) => return Err(fatal),
            }
        }

        log::info!(
            "import finished: {} imported, {} rejected, {} duplicates",
            report.imported,
            report.rejected(),
            report.duplicates
        );

        Ok(report)
    }

    fn import_row(
        &self,
        record: &StringRecord,
        headers: &StringRecord,
        seen: &mut HashSet<String>,
    ) -> Result<RowOutcome> {
        let raw: RawRecord = record.deserialize(Some(headers)).map_err(|e| Error::MalformedRow {
            message: e.to_string(),
        })?;

        let date = parse_date(&raw.date)?;
        let amount = parse_amount(&raw.amount)?;

        let name = raw.category.trim();
        if name.is_empty() {
            return Err(Error::EmptyCategory);
        }

        let description = raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);

        let fingerprint = row_fingerprint(date, amount, name, description.as_deref());
        if seen.contains(&fingerprint) {
            return Ok(RowOutcome::Duplicate);
        }

        // Category resolution and expense insert are atomic: the transaction
        // commits whole or rolls back whole on drop.
        let tx = self.conn.unchecked_transaction()?;

        let categories = CategoryStore::new(&tx);
        let (category, new_category) = match categories.find_by_name(name)? {
            Some(existing) => (existing, None),
            None if self.create_categories => {
                let created = categories.create(name)?;
                let created_name = created.name.clone();
                (created, Some(created_name))
            }
            None => {
                return Err(Error::UnknownCategory {
                    name: name.to_string(),
                })
            }
        };

        ExpenseStore::new(&tx).create(&NewExpense {
            date,
            amount,
            category_id: category.id,
            description,
        })?;

        tx.commit()?;
        seen.insert(fingerprint);

        Ok(RowOutcome::Imported { new_category })
    }
}
