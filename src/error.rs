//! Error taxonomy for the expense tracker.
//!
//! Per-row import errors (dates, amounts, categories) are caught by the
//! importer and turned into report entries; everything else propagates to
//! the console layer, which prints the message and exits non-zero.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Date field did not parse as a calendar date.
    #[error("invalid date '{input}' (expected YYYY-MM-DD)")]
    MalformedDate { input: String },

    /// Amount field did not parse as a usable monetary value.
    #[error("invalid amount '{input}': {reason}")]
    MalformedAmount { input: String, reason: &'static str },

    /// The CSV layer rejected the row itself (ragged fields, broken quoting).
    #[error("malformed row: {message}")]
    MalformedRow { message: String },

    /// A required column is absent from the CSV header. Fatal for the file.
    #[error("input file is missing required column '{column}'")]
    InvalidHeader { column: String },

    /// Category names must be non-empty.
    #[error("category name is empty")]
    EmptyCategory,

    /// Named category does not exist and auto-provisioning is off.
    #[error("unknown category '{name}'")]
    UnknownCategory { name: String },

    /// A category with this name (case-insensitive) already exists.
    #[error("category '{name}' already exists")]
    DuplicateCategory { name: String },

    /// Referential integrity: the category is still referenced by expenses.
    #[error("category '{name}' is still used by {expenses} expense(s)")]
    CategoryInUse { name: String, expenses: i64 },

    /// Update/delete/read aimed at an id that does not exist.
    #[error("no {entity} with id {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Underlying database failure. Fatal; aborts the current operation.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// File-level CSV failure (unreadable file, I/O error mid-read).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Error::NotFound { entity, id }
    }

    pub fn malformed_amount(input: &str, reason: &'static str) -> Self {
        Error::MalformedAmount {
            input: input.to_string(),
            reason,
        }
    }
}
