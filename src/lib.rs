// Personal Expense Tracker - Core Library
// Exposes all modules for use in the CLI binary and tests

pub mod cli;
pub mod db;
pub mod error;
pub mod import;
pub mod report;
pub mod store;

// Re-export commonly used types
pub use db::{
    open_database, open_in_memory, parse_amount, parse_date, setup_database, DATE_FORMAT,
};
pub use error::{Error, Result};
pub use import::{ImportReport, Importer, RowFailure};
pub use store::{
    Category, CategoryStore, CategoryTotal, Expense, ExpenseRow, ExpenseStore, ExpenseUpdate,
    NewExpense,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
