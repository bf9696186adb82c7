//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Track personal expenses in a local SQLite database
#[derive(Parser, Debug)]
#[command(name = "expense-tracker")]
#[command(about = "Track personal expenses in a local SQLite database", long_about = None)]
pub struct Cli {
    /// Path to the database file (defaults to the user data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database file and schema (idempotent)
    Init,

    /// Record a new expense
    Add {
        /// Amount spent, e.g. 12.50 or $12.50 (negative for refunds)
        #[arg(long)]
        amount: String,

        /// Category name; created on first use
        #[arg(long)]
        category: String,

        /// Date as YYYY-MM-DD; today when omitted
        #[arg(long)]
        date: Option<String>,

        /// Free-text note
        #[arg(long)]
        description: Option<String>,
    },

    /// List all expenses, newest first
    List,

    /// Update fields of an expense by id; unnamed fields keep their value
    Update {
        id: i64,

        /// New date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        /// New amount
        #[arg(long)]
        amount: Option<String>,

        /// New category (must already exist)
        #[arg(long)]
        category: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an expense by id
    Delete { id: i64 },

    /// Bulk-import expenses from a CSV file
    ///
    /// Expected header: date, amount, category and optionally description
    /// (any casing, any order). Dates are YYYY-MM-DD.
    Import {
        /// CSV file to import
        file: PathBuf,

        /// Reject rows whose category does not exist yet instead of
        /// creating it
        #[arg(long)]
        no_create_categories: bool,
    },

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Spending totals per category
    Summary,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Add a category
    Add { name: String },

    /// List categories
    List,

    /// Rename a category by id
    Rename { id: i64, new_name: String },

    /// Delete a category by id; rejected while expenses reference it
    Delete { id: i64 },
}
