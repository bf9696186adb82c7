use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rusqlite::Connection;

use expense_tracker::cli::{CategoryCommand, Cli, Command};
use expense_tracker::db::{open_database, parse_amount, parse_date};
use expense_tracker::error::Error;
use expense_tracker::import::Importer;
use expense_tracker::report;
use expense_tracker::store::{CategoryStore, ExpenseStore, ExpenseUpdate, NewExpense};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let db_path = resolve_db_path(cli.db)?;
    log::debug!("using database at {}", db_path.display());

    let conn = open_database(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    run(&conn, cli.command, &db_path)
}

/// Explicit `--db` wins; otherwise the platform data directory, falling
/// back to the working directory when none exists.
fn resolve_db_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        return Ok(path);
    }

    match dirs::data_dir() {
        Some(data_dir) => {
            let dir = data_dir.join("expense-tracker");
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            Ok(dir.join("expenses.db"))
        }
        None => Ok(PathBuf::from("expenses.db")),
    }
}

fn run(conn: &Connection, command: Command, db_path: &std::path::Path) -> Result<()> {
    match command {
        Command::Init => {
            // Schema creation already happened on open; confirm and exit.
            println!("✓ Database ready at {}", db_path.display());
        }

        Command::Add {
            amount,
            category,
            date,
            description,
        } => {
            let amount = parse_amount(&amount)?;
            let date = match date {
                Some(input) => parse_date(&input)?,
                None => Local::now().date_naive(),
            };

            let category = CategoryStore::new(conn).find_or_create(&category)?;
            let expense = ExpenseStore::new(conn).create(&NewExpense {
                date,
                amount,
                category_id: category.id,
                description,
            })?;

            println!(
                "✓ Recorded expense #{}: {:.2} under '{}' on {}",
                expense.id, expense.amount, category.name, expense.date
            );
        }

        Command::List => {
            let rows = ExpenseStore::new(conn).list()?;
            print!("{}", report::render_expense_table(&rows));
        }

        Command::Update {
            id,
            date,
            amount,
            category,
            description,
        } => {
            let category_id = match category {
                // Corrections must not mint categories from typos: the
                // target category has to exist already.
                Some(name) => Some(
                    CategoryStore::new(conn)
                        .find_by_name(&name)?
                        .ok_or(Error::UnknownCategory { name })?
                        .id,
                ),
                None => None,
            };

            let update = ExpenseUpdate {
                date: date.as_deref().map(parse_date).transpose()?,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                category_id,
                description,
            };

            ExpenseStore::new(conn).update(id, &update)?;
            println!("✓ Updated expense #{id}");
        }

        Command::Delete { id } => {
            ExpenseStore::new(conn).delete(id)?;
            println!("✓ Deleted expense #{id}");
        }

        Command::Import {
            file,
            no_create_categories,
        } => {
            let outcome = Importer::new(conn)
                .with_auto_create(!no_create_categories)
                .import_file(&file)
                .with_context(|| format!("failed to import {}", file.display()))?;
            print!("{}", report::render_import_report(&outcome));
        }

        Command::Category(command) => run_category(conn, command)?,

        Command::Summary => {
            let totals = ExpenseStore::new(conn).totals_by_category()?;
            print!("{}", report::render_summary_table(&totals));
        }
    }

    Ok(())
}

fn run_category(conn: &Connection, command: CategoryCommand) -> Result<()> {
    let store = CategoryStore::new(conn);

    match command {
        CategoryCommand::Add { name } => {
            let category = store.create(&name)?;
            println!("✓ Added category '{}' (id {})", category.name, category.id);
        }
        CategoryCommand::List => {
            let categories = store.list()?;
            print!("{}", report::render_category_table(&categories));
        }
        CategoryCommand::Rename { id, new_name } => {
            store.rename(id, &new_name)?;
            println!("✓ Renamed category #{id} to '{new_name}'");
        }
        CategoryCommand::Delete { id } => {
            store.delete(id)?;
            println!("✓ Deleted category #{id}");
        }
    }

    Ok(())
}
