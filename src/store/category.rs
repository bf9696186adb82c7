//! Category Store - name ↔ id mapping for expense categories.
//!
//! Names are matched case-insensitively (NOCASE collation on the column);
//! the spelling stored is whichever one was seen first. Categories that are
//! still referenced by expenses cannot be deleted.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};

/// A user-defined label grouping expenses (e.g. "Food", "Transport").
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

pub struct CategoryStore<'c> {
    conn: &'c Connection,
}

impl<'c> CategoryStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        CategoryStore { conn }
    }

    /// Insert a new category. Fails with `DuplicateCategory` if a category
    /// with the same name (any casing) already exists.
    pub fn create(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyCategory);
        }

        let result = self
            .conn
            .execute("INSERT INTO categories (name) VALUES (?1)", params![name]);

        match result {
            Ok(_) => Ok(Category {
                id: self.conn.last_insert_rowid(),
                name: name.to_string(),
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::DuplicateCategory {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, id: i64) -> Result<Category> {
        self.conn
            .query_row(
                "SELECT id, name FROM categories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or(Error::not_found("category", id))
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE name = ?1",
                params![name.trim()],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    /// Resolve a name to an existing category, creating it on first
    /// reference.
    pub fn find_or_create(&self, name: &str) -> Result<Category> {
        if let Some(existing) = self.find_by_name(name)? {
            return Ok(existing);
        }
        self.create(name)
    }

    /// All categories, ordered by name for display.
    pub fn list(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;

        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Rename a category. The new name must not collide with another
    /// category (case-insensitive).
    pub fn rename(&self, id: i64, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::EmptyCategory);
        }

        let result = self.conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2",
            params![new_name, id],
        );

        match result {
            Ok(0) => Err(Error::not_found("category", id)),
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::DuplicateCategory {
                    name: new_name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a category by id. Rejected with `CategoryInUse` while any
    /// expense still references it.
    pub fn delete(&self, id: i64) -> Result<()> {
        let category = self.get(id)?;

        let expenses = self.expense_count(id)?;
        if expenses > 0 {
            return Err(Error::CategoryInUse {
                name: category.name,
                expenses,
            });
        }

        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Number of expenses referencing this category.
    pub fn expense_count(&self, id: i64) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_create_and_get() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        let food = store.create("Food").unwrap();
        assert_eq!(food.name, "Food");

        let fetched = store.get(food.id).unwrap();
        assert_eq!(fetched, food);
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        store.create("Food").unwrap();
        assert!(matches!(
            store.create("Food"),
            Err(Error::DuplicateCategory { .. })
        ));
        // Same name, different casing: still a duplicate.
        assert!(matches!(
            store.create("FOOD"),
            Err(Error::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn test_create_empty_name_rejected() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        assert!(matches!(store.create(""), Err(Error::EmptyCategory)));
        assert!(matches!(store.create("   "), Err(Error::EmptyCategory)));
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        let created = store.create("Transport").unwrap();

        let found = store.find_by_name("transport").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        // First-seen spelling is the stored one.
        assert_eq!(found.name, "Transport");

        assert!(store.find_by_name("Leisure").unwrap().is_none());
    }

    #[test]
    fn test_find_or_create_never_mints_second_spelling() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        let first = store.find_or_create("Utilities").unwrap();
        let second = store.find_or_create("UTILITIES").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_ordered_by_name() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        store.create("Transport").unwrap();
        store.create("Food").unwrap();
        store.create("Leisure").unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Food", "Leisure", "Transport"]);
    }

    #[test]
    fn test_rename() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        let leisure = store.create("Leisure").unwrap();
        store.rename(leisure.id, "Entertainment").unwrap();
        assert_eq!(store.get(leisure.id).unwrap().name, "Entertainment");

        assert!(matches!(
            store.rename(999, "Anything"),
            Err(Error::NotFound { .. })
        ));

        let food = store.create("Food").unwrap();
        assert!(matches!(
            store.rename(food.id, "entertainment"),
            Err(Error::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn test_delete_unreferenced_succeeds() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        let food = store.create("Food").unwrap();
        store.delete(food.id).unwrap();
        assert!(matches!(store.get(food.id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_delete_referenced_rejected() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        let food = store.create("Food").unwrap();
        conn.execute(
            "INSERT INTO expenses (date, amount, category_id) VALUES ('2023-11-20', 9.5, ?1)",
            params![food.id],
        )
        .unwrap();

        let err = store.delete(food.id).unwrap_err();
        match err {
            Error::CategoryInUse { name, expenses } => {
                assert_eq!(name, "Food");
                assert_eq!(expenses, 1);
            }
            other => panic!("expected CategoryInUse, got {other:?}"),
        }

        // Still there.
        assert!(store.get(food.id).is_ok());
    }

    #[test]
    fn test_delete_unknown_id() {
        let conn = open_in_memory().unwrap();
        let store = CategoryStore::new(&conn);

        assert!(matches!(store.delete(404), Err(Error::NotFound { .. })));
    }
}
