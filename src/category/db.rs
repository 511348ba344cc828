//! Database operations for categories.
//!
//! Every query is scoped to a single user. A category that belongs to another
//! user is treated the same as one that does not exist.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{
        Category, CategoryName, CategoryWithCount,
        domain::{DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES},
    },
    database_id::CategoryId,
    transaction::TransactionType,
};

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL COLLATE NOCASE,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            is_default INTEGER NOT NULL DEFAULT 0,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id, kind, name);",
    )?;

    Ok(())
}

/// Turn a UNIQUE constraint failure into [Error::DuplicateCategoryName].
fn map_duplicate_name(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, _)
            if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::DuplicateCategoryName(name.to_string())
        }
        error => error.into(),
    }
}

fn insert_category(
    user_id: UserID,
    name: CategoryName,
    kind: TransactionType,
    is_default: bool,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (user_id, name, kind, is_default) VALUES (?1, ?2, ?3, ?4)",
            (user_id.as_i64(), name.as_ref(), kind, is_default),
        )
        .map_err(|error| map_duplicate_name(error, &name))?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        user_id,
        name,
        kind,
        is_default,
    })
}

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// called `name`, ignoring case.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    kind: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    insert_category(user_id, name, kind, false, connection)
}

/// Seed the default income and expense categories for a new user.
pub fn create_default_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let expense_categories = DEFAULT_EXPENSE_CATEGORIES
        .iter()
        .map(|name| (name, TransactionType::Expense));
    let income_categories = DEFAULT_INCOME_CATEGORIES
        .iter()
        .map(|name| (name, TransactionType::Income));

    expense_categories
        .chain(income_categories)
        .map(|(name, kind)| {
            insert_category(
                user_id,
                CategoryName::new_unchecked(name),
                kind,
                true,
                connection,
            )
        })
        .collect()
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, is_default FROM category \
            WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the user's categories ordered by kind and then name, with the
/// number of transactions in each category.
pub fn get_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryWithCount>, Error> {
    connection
        .prepare(
            "SELECT c.id, c.user_id, c.name, c.kind, c.is_default,
                (SELECT COUNT(1) FROM \"transaction\" t WHERE t.category_id = c.id)
            FROM category c
            WHERE c.user_id = ?1
            ORDER BY c.kind ASC, c.name ASC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(CategoryWithCount {
                category: map_row(row)?,
                transaction_count: row.get(5)?,
            })
        })?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// The number of transactions and budgets of `user_id` that refer to the category.
fn count_references(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(u32, u32), Error> {
    let counts = connection.query_row(
        "SELECT
            (SELECT COUNT(1) FROM \"transaction\" WHERE category_id = ?1 AND user_id = ?2),
            (SELECT COUNT(1) FROM budget WHERE category_id = ?1 AND user_id = ?2)",
        (category_id, user_id.as_i64()),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(counts)
}

/// Rename a category or change its kind.
///
/// The kind can only change while no transaction or budget refers to the category.
///
/// # Errors
///
/// Returns:
/// - [Error::UpdateMissingCategory] if the category does not exist or belongs to another user,
/// - [Error::DefaultCategoryImmutable] if the category is a default category,
/// - [Error::CategoryKindInUse] if the kind changes and the category is in use,
/// - [Error::DuplicateCategoryName] if the user has another category called `name`.
pub fn update_category(
    user_id: UserID,
    category_id: CategoryId,
    name: CategoryName,
    kind: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = match get_category(user_id, category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::UpdateMissingCategory),
        Err(error) => return Err(error),
    };

    if category.is_default {
        return Err(Error::DefaultCategoryImmutable);
    }

    if kind != category.kind {
        let (transaction_count, budget_count) =
            count_references(user_id, category_id, connection)?;

        if transaction_count > 0 || budget_count > 0 {
            return Err(Error::CategoryKindInUse {
                transaction_count,
                budget_count,
            });
        }
    }

    connection
        .execute(
            "UPDATE category SET name = ?1, kind = ?2 WHERE id = ?3 AND user_id = ?4",
            (name.as_ref(), kind, category_id, user_id.as_i64()),
        )
        .map_err(|error| map_duplicate_name(error, &name))?;

    Ok(Category {
        name,
        kind,
        ..category
    })
}

/// Delete a category that nothing refers to.
///
/// # Errors
///
/// Returns:
/// - [Error::DeleteMissingCategory] if the category does not exist or belongs to another user,
/// - [Error::DefaultCategoryImmutable] if the category is a default category,
/// - [Error::CategoryInUse] if any transaction or budget refers to the category.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let category = match get_category(user_id, category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    };

    if category.is_default {
        return Err(Error::DefaultCategoryImmutable);
    }

    let (transaction_count, budget_count) = count_references(user_id, category_id, connection)?;

    if transaction_count > 0 || budget_count > 0 {
        return Err(Error::CategoryInUse {
            transaction_count,
            budget_count,
        });
    }

    connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_name: String = row.get(2)?;
    let kind = row.get(3)?;
    let is_default = row.get(4)?;

    Ok(Category {
        id,
        user_id,
        name: CategoryName::new_unchecked(&raw_name),
        kind,
        is_default,
    })
}
