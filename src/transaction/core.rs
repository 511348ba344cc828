//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::{Currency, UserID, get_user_currency},
    database_id::{CategoryId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    #[default]
    Expense,
}

impl TransactionType {
    /// Both transaction types in the order they are shown in forms.
    pub const ALL: [TransactionType; 2] = [TransactionType::Expense, TransactionType::Income];

    /// The value used in the database and in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The amount of money spent or earned in this transaction, always zero or more.
    pub amount: f64,
    /// Whether the amount was earned or spent.
    pub transaction_type: TransactionType,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// The owner's currency at the time the transaction was recorded.
    pub currency: Currency,
}

impl Transaction {
    /// Create a new expense.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: Date, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            transaction_type: TransactionType::Expense,
            category_id: None,
        }
    }
}

/// A builder for creating and updating [Transaction]s.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::{Transaction, TransactionType};
///
/// let salary = Transaction::build(4200.0, date!(2025-01-15), "January salary")
///     .transaction_type(TransactionType::Income)
///     .category_id(Some(salary_category.id));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money, zero or more. The direction is given by `transaction_type`.
    pub amount: f64,

    /// The date when the transaction occurred.
    ///
    /// This is when money moved, not when it was recorded.
    pub date: Date,

    /// A human-readable description of the transaction.
    pub description: String,

    /// Whether money was earned or spent. Defaults to [TransactionType::Expense].
    pub transaction_type: TransactionType,

    /// The category of the transaction, e.g. "Food", "Transport", "Salary".
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the category ID for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set whether the transaction is income or an expense.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Check the amount and that the date is no later than `today`.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] for negative or non-finite amounts and
    /// [Error::FutureDate] for dates after `today`.
    pub fn validate(&self, today: Date) -> Result<(), Error> {
        validate_amount(self.amount)?;

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(())
    }
}

/// Amounts are magnitudes, the transaction type carries the direction.
pub(crate) fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    Ok(())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, user_id, category_id, amount, transaction_type, description, date, currency";

/// Check that `category_id`, if set, refers to a category owned by `user_id`.
fn ensure_category_owned(
    user_id: UserID,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(id) = category_id else {
        return Ok(());
    };

    let owned = connection
        .query_row(
            "SELECT 1 FROM category WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            |_| Ok(()),
        )
        .optional()?;

    match owned {
        Some(()) => Ok(()),
        None => Err(Error::InvalidCategory(category_id)),
    }
}

/// Create a new transaction for `user_id` from a builder.
///
/// The transaction takes the user's current currency. Dates are not checked
/// here, use [TransactionBuilder::validate] at the request boundary.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not finite,
/// - [Error::InvalidCategory] if the category does not belong to the user,
/// - [Error::NotFound] if the user does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;
    ensure_category_owned(user_id, builder.category_id, connection)?;
    let currency = get_user_currency(user_id, connection)?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
                (user_id, category_id, amount, transaction_type, description, date, currency) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                builder.category_id,
                builder.amount,
                builder.transaction_type,
                builder.description,
                builder.date,
                currency.as_str(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Replace the details of a transaction owned by `user_id`.
///
/// The currency recorded when the transaction was created is kept.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not finite,
/// - [Error::InvalidCategory] if the category does not belong to the user,
/// - [Error::UpdateMissingTransaction] if the transaction does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;
    ensure_category_owned(user_id, builder.category_id, connection)?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\" \
             SET category_id = ?1, amount = ?2, transaction_type = ?3, description = ?4, date = ?5 \
             WHERE id = ?6 AND user_id = ?7 \
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.category_id,
                builder.amount,
                builder.transaction_type,
                builder.description,
                builder.date,
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not exist
/// or belongs to another user.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Retrieve a transaction owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id AND user_id = :user_id"
        ))?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the number of transactions recorded by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get::<_, u32>(0).map(u64::from),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER,
                amount REAL NOT NULL CHECK (amount >= 0),
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                currency TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE SET NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Used by the transactions page, the dashboard and budget spend.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date \
        ON \"transaction\"(user_id, date, category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in the same order as [TRANSACTION_COLUMNS].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let category_id = row.get(2)?;
    let amount = row.get(3)?;
    let transaction_type = row.get(4)?;
    let description = row.get(5)?;
    let date = row.get(6)?;
    let raw_currency: String = row.get(7)?;

    let currency = raw_currency.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id,
        user_id,
        category_id,
        amount,
        transaction_type,
        description,
        date,
        currency,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod builder_tests {
    use time::macros::date;

    use crate::Error;

    use super::Transaction;

    #[test]
    fn validate_accepts_today_and_zero() {
        let today = date!(2025 - 10 - 05);

        assert_eq!(Transaction::build(0.0, today, "").validate(today), Ok(()));
    }

    #[test]
    fn validate_rejects_future_date() {
        let today = date!(2025 - 10 - 05);
        let tomorrow = date!(2025 - 10 - 06);

        assert_eq!(
            Transaction::build(1.0, tomorrow, "").validate(today),
            Err(Error::FutureDate(tomorrow))
        );
    }

    #[test]
    fn validate_rejects_bad_amounts() {
        let today = date!(2025 - 10 - 05);

        assert_eq!(
            Transaction::build(-1.0, today, "").validate(today),
            Err(Error::InvalidAmount(-1.0))
        );
        assert!(matches!(
            Transaction::build(f64::NAN, today, "").validate(today),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            Transaction::build(f64::INFINITY, today, "").validate(today),
            Err(Error::InvalidAmount(_))
        ));
    }
}
