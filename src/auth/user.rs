//! Users of the application: IDs, emails, display currencies and the user table.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An email address that users log in with.
///
/// Emails are trimmed and lowercased so that "Foo@Bar.com " and "foo@bar.com"
/// refer to the same account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Email(String);

impl Email {
    /// Create an email address.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `raw_email` does not have text on both sides of an '@'.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(email))
            }
            _ => Err(Error::InvalidEmail(raw_email.to_owned())),
        }
    }

    /// Create an email address without validation.
    ///
    /// The caller should ensure that the string is a valid, lowercase email address.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The currency a user's amounts are displayed and recorded in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Currency {
    /// Ukrainian hryvnia.
    #[default]
    #[serde(rename = "UAH")]
    Uah,
    /// United States dollar.
    #[serde(rename = "USD")]
    Usd,
    /// Euro.
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    /// Every supported currency, in the order they are offered to users.
    pub const ALL: [Currency; 3] = [Currency::Uah, Currency::Usd, Currency::Eur];

    /// The ISO 4217 code, e.g. "UAH".
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Uah => "UAH",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// The symbol placed in front of amounts, e.g. "₴".
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Uah => "₴",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    /// A human readable name, e.g. "Ukrainian hryvnia".
    pub fn name(&self) -> &'static str {
        match self {
            Currency::Uah => "Ukrainian hryvnia",
            Currency::Usd => "US dollar",
            Currency::Eur => "Euro",
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UAH" => Ok(Currency::Uah),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(Error::InvalidCurrency(s.to_owned())),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown in the app.
    pub name: String,
    /// The email address the user logs in with.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The currency the user's amounts are shown in.
    pub currency: Currency,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                currency TEXT NOT NULL DEFAULT 'UAH'
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database with the default currency.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyUserName] if `name` is empty or only whitespace,
/// - [Error::DuplicateEmail] if another user has registered with `email`,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    name: &str,
    email: Email,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyUserName);
    }

    let currency = Currency::default();

    connection.execute(
        "INSERT INTO user (name, email, password, currency) VALUES (?1, ?2, ?3, ?4)",
        (name, email.as_ref(), password_hash.as_ref(), currency.as_str()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_owned(),
        email,
        password_hash,
        currency,
    })
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, currency FROM user WHERE email = :email")?
        .query_row(&[(":email", email.as_ref())], map_row)
        .map_err(|error| error.into())
}

/// Get the display currency of a user.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn get_user_currency(user_id: UserID, connection: &Connection) -> Result<Currency, Error> {
    let raw_currency: String = connection.query_row(
        "SELECT currency FROM user WHERE id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    raw_currency.parse()
}

/// Change the display currency of a user.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_currency(
    user_id: UserID,
    currency: Currency,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET currency = ?1 WHERE id = ?2",
        (currency.as_str(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Replace the password hash of a user.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let raw_currency: String = row.get(4)?;

    let currency = raw_currency.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        currency,
    })
}

#[cfg(test)]
mod email_tests {
    use crate::Error;

    use super::Email;

    #[test]
    fn new_normalises_email() {
        let email = Email::new("  Foo@Example.COM ").unwrap();

        assert_eq!(email.as_ref(), "foo@example.com");
    }

    #[test]
    fn new_fails_without_at_sign() {
        assert_eq!(
            Email::new("foo.example.com"),
            Err(Error::InvalidEmail("foo.example.com".to_owned()))
        );
    }

    #[test]
    fn new_fails_with_empty_parts() {
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("foo@").is_err());
        assert!(Email::new("").is_err());
    }
}
