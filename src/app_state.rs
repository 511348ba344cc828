//! The state shared by every request handler.
//!
//! Handlers do not take [AppState] directly. Each one declares the slice it
//! needs as its own struct with a `FromRef<AppState>` impl.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, pagination::PaginationConfig};

/// Everything the request handlers share.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts and signs the session cookie.
    pub cookie_key: Key,
    /// How long a session lasts without "remember me".
    pub cookie_duration: Duration,
    /// The canonical timezone name used to decide what "today" is, e.g. "Europe/Kyiv".
    pub local_timezone: String,
    /// Page sizes for the transaction list.
    pub pagination_config: PaginationConfig,
    /// The one SQLite connection, shared by all handlers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Build the state around `db_connection`, creating any missing tables first.
    ///
    /// `cookie_secret` is hashed into the cookie key, so the same secret keeps
    /// sessions valid across restarts.
    ///
    /// # Errors
    /// Returns an error if the database schema could not be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie key from the SHA-512 digest of `secret`.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}

#[cfg(test)]
mod app_state_tests {
    use rusqlite::Connection;

    use crate::{AppState, PaginationConfig};

    use super::create_cookie_key;

    #[test]
    fn creates_tables_on_startup() {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "42",
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .expect("Could not create app state");

        let connection = state.db_connection.lock().unwrap();
        for table in ["user", "category", "transaction", "budget"] {
            let count: i64 = connection
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "table {table} should exist");
        }
    }

    #[test]
    fn cookie_key_depends_only_on_secret() {
        assert_eq!(
            create_cookie_key("secret").master(),
            create_cookie_key("secret").master()
        );
        assert_ne!(
            create_cookie_key("secret").master(),
            create_cookie_key("other secret").master()
        );
    }
}
