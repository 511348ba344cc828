use rusqlite::Connection;

use crate::{
    PasswordHash,
    auth::{Email, User, create_user},
    db::initialize,
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

/// Insert a user with a placeholder password hash.
#[track_caller]
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        "Test User",
        Email::new_unchecked(email),
        PasswordHash::new_unchecked("not a real hash"),
        connection,
    )
    .expect("Could not create test user")
}
