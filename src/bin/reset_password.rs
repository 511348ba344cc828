use std::{io, path::Path, process::ExitCode};

use clap::Parser;
use rusqlite::Connection;

use pennywise::{Email, PasswordHash, ValidatedPassword, get_user_by_email, update_password};

/// Set a new password for a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the pennywise SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address of the account to reset.
    #[arg(long)]
    email: String,
}

fn main() -> ExitCode {
    match reset_password(&Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("\x1b[31;1m{message}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn reset_password(args: &Args) -> Result<(), String> {
    let db_path = Path::new(&args.db_path);
    if db_path.extension().is_none_or(|extension| extension.is_empty()) {
        return Err("The database path needs a file extension, e.g. 'pennywise.db'.".to_owned());
    }
    if !db_path.is_file() {
        return Err(format!("There is no database at {db_path:?}."));
    }

    let email = Email::new(&args.email).map_err(|error| error.to_string())?;
    let connection = Connection::open(db_path)
        .map_err(|error| format!("Could not open the database: {error}"))?;
    let user = get_user_by_email(&email, &connection)
        .map_err(|error| format!("Could not find a user with the email {email}: {error}"))?;

    println!("Resetting the password for {}", user.email);

    let Some(password_hash) = prompt_new_password() else {
        println!("Cancelled, the password was not changed.");
        return Ok(());
    };

    update_password(user.id, &password_hash, &connection)
        .map_err(|error| format!("Could not save the new password: {error}"))?;
    println!("Password updated.");

    Ok(())
}

/// Ask for a strong password twice until both entries match.
///
/// Returns `None` if stdin is closed, e.g. with Ctrl+D.
fn prompt_new_password() -> Option<PasswordHash> {
    loop {
        let password = read_password("New password: ")?;
        let validated = match ValidatedPassword::new(&password) {
            Ok(validated) => validated,
            Err(error) => {
                eprintln!("{error}");
                continue;
            }
        };

        if read_password("Repeat the password: ")? != password {
            eprintln!("The passwords do not match, try again.");
            continue;
        }

        match PasswordHash::new(validated, PasswordHash::DEFAULT_COST) {
            Ok(hash) => return Some(hash),
            Err(error) => eprintln!("Could not hash the password, try again: {error}"),
        }
    }
}

fn read_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            eprintln!("Could not read the password: {error}");
            None
        }
    }
}
