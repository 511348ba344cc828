use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use pennywise::{
    BudgetPeriod, Category, Email, NewBudget, PasswordHash, Transaction, TransactionType, UserID,
    ValidatedPassword, create_budget, create_default_categories, create_transaction, create_user,
    initialize_db,
};

/// A utility for creating a demo database for pennywise.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "demo";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {DEMO_EMAIL} with the password '{DEMO_PASSWORD}'...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        "Demo User",
        Email::new_unchecked(DEMO_EMAIL),
        password_hash,
        &conn,
    )?;
    let categories = create_default_categories(user.id, &conn)?;

    let today = OffsetDateTime::now_utc().date();

    println!("Creating transactions...");
    let transaction_count = create_demo_transactions(user.id, today, &categories, &conn)?;
    println!("Created {transaction_count} transactions.");

    println!("Creating budgets...");
    let month_start = today.replace_day(1)?;
    for (name, amount) in [("Food", 400.0), ("Transport", 120.0), ("Entertainment", 80.0)] {
        let Some(category) = find_category(&categories, name) else {
            continue;
        };

        create_budget(
            user.id,
            NewBudget {
                category_id: category.id,
                amount,
                period: BudgetPeriod::Monthly,
                start_date: month_start - Duration::days(90),
                end_date: None,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}

fn find_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    categories
        .iter()
        .find(|category| category.name.as_ref() == name)
}

/// Roughly six months of salary, rent, groceries and the occasional treat.
fn create_demo_transactions(
    user_id: UserID,
    today: Date,
    categories: &[Category],
    conn: &Connection,
) -> Result<usize, Box<dyn Error>> {
    let category_id = |name: &str| find_category(categories, name).map(|category| category.id);
    let mut count = 0;

    for days_ago in 0..180_i64 {
        let date = today - Duration::days(days_ago);
        let mut transactions = Vec::new();

        if date.day() == 1 {
            transactions.push(
                Transaction::build(4200.0, date, "Monthly salary")
                    .transaction_type(TransactionType::Income)
                    .category_id(category_id("Salary")),
            );
            transactions.push(
                Transaction::build(1500.0, date, "Rent").category_id(category_id("Housing")),
            );
        }

        if date.day() == 15 {
            transactions.push(
                Transaction::build(180.0, date, "Electricity and water")
                    .category_id(category_id("Utilities")),
            );
        }

        if days_ago % 7 == 0 {
            transactions.push(
                Transaction::build(85.0 + (days_ago % 5) as f64 * 7.5, date, "Groceries")
                    .category_id(category_id("Food")),
            );
        }

        if days_ago % 3 == 0 {
            transactions.push(
                Transaction::build(4.5, date, "Bus fare").category_id(category_id("Transport")),
            );
        }

        if days_ago % 20 == 0 {
            transactions.push(
                Transaction::build(32.0, date, "Cinema").category_id(category_id("Entertainment")),
            );
        }

        if days_ago % 45 == 10 {
            transactions.push(
                Transaction::build(350.0, date, "Website for a client")
                    .transaction_type(TransactionType::Income)
                    .category_id(category_id("Freelance")),
            );
        }

        if days_ago % 11 == 4 {
            transactions.push(Transaction::build(12.99, date, "Cash withdrawal"));
        }

        for transaction in transactions {
            create_transaction(user_id, transaction, conn)?;
            count += 1;
        }
    }

    Ok(count)
}
