//! Database query helpers for the transactions page and summary figures.

use rusqlite::{Connection, ToSql};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::CategoryName,
    database_id::CategoryId,
    transaction::{Transaction, TransactionType, map_transaction_row},
};

/// Narrows down which transactions are returned by [query_transactions].
///
/// Unset fields do not filter anything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only income or only expenses.
    pub transaction_type: Option<TransactionType>,
    /// Only transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only transactions on or before this date.
    pub end_date: Option<Date>,
    /// Only transactions whose description contains this text, ignoring case.
    pub search: Option<String>,
}

/// A transaction with the name of its category for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionListItem {
    pub transaction: Transaction,
    pub category_name: Option<CategoryName>,
}

/// One page of transactions and the number of transactions across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    pub items: Vec<TransactionListItem>,
    pub total_count: u64,
}

/// Income and expense totals over all of a user's transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TransactionStats {
    pub total_income: f64,
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    pub transaction_count: u64,
}

/// Escape the LIKE wildcards in `text` so it is matched literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Build the WHERE clause and its parameters for `filter`.
fn where_clause(user_id: UserID, filter: &TransactionFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions = vec!["t.user_id = ?".to_owned()];
    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_i64())];

    if let Some(category_id) = filter.category_id {
        conditions.push("t.category_id = ?".to_owned());
        values.push(Box::new(category_id));
    }

    if let Some(transaction_type) = filter.transaction_type {
        conditions.push("t.transaction_type = ?".to_owned());
        values.push(Box::new(transaction_type));
    }

    if let Some(start_date) = filter.start_date {
        conditions.push("t.date >= ?".to_owned());
        values.push(Box::new(start_date));
    }

    if let Some(end_date) = filter.end_date {
        conditions.push("t.date <= ?".to_owned());
        values.push(Box::new(end_date));
    }

    if let Some(search) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
    {
        conditions.push("t.description LIKE ? ESCAPE '\\'".to_owned());
        values.push(Box::new(format!("%{}%", escape_like(search))));
    }

    (conditions.join(" AND "), values)
}

/// Get one page of the user's transactions matching `filter`, newest first.
///
/// Pages start at 1, a `page` of 0 is treated as the first page. Ties on the
/// date are broken by ID so that the order is stable across edits.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn query_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let (where_sql, mut values) = where_clause(user_id, filter);

    let total_count: u64 = {
        let params: Vec<&dyn ToSql> = values.iter().map(|value| value.as_ref()).collect();
        connection.query_row(
            &format!("SELECT COUNT(t.id) FROM \"transaction\" t WHERE {where_sql}"),
            params.as_slice(),
            |row| row.get::<_, u32>(0).map(u64::from),
        )?
    };

    let offset = page.saturating_sub(1).saturating_mul(page_size);
    values.push(Box::new(i64::try_from(page_size).unwrap_or(i64::MAX)));
    values.push(Box::new(i64::try_from(offset).unwrap_or(i64::MAX)));
    let params: Vec<&dyn ToSql> = values.iter().map(|value| value.as_ref()).collect();

    let query = format!(
        "SELECT t.id, t.user_id, t.category_id, t.amount, t.transaction_type, t.description, \
            t.date, t.currency, c.name \
        FROM \"transaction\" t \
        LEFT JOIN category c ON t.category_id = c.id \
        WHERE {where_sql} \
        ORDER BY t.date DESC, t.id DESC \
        LIMIT ? OFFSET ?"
    );

    let items = connection
        .prepare(&query)?
        .query_map(params.as_slice(), |row| {
            let category_name = row
                .get::<usize, Option<String>>(8)?
                .map(|name| CategoryName::new_unchecked(&name));

            Ok(TransactionListItem {
                transaction: map_transaction_row(row)?,
                category_name,
            })
        })?
        .map(|item| item.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransactionPage { items, total_count })
}

/// Get the user's total income, total expenses and balance over all time.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transaction_stats(
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionStats, Error> {
    let (total_income, total_expense, transaction_count): (f64, f64, u32) = connection
        .query_row(
            "SELECT \
                COALESCE(SUM(CASE WHEN transaction_type = 'income' THEN amount END), 0.0), \
                COALESCE(SUM(CASE WHEN transaction_type = 'expense' THEN amount END), 0.0), \
                COUNT(id) \
            FROM \"transaction\" WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

    Ok(TransactionStats {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count: u64::from(transaction_count),
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Duration, macros::date};

    use crate::{
        auth::{User, UserID},
        category::{CategoryName, create_category},
        database_id::CategoryId,
        test_utils::{create_test_user, get_test_connection},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{
        TransactionFilter, escape_like, get_transaction_stats, query_transactions,
    };

    fn setup() -> (Connection, User, CategoryId) {
        let conn = get_test_connection();
        let user = create_test_user("a@example.com", &conn);
        let food = create_category(
            user.id,
            CategoryName::new_unchecked("Food"),
            TransactionType::Expense,
            &conn,
        )
        .unwrap();

        (conn, user, food.id)
    }

    fn ids(user_id: UserID, filter: &TransactionFilter, conn: &Connection) -> Vec<i64> {
        query_transactions(user_id, filter, 1, 100, conn)
            .unwrap()
            .items
            .iter()
            .map(|item| item.transaction.id)
            .collect()
    }

    #[test]
    fn orders_newest_first_with_stable_ties() {
        let (conn, user, _) = setup();
        let today = date!(2025 - 10 - 05);
        let mut created = Vec::new();
        for i in 1..=6 {
            let date = if i <= 3 {
                today - Duration::days(1)
            } else {
                today
            };
            let transaction =
                create_transaction(user.id, Transaction::build(i as f64, date, ""), &conn)
                    .expect("Could not create transaction");
            created.push((transaction.date, transaction.id));
        }
        created.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        let want = created.iter().map(|(_, id)| *id).collect::<Vec<_>>();

        let got = ids(user.id, &TransactionFilter::default(), &conn);

        assert_eq!(want, got);
    }

    #[test]
    fn pages_and_counts() {
        let (conn, user, _) = setup();
        let today = date!(2025 - 10 - 05);
        for i in 0..25 {
            create_transaction(
                user.id,
                Transaction::build(1.0, today - Duration::days(i), ""),
                &conn,
            )
            .unwrap();
        }

        let first = query_transactions(user.id, &TransactionFilter::default(), 1, 10, &conn)
            .unwrap();
        let last = query_transactions(user.id, &TransactionFilter::default(), 3, 10, &conn)
            .unwrap();

        assert_eq!(first.total_count, 25);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].transaction.date, today);
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.total_count, 25);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let (conn, user, _) = setup();
        create_transaction(user.id, Transaction::build(1.0, date!(2025 - 10 - 05), ""), &conn)
            .unwrap();

        for page in [2, u64::MAX / 10, u64::MAX] {
            let result =
                query_transactions(user.id, &TransactionFilter::default(), page, 10, &conn)
                    .unwrap();

            assert!(result.items.is_empty(), "page {page} should be empty");
            assert_eq!(result.total_count, 1);
        }
    }

    #[test]
    fn filters_by_category_type_and_inclusive_dates() {
        let (conn, user, food_id) = setup();
        let food = create_transaction(
            user.id,
            Transaction::build(5.0, date!(2025 - 03 - 01), "lunch").category_id(Some(food_id)),
            &conn,
        )
        .unwrap();
        let salary = create_transaction(
            user.id,
            Transaction::build(100.0, date!(2025 - 03 - 31), "pay")
                .transaction_type(TransactionType::Income),
            &conn,
        )
        .unwrap();
        create_transaction(
            user.id,
            Transaction::build(7.0, date!(2025 - 04 - 01), "bus"),
            &conn,
        )
        .unwrap();

        let by_category = TransactionFilter {
            category_id: Some(food_id),
            ..Default::default()
        };
        let by_type = TransactionFilter {
            transaction_type: Some(TransactionType::Income),
            ..Default::default()
        };
        let by_dates = TransactionFilter {
            start_date: Some(date!(2025 - 03 - 01)),
            end_date: Some(date!(2025 - 03 - 31)),
            ..Default::default()
        };

        assert_eq!(ids(user.id, &by_category, &conn), vec![food.id]);
        assert_eq!(ids(user.id, &by_type, &conn), vec![salary.id]);
        assert_eq!(ids(user.id, &by_dates, &conn), vec![salary.id, food.id]);
    }

    #[test]
    fn search_ignores_case_and_wildcards() {
        let (conn, user, _) = setup();
        let coffee = create_transaction(
            user.id,
            Transaction::build(4.5, date!(2025 - 03 - 01), "Morning Coffee"),
            &conn,
        )
        .unwrap();
        let discount = create_transaction(
            user.id,
            Transaction::build(4.5, date!(2025 - 03 - 02), "50% off"),
            &conn,
        )
        .unwrap();
        create_transaction(
            user.id,
            Transaction::build(4.5, date!(2025 - 03 - 03), "500 offset"),
            &conn,
        )
        .unwrap();

        let coffee_filter = TransactionFilter {
            search: Some("coffee".to_owned()),
            ..Default::default()
        };
        let percent_filter = TransactionFilter {
            search: Some("0% off".to_owned()),
            ..Default::default()
        };

        assert_eq!(ids(user.id, &coffee_filter, &conn), vec![coffee.id]);
        assert_eq!(ids(user.id, &percent_filter, &conn), vec![discount.id]);
    }

    #[test]
    fn only_returns_own_transactions() {
        let (conn, user, _) = setup();
        let other = create_test_user("b@example.com", &conn);
        create_transaction(
            other.id,
            Transaction::build(1.0, date!(2025 - 03 - 01), "secret"),
            &conn,
        )
        .unwrap();

        let page =
            query_transactions(user.id, &TransactionFilter::default(), 1, 10, &conn).unwrap();

        assert_eq!(page.total_count, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn includes_category_names() {
        let (conn, user, food_id) = setup();
        create_transaction(
            user.id,
            Transaction::build(5.0, date!(2025 - 03 - 01), "lunch").category_id(Some(food_id)),
            &conn,
        )
        .unwrap();

        let page =
            query_transactions(user.id, &TransactionFilter::default(), 1, 10, &conn).unwrap();

        assert_eq!(
            page.items[0].category_name,
            Some(CategoryName::new_unchecked("Food"))
        );
    }

    #[test]
    fn stats_sum_income_and_expenses() {
        let (conn, user, _) = setup();
        let date = date!(2025 - 03 - 01);
        create_transaction(
            user.id,
            Transaction::build(100.0, date, "pay").transaction_type(TransactionType::Income),
            &conn,
        )
        .unwrap();
        create_transaction(user.id, Transaction::build(30.0, date, "food"), &conn).unwrap();
        create_transaction(user.id, Transaction::build(20.0, date, "bus"), &conn).unwrap();

        let stats = get_transaction_stats(user.id, &conn).unwrap();

        assert_eq!(stats.total_income, 100.0);
        assert_eq!(stats.total_expense, 50.0);
        assert_eq!(stats.balance, 50.0);
        assert_eq!(stats.transaction_count, 3);
    }

    #[test]
    fn stats_are_zero_without_transactions() {
        let (conn, user, _) = setup();

        let stats = get_transaction_stats(user.id, &conn).unwrap();

        assert_eq!(stats, Default::default());
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_\\"), "50\\%\\_\\\\");
    }
}
