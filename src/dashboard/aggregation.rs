//! Transaction and budget aggregates for the dashboard.
//!
//! All windows are relative to "today" in the server's local timezone:
//! - the summary and monthly trends cover the current calendar month and the five before it,
//! - monthly spending covers every month of the current calendar year,
//! - the category breakdown covers the month up to and including today,
//! - budget vs actual covers the current calendar month.

use std::collections::HashMap;

use rusqlite::Connection;
use time::{Date, Month};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, DateSpan, map_budget_row, ranges_overlap, spent_percentage},
    category::CategoryName,
    transaction::{TransactionFilter, TransactionListItem, query_transactions},
};

/// The number of calendar months shown in the summary and trends.
pub(super) const TREND_MONTHS: u8 = 6;

/// The number of transactions shown in the recent transactions table.
pub(super) const RECENT_TRANSACTION_COUNT: u64 = 10;

/// The label for expenses without a category in the category breakdown.
pub(super) const UNCATEGORIZED_LABEL: &str = "Other";

/// Income and expense totals for the summary cards.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct DashboardSummary {
    pub total_income: f64,
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// The number of transactions in the current calendar month.
    pub transaction_count: u64,
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct MonthlyTotals {
    /// The first day of the month.
    pub month: Date,
    pub income: f64,
    pub expense: f64,
}

/// Total expenses for one month of the current year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct MonthlySpending {
    pub month: Month,
    pub total: f64,
}

/// Total expenses for one category.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryExpense {
    pub name: String,
    pub total: f64,
}

/// A monthly budget and the expenses in its category this month.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct BudgetVsActual {
    pub category_name: CategoryName,
    pub budget_amount: f64,
    pub actual: f64,
    pub spent_percentage: f64,
}

/// The first day of the month containing `date`.
pub(super) fn month_start(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The last day of the month containing `date`.
pub(super) fn month_end(date: Date) -> Date {
    date.replace_day(date.month().length(date.year()))
        .unwrap_or(date)
}

/// The first day of the month before the month containing `date`.
fn previous_month_start(date: Date) -> Date {
    month_start(date)
        .previous_day()
        .map(month_start)
        .unwrap_or(date)
}

/// The first days of the `count` calendar months ending with the month of `today`, oldest first.
pub(super) fn trailing_months(today: Date, count: u8) -> Vec<Date> {
    let mut months = Vec::with_capacity(count as usize);
    let mut month = month_start(today);

    for _ in 0..count {
        months.push(month);
        month = previous_month_start(month);
    }

    months.reverse();
    months
}

/// The same day of the month one month before `date`, clamped to the end of
/// shorter months, e.g. 31 March gives 28 or 29 February.
pub(super) fn one_month_before(date: Date) -> Date {
    let previous = previous_month_start(date);
    let day = date
        .day()
        .min(previous.month().length(previous.year()));

    previous.replace_day(day).unwrap_or(previous)
}

/// Income and expense totals over the trend window and this month's transaction count.
pub(super) fn get_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let window_start = trailing_months(today, TREND_MONTHS)
        .first()
        .copied()
        .unwrap_or_else(|| month_start(today));

    let (total_income, total_expense): (f64, f64) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN transaction_type = 'income' THEN amount END), 0),
            COALESCE(SUM(CASE WHEN transaction_type = 'expense' THEN amount END), 0)
        FROM \"transaction\"
        WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
        (user_id.as_i64(), window_start, today),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let transaction_count = connection.query_row(
        "SELECT COUNT(1) FROM \"transaction\" WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
        (user_id.as_i64(), month_start(today), month_end(today)),
        |row| row.get::<_, u32>(0).map(u64::from),
    )?;

    Ok(DashboardSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count,
    })
}

fn month_key(month: Date) -> String {
    format!("{:04}-{:02}", month.year(), u8::from(month.month()))
}

/// Income and expense totals for each month in the trend window, oldest first.
///
/// Months without transactions are included with zero totals.
pub(super) fn get_monthly_trends(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<MonthlyTotals>, Error> {
    let months = trailing_months(today, TREND_MONTHS);
    let window_start = months.first().copied().unwrap_or_else(|| month_start(today));

    let totals_by_month = connection
        .prepare(
            "SELECT substr(date, 1, 7) AS month,
                COALESCE(SUM(CASE WHEN transaction_type = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN transaction_type = 'expense' THEN amount END), 0)
            FROM \"transaction\"
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            GROUP BY month",
        )?
        .query_map(
            (user_id.as_i64(), window_start, month_end(today)),
            |row| Ok((row.get::<_, String>(0)?, (row.get(1)?, row.get(2)?))),
        )?
        .collect::<Result<HashMap<String, (f64, f64)>, _>>()?;

    Ok(months
        .into_iter()
        .map(|month| {
            let (income, expense) = totals_by_month
                .get(&month_key(month))
                .copied()
                .unwrap_or_default();

            MonthlyTotals {
                month,
                income,
                expense,
            }
        })
        .collect())
}

/// Expense totals for each month of the year containing `today`, January first.
///
/// Months without expenses, including those still to come, have a zero total.
pub(super) fn get_monthly_spending(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<MonthlySpending>, Error> {
    let year_start = today.replace_ordinal(1).unwrap_or(today);
    let year_end = Date::from_calendar_date(today.year(), Month::December, 31).unwrap_or(today);

    let totals_by_month = connection
        .prepare(
            "SELECT CAST(substr(date, 6, 2) AS INTEGER) AS month, COALESCE(SUM(amount), 0)
            FROM \"transaction\"
            WHERE user_id = ?1 AND transaction_type = 'expense' AND date >= ?2 AND date <= ?3
            GROUP BY month",
        )?
        .query_map((user_id.as_i64(), year_start, year_end), |row| {
            Ok((row.get::<_, u8>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<HashMap<u8, f64>, _>>()?;

    Ok((1..=12u8)
        .filter_map(|number| Month::try_from(number).ok())
        .map(|month| MonthlySpending {
            month,
            total: totals_by_month
                .get(&u8::from(month))
                .copied()
                .unwrap_or_default(),
        })
        .collect())
}

/// Expense totals per category from one month ago up to today, largest first.
///
/// Expenses without a category are grouped under [UNCATEGORIZED_LABEL].
pub(super) fn get_category_breakdown(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<CategoryExpense>, Error> {
    connection
        .prepare(
            "SELECT c.name, SUM(t.amount) AS total
            FROM \"transaction\" t
            LEFT JOIN category c ON c.id = t.category_id
            WHERE t.user_id = ?1
                AND t.transaction_type = 'expense'
                AND t.date >= ?2
                AND t.date <= ?3
            GROUP BY t.category_id
            ORDER BY total DESC, c.name ASC",
        )?
        .query_map(
            (user_id.as_i64(), one_month_before(today), today),
            |row| {
                let name: Option<String> = row.get(0)?;

                Ok(CategoryExpense {
                    name: name.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned()),
                    total: row.get(1)?,
                })
            },
        )?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Monthly budgets that cover any day of the current month, with this month's
/// expenses in each budget's category. Sorted by category name.
pub(super) fn get_budget_vs_actual(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<BudgetVsActual>, Error> {
    let this_month = DateSpan {
        start: month_start(today),
        end: Some(month_end(today)),
    };

    let rows = connection
        .prepare(
            "SELECT b.id, b.user_id, b.category_id, b.amount, b.period, b.start_date, b.end_date,
                c.name,
                (SELECT COALESCE(SUM(t.amount), 0) FROM \"transaction\" t
                    WHERE t.user_id = b.user_id
                    AND t.category_id = b.category_id
                    AND t.transaction_type = 'expense'
                    AND t.date >= ?2
                    AND t.date <= ?3)
            FROM budget b
            INNER JOIN category c ON c.id = b.category_id
            WHERE b.user_id = ?1 AND b.period = 'monthly'
            ORDER BY c.name ASC, b.id ASC",
        )?
        .query_map(
            (user_id.as_i64(), this_month.start, this_month.end),
            |row| {
                let budget: Budget = map_budget_row(row)?;
                let category_name: String = row.get(7)?;
                let actual: f64 = row.get(8)?;

                Ok((budget, category_name, actual))
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .filter(|(budget, _, _)| ranges_overlap(budget.span(), this_month))
        .map(|(budget, category_name, actual)| BudgetVsActual {
            category_name: CategoryName::new_unchecked(&category_name),
            budget_amount: budget.amount,
            actual,
            spent_percentage: spent_percentage(actual, budget.amount),
        })
        .collect())
}

/// The user's most recent transactions, newest first.
pub(super) fn get_recent_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionListItem>, Error> {
    Ok(query_transactions(
        user_id,
        &TransactionFilter::default(),
        1,
        RECENT_TRANSACTION_COUNT,
        connection,
    )?
    .items)
}

/// The three-letter name of `month`, e.g. "Jan".
pub(super) fn short_month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Three-letter month and year labels, e.g. "Jan 2025".
pub(super) fn format_month_labels(months: &[MonthlyTotals]) -> Vec<String> {
    months
        .iter()
        .map(|totals| {
            format!(
                "{} {}",
                short_month_name(totals.month.month()),
                totals.month.year()
            )
        })
        .collect()
}


#[cfg(test)]
mod query_tests {
    use rusqlite::Connection;
    use time::{Date, Month, macros::date};

    use crate::{
        auth::User,
        budget::{BudgetPeriod, NewBudget, create_budget},
        category::{Category, CategoryName, create_category},
        test_utils::{create_test_user, get_test_connection},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{
        UNCATEGORIZED_LABEL, get_budget_vs_actual, get_category_breakdown, get_monthly_spending,
        get_monthly_trends, get_recent_transactions, get_summary,
    };

    const TODAY: Date = date!(2025 - 03 - 20);

    fn setup() -> (Connection, User) {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);

        (connection, user)
    }

    fn category(user: &User, name: &str, connection: &Connection) -> Category {
        create_category(
            user.id,
            CategoryName::new_unchecked(name),
            TransactionType::Expense,
            connection,
        )
        .unwrap()
    }

    fn add(
        user: &User,
        amount: f64,
        date: Date,
        transaction_type: TransactionType,
        category: Option<&Category>,
        connection: &Connection,
    ) {
        create_transaction(
            user.id,
            Transaction::build(amount, date, "")
                .transaction_type(transaction_type)
                .category_id(category.map(|category| category.id)),
            connection,
        )
        .unwrap();
    }

    #[test]
    fn summary_covers_six_calendar_months() {
        let (connection, user) = setup();
        add(&user, 1000.0, date!(2024 - 10 - 01), TransactionType::Income, None, &connection);
        add(&user, 200.0, date!(2025 - 03 - 01), TransactionType::Expense, None, &connection);
        add(&user, 50.0, date!(2025 - 03 - 20), TransactionType::Expense, None, &connection);
        // Outside the window.
        add(&user, 999.0, date!(2024 - 09 - 30), TransactionType::Income, None, &connection);

        let summary = get_summary(user.id, TODAY, &connection).unwrap();

        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.total_expense, 250.0);
        assert_eq!(summary.balance, 750.0);
        assert_eq!(summary.transaction_count, 2);
    }

    #[test]
    fn monthly_trends_fill_missing_months_with_zero() {
        let (connection, user) = setup();
        add(&user, 100.0, date!(2024 - 11 - 05), TransactionType::Income, None, &connection);
        add(&user, 40.0, date!(2024 - 11 - 06), TransactionType::Expense, None, &connection);
        add(&user, 10.0, date!(2025 - 03 - 02), TransactionType::Expense, None, &connection);

        let trends = get_monthly_trends(user.id, TODAY, &connection).unwrap();

        let got = trends
            .iter()
            .map(|totals| (totals.month, totals.income, totals.expense))
            .collect::<Vec<_>>();
        assert_eq!(
            got,
            vec![
                (date!(2024 - 10 - 01), 0.0, 0.0),
                (date!(2024 - 11 - 01), 100.0, 40.0),
                (date!(2024 - 12 - 01), 0.0, 0.0),
                (date!(2025 - 01 - 01), 0.0, 0.0),
                (date!(2025 - 02 - 01), 0.0, 0.0),
                (date!(2025 - 03 - 01), 0.0, 10.0),
            ]
        );
    }

    #[test]
    fn monthly_spending_covers_calendar_year() {
        let (connection, user) = setup();
        add(&user, 40.0, date!(2025 - 01 - 15), TransactionType::Expense, None, &connection);
        add(&user, 10.0, date!(2025 - 01 - 31), TransactionType::Expense, None, &connection);
        add(&user, 25.0, date!(2025 - 03 - 02), TransactionType::Expense, None, &connection);
        add(&user, 500.0, date!(2025 - 02 - 10), TransactionType::Income, None, &connection);
        // Last year.
        add(&user, 999.0, date!(2024 - 12 - 31), TransactionType::Expense, None, &connection);

        let spending = get_monthly_spending(user.id, TODAY, &connection).unwrap();

        let totals = spending.iter().map(|month| month.total).collect::<Vec<_>>();
        assert_eq!(
            totals,
            vec![50.0, 0.0, 25.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(spending.first().map(|month| month.month), Some(Month::January));
        assert_eq!(spending.last().map(|month| month.month), Some(Month::December));
    }

    #[test]
    fn category_breakdown_groups_uncategorized_and_sorts_by_total() {
        let (connection, user) = setup();
        let food = category(&user, "Food", &connection);
        let transport = category(&user, "Transport", &connection);
        add(&user, 30.0, date!(2025 - 03 - 01), TransactionType::Expense, Some(&food), &connection);
        add(&user, 45.0, date!(2025 - 02 - 20), TransactionType::Expense, Some(&food), &connection);
        add(&user, 20.0, date!(2025 - 03 - 10), TransactionType::Expense, Some(&transport), &connection);
        add(&user, 90.0, date!(2025 - 03 - 15), TransactionType::Expense, None, &connection);
        // Too old, and income.
        add(&user, 500.0, date!(2025 - 02 - 19), TransactionType::Expense, Some(&transport), &connection);
        add(&user, 500.0, date!(2025 - 03 - 15), TransactionType::Income, Some(&food), &connection);

        let breakdown = get_category_breakdown(user.id, TODAY, &connection).unwrap();

        let got = breakdown
            .iter()
            .map(|expense| (expense.name.as_str(), expense.total))
            .collect::<Vec<_>>();
        assert_eq!(
            got,
            vec![(UNCATEGORIZED_LABEL, 90.0), ("Food", 75.0), ("Transport", 20.0)]
        );
    }

    #[test]
    fn budget_vs_actual_only_includes_active_monthly_budgets() {
        let (connection, user) = setup();
        let food = category(&user, "Food", &connection);
        let transport = category(&user, "Transport", &connection);
        let rent = category(&user, "Rent", &connection);
        let budget = |category: &Category, period, start_date, end_date| {
            create_budget(
                user.id,
                NewBudget {
                    category_id: category.id,
                    amount: 200.0,
                    period,
                    start_date,
                    end_date,
                },
                &connection,
            )
            .unwrap();
        };
        budget(&food, BudgetPeriod::Monthly, date!(2025 - 01 - 01), None);
        budget(&transport, BudgetPeriod::Weekly, date!(2025 - 01 - 01), None);
        // Ended before this month.
        budget(&rent, BudgetPeriod::Monthly, date!(2024 - 01 - 01), Some(date!(2025 - 02 - 28)));
        add(&user, 50.0, date!(2025 - 03 - 05), TransactionType::Expense, Some(&food), &connection);
        add(&user, 70.0, date!(2025 - 02 - 05), TransactionType::Expense, Some(&food), &connection);

        let rows = get_budget_vs_actual(user.id, TODAY, &connection).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_name.as_ref(), "Food");
        assert_eq!(rows[0].budget_amount, 200.0);
        assert_eq!(rows[0].actual, 50.0);
        assert_eq!(rows[0].spent_percentage, 25.0);
    }

    #[test]
    fn recent_transactions_are_limited_to_ten() {
        let (connection, user) = setup();
        for day in 1..=12 {
            add(
                &user,
                day as f64,
                date!(2025 - 03 - 01).replace_day(day).unwrap(),
                TransactionType::Expense,
                None,
                &connection,
            );
        }

        let recent = get_recent_transactions(user.id, &connection).unwrap();

        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].transaction.date, date!(2025 - 03 - 12));
    }
}
