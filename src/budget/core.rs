//! Budget models, spend calculations and database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::CategoryName,
    database_id::{BudgetId, CategoryId},
    transaction::validate_amount,
};

// ============================================================================
// MODELS
// ============================================================================

/// How often a budget's amount is meant to be spent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Seven days.
    Weekly,
    /// One calendar month.
    #[default]
    Monthly,
    /// One calendar year.
    Yearly,
}

impl BudgetPeriod {
    /// All periods in the order they are shown in forms.
    pub const ALL: [BudgetPeriod; 3] = [
        BudgetPeriod::Weekly,
        BudgetPeriod::Monthly,
        BudgetPeriod::Yearly,
    ];

    /// The value used in the database and in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    /// The name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "Weekly",
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Yearly => "Yearly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(Error::InvalidBudgetPeriod(other.to_owned())),
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An inclusive range of dates. A missing end date means the range never ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: Date,
    pub end: Option<Date>,
}

/// Whether two date spans share at least one day.
pub fn ranges_overlap(a: DateSpan, b: DateSpan) -> bool {
    let a_starts_before_b_ends = b.end.is_none_or(|b_end| a.start <= b_end);
    let b_starts_before_a_ends = a.end.is_none_or(|a_end| b.start <= a_end);

    a_starts_before_b_ends && b_starts_before_a_ends
}

/// `spent` as a percentage of `amount`, rounded to two decimal places.
///
/// A budget of zero or less has nothing to spend, so the percentage is zero.
pub fn spent_percentage(spent: f64, amount: f64) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }

    (spent / amount * 10_000.0).round() / 100.0
}

/// A limit on how much a user wants to spend in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub category_id: CategoryId,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: Date,
    /// The last day of the budget, or `None` if the budget is open-ended.
    pub end_date: Option<Date>,
}

impl Budget {
    /// The days whose expenses count towards this budget.
    pub fn span(&self) -> DateSpan {
        DateSpan {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// The fields needed to create or update a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The expense category whose spending is limited.
    pub category_id: CategoryId,
    /// The most the user wants to spend.
    pub amount: f64,
    /// How often the amount is meant to be spent.
    pub period: BudgetPeriod,
    /// The first day that counts towards the budget.
    pub start_date: Date,
    /// The last day that counts, or `None` for an open-ended budget.
    pub end_date: Option<Date>,
}

impl NewBudget {
    /// Check the amount and date range.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is negative or not finite,
    /// or [Error::InvalidDateRange] if the end date is before the start date.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)?;

        match self.end_date {
            Some(end) if end < self.start_date => Err(Error::InvalidDateRange {
                start: self.start_date,
                end,
            }),
            _ => Ok(()),
        }
    }

    fn span(&self) -> DateSpan {
        DateSpan {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// A budget with how much has been spent against it.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetWithSpend {
    pub budget: Budget,
    pub category_name: CategoryName,
    /// Total expenses in the budget's category within the budget's dates.
    pub spent: f64,
    pub spent_percentage: f64,
    /// The budget amount minus the amount spent. Negative when overspent.
    pub remaining: f64,
}

impl BudgetWithSpend {
    fn new(budget: Budget, category_name: CategoryName, spent: f64) -> Self {
        let spent_percentage = spent_percentage(spent, budget.amount);
        let remaining = budget.amount - spent;

        Self {
            budget,
            category_name,
            spent,
            spent_percentage,
            remaining,
        }
    }

    pub fn is_overspent(&self) -> bool {
        self.spent > self.budget.amount
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const BUDGET_COLUMNS: &str = "id, user_id, category_id, amount, period, start_date, end_date";

/// Expenses in the budget's category within the budget's dates.
///
/// Expects the budget table to be aliased as `b`.
const SPENT_SUBQUERY: &str = "(SELECT COALESCE(SUM(t.amount), 0) FROM \"transaction\" t \
    WHERE t.user_id = b.user_id \
    AND t.category_id = b.category_id \
    AND t.transaction_type = 'expense' \
    AND t.date >= b.start_date \
    AND (b.end_date IS NULL OR t.date <= b.end_date))";

/// Check that the category belongs to `user_id` and is an expense category.
fn ensure_category_owned(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .query_row(
            "SELECT 1 FROM category WHERE id = ?1 AND user_id = ?2 AND kind = 'expense'",
            (category_id, user_id.as_i64()),
            |_| Ok(()),
        )
        .optional()?
        .ok_or(Error::NotFound)
}

/// Check that no other budget of the user's covers the same category and period
/// on any of the same days.
fn ensure_no_overlap(
    user_id: UserID,
    budget: &NewBudget,
    exclude_id: Option<BudgetId>,
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection.prepare(
        "SELECT start_date, end_date FROM budget \
        WHERE user_id = ?1 AND category_id = ?2 AND period = ?3 AND id IS NOT ?4",
    )?;

    let existing_spans = statement.query_map(
        (user_id.as_i64(), budget.category_id, budget.period, exclude_id),
        |row| {
            Ok(DateSpan {
                start: row.get(0)?,
                end: row.get(1)?,
            })
        },
    )?;

    for span in existing_spans {
        if ranges_overlap(span?, budget.span()) {
            return Err(Error::OverlappingBudget);
        }
    }

    Ok(())
}

/// Create a budget for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] or [Error::InvalidDateRange] if the budget is not valid,
/// - [Error::NotFound] if the category does not belong to the user or is an
///   income category,
/// - [Error::OverlappingBudget] if another budget for the same category and
///   period covers any of the same days,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    budget.validate()?;
    ensure_category_owned(user_id, budget.category_id, connection)?;
    ensure_no_overlap(user_id, &budget, None, connection)?;

    let created = connection
        .prepare(&format!(
            "INSERT INTO budget (user_id, category_id, amount, period, start_date, end_date) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
            RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                budget.category_id,
                budget.amount,
                budget.period,
                budget.start_date,
                budget.end_date,
            ),
            map_budget_row,
        )?;

    Ok(created)
}

/// Replace the fields of a budget owned by `user_id`.
///
/// The budget is not compared against itself when checking for overlaps.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingBudget] if the budget does not exist or belongs to another user,
/// - [Error::InvalidAmount] or [Error::InvalidDateRange] if the budget is not valid,
/// - [Error::NotFound] if the category does not belong to the user or is an
///   income category,
/// - [Error::OverlappingBudget] if another budget overlaps the new dates,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    user_id: UserID,
    budget_id: BudgetId,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    match get_budget(user_id, budget_id, connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::UpdateMissingBudget),
        Err(error) => return Err(error),
    }

    budget.validate()?;
    ensure_category_owned(user_id, budget.category_id, connection)?;
    ensure_no_overlap(user_id, &budget, Some(budget_id), connection)?;

    let updated = connection
        .prepare(&format!(
            "UPDATE budget \
            SET category_id = ?1, amount = ?2, period = ?3, start_date = ?4, end_date = ?5 \
            WHERE id = ?6 AND user_id = ?7 \
            RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            (
                budget.category_id,
                budget.amount,
                budget.period,
                budget.start_date,
                budget.end_date,
                budget_id,
                user_id.as_i64(),
            ),
            map_budget_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingBudget,
            error => error.into(),
        })?;

    Ok(updated)
}

/// Delete a budget owned by `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingBudget] if the budget does not exist or belongs
/// to another user, or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Retrieve a budget owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn get_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((budget_id, user_id.as_i64()), map_budget_row)
        .map_err(|error| error.into())
}

/// Retrieve the user's budgets, newest first, with the amount spent against each.
pub fn get_budgets_with_spend(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetWithSpend>, Error> {
    connection
        .prepare(&format!(
            "SELECT b.id, b.user_id, b.category_id, b.amount, b.period, b.start_date, b.end_date, \
                c.name, {SPENT_SUBQUERY} \
            FROM budget b \
            INNER JOIN category c ON c.id = b.category_id \
            WHERE b.user_id = ?1 \
            ORDER BY b.id DESC"
        ))?
        .query_map([user_id.as_i64()], |row| {
            let budget = map_budget_row(row)?;
            let category_name = CategoryName::new_unchecked(&row.get::<_, String>(7)?);
            let spent = row.get(8)?;

            Ok(BudgetWithSpend::new(budget, category_name, spent))
        })?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                period TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'yearly')),
                start_date TEXT NOT NULL,
                end_date TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_user_category \
        ON budget(user_id, category_id, period);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Budget.
///
/// The row must contain the columns in the same order as [BUDGET_COLUMNS].
pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        period: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod budget_period_tests {
    use std::str::FromStr;

    use crate::Error;

    use super::BudgetPeriod;

    #[test]
    fn parses_all_periods() {
        for period in BudgetPeriod::ALL {
            assert_eq!(BudgetPeriod::from_str(period.as_str()), Ok(period));
        }
    }

    #[test]
    fn rejects_unknown_period() {
        assert_eq!(
            BudgetPeriod::from_str("daily"),
            Err(Error::InvalidBudgetPeriod("daily".to_owned()))
        );
    }
}

#[cfg(test)]
mod overlap_tests {
    use time::{Date, macros::date};

    use super::{DateSpan, ranges_overlap};

    fn span(start: Date, end: Option<Date>) -> DateSpan {
        DateSpan { start, end }
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        let january = span(date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31)));
        let february = span(date!(2025 - 02 - 01), Some(date!(2025 - 02 - 28)));

        assert!(!ranges_overlap(january, february));
    }

    #[test]
    fn ranges_sharing_one_day_overlap() {
        let first = span(date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31)));
        let second = span(date!(2025 - 01 - 31), Some(date!(2025 - 02 - 28)));

        assert!(ranges_overlap(first, second));
    }

    #[test]
    fn open_ended_range_overlaps_everything_after_its_start() {
        let open = span(date!(2025 - 01 - 01), None);
        let later = span(date!(2030 - 06 - 01), Some(date!(2030 - 06 - 30)));
        let earlier = span(date!(2024 - 01 - 01), Some(date!(2024 - 12 - 31)));

        assert!(ranges_overlap(open, later));
        assert!(!ranges_overlap(open, earlier));
    }

    #[test]
    fn two_open_ended_ranges_always_overlap() {
        let a = span(date!(2025 - 01 - 01), None);
        let b = span(date!(2030 - 01 - 01), None);

        assert!(ranges_overlap(a, b));
    }

    #[test]
    fn overlap_is_symmetric() {
        let days = [
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 15),
            date!(2025 - 02 - 01),
            date!(2025 - 03 - 01),
        ];
        let mut spans = Vec::new();
        for start in days {
            spans.push(span(start, None));
            for end in days.iter().filter(|end| **end >= start) {
                spans.push(span(start, Some(*end)));
            }
        }

        for a in &spans {
            for b in &spans {
                assert_eq!(
                    ranges_overlap(*a, *b),
                    ranges_overlap(*b, *a),
                    "overlap of {a:?} and {b:?} is not symmetric"
                );
            }
        }
    }
}



#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        Error,
        auth::User,
        category::{Category, CategoryName, create_category},
        test_utils::{create_test_user, get_test_connection},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{
        BudgetPeriod, NewBudget, create_budget, delete_budget, get_budget,
        get_budgets_with_spend, update_budget,
    };

    fn setup() -> (Connection, User, Category) {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        let category = create_category(
            user.id,
            CategoryName::new_unchecked("Food"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();

        (connection, user, category)
    }

    fn monthly(category: &Category, start: Date, end: Option<Date>) -> NewBudget {
        NewBudget {
            category_id: category.id,
            amount: 100.0,
            period: BudgetPeriod::Monthly,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn create_and_get_budget() {
        let (connection, user, category) = setup();

        let created = create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), Some(date!(2025 - 12 - 31))),
            &connection,
        )
        .unwrap();

        assert_eq!(created.user_id, user.id);
        assert_eq!(created.category_id, category.id);
        assert_eq!(created.period, BudgetPeriod::Monthly);
        assert_eq!(created.end_date, Some(date!(2025 - 12 - 31)));
        assert_eq!(get_budget(user.id, created.id, &connection), Ok(created));
    }

    #[test]
    fn create_fails_for_category_of_other_user() {
        let (connection, _, category) = setup();
        let other = create_test_user("b@example.com", &connection);

        let result = create_budget(
            other.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn create_fails_for_income_category() {
        let (connection, user, _) = setup();
        let salary = create_category(
            user.id,
            CategoryName::new_unchecked("Salary"),
            TransactionType::Income,
            &connection,
        )
        .unwrap();

        let result = create_budget(
            user.id,
            monthly(&salary, date!(2025 - 01 - 01), None),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(get_budgets_with_spend(user.id, &connection).map(|b| b.len()), Ok(0));
    }

    #[test]
    fn update_fails_when_moved_to_income_category() {
        let (connection, user, food) = setup();
        let salary = create_category(
            user.id,
            CategoryName::new_unchecked("Salary"),
            TransactionType::Income,
            &connection,
        )
        .unwrap();
        let budget = create_budget(
            user.id,
            monthly(&food, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        let result = update_budget(
            user.id,
            budget.id,
            monthly(&salary, date!(2025 - 01 - 01), None),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(get_budget(user.id, budget.id, &connection), Ok(budget));
    }

    #[test]
    fn create_fails_on_overlap_in_same_category_and_period() {
        let (connection, user, category) = setup();
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), Some(date!(2025 - 06 - 30))),
            &connection,
        )
        .unwrap();

        let result = create_budget(
            user.id,
            monthly(&category, date!(2025 - 06 - 30), None),
            &connection,
        );

        assert_eq!(result, Err(Error::OverlappingBudget));
    }

    #[test]
    fn open_ended_budget_blocks_later_budgets() {
        let (connection, user, category) = setup();
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        let result = create_budget(
            user.id,
            monthly(&category, date!(2040 - 01 - 01), Some(date!(2040 - 01 - 31))),
            &connection,
        );

        assert_eq!(result, Err(Error::OverlappingBudget));
    }

    #[test]
    fn different_period_or_category_never_conflicts() {
        let (connection, user, category) = setup();
        let other_category = create_category(
            user.id,
            CategoryName::new_unchecked("Transport"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        let weekly = NewBudget {
            period: BudgetPeriod::Weekly,
            ..monthly(&category, date!(2025 - 01 - 01), None)
        };
        assert!(create_budget(user.id, weekly, &connection).is_ok());
        assert!(
            create_budget(
                user.id,
                monthly(&other_category, date!(2025 - 01 - 01), None),
                &connection,
            )
            .is_ok()
        );
    }

    #[test]
    fn other_users_budgets_do_not_conflict() {
        let (connection, user, category) = setup();
        let other = create_test_user("b@example.com", &connection);
        let other_category = create_category(
            other.id,
            CategoryName::new_unchecked("Food"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        let result = create_budget(
            other.id,
            monthly(&other_category, date!(2025 - 01 - 01), None),
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn update_does_not_conflict_with_itself() {
        let (connection, user, category) = setup();
        let budget = create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), Some(date!(2025 - 06 - 30))),
            &connection,
        )
        .unwrap();

        let updated = update_budget(
            user.id,
            budget.id,
            NewBudget {
                amount: 250.0,
                ..monthly(&category, date!(2025 - 02 - 01), None)
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.id, budget.id);
        assert_eq!(updated.amount, 250.0);
        assert_eq!(updated.start_date, date!(2025 - 02 - 01));
        assert_eq!(updated.end_date, None);
    }

    #[test]
    fn update_fails_on_overlap_with_other_budget() {
        let (connection, user, category) = setup();
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31))),
            &connection,
        )
        .unwrap();
        let february = create_budget(
            user.id,
            monthly(&category, date!(2025 - 02 - 01), Some(date!(2025 - 02 - 28))),
            &connection,
        )
        .unwrap();

        let result = update_budget(
            user.id,
            february.id,
            monthly(&category, date!(2025 - 01 - 15), Some(date!(2025 - 02 - 28))),
            &connection,
        );

        assert_eq!(result, Err(Error::OverlappingBudget));
    }

    #[test]
    fn update_of_other_users_budget_fails() {
        let (connection, user, category) = setup();
        let other = create_test_user("b@example.com", &connection);
        let budget = create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        let result = update_budget(
            other.id,
            budget.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingBudget));
    }

    #[test]
    fn delete_budget_removes_it() {
        let (connection, user, category) = setup();
        let budget = create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_budget(user.id, budget.id, &connection), Ok(()));
        assert_eq!(
            get_budget(user.id, budget.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_of_other_users_budget_fails() {
        let (connection, user, category) = setup();
        let other = create_test_user("b@example.com", &connection);
        let budget = create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_budget(other.id, budget.id, &connection),
            Err(Error::DeleteMissingBudget)
        );
        assert!(get_budget(user.id, budget.id, &connection).is_ok());
    }

    #[test]
    fn spend_counts_expenses_in_category_and_dates_only() {
        let (connection, user, category) = setup();
        let other_category = create_category(
            user.id,
            CategoryName::new_unchecked("Transport"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31))),
            &connection,
        )
        .unwrap();
        let add = |amount: f64, date: Date, category_id, transaction_type| {
            create_transaction(
                user.id,
                Transaction::build(amount, date, "")
                    .category_id(category_id)
                    .transaction_type(transaction_type),
                &connection,
            )
            .unwrap();
        };
        add(30.0, date!(2025 - 01 - 01), Some(category.id), TransactionType::Expense);
        add(45.5, date!(2025 - 01 - 31), Some(category.id), TransactionType::Expense);
        add(99.0, date!(2025 - 02 - 01), Some(category.id), TransactionType::Expense);
        add(99.0, date!(2024 - 12 - 31), Some(category.id), TransactionType::Expense);
        add(99.0, date!(2025 - 01 - 10), Some(category.id), TransactionType::Income);
        add(99.0, date!(2025 - 01 - 10), Some(other_category.id), TransactionType::Expense);
        add(99.0, date!(2025 - 01 - 10), None, TransactionType::Expense);

        let budgets = get_budgets_with_spend(user.id, &connection).unwrap();

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].spent, 75.5);
        assert_eq!(budgets[0].spent_percentage, 75.5);
        assert_eq!(budgets[0].remaining, 24.5);
        assert!(!budgets[0].is_overspent());
        assert_eq!(budgets[0].category_name.as_ref(), "Food");
    }

    #[test]
    fn open_ended_budget_counts_all_later_expenses() {
        let (connection, user, category) = setup();
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();
        for date in [date!(2025 - 01 - 01), date!(2026 - 06 - 15), date!(2030 - 12 - 31)] {
            create_transaction(
                user.id,
                Transaction::build(50.0, date, "").category_id(Some(category.id)),
                &connection,
            )
            .unwrap();
        }

        let budgets = get_budgets_with_spend(user.id, &connection).unwrap();

        assert_eq!(budgets[0].spent, 150.0);
        assert_eq!(budgets[0].remaining, -50.0);
        assert!(budgets[0].is_overspent());
    }

    #[test]
    fn budgets_are_listed_newest_first() {
        let (connection, user, category) = setup();
        let first = create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31))),
            &connection,
        )
        .unwrap();
        let second = create_budget(
            user.id,
            monthly(&category, date!(2025 - 02 - 01), Some(date!(2025 - 02 - 28))),
            &connection,
        )
        .unwrap();

        let ids = get_budgets_with_spend(user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|budget| budget.budget.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn does_not_list_other_users_budgets() {
        let (connection, user, category) = setup();
        let other = create_test_user("b@example.com", &connection);
        create_budget(
            user.id,
            monthly(&category, date!(2025 - 01 - 01), None),
            &connection,
        )
        .unwrap();

        assert!(get_budgets_with_spend(other.id, &connection).unwrap().is_empty());
    }
}
