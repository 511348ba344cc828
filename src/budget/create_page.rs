//! Defines the route handler for the page for creating a new budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::{Currency, UserID, get_user_currency},
    budget::{
        BudgetPeriod,
        form::{BudgetFormDefaults, budget_form_fields},
    },
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, currency_input_styles, link,
        loading_spinner,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::TransactionType,
};

/// The state needed for the new budget page.
#[derive(Debug, Clone)]
pub struct CreateBudgetPageState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
    /// The database connection for reading categories and the user's currency.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The user's categories that a budget can be set for.
pub(super) fn get_expense_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    Ok(get_categories(user_id, connection)?
        .into_iter()
        .map(|row| row.category)
        .filter(|category| category.kind == TransactionType::Expense)
        .collect())
}

/// Renders the page for creating a budget.
pub async fn get_new_budget_page(
    State(state): State<CreateBudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_expense_categories(user_id, &connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve categories for new budget page: {error}")
    })?;
    let currency = get_user_currency(user_id, &connection)?;

    Ok(create_budget_view(today, &categories, currency).into_response())
}

fn create_budget_view(today: Date, categories: &[Category], currency: Currency) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = budget_form_fields(
        &BudgetFormDefaults {
            category_id: None,
            amount: None,
            period: BudgetPeriod::Monthly,
            start_date: today.replace_day(1).unwrap_or(today),
            end_date: None,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            @if categories.is_empty() {
                div class="w-full space-y-4"
                {
                    h2 class="text-xl font-bold" { "New Budget" }
                    p
                    {
                        "Budgets are set per expense category. "
                        (link(endpoints::NEW_CATEGORY_VIEW, "Create an expense category"))
                        " first."
                    }
                }
            } @else {
                form
                    hx-post=(endpoints::BUDGETS_API)
                    hx-target-error="#alert-container"
                    class="w-full space-y-4 md:space-y-6"
                {
                    h2 class="text-xl font-bold" { "New Budget" }

                    (fields)

                    button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span
                            id="indicator"
                            class="inline htmx-indicator"
                        {
                            (spinner)
                        }
                        " Create Budget"
                    }
                }
            }
        }
    };

    base("Create Budget", &[currency_input_styles(currency)], &content)
}
