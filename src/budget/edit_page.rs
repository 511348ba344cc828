//! Defines the route handler for the page for editing a budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{Currency, UserID, get_user_currency},
    budget::{
        Budget,
        create_page::get_expense_categories,
        form::{BudgetFormDefaults, budget_form_fields},
        get_budget,
    },
    category::Category,
    database_id::BudgetId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, currency_input_styles, loading_spinner},
    navigation::NavBar,
};

/// The state needed for the edit budget page.
#[derive(Debug, Clone)]
pub struct EditBudgetPageState {
    /// The database connection for reading the budget and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a budget.
pub async fn get_edit_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(user_id, budget_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve budget {budget_id}: {error}");
        }
    })?;
    let categories = get_expense_categories(user_id, &connection)?;
    let currency = get_user_currency(user_id, &connection)?;

    Ok(edit_budget_view(&budget, &categories, currency).into_response())
}

fn edit_budget_view(budget: &Budget, categories: &[Category], currency: Currency) -> Markup {
    let update_endpoint = format_endpoint(endpoints::BUDGET, budget.id);
    let nav_bar = NavBar::new(endpoints::EDIT_BUDGET_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = budget_form_fields(
        &BudgetFormDefaults {
            category_id: Some(budget.category_id),
            amount: Some(budget.amount),
            period: budget.period,
            start_date: budget.start_date,
            end_date: budget.end_date,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Budget" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Update Budget"
                }
            }
        }
    };

    base("Edit Budget", &[currency_input_styles(currency)], &content)
}
