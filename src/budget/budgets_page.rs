//! Displays the user's budgets and how much has been spent against each.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{Currency, UserID, get_user_currency},
    budget::{BudgetWithSpend, get_budgets_with_spend},
    endpoints::{self, format_endpoint},
    html::{
        CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, edit_delete_action_links,
        format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budgets page.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_with_spend(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let currency = get_user_currency(user_id, &connection)?;

    Ok(budgets_view(&budgets, currency).into_response())
}

fn progress_bar_class(budget: &BudgetWithSpend) -> &'static str {
    if budget.is_overspent() {
        "bg-red-600 dark:bg-red-500"
    } else if budget.spent_percentage >= 80.0 {
        "bg-yellow-400 dark:bg-yellow-500"
    } else {
        "bg-blue-600 dark:bg-blue-500"
    }
}

fn budget_card(budget: &BudgetWithSpend, currency: Currency) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.budget.id);
    let delete_url = format_endpoint(endpoints::BUDGET, budget.budget.id);
    let bar_width = budget.spent_percentage.clamp(0.0, 100.0);
    let card_border = if budget.is_overspent() {
        "border-red-500 dark:border-red-500"
    } else {
        ""
    };
    let date_range = match budget.budget.end_date {
        Some(end_date) => format!("{} to {}", budget.budget.start_date, end_date),
        None => format!("From {}", budget.budget.start_date),
    };

    html! {
        li
            class={ (CARD_STYLE) " " (card_border) }
            data-budget-card="true"
            data-overspent=(budget.is_overspent())
        {
            div class="flex items-start justify-between gap-3"
            {
                div
                {
                    h3 class="font-semibold text-lg text-gray-900 dark:text-white"
                    {
                        (budget.category_name)
                    }
                    p class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        (budget.budget.period.label()) " · " (date_range)
                    }
                }

                div class="flex items-center gap-4 text-sm"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &format!(
                            "Are you sure you want to delete the budget for '{}'? This cannot be undone.",
                            budget.category_name
                        ),
                        "closest [data-budget-card='true']",
                        "outerHTML",
                    ))
                }
            }

            div class="mt-4 space-y-2"
            {
                div class="flex items-center justify-between text-sm"
                {
                    span class="text-gray-500 dark:text-gray-400"
                    {
                        (format_currency(budget.spent, currency))
                        " of "
                        (format_currency(budget.budget.amount, currency))
                    }

                    @if budget.is_overspent() {
                        span class="font-medium text-red-600 dark:text-red-400"
                        {
                            (format!("{:.2}%", budget.spent_percentage))
                        }
                    } @else {
                        span class="font-medium"
                        {
                            (format!("{:.2}%", budget.spent_percentage))
                        }
                    }
                }

                div
                    class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700"
                    role="progressbar"
                    aria-valuemin="0"
                    aria-valuemax="100"
                    aria-valuenow=(bar_width)
                {
                    div
                        class={ "h-2 rounded-full " (progress_bar_class(budget)) }
                        style=(format!("width: {bar_width}%"))
                    {}
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    @if budget.is_overspent() {
                        span class="text-red-600 dark:text-red-400"
                        {
                            "Overspent by " (format_currency(-budget.remaining, currency))
                        }
                    } @else {
                        (format_currency(budget.remaining, currency)) " remaining"
                    }
                }
            }
        }
    }
}

fn budgets_view(budgets: &[BudgetWithSpend], currency: Currency) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                    {
                        "Create Budget"
                    }
                }

                @if budgets.is_empty() {
                    div class="rounded-lg border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                    {
                        "No budgets yet. "
                        a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                        {
                            "Create a budget"
                        }
                        " to track your spending."
                    }
                } @else {
                    ul class="grid gap-4 md:grid-cols-2 lg:grid-cols-3"
                    {
                        @for budget in budgets {
                            (budget_card(budget, currency))
                        }
                    }
                }
            }
        }
    };

    base("Budgets", &[], &content)
}
