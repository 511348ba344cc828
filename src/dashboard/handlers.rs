//! Dashboard HTTP handlers and view rendering.

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
    dashboard::{
        aggregation::{
            BudgetVsActual, DashboardSummary, get_budget_vs_actual, get_category_breakdown,
            get_monthly_spending, get_monthly_trends, get_recent_transactions, get_summary,
        },
        cards::summary_cards_view,
        charts::{DashboardChart, charts_script, charts_view, dashboard_charts},
        tables::{budget_vs_actual_table, recent_transactions_table},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    timezone::local_today,
    transaction::{TransactionListItem, count_transactions},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    summary: DashboardSummary,
    charts: Vec<DashboardChart>,
    budget_vs_actual: Vec<BudgetVsActual>,
    recent_transactions: Vec<TransactionListItem>,
    currency: Currency,
}

/// Display a page with an overview of the user's income, spending and budgets.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    if count_transactions(user_id, &connection)? == 0 {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let data = build_dashboard_data(user_id, today, &connection)
        .inspect_err(|error| tracing::error!("could not build dashboard: {error}"))?;

    Ok(dashboard_view(nav_bar, &data).into_response())
}

fn build_dashboard_data(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let currency = get_user_currency(user_id, connection)?;
    let summary = get_summary(user_id, today, connection)?;
    let monthly_totals = get_monthly_trends(user_id, today, connection)?;
    let monthly_spending = get_monthly_spending(user_id, today, connection)?;
    let category_breakdown = get_category_breakdown(user_id, today, connection)?;
    let budget_vs_actual = get_budget_vs_actual(user_id, today, connection)?;
    let recent_transactions = get_recent_transactions(user_id, connection)?;

    let charts = dashboard_charts(
        &monthly_totals,
        &monthly_spending,
        &category_breakdown,
        &budget_vs_actual,
        currency,
    );

    Ok(DashboardData {
        summary,
        charts,
        budget_vs_actual,
        recent_transactions,
        currency,
    })
}

/// Renders the dashboard page when the user has no transactions.
fn dashboard_no_data_view(nav_bar: Markup) -> Markup {
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "add a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(nav_bar: Markup, data: &DashboardData) -> Markup {
    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&data.summary, data.currency))

            (charts_view(&data.charts))

            div class="w-full grid grid-cols-1 xl:grid-cols-2 gap-4 mb-8"
            {
                (budget_vs_actual_table(&data.budget_vs_actual, data.currency))
                div { (recent_transactions_table(&data.recent_transactions, data.currency)) }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}
