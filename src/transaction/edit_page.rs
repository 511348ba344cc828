//! Defines the route handler for the page for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::{Currency, UserID, get_user_currency, normalize_redirect_url},
    category::Category,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, currency_input_styles, loading_spinner},
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        Transaction,
        create_page::get_category_options,
        form::{TransactionFormDefaults, transaction_form_fields},
        get_transaction,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
    /// The database connection for reading the transaction and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Where to send the user after the transaction is saved.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The URL the edit form submits to, keeping a safe `redirect_url`.
pub(super) fn update_endpoint_with_redirect(
    transaction_id: TransactionId,
    redirect_url: Option<&str>,
) -> String {
    let endpoint = format_endpoint(endpoints::TRANSACTION, transaction_id);

    match redirect_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => {
            match serde_urlencoded::to_string([("redirect_url", redirect_url.as_str())]) {
                Ok(query) => format!("{endpoint}?{query}"),
                Err(error) => {
                    tracing::warn!("Could not encode redirect URL {redirect_url}: {error}");
                    endpoint
                }
            }
        }
        None => endpoint,
    }
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response, Error> {
    let max_date = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(user_id, transaction_id, &connection).inspect_err(
        |error| {
            if *error != Error::NotFound {
                tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
            }
        },
    )?;
    let categories = get_category_options(user_id, &connection)?;
    let currency = get_user_currency(user_id, &connection)?;

    let update_endpoint =
        update_endpoint_with_redirect(transaction_id, query.redirect_url.as_deref());

    Ok(edit_transaction_view(
        &transaction,
        &update_endpoint,
        max_date,
        &categories,
        currency,
    )
    .into_response())
}

fn edit_transaction_view(
    transaction: &Transaction,
    update_endpoint: &str,
    max_date: Date,
    categories: &[Category],
    currency: Currency,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            transaction_type: transaction.transaction_type,
            amount: Some(transaction.amount),
            date: transaction.date,
            description: Some(&transaction.description),
            category_id: transaction.category_id,
            // Never below the saved date, or the form could not be resubmitted.
            max_date: max_date.max(transaction.date),
            autofocus_amount: false,
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
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Update Transaction"
                }
            }
        }
    };

    base("Edit Transaction", &[currency_input_styles(currency)], &content)
}
