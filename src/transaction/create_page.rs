//! Defines the route handler for the page for creating a new transaction.

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
    category::{Category, get_categories},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, currency_input_styles, loading_spinner},
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        TransactionType,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
    /// The database connection for reading categories and the user's currency.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the user's categories for a category select input.
pub(super) fn get_category_options(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    Ok(get_categories(user_id, connection)?
        .into_iter()
        .map(|row| row.category)
        .collect())
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_category_options(user_id, &connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve categories for new transaction page: {error}")
    })?;
    let currency = get_user_currency(user_id, &connection)?;

    Ok(create_transaction_view(today, &categories, currency).into_response())
}

fn create_transaction_view(max_date: Date, categories: &[Category], currency: Currency) -> Markup {
    let create_transaction_route = endpoints::TRANSACTIONS_API;
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            transaction_type: TransactionType::Expense,
            amount: None,
            date: max_date,
            description: None,
            category_id: None,
            max_date,
            autofocus_amount: true,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(create_transaction_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base(
        "Create Transaction",
        &[currency_input_styles(currency)],
        &content,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        category::create_default_categories,
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_hx_endpoint, assert_valid_html,
            create_test_user, get_test_connection, must_get_form, parse_html_document,
        },
    };

    use super::{CreateTransactionPageState, get_new_transaction_page};

    #[tokio::test]
    async fn render_page() {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        create_default_categories(user.id, &connection).unwrap();
        let state = CreateTransactionPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_new_transaction_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_input(&form, "type_", "radio");
        let options = form
            .select(&Selector::parse("select[name=category_id] option").unwrap())
            .count();
        // 12 default categories plus the empty option.
        assert_eq!(options, 13);
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        let state = CreateTransactionPageState {
            local_timezone: "Not/AZone".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = get_new_transaction_page(State(state), Extension(user.id)).await;

        assert!(result.is_err());
    }
}
