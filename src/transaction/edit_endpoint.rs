//! Defines the endpoint for updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, normalize_redirect_url},
    database_id::TransactionId,
    endpoints,
    timezone::local_today,
    transaction::{
        core::update_transaction, edit_page::RedirectQuery, form::TransactionForm,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for updating a transaction.
///
/// Redirects to `redirect_url` if it is a local page, otherwise to the transactions page.
pub async fn edit_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query_params): Query<RedirectQuery>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let transaction = form.into_builder();

    if let Err(error) = transaction.validate(today) {
        tracing::debug!("Rejected update to transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(user_id, transaction_id, transaction, &connection) {
        Ok(_) => {}
        Err(
            error @ (Error::UpdateMissingTransaction
            | Error::InvalidCategory(_)
            | Error::InvalidAmount(_)),
        ) => return error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    }

    let redirect_url = query_params
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url)
        .unwrap_or_else(|| endpoints::TRANSACTIONS_VIEW.to_owned());

    (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        auth::User,
        endpoints,
        test_utils::{assert_hx_redirect, create_test_user, get_test_connection},
        transaction::{
            Transaction, TransactionType, create_transaction, edit_page::RedirectQuery,
            form::TransactionForm, get_transaction,
        },
    };

    use super::{EditTransactionState, edit_transaction_endpoint};

    fn get_state() -> (EditTransactionState, User, i64) {
        let conn = get_test_connection();
        let user = create_test_user("a@example.com", &conn);
        let transaction = create_transaction(
            user.id,
            Transaction::build(1.23, date!(2025 - 10 - 27), "test"),
            &conn,
        )
        .expect("could not create test transaction");
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user, transaction.id)
    }

    fn form() -> TransactionForm {
        TransactionForm {
            transaction_type: TransactionType::Income,
            amount: 3.21,
            date: date!(2025 - 10 - 28),
            description: "foo".to_owned(),
            category_id: None,
        }
    }

    #[tokio::test]
    async fn can_update_transaction() {
        let (state, user, transaction_id) = get_state();
        let redirect_url = "/transactions?page=3".to_owned();

        let response = edit_transaction_endpoint(
            Path(transaction_id),
            State(state.clone()),
            Extension(user.id),
            Query(RedirectQuery {
                redirect_url: Some(redirect_url.clone()),
            }),
            Form(form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, &redirect_url);
        let got = get_transaction(
            user.id,
            transaction_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(got.amount, 3.21);
        assert_eq!(got.date, date!(2025 - 10 - 28));
        assert_eq!(got.description, "foo");
        assert_eq!(got.transaction_type, TransactionType::Income);
    }

    #[tokio::test]
    async fn external_redirect_falls_back_to_transactions_page() {
        let (state, user, transaction_id) = get_state();

        let response = edit_transaction_endpoint(
            Path(transaction_id),
            State(state),
            Extension(user.id),
            Query(RedirectQuery {
                redirect_url: Some("https://evil.example.com".to_owned()),
            }),
            Form(form()),
        )
        .await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
    }

    #[tokio::test]
    async fn update_by_other_user_is_not_found() {
        let (state, _, transaction_id) = get_state();
        let other = create_test_user("b@example.com", &state.db_connection.lock().unwrap());

        let response = edit_transaction_endpoint(
            Path(transaction_id),
            State(state),
            Extension(other.id),
            Query(RedirectQuery::default()),
            Form(form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
