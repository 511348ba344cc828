//! The settings page and the endpoint for changing the user's display currency.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{Currency, UserID, get_user_currency, update_currency},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, base, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the settings page and endpoints.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// The database connection for reading and updating user settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for changing the display currency.
#[derive(Debug, Deserialize)]
pub struct CurrencyForm {
    /// The new currency.
    pub currency: Currency,
}

/// Render the settings page.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let currency = get_user_currency(user_id, &connection)?;

    Ok(settings_view(currency).into_response())
}

/// A route handler for changing the user's currency, redirects to the settings page on success.
pub async fn update_currency_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CurrencyForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_currency(user_id, form.currency, &connection) {
        Ok(()) => {
            tracing::info!("User {user_id} changed their currency to {}", form.currency.as_str());
            (
                HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not update currency for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn settings_view(current_currency: Currency) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Settings" }

            form
                hx-put=(endpoints::CURRENCY_API)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                fieldset class="space-y-2"
                {
                    legend class=(FORM_LABEL_STYLE) { "Currency" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for currency in Currency::ALL {
                            @let id = format!("currency-{}", currency.as_str());

                            div class="flex items-center gap-3"
                            {
                                input
                                    name="currency"
                                    id=(id)
                                    type="radio"
                                    value=(currency.as_str())
                                    checked[currency == current_currency]
                                    required
                                    tabindex="0"
                                    class=(FORM_RADIO_INPUT_STYLE);

                                label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                                {
                                    (currency.name()) " (" (format_currency(1234.5, currency)) ")"
                                }
                            }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
            }
        }
    };

    base("Settings", &[], &content)
}
