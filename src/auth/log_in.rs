//! The log in page and the endpoint that checks credentials and starts a session.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Email, User, get_user_by_email, invalidate_auth_cookie, normalize_redirect_url,
        set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        loading_spinner, log_in_register, password_input,
    },
    timezone::get_local_offset,
};

/// Session length when "Keep me logged in" is ticked.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Used for an unknown email and for a wrong password alike, so the form does
/// not reveal which emails have accounts.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

#[derive(Debug, Clone)]
pub struct LoginState {
    pub cookie_key: Key,
    pub cookie_duration: Duration,
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// What the user typed into the log in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub email: String,
    pub password: String,
    /// Set to any value when the "remember me" checkbox is ticked, missing otherwise.
    pub remember_me: Option<String>,
    /// Where to go after logging in, carried over from the log in page's query.
    pub redirect_url: Option<String>,
}

/// The log in form, optionally refilled after a failed attempt.
struct LogInForm<'a> {
    email: &'a str,
    error_message: Option<&'a str>,
    redirect_url: Option<&'a str>,
}

impl LogInForm<'_> {
    fn into_html(self) -> Markup {
        html! {
            form
                hx-post=(endpoints::LOG_IN_API)
                hx-indicator="#indicator"
                hx-disabled-elt="#email, #password, #submit-button"
                class="space-y-4 md:space-y-6"
            {
                @if let Some(redirect_url) = self.redirect_url {
                    input type="hidden" name="redirect_url" value=(redirect_url);
                }

                div {
                    label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                    input
                        id="email"
                        name="email"
                        type="email"
                        autocomplete="email"
                        placeholder="you@example.com"
                        required
                        autofocus
                        value=(self.email)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (password_input("", 0, self.error_message))

                div class="flex items-center gap-x-3" {
                    input id="remember_me" name="remember_me" type="checkbox" class="rounded-xs";
                    label for="remember_me" class=(FORM_LABEL_STYLE) {
                        "Keep me logged in for one week"
                    }
                }

                button id="submit-button" type="submit" class=(BUTTON_PRIMARY_STYLE) {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    "Log in"
                }

                p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                    "Don't have an account? "
                    a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Register here" }
                }
            }
        }
    }
}

/// The local page to return to after logging in, if `raw_url` names one.
fn safe_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Ignoring unsafe redirect URL {raw_url:?}");
    }

    redirect_url
}

/// Display the log in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = safe_redirect_url(query.redirect_url.as_deref());
    let form = LogInForm {
        email: "",
        error_message: None,
        redirect_url: redirect_url.as_deref(),
    };

    base(
        "Log In",
        &[],
        &log_in_register("Log in to your account", &form.into_html()),
    )
    .into_response()
}

/// Find the user with `email` and check `password` against their hash.
///
/// A malformed email, an unknown email and a wrong password all give
/// [Error::InvalidCredentials].
fn check_credentials(email: &str, password: &str, connection: &Connection) -> Result<User, Error> {
    let email = Email::new(email).map_err(|_| Error::InvalidCredentials)?;
    let user = get_user_by_email(&email, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        error => error,
    })?;

    match user.password_hash.verify(password)? {
        true => Ok(user),
        false => Err(Error::InvalidCredentials),
    }
}

/// Check the submitted credentials and start a session.
///
/// On success the auth cookie is set and htmx is told to go to the requested
/// page, or the dashboard. Otherwise the form is sent back with the email
/// filled in and an error under the password field.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(data): Form<LogInData>,
) -> Response {
    let redirect_url = safe_redirect_url(data.redirect_url.as_deref());
    let form_with_error = |error_message| {
        LogInForm {
            email: &data.email,
            error_message: Some(error_message),
            redirect_url: redirect_url.as_deref(),
        }
        .into_html()
        .into_response()
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => check_credentials(&data.email, &data.password, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let user = match result {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            tracing::info!("Failed log in attempt for {}", data.email);
            return form_with_error(INVALID_CREDENTIALS_ERROR_MSG);
        }
        Err(error) => {
            tracing::error!("Could not check credentials: {error}");
            return form_with_error(INTERNAL_ERROR_MSG);
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let session_duration = match data.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    match set_auth_cookie(jar.clone(), user.id, session_duration, local_offset) {
        Ok(jar) => {
            let destination = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());
            (StatusCode::SEE_OTHER, HxRedirect(destination), jar).into_response()
        }
        Err(error) => {
            tracing::error!("Could not set the auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{extract::Query, http::StatusCode};
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::{RedirectQuery, get_log_in_page};

    async fn render(redirect_url: Option<&str>) -> scraper::Html {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: redirect_url.map(str::to_owned),
        }))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        document
    }

    fn redirect_inputs(document: &scraper::Html) -> Vec<String> {
        document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .filter_map(|input| input.value().attr("value"))
            .map(str::to_owned)
            .collect()
    }

    #[tokio::test]
    async fn shows_form_with_link_to_registration() {
        let document = render(None).await;

        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        let links: Vec<_> = form
            .select(&Selector::parse("a[href]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(links, vec![endpoints::REGISTER_VIEW]);
        assert!(redirect_inputs(&document).is_empty());
    }

    #[tokio::test]
    async fn carries_local_redirect_url_into_form() {
        let document = render(Some("/transactions?page=2")).await;

        assert_eq!(redirect_inputs(&document), vec!["/transactions?page=2"]);
    }

    #[tokio::test]
    async fn drops_external_redirect_url() {
        let document = render(Some("https://example.com/")).await;

        assert!(redirect_inputs(&document).is_empty());
    }
}
