//! Route guards that require a valid session cookie.
//!
//! A request with a valid cookie gets the user's [UserID] as a request
//! extension, so handlers can take `Extension(user_id): Extension<UserID>`.
//! The session is extended on the way out. Requests without a valid session
//! are sent to the log in page with a `redirect_url` back to where they were.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState,
    auth::{
        DEFAULT_COOKIE_DURATION, UserID,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed by the auth guards.
#[derive(Clone)]
pub struct AuthState {
    /// The key used to encrypt and sign private cookies.
    pub cookie_key: Key,
    /// How long a fresh session cookie lasts.
    pub cookie_duration: Duration,
    /// The canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How an unauthenticated request is turned away.
#[derive(Clone, Copy)]
enum Rejection {
    /// A plain 303 redirect, for full page loads.
    Redirect,
    /// An `HX-Redirect` header, for htmx requests.
    HxRedirect,
}

impl Rejection {
    fn respond(self, log_in_url: String) -> Response {
        match self {
            Rejection::Redirect => Redirect::to(&log_in_url).into_response(),
            Rejection::HxRedirect => (HxRedirect(log_in_url), StatusCode::OK).into_response(),
        }
    }
}

/// Guard for pages. Unauthenticated requests are redirected to the log in page.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, Rejection::Redirect).await
}

/// Guard for htmx endpoints. Unauthenticated requests get an `HX-Redirect` to the log in page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, Rejection::HxRedirect).await
}

async fn guard(state: AuthState, request: Request, next: Next, rejection: Rejection) -> Response {
    let log_in_url = log_in_url_for(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Could not get the offset for timezone {}, redirecting to log in page.",
            state.local_timezone
        );
        return rejection.respond(log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let Some((user_id, jar)) = authenticate(&mut parts, &state).await else {
        return rejection.respond(log_in_url);
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    with_extended_session(response, jar, local_offset)
}

/// The log in page URL that leads back to the page the request came from.
fn log_in_url_for(request: &Request) -> String {
    if let Some(url) = build_log_in_redirect_url(request) {
        return url;
    }

    if request.uri().path().starts_with("/api") {
        tracing::warn!("API request without usable htmx headers, returning to the dashboard.");
    } else {
        tracing::warn!(
            "Unsafe redirect target {}, returning to the dashboard.",
            request.uri()
        );
    }

    build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

async fn authenticate(
    parts: &mut Parts,
    state: &AuthState,
) -> Option<(UserID, PrivateCookieJar)> {
    let jar = PrivateCookieJar::from_request_parts(parts, state)
        .await
        .inspect_err(|error| tracing::error!("Could not read cookies: {error:?}"))
        .ok()?;

    match get_token_from_cookies(&jar) {
        Ok(token) => Some((token.user_id, jar)),
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri);
            None
        }
    }
}

/// Push the session expiry forward and copy the new cookie onto `response`.
fn with_extended_session(
    response: Response,
    jar: PrivateCookieJar,
    local_offset: UtcOffset,
) -> Response {
    let jar =
        extend_auth_cookie_duration_if_needed(jar.clone(), DEFAULT_COOKIE_DURATION, local_offset)
            .unwrap_or_else(|error| {
                tracing::error!("Could not extend the session cookie: {error}");
                jar
            });

    let (mut parts, body) = response.into_parts();
    let cookie_headers = jar.into_response();

    for cookie in cookie_headers.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.clone());
    }

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router,
        extract::{Path, State},
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            AuthState, COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, auth_guard, auth_guard_hx,
            set_auth_cookie,
        },
        endpoints::{self, format_endpoint},
        timezone::get_local_offset,
    };

    const LOG_IN_ROUTE: &str = "/log_in/{user_id}";
    const PAGE_ROUTE: &str = "/protected";
    const API_ROUTE: &str = "/api/protected";

    async fn whoami(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    async fn stub_log_in(
        State(state): State<AuthState>,
        Path(user_id): Path<i64>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let local_offset = get_local_offset(&state.local_timezone).unwrap();

        set_auth_cookie(jar, UserID::new(user_id), state.cookie_duration, local_offset)
    }

    fn test_state(cookie_duration: Duration) -> AuthState {
        AuthState {
            cookie_key: Key::from(&Sha512::digest("a test secret")),
            cookie_duration,
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn page_server(cookie_duration: Duration) -> TestServer {
        let state = test_state(cookie_duration);
        let app = Router::new()
            .route(PAGE_ROUTE, get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(LOG_IN_ROUTE, post(stub_log_in))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn api_server() -> TestServer {
        let state = test_state(DEFAULT_COOKIE_DURATION);
        let app = Router::new()
            .route(API_ROUTE, get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer, user_id: i64) -> Cookie<'static> {
        let response = server.post(&format_endpoint(LOG_IN_ROUTE, user_id)).await;
        response.assert_status_ok();
        response.cookie(COOKIE_TOKEN)
    }

    fn log_in_location(redirect_url: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", redirect_url)]).unwrap();
        format!("{}?{query}", endpoints::LOG_IN_VIEW)
    }

    #[track_caller]
    fn assert_roughly_equal(got: OffsetDateTime, want: OffsetDateTime) {
        assert!(
            (got - want).abs() < Duration::seconds(1),
            "got {got:?}, want {want:?}"
        );
    }

    #[tokio::test]
    async fn handler_gets_user_id_from_session() {
        let server = page_server(DEFAULT_COOKIE_DURATION);
        let cookie = log_in(&server, 42).await;

        let response = server.get(PAGE_ROUTE).add_cookie(cookie).await;

        response.assert_status_ok();
        response.assert_text("42");
    }

    #[tokio::test]
    async fn session_cookie_is_extended_on_each_request() {
        let server = page_server(Duration::seconds(5));
        let cookie = log_in(&server, 1).await;
        let logged_in_at = OffsetDateTime::now_utc();
        assert_roughly_equal(
            cookie.expires_datetime().unwrap(),
            logged_in_at + Duration::seconds(5),
        );

        let response = server.get(PAGE_ROUTE).add_cookie(cookie).await;

        let cookie = response.cookie(COOKIE_TOKEN);
        assert_roughly_equal(
            cookie.expires_datetime().unwrap(),
            logged_in_at + DEFAULT_COOKIE_DURATION,
        );
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn page_without_cookie_redirects_to_log_in() {
        let server = page_server(DEFAULT_COOKIE_DURATION);

        let response = server.get(PAGE_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), log_in_location(PAGE_ROUTE));
    }

    #[tokio::test]
    async fn page_with_garbage_cookie_redirects_to_log_in() {
        let server = page_server(DEFAULT_COOKIE_DURATION);

        let response = server
            .get(PAGE_ROUTE)
            .add_cookie(Cookie::new(COOKIE_TOKEN, "FOOBAR"))
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), log_in_location(PAGE_ROUTE));
    }

    #[tokio::test]
    async fn page_with_expired_session_redirects_to_log_in() {
        let server = page_server(Duration::seconds(-10));
        let mut cookie = log_in(&server, 1).await;
        // The client would drop an expired cookie, so force it to be sent.
        cookie.set_expires(OffsetDateTime::now_utc() + Duration::days(1));

        let response = server.get(PAGE_ROUTE).add_cookie(cookie).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), log_in_location(PAGE_ROUTE));
    }

    #[tokio::test]
    async fn htmx_request_is_redirected_back_to_current_page() {
        let server = api_server();
        let current_url = "/transactions?page=2&category_id=3";

        let response = server
            .get(API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("hx-redirect"), log_in_location(current_url));
    }

    #[tokio::test]
    async fn htmx_request_without_current_url_returns_to_dashboard() {
        let server = api_server();

        let response = server.get(API_ROUTE).await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            log_in_location(endpoints::DASHBOARD_VIEW)
        );
    }
}
