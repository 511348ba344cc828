//! Where to send a user after they log in.
//!
//! Protected pages send anonymous users to the log in page with the page they
//! wanted in the `redirect_url` query parameter. Only local paths are accepted
//! so the log in form cannot be used as an open redirect.

use axum::{extract::Request, http::Uri};
use axum_htmx::{HX_CURRENT_URL, HX_REQUEST};

use crate::endpoints;

/// Pages that make no sense to come back to after logging in.
const AUTH_PAGES: [&str; 3] = [
    endpoints::LOG_IN_VIEW,
    endpoints::LOG_OUT,
    endpoints::REGISTER_VIEW,
];

/// The path and query of `uri`, unless it leads somewhere it should not.
fn local_target(uri: &Uri) -> Option<String> {
    let target = uri.path_and_query()?;

    if !target.as_str().starts_with('/') || target.as_str().starts_with("//") {
        return None;
    }

    if AUTH_PAGES.contains(&target.path()) {
        return None;
    }

    Some(target.as_str().to_owned())
}

/// Reduce `raw_url` to a local path and query.
///
/// Returns `None` for absolute URLs, protocol relative URLs, and the
/// authentication pages themselves.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_target(&uri)
}

/// The page behind `request`.
///
/// A page load is its own target. An `/api` request comes from htmx, which
/// names the page it was sent from in `HX-Current-URL`. That header holds a
/// full URL, so only its path and query are kept.
fn redirect_target(request: &Request) -> Option<String> {
    if !request.uri().path().starts_with("/api") {
        return local_target(request.uri());
    }

    let headers = request.headers();
    let is_htmx = headers
        .get(HX_REQUEST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if !is_htmx {
        tracing::warn!("Request to {} is missing the HX-Request header.", request.uri());
        return None;
    }

    let current_url = headers
        .get(HX_CURRENT_URL)
        .and_then(|value| value.to_str().ok())
        .or_else(|| {
            tracing::warn!("Request to {} is missing the HX-Current-URL header.", request.uri());
            None
        })?;

    let target = current_url.parse::<Uri>().ok().and_then(|uri| local_target(&uri));
    if target.is_none() {
        tracing::warn!("Ignoring HX-Current-URL {current_url:?}");
    }

    target
}

/// The log in page URL that sends the user back to the page behind `request`.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    build_log_in_redirect_url_from_target(&redirect_target(request)?)
}

/// The log in page URL that sends the user to `redirect_target` afterwards.
pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", redirect_target)])
        .inspect_err(|error| {
            tracing::error!("Could not encode redirect URL {redirect_target:?}: {error}")
        })
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}
