//! Alert messages for reporting the outcome of htmx requests to users.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element rendered by
//! [crate::html::base], so they work regardless of which element the request targets.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple {
        /// The headline shown in bold.
        message: String,
    },
    /// An error message with extra details.
    Error {
        /// The headline shown in bold.
        message: String,
        /// Extra information shown below the headline, e.g., how to fix the error.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::SuccessSimple { message } => (false, message, None),
            Alert::Error { message, details } => (true, message, Some(details)),
        };

        let container_style = if is_error {
            "p-4 mb-4 rounded-lg shadow text-red-800 bg-red-50 dark:bg-gray-800 \
            dark:text-red-400 border border-red-300 dark:border-red-800"
        } else {
            "p-4 mb-4 rounded-lg shadow text-green-800 bg-green-50 dark:bg-gray-800 \
            dark:text-green-400 border border-green-300 dark:border-green-800"
        };

        html! {
            div hx-swap-oob="innerHTML:#alert-container"
            {
                div
                    role="alert"
                    class=(container_style)
                    onclick="this.remove()"
                {
                    p class="font-semibold" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty())
                    {
                        p class="mt-1 text-sm" { (details) }
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
