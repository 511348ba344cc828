//! The 500 page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A 500 response with a description of what failed and what the user can do about it.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

/// Where htmx is sent when a request fails in a way no alert can explain.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

#[cfg(test)]
mod internal_server_error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{InternalServerError, get_internal_server_error_page};

    #[tokio::test]
    async fn default_page_is_a_500() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let header = html.select(&Selector::parse("h1").unwrap()).next().unwrap();
        assert_eq!(header.text().collect::<String>().trim(), "500");
    }

    #[tokio::test]
    async fn shows_custom_fix() {
        let response = InternalServerError {
            description: "Invalid Timezone Settings",
            fix: "Set TZ to a canonical timezone name.",
        }
        .into_response();

        let html = parse_html_document(response).await;
        let paragraphs: Vec<String> = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>().trim().to_owned())
            .collect();
        assert_eq!(
            paragraphs,
            vec!["Invalid Timezone Settings", "Set TZ to a canonical timezone name."]
        );
    }
}
