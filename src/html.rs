//! Shared page layout, styles and formatting helpers for maud views.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

use crate::auth::Currency;

pub const LINK_STYLE: &str = "underline text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 rounded text-white \
    bg-blue-500 dark:bg-blue-600 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 disabled:bg-blue-700";

const BUTTON_DELETE_STYLE: &str = "underline cursor-pointer bg-transparent border-none \
    text-red-600 hover:text-red-500 dark:text-red-500 dark:hover:text-red-400";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center mx-auto px-6 py-8 lg:py-5 text-gray-900 dark:text-white";
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center mx-auto max-w-md \
    px-6 py-8 lg:py-0 text-gray-900 dark:text-white";

pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 text-sm rounded \
    border border-gray-300 dark:border-gray-600 bg-gray-50 dark:bg-gray-700 \
    text-gray-900 dark:text-white disabled:text-gray-500 dark:placeholder-gray-400 \
    focus:border-blue-600 focus:ring-blue-600 focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_ERROR_STYLE: &str = "text-red-600 dark:text-red-400";

pub const FORM_RADIO_GROUP_STYLE: &str = "flex flex-col gap-2";
pub const FORM_RADIO_INPUT_STYLE: &str = "peer h-4 w-4 shrink-0 cursor-pointer text-blue-600 \
    border-gray-300 dark:border-gray-600 focus-visible:ring-2 focus-visible:ring-blue-500";
pub const FORM_RADIO_LABEL_STYLE: &str = "flex-1 px-3 py-2 rounded cursor-pointer \
    text-sm font-medium border border-gray-300 dark:border-gray-600 \
    bg-white dark:bg-gray-700 text-gray-700 dark:text-white \
    hover:bg-gray-50 hover:dark:bg-gray-600 \
    peer-checked:border-blue-600 peer-checked:bg-blue-50 peer-checked:text-blue-700 \
    peer-checked:dark:border-blue-500 peer-checked:dark:bg-blue-600/20 peer-checked:dark:text-blue-200";

pub const TABLE_HEADER_STYLE: &str =
    "text-xs uppercase text-gray-700 dark:text-gray-400 bg-gray-50 dark:bg-gray-700";
pub const TABLE_ROW_STYLE: &str = "border-b bg-white dark:bg-gray-800 dark:border-gray-700";
pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

pub const CATEGORY_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 rounded-full \
    text-xs font-semibold text-blue-800 bg-blue-100 dark:bg-blue-900 dark:text-blue-300";

pub const CARD_STYLE: &str = "px-4 py-3 rounded border border-gray-200 dark:border-gray-700 \
    bg-white dark:bg-gray-800 shadow-sm";

/// Rules every page needs: the htmx request indicator and chart tooltips that
/// stay under the bottom navigation bar.
const BASE_CSS: &str = r#"
    #indicator.htmx-indicator { display: none; }
    #indicator.htmx-request .htmx-indicator,
    #indicator.htmx-request.htmx-indicator { display: inline; }
    .echarts-tooltip { z-index: 30 !important; }
"#;

/// Extra elements for the `<head>` of a single page.
pub enum HeadElement {
    /// A script loaded from a path or URL.
    ScriptLink(String),
    /// An inline script.
    ScriptSource(PreEscaped<String>),
    /// An inline stylesheet.
    Style(PreEscaped<String>),
}

/// The document shell every page is rendered into.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Pennywise" }

                @for size in ["32x32", "128x128"] {
                    link rel="icon" type="image/png" sizes=(size) href={ "/static/favicon-" (size) ".png" };
                }

                link rel="stylesheet" href="/static/main.css";
                script src="/static/htmx-2.0.8-min.js" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" {}
                style { (PreEscaped(BASE_CSS)) }

                @for element in head_elements {
                    @match element {
                        HeadElement::ScriptLink(src) => script src=(src) {}
                        HeadElement::ScriptSource(source) => script { (source) }
                        HeadElement::Style(css) => style { (css) }
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900
                    pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Target for out-of-band alerts.
                div
                    id="alert-container"
                    class="fixed bottom-4 left-1/2 -translate-x-1/2 z-[9999] w-full max-w-md px-4"
                {}
            }
        }
    }
}

/// A full page explaining an error, e.g. a 404, with a link back home.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        section class="bg-white dark:bg-gray-900" {
            div class="mx-auto max-w-screen-sm px-4 py-8 lg:py-16 text-center" {
                h1 class="mb-4 text-7xl lg:text-9xl font-extrabold tracking-tight text-blue-600 dark:text-blue-500" {
                    (header)
                }
                p class="mb-4 text-3xl md:text-4xl font-bold tracking-tight text-gray-900 dark:text-white" {
                    (description)
                }
                p class="mb-4 text-xl md:text-2xl text-gray-900 dark:text-white" {
                    (fix)
                }
                a href="/" class="inline-flex my-4 px-5 py-2.5 rounded text-sm font-medium text-white bg-blue-600 hover:bg-blue-800" {
                    "Back to Homepage"
                }
            }
        }
    };

    base(title, &[], &content)
}

/// The card that holds the log in and registration forms.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center mx-auto px-6 py-8" {
            div class="flex items-center gap-2 mb-6 text-2xl font-semibold text-gray-900 dark:text-white" {
                img class="w-8 h-8" src="/static/favicon-128x128.png" alt="logo";
                "Pennywise"
            }

            div class="w-full sm:max-w-md p-6 sm:p-8 space-y-4 md:space-y-6 rounded-lg shadow bg-white dark:bg-gray-800 dark:border dark:border-gray-700" {
                h1 class="text-xl md:text-2xl font-bold leading-tight tracking-tight text-gray-900 dark:text-white" {
                    (form_title)
                }

                (form)
            }
        }
    }
}

/// A labelled password field with an optional error message underneath.
pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div {
            label for="password" class=(FORM_LABEL_STYLE) { "Password" }

            input
                id="password"
                name="password"
                type="password"
                placeholder="••••••••"
                required
                minlength=(min_length)
                value=(password)
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// A small spinning ring shown inside buttons while a request is in flight.
pub fn loading_spinner() -> Markup {
    html! {
        span
            role="status"
            aria-hidden="true"
            class="inline-block w-4 h-4 me-2 align-middle rounded-full border-2
                border-gray-200 border-t-current animate-spin"
        {}
    }
}

/// Stylesheet that shows the currency symbol inside `.input-wrapper` number inputs.
pub fn currency_input_styles(currency: Currency) -> HeadElement {
    let symbol = currency.symbol();

    HeadElement::Style(PreEscaped(format!(
        ".input-wrapper {{ position: relative; display: inline-block; }}\n\
         .input-wrapper input[type=\"number\"] {{ padding-left: 1.4rem; }}\n\
         .input-wrapper::before {{ content: '{symbol}'; position: absolute; left: 0.6rem; \
         top: 50%; transform: translateY(-50%); pointer-events: none; }}"
    )))
}

/// "Edit" and "Delete" controls for one item in a list.
///
/// Delete asks `confirm_message` first, then swaps the response into
/// `hx_target` with `hx_swap`. Errors go to the alert container.
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    hx_target: &str,
    hx_swap: &str,
) -> Markup {
    html! {
        a href=(edit_url) class=(LINK_STYLE) { "Edit" }

        button
            class=(BUTTON_DELETE_STYLE)
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(hx_target)
            hx-swap=(hx_swap)
            hx-target-error="#alert-container"
        {
            "Delete"
        }
    }
}

/// An inline text link.
pub fn link(url: &str, text: &str) -> Markup {
    html! {
        a href=(url) class=(LINK_STYLE) { (text) }
    }
}

fn grouped_formatter(decimals: u8) -> Formatter {
    Formatter::new()
        .separator(',')
        .unwrap_or_else(|_| Formatter::new())
        .precision(Precision::Decimals(decimals))
}

/// Format `number` as an amount of money in `currency` with two decimal places,
/// e.g. "₴1,234.50" or "-$3.00".
pub fn format_currency(number: f64, currency: Currency) -> String {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    let mut digits = FORMATTER
        .get_or_init(|| grouped_formatter(2))
        .fmt_string(number.abs());

    // numfmt drops trailing zeros, e.g. "12.30" comes out as "12.3" and zero as "0".
    match digits.find('.') {
        None => digits.push_str(".00"),
        Some(point) if digits.len() - point == 2 => digits.push('0'),
        Some(_) => {}
    }

    let sign = if number < 0.0 && digits != "0.00" { "-" } else { "" };

    format!("{sign}{}{digits}", currency.symbol())
}

/// Format `number` as an amount of money in `currency` rounded to a whole number.
fn format_currency_rounded(number: f64, currency: Currency) -> String {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    let number = number.round();
    let digits = FORMATTER
        .get_or_init(|| grouped_formatter(0))
        .fmt_string(number.abs());
    let whole = digits.split('.').next().unwrap_or("0");

    let sign = if number < 0.0 { "-" } else { "" };

    format!("{sign}{}{whole}", currency.symbol())
}

/// `amount` rounded to a whole number, with the exact amount in a tooltip.
pub fn currency_rounded_with_tooltip(amount: f64, currency: Currency) -> Markup {
    html! {
        span title=(format_currency(amount, currency)) { (format_currency_rounded(amount, currency)) }
    }
}
