//! Every URL the app serves.
//!
//! Pages end in `_VIEW` and return full HTML documents. Paths under `/api` are
//! called by htmx and answer with fragments, alerts or `HX-Redirect`.
//! Use [format_endpoint] to fill in the ID of paths such as `/budgets/{budget_id}/edit`.

pub const ROOT: &str = "/";
pub const DASHBOARD_VIEW: &str = "/dashboard";
pub const TRANSACTIONS_VIEW: &str = "/transactions";
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
pub const CATEGORIES_VIEW: &str = "/categories";
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
pub const BUDGETS_VIEW: &str = "/budgets";
pub const NEW_BUDGET_VIEW: &str = "/budgets/new";
pub const EDIT_BUDGET_VIEW: &str = "/budgets/{budget_id}/edit";
pub const SETTINGS_VIEW: &str = "/settings";
pub const REGISTER_VIEW: &str = "/register";
pub const LOG_IN_VIEW: &str = "/log_in";
/// Where htmx is sent when a request fails unexpectedly.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// CSS, JavaScript and images, served from the `static` directory.
pub const STATIC: &str = "/static";

pub const LOG_IN_API: &str = "/api/log_in";
pub const LOG_OUT: &str = "/api/log_out";
/// POST here to register a new user.
pub const USERS: &str = "/api/users";
/// PUT here to change the display currency.
pub const CURRENCY_API: &str = "/api/settings/currency";
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// PUT or DELETE a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
pub const CATEGORIES_API: &str = "/api/categories";
/// PUT or DELETE a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
pub const BUDGETS_API: &str = "/api/budgets";
/// PUT or DELETE a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";

/// Put `id` in place of the `{...}` parameter in `endpoint_path`.
///
/// Paths are expected to hold at most one parameter. A path without one is
/// returned unchanged, and an unclosed brace swallows the rest of the path.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((prefix, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };
    let suffix = rest.split_once('}').map_or("", |(_, suffix)| suffix);

    format!("{prefix}{id}{suffix}")
}
