//! Defines the route handler for the page that lists transactions as a filterable, paged table.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// Empty filter inputs are submitted as empty strings, which axum_extra's Query
// reads as None.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::{Currency, UserID, get_user_currency},
    category::Category,
    database_id::CategoryId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, create_pagination_indicators, page_count, pagination_view},
    transaction::{
        TransactionType,
        create_page::get_category_options,
        query::{
            TransactionFilter, TransactionListItem, TransactionStats, get_transaction_stats,
            query_transactions,
        },
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Configuration for pagination controls.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The filters and page selected on the transactions page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionsQuery {
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
    /// The maximum number of transactions to display per page.
    pub per_page: Option<u64>,
    pub category_id: Option<CategoryId>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub search: Option<String>,
}

impl TransactionsQuery {
    fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            category_id: self.category_id,
            transaction_type: self.transaction_type,
            start_date: self.start_date,
            end_date: self.end_date,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|search| !search.is_empty())
                .map(str::to_owned),
        }
    }

    /// The URL of `page` with the same filters.
    fn page_url(&self, page: u64, per_page: u64) -> String {
        let mut params = vec![("page", page.to_string()), ("per_page", per_page.to_string())];

        if let Some(category_id) = self.category_id {
            params.push(("category_id", category_id.to_string()));
        }
        if let Some(transaction_type) = self.transaction_type {
            params.push(("type", transaction_type.as_str().to_owned()));
        }
        if let Some(start_date) = self.start_date {
            params.push(("start_date", start_date.to_string()));
        }
        if let Some(end_date) = self.end_date {
            params.push(("end_date", end_date.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|search| !search.is_empty()) {
            params.push(("search", search.to_owned()));
        }

        match serde_urlencoded::to_string(&params) {
            Ok(query) => format!("{}?{query}", endpoints::TRANSACTIONS_VIEW),
            Err(error) => {
                tracing::warn!("Could not encode transactions page query: {error}");
                endpoints::TRANSACTIONS_VIEW.to_owned()
            }
        }
    }

    fn has_filters(&self) -> bool {
        self.filter() != TransactionFilter::default()
    }
}

/// A transaction row with its links prepared for rendering.
struct TransactionRow {
    item: TransactionListItem,
    edit_url: String,
    delete_url: String,
}

/// Render a page of the user's transactions.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let per_page = query
        .per_page
        .filter(|per_page| *per_page > 0)
        .unwrap_or(state.pagination_config.default_page_size);
    let requested_page = query
        .page
        .filter(|page| *page > 0)
        .unwrap_or(state.pagination_config.default_page);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let filter = query.filter();
    let transaction_page = query_transactions(user_id, &filter, requested_page, per_page, &connection)
        .inspect_err(|error| tracing::error!("Failed to query transactions: {error}"))?;
    let stats = get_transaction_stats(user_id, &connection)?;
    let categories = get_category_options(user_id, &connection)?;
    let currency = get_user_currency(user_id, &connection)?;

    let page_count = page_count(transaction_page.total_count, per_page);
    let current_page = requested_page.min(page_count);
    let current_url = query.page_url(current_page, per_page);

    let rows = transaction_page
        .items
        .into_iter()
        .map(|item| {
            let edit_url = format!(
                "{}?{}",
                endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, item.transaction.id),
                serde_urlencoded::to_string([("redirect_url", current_url.as_str())])
                    .unwrap_or_default()
            );
            let delete_url =
                endpoints::format_endpoint(endpoints::TRANSACTION, item.transaction.id);

            TransactionRow {
                item,
                edit_url,
                delete_url,
            }
        })
        .collect::<Vec<_>>();

    let indicators = create_pagination_indicators(
        current_page,
        page_count,
        state.pagination_config.max_pages,
    );
    let pagination = pagination_view(&indicators, |page| query.page_url(page, per_page));

    Ok(transactions_view(
        &rows,
        &query,
        &categories,
        stats,
        currency,
        &pagination,
    )
    .into_response())
}

fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Expense => "text-red-700 dark:text-red-300",
        TransactionType::Income => "text-green-700 dark:text-green-300",
    }
}

fn signed_amount(row: &TransactionRow) -> f64 {
    let transaction = &row.item.transaction;

    match transaction.transaction_type {
        TransactionType::Expense => -transaction.amount,
        TransactionType::Income => transaction.amount,
    }
}

fn category_badge(row: &TransactionRow) -> Markup {
    html! {
        @if let Some(ref category_name) = row.item.category_name {
            span class=(CATEGORY_BADGE_STYLE) { (category_name) }
        } @else {
            span class="text-gray-400 dark:text-gray-500" { "-" }
        }
    }
}

fn delete_confirm_message(row: &TransactionRow) -> String {
    format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        row.item.transaction.description
    )
}

fn transaction_row_view(row: &TransactionRow) -> Markup {
    let transaction = &row.item.transaction;

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (transaction.date) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (category_badge(row)) }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(transaction.transaction_type)) }
            {
                (format_currency(signed_amount(row), transaction.currency))
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &row.edit_url,
                        &row.delete_url,
                        &delete_confirm_message(row),
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

fn transaction_card_view(row: &TransactionRow) -> Markup {
    let transaction = &row.item.transaction;

    html! {
        li class=(CARD_STYLE) data-transaction-card="true"
        {
            div class="flex items-start justify-between gap-3"
            {
                div class="min-w-0 flex-1 truncate text-sm font-medium text-gray-900 dark:text-white"
                    title=(transaction.description)
                { (transaction.description) }
                div class={ "shrink-0 text-sm tabular-nums text-right whitespace-nowrap " (amount_class(transaction.transaction_type)) }
                { (format_currency(signed_amount(row), transaction.currency)) }
            }

            div class="mt-3 flex items-center justify-between gap-3 border-t border-gray-200 pt-2 text-xs text-gray-500 dark:border-gray-700/80 dark:text-gray-400"
            {
                div class="flex items-center gap-2"
                {
                    time datetime=(transaction.date) { (transaction.date) }
                    (category_badge(row))
                }

                div class="flex items-center gap-4 text-sm text-gray-900 dark:text-white"
                {
                    (edit_delete_action_links(
                        &row.edit_url,
                        &row.delete_url,
                        &delete_confirm_message(row),
                        "closest [data-transaction-card='true']",
                        "outerHTML",
                    ))
                }
            }
        }
    }
}

fn summary_view(stats: TransactionStats, currency: Currency) -> Markup {
    let balance_class = if stats.balance < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    };

    html! {
        dl class="grid grid-cols-1 sm:grid-cols-3 gap-4" data-transaction-summary="true"
        {
            div class=(CARD_STYLE)
            {
                dt class="text-xs uppercase text-gray-500 dark:text-gray-400" { "Income" }
                dd class="text-lg font-semibold text-green-700 dark:text-green-300"
                { (format_currency(stats.total_income, currency)) }
            }
            div class=(CARD_STYLE)
            {
                dt class="text-xs uppercase text-gray-500 dark:text-gray-400" { "Expenses" }
                dd class="text-lg font-semibold text-red-700 dark:text-red-300"
                { (format_currency(stats.total_expense, currency)) }
            }
            div class=(CARD_STYLE)
            {
                dt class="text-xs uppercase text-gray-500 dark:text-gray-400" { "Balance" }
                dd class={ "text-lg font-semibold " (balance_class) }
                { (format_currency(stats.balance, currency)) }
            }
        }
    }
}

fn filter_form_view(query: &TransactionsQuery, categories: &[Category]) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-1 md:grid-cols-3 lg:grid-cols-6 gap-4 items-end"
            data-transaction-filters="true"
        {
            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    type="search"
                    id="search"
                    name="search"
                    placeholder="Description"
                    value=[query.search.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter-category" class=(FORM_LABEL_STYLE) { "Category" }
                select id="filter-category" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All categories" }
                    @for category in categories {
                        option
                            value=(category.id)
                            selected[Some(category.id) == query.category_id]
                        { (category.name) }
                    }
                }
            }

            div
            {
                label for="filter-type" class=(FORM_LABEL_STYLE) { "Type" }
                select id="filter-type" name="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All types" }
                    @for kind in TransactionType::ALL {
                        option
                            value=(kind.as_str())
                            selected[Some(kind) == query.transaction_type]
                        { (kind.label()) }
                    }
                }
            }

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    id="start_date"
                    name="start_date"
                    value=[query.start_date]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    id="end_date"
                    name="end_date"
                    value=[query.end_date]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
                @if query.has_filters() {
                    a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Clear" }
                }
            }
        }
    }
}

fn transactions_view(
    rows: &[TransactionRow],
    query: &TransactionsQuery,
    categories: &[Category],
    stats: TransactionStats,
    currency: Currency,
    pagination: &Markup,
) -> Markup {
    let create_transaction_route = endpoints::NEW_TRANSACTION_VIEW;
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let empty_message = if query.has_filters() {
        "No transactions match these filters."
    } else {
        "No transactions recorded yet."
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(create_transaction_route) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (summary_view(stats, currency))

                (filter_form_view(query, categories))

                ul class="lg:hidden space-y-4"
                {
                    @for row in rows {
                        (transaction_card_view(row))
                    }

                    @if rows.is_empty() {
                        li class="rounded-lg border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                        {
                            (empty_message)
                        }
                    }
                }

                section class="hidden lg:block dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (transaction_row_view(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        (empty_message) " "
                                        a href=(create_transaction_route) class=(LINK_STYLE)
                                        {
                                            "Create a transaction"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination)
            }
        }
    );

    base("Transactions", &[], &content)
}
