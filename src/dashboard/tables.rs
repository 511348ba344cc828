//! Table views for dashboard data display.
//!
//! Provides HTML tables for this month's budgets and the most recent transactions.

use maud::{Markup, html};

use crate::{
    auth::Currency,
    dashboard::aggregation::BudgetVsActual,
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
    transaction::{TransactionListItem, TransactionType},
};

const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

fn table_wrapper(title: &str, table: Markup) -> Markup {
    html! {
        div
        {
            h3 class="text-xl font-semibold mb-4" { (title) }

            div class="overflow-x-auto rounded-lg shadow"
            {
                (table)
            }
        }
    }
}

/// Renders this month's budgets against what has been spent.
///
/// Returns empty markup if there are no active monthly budgets.
pub(super) fn budget_vs_actual_table(rows: &[BudgetVsActual], currency: Currency) -> Markup {
    if rows.is_empty() {
        return html! {};
    }

    let table = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" data-budget-vs-actual="true"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actual" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                }
            }
            tbody
            {
                @for row in rows {
                    @let over_budget = row.actual > row.budget_amount;

                    tr class=(TABLE_ROW_STYLE) data-over-budget=(over_budget)
                    {
                        th scope="row" class={ (TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white" }
                        {
                            (row.category_name)
                        }
                        td class=(TABLE_CELL_STYLE) { (format_currency(row.budget_amount, currency)) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(row.actual, currency)) }
                        @if over_budget {
                            td class={ (TABLE_CELL_STYLE) " " (TABLE_CELL_RED_STYLE) }
                            {
                                (format!("{:.2}%", row.spent_percentage))
                            }
                        } @else {
                            td class=(TABLE_CELL_STYLE)
                            {
                                (format!("{:.2}%", row.spent_percentage))
                            }
                        }
                    }
                }
            }
        }
    };

    table_wrapper("Budget vs Actual", table)
}

/// Renders the most recent transactions with a link to the full list.
pub(super) fn recent_transactions_table(
    transactions: &[TransactionListItem],
    currency: Currency,
) -> Markup {
    let table = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" data-recent-transactions="true"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                }
            }
            tbody
            {
                @for item in transactions {
                    @let transaction = &item.transaction;

                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class={ (TABLE_CELL_STYLE) " whitespace-nowrap" } { (transaction.date) }
                        td class=(TABLE_CELL_STYLE) { (transaction.description) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @if let Some(name) = &item.category_name {
                                span class=(CATEGORY_BADGE_STYLE) { (name) }
                            }
                        }
                        @match transaction.transaction_type {
                            TransactionType::Income => {
                                td class={ (TABLE_CELL_STYLE) " text-right " (TABLE_CELL_GREEN_STYLE) }
                                {
                                    (format_currency(transaction.amount, currency))
                                }
                            }
                            TransactionType::Expense => {
                                td class={ (TABLE_CELL_STYLE) " text-right " (TABLE_CELL_RED_STYLE) }
                                {
                                    (format_currency(-transaction.amount, currency))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    html! {
        (table_wrapper("Recent Transactions", table))

        p class="mt-2 text-sm"
        {
            a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all transactions" }
        }
    }
}
