//! Summary cards shown at the top of the dashboard.

use maud::{Markup, html};

use crate::{
    auth::Currency,
    dashboard::aggregation::DashboardSummary,
    html::{CARD_STYLE, currency_rounded_with_tooltip},
};

const CARD_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const CARD_RED_STYLE: &str = "text-red-600 dark:text-red-400";

fn balance_color_class(balance: f64) -> &'static str {
    if balance >= 0.0 {
        CARD_GREEN_STYLE
    } else {
        CARD_RED_STYLE
    }
}

fn summary_card(label: &str, subtext: &str, value: Markup, value_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary-card=(label)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p class={ "text-2xl font-bold " (value_style) } { (value) }
            p class="text-xs text-gray-500 dark:text-gray-400" { (subtext) }
        }
    }
}

/// Renders the income, expense, balance and transaction count cards.
pub(super) fn summary_cards_view(summary: &DashboardSummary, currency: Currency) -> Markup {
    html! {
        section class="w-full grid grid-cols-2 lg:grid-cols-4 gap-4 mb-4"
        {
            (summary_card(
                "Total Income",
                "Last six months",
                currency_rounded_with_tooltip(summary.total_income, currency),
                CARD_GREEN_STYLE,
            ))
            (summary_card(
                "Total Expenses",
                "Last six months",
                currency_rounded_with_tooltip(summary.total_expense, currency),
                CARD_RED_STYLE,
            ))
            (summary_card(
                "Balance",
                "Income minus expenses",
                currency_rounded_with_tooltip(summary.balance, currency),
                balance_color_class(summary.balance),
            ))
            (summary_card(
                "Transactions",
                "This month",
                html! { (summary.transaction_count) },
                "text-gray-900 dark:text-white",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{auth::Currency, dashboard::aggregation::DashboardSummary};

    use super::summary_cards_view;

    #[test]
    fn negative_balance_is_red() {
        let summary = DashboardSummary {
            total_income: 100.0,
            total_expense: 250.0,
            balance: -150.0,
            transaction_count: 3,
        };

        let html = Html::parse_fragment(&summary_cards_view(&summary, Currency::Usd).into_string());

        let balance = html
            .select(&Selector::parse("[data-summary-card='Balance'] p:nth-child(2)").unwrap())
            .next()
            .unwrap();
        assert!(balance.value().attr("class").unwrap().contains("text-red-600"));
        assert_eq!(balance.text().collect::<String>().trim(), "-$150");
        let count = html
            .select(&Selector::parse("[data-summary-card='Transactions'] p:nth-child(2)").unwrap())
            .next()
            .unwrap();
        assert_eq!(count.text().collect::<String>().trim(), "3");
    }
}
