//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations:
//! - **Monthly Trends**: Income and expense totals for the last six months
//! - **Spending This Year**: Expenses for each month of the current year
//! - **Expenses by Category**: Share of this month's expenses per category
//! - **Budget vs Actual**: Monthly budgets against this month's spending
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    auth::Currency,
    dashboard::aggregation::{
        BudgetVsActual, CategoryExpense, MonthlySpending, MonthlyTotals, format_month_labels,
        short_month_name,
    },
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        data-chart="true"
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Each chart follows the browser's dark mode preference and resizes with the window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Build the dashboard charts, skipping charts that would be empty.
pub(super) fn dashboard_charts(
    monthly_totals: &[MonthlyTotals],
    monthly_spending: &[MonthlySpending],
    category_breakdown: &[CategoryExpense],
    budget_vs_actual: &[BudgetVsActual],
    currency: Currency,
) -> Vec<DashboardChart> {
    let mut charts = vec![DashboardChart {
        id: "monthly-trends-chart",
        options: monthly_trends_chart(monthly_totals, currency).to_string(),
    }];

    if monthly_spending.iter().any(|month| month.total > 0.0) {
        charts.push(DashboardChart {
            id: "yearly-spending-chart",
            options: yearly_spending_chart(monthly_spending, currency).to_string(),
        });
    }

    if !category_breakdown.is_empty() {
        charts.push(DashboardChart {
            id: "category-breakdown-chart",
            options: category_breakdown_chart(category_breakdown, currency).to_string(),
        });
    }

    if !budget_vs_actual.is_empty() {
        charts.push(DashboardChart {
            id: "budget-vs-actual-chart",
            options: budget_vs_actual_chart(budget_vs_actual, currency).to_string(),
        });
    }

    charts
}

fn monthly_trends_chart(monthly_totals: &[MonthlyTotals], currency: Currency) -> Chart {
    let labels = format_month_labels(monthly_totals);
    let income = monthly_totals
        .iter()
        .map(|totals| totals.income)
        .collect::<Vec<_>>();
    let expenses = monthly_totals
        .iter()
        .map(|totals| totals.expense)
        .collect::<Vec<_>>();

    Chart::new()
        .title(
            Title::new()
                .text("Monthly Trends")
                .subtext("Last six months"),
        )
        .tooltip(currency_tooltip(currency))
        .legend(Legend::new().top("1%").right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(
            bar::Bar::new()
                .name("Income")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expenses),
        )
}

fn yearly_spending_chart(monthly_spending: &[MonthlySpending], currency: Currency) -> Chart {
    let labels = monthly_spending
        .iter()
        .map(|month| short_month_name(month.month).to_owned())
        .collect::<Vec<_>>();
    let totals = monthly_spending
        .iter()
        .map(|month| month.total)
        .collect::<Vec<_>>();

    Chart::new()
        .title(
            Title::new()
                .text("Spending This Year")
                .subtext("Expenses per month"),
        )
        .tooltip(currency_tooltip(currency))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(bar::Bar::new().name("Expenses").data(totals))
}

fn category_breakdown_chart(category_breakdown: &[CategoryExpense], currency: Currency) -> Chart {
    let data = category_breakdown
        .iter()
        .map(|expense| (expense.total, expense.name.as_str()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by Category")
                .subtext("Last month"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter(currency)),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

fn budget_vs_actual_chart(budget_vs_actual: &[BudgetVsActual], currency: Currency) -> Chart {
    let labels = budget_vs_actual
        .iter()
        .map(|row| row.category_name.to_string())
        .collect::<Vec<_>>();
    let budgeted = budget_vs_actual
        .iter()
        .map(|row| row.budget_amount)
        .collect::<Vec<_>>();
    let actual = budget_vs_actual
        .iter()
        .map(|row| row.actual)
        .collect::<Vec<_>>();

    Chart::new()
        .title(
            Title::new()
                .text("Budget vs Actual")
                .subtext("This month"),
        )
        .tooltip(currency_tooltip(currency))
        .legend(Legend::new().top("1%").right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(bar::Bar::new().name("Budget").data(budgeted))
        .series(bar::Bar::new().name("Actual").data(actual))
}

fn currency_formatter(currency: Currency) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
              style: 'currency',
              currency: '{}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";",
            currency.as_str()
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(currency: Currency) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::{
        auth::Currency,
        category::CategoryName,
        dashboard::aggregation::{BudgetVsActual, CategoryExpense, MonthlySpending, MonthlyTotals},
    };

    use super::dashboard_charts;

    fn monthly_totals() -> Vec<MonthlyTotals> {
        vec![MonthlyTotals {
            month: date!(2025 - 03 - 01),
            income: 100.0,
            expense: 40.0,
        }]
    }

    #[test]
    fn skips_empty_charts() {
        let no_spending = [MonthlySpending {
            month: Month::January,
            total: 0.0,
        }];

        let charts = dashboard_charts(&monthly_totals(), &no_spending, &[], &[], Currency::Usd);

        let ids = charts.iter().map(|chart| chart.id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["monthly-trends-chart"]);
    }

    #[test]
    fn chart_options_use_user_currency_and_labels() {
        let charts = dashboard_charts(
            &monthly_totals(),
            &[MonthlySpending {
                month: Month::March,
                total: 40.0,
            }],
            &[CategoryExpense {
                name: "Food".to_owned(),
                total: 40.0,
            }],
            &[BudgetVsActual {
                category_name: CategoryName::new_unchecked("Food"),
                budget_amount: 100.0,
                actual: 40.0,
                spent_percentage: 40.0,
            }],
            Currency::Eur,
        );

        assert_eq!(charts.len(), 4);
        assert!(charts[0].options.contains("Mar 2025"));
        assert!(charts[0].options.contains("EUR"));
        assert!(charts[1].options.contains("Spending This Year"));
        assert!(charts[2].options.contains("Food"));
        assert!(charts[3].options.contains("Budget vs Actual"));
    }
}
