//! The form shared by the new and edit budget pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    budget::{BudgetPeriod, NewBudget},
    category::Category,
    database_id::CategoryId,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::TransactionType,
};

/// The form data for creating or updating a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    pub category_id: CategoryId,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: Date,
    /// Left empty for a budget with no end.
    #[serde(default)]
    pub end_date: Option<Date>,
}

impl From<BudgetForm> for NewBudget {
    fn from(form: BudgetForm) -> Self {
        NewBudget {
            category_id: form.category_id,
            amount: form.amount,
            period: form.period,
            start_date: form.start_date,
            end_date: form.end_date,
        }
    }
}

pub struct BudgetFormDefaults {
    pub category_id: Option<CategoryId>,
    pub amount: Option<f64>,
    pub period: BudgetPeriod,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

/// The inputs for a budget. Only expense categories can be picked since
/// budgets only count expenses.
pub fn budget_form_fields(defaults: &BudgetFormDefaults, categories: &[Category]) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            select
                name="category_id"
                id="category_id"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for category in categories.iter().filter(|c| c.kind == TransactionType::Expense) {
                    option
                        value=(category.id)
                        selected[Some(category.id) == defaults.category_id]
                    {
                        (category.name)
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.00"
                    min="0"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Period" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for period in BudgetPeriod::ALL {
                    @let id = format!("budget-period-{}", period.as_str());

                    div class="flex items-center gap-3"
                    {
                        input
                            name="period"
                            id=(id)
                            type="radio"
                            value=(period.as_str())
                            checked[period == defaults.period]
                            required
                            tabindex="0"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (period.label())
                        }
                    }
                }
            }
        }

        div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "Start date" }

                input
                    name="start_date"
                    id="start_date"
                    type="date"
                    value=(defaults.start_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "End date (optional)" }

                input
                    name="end_date"
                    id="end_date"
                    type="date"
                    min=(defaults.start_date)
                    value=[defaults.end_date]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}
