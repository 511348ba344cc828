//! Spending limits per category and period.

mod budgets_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;

pub use budgets_page::get_budgets_page;
pub use core::{
    Budget, BudgetPeriod, BudgetWithSpend, DateSpan, NewBudget, create_budget,
    create_budget_table, get_budget, get_budgets_with_spend, map_budget_row, ranges_overlap,
    spent_percentage,
};
pub use create_endpoint::create_budget_endpoint;
pub use create_page::get_new_budget_page;
pub use delete_endpoint::delete_budget_endpoint;
pub use edit_endpoint::edit_budget_endpoint;
pub use edit_page::get_edit_budget_page;
