//! Dashboard module
//!
//! Provides an overview page with income and expense summaries, charts,
//! this month's budgets and the most recent transactions.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
