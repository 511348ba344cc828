//! Categories for grouping income and expense transactions.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    create_category, create_category_table, create_default_categories, get_categories,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryName, CategoryWithCount};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_categories_page;

#[cfg(test)]
pub use db::{delete_category, get_category, update_category};
