//! Categories group trackers under a shared title, e.g. "Health".

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_category_table, delete_category, get_all_categories, get_category,
    get_category_by_title, get_or_create_category, rename_category,
};
pub use domain::{Category, CategoryFormData, CategoryTitle, UNCATEGORIZED_LABEL};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    get_category_endpoint, rename_category_endpoint,
};
