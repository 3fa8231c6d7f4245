//! Trackers are the habits users want to keep and the days they are scheduled on.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_tracker, create_tracker_table, delete_tracker, get_all_trackers,
    get_categorized_tracker, get_tracker, get_trackers_for_weekday, update_tracker,
};
pub use domain::{
    CategorizedTracker, MAX_TRACKER_NAME_LENGTH, NewTracker, Tracker, TrackerColor,
    TrackerEmoji, TrackerFormData, TrackerName,
};
pub use endpoints::{
    create_tracker_endpoint, delete_tracker_endpoint, get_completions_endpoint,
    get_tracker_endpoint, get_trackers_endpoint, toggle_completion_endpoint,
    update_tracker_endpoint,
};
