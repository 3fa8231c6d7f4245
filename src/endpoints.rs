//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/trackers/{tracker_id}', use [format_endpoint].

use crate::database_id::DatabaseId;

/// The route to list the trackers for a day and to create trackers.
pub const TRACKERS: &str = "/api/trackers";
/// The route to read, update and delete a single tracker.
pub const TRACKER: &str = "/api/trackers/{tracker_id}";
/// The route to toggle and list a tracker's completions.
pub const TRACKER_COMPLETIONS: &str = "/api/trackers/{tracker_id}/completions";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to read, rename and delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route for the completion statistics.
pub const STATISTICS: &str = "/api/statistics";
/// The route for the weekday labels used by schedule editors.
pub const WEEKDAYS: &str = "/api/weekdays";

/// Replace the first `{parameter}` in `endpoint_path` with `id`.
///
/// Returns `endpoint_path` unchanged if it has no parameter.
pub fn format_endpoint(endpoint_path: &str, id: DatabaseId) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| start + offset + 1);

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
