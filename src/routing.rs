//! Application router configuration.

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    AppState, Error,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, rename_category_endpoint,
    },
    endpoints,
    schedule::Weekday,
    statistics::get_statistics_endpoint,
    tracker::{
        create_tracker_endpoint, delete_tracker_endpoint, get_completions_endpoint,
        get_tracker_endpoint, get_trackers_endpoint, toggle_completion_endpoint,
        update_tracker_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRACKERS,
            get(get_trackers_endpoint).post(create_tracker_endpoint),
        )
        .route(
            endpoints::TRACKER,
            get(get_tracker_endpoint)
                .put(update_tracker_endpoint)
                .delete(delete_tracker_endpoint),
        )
        .route(
            endpoints::TRACKER_COMPLETIONS,
            post(toggle_completion_endpoint).get(get_completions_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(rename_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .route(endpoints::WEEKDAYS, get(get_weekdays))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// A weekday as shown in schedule editors.
#[derive(Debug, Serialize)]
struct WeekdayLabel {
    day: Weekday,
    abbreviation: &'static str,
    name: &'static str,
}

/// The weekdays in the order schedule editors list them, starting from Monday.
async fn get_weekdays() -> Json<Vec<WeekdayLabel>> {
    Json(
        Weekday::DISPLAY_ORDER
            .into_iter()
            .map(|day| WeekdayLabel {
                day,
                abbreviation: day.abbreviation(),
                name: day.name(),
            })
            .collect(),
    )
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
