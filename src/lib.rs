//! A habit tracker backend.
//!
//! Users define trackers (habits) that are scheduled on some days of the week,
//! group them into categories and mark them as completed for each day. This
//! library stores that data in SQLite and serves it as a JSON API.

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod category;
mod completion;
mod database_id;
mod db;
mod diff;
mod endpoints;
mod filter;
mod logging;
mod routing;
mod schedule;
mod statistics;
mod store;
mod timezone;
mod tracker;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::{Category, CategoryTitle};
pub use db::initialize as initialize_db;
pub use diff::{IndexPath, ListUpdate, Section, diff_snapshots};
pub use filter::{
    CompletionFilter, FilterPreset, FilteredTrackers, TrackerQuery, TrackerSection,
    filter_trackers,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use schedule::{Schedule, Weekday, weekday_from_calendar_index};
pub use statistics::{Statistics, compute_statistics, get_statistics};
pub use store::{StoreEvent, ToggledCompletion, TrackerStore};
pub use tracker::{NewTracker, Tracker, TrackerColor, TrackerEmoji, TrackerName};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A weekday number outside 1 (Sunday) to 7 (Saturday).
    #[error("{0} is not a weekday number, expected 1 (Sunday) to 7 (Saturday)")]
    InvalidCalendarIndex(u8),

    /// A category could not be read or created.
    ///
    /// The string holds the underlying SQL error and should only be logged.
    #[error("could not read or create the category: {0}")]
    CategoryPersistenceError(String),

    /// A tracker must be scheduled on at least one day.
    #[error("select at least one day for the tracker")]
    ScheduleRequired,

    /// An empty string was used to create a tracker name.
    #[error("tracker name cannot be empty")]
    EmptyTrackerName,

    /// The tracker name has more characters than allowed. Holds the name's length.
    #[error("tracker name is {0} characters long, the limit is 38")]
    TrackerNameTooLong(usize),

    /// A color that is not a hex color such as `#FD4C49`.
    #[error("\"{0}\" is not a hex color like #FD4C49")]
    InvalidColor(String),

    /// A tracker emoji must be a single emoji.
    #[error("\"{0}\" is not a single emoji")]
    InvalidEmoji(String),

    /// An empty string was used to create a category title.
    #[error("category title cannot be empty")]
    EmptyCategoryTitle,

    /// Another category already has the title.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryTitle(String),

    /// A date in the future was used to mark a tracker as completed.
    ///
    /// Completion records describe what has already happened, therefore
    /// future dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a tracker that does not exist
    #[error("tried to update a tracker that is not in the database")]
    UpdateMissingTracker,

    /// Tried to delete a tracker that does not exist
    #[error("tried to delete a tracker that is not in the database")]
    DeleteMissingTracker,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCalendarIndex(_)
            | Error::ScheduleRequired
            | Error::EmptyTrackerName
            | Error::TrackerNameTooLong(_)
            | Error::InvalidColor(_)
            | Error::InvalidEmoji(_)
            | Error::EmptyCategoryTitle
            | Error::FutureDate(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategoryTitle(_) => StatusCode::CONFLICT,
            Error::NotFound
            | Error::UpdateMissingTracker
            | Error::DeleteMissingTracker
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::CategoryPersistenceError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = match self {
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            // Any other server errors are not intended to be shown to the client.
            error if status_code.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
