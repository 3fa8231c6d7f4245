//! JSON endpoints for trackers and their completions.

use axum::{
    Json, debug_handler,
    extract::{FromRef, Path, Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    completion::{get_completed_dates, is_completed},
    database_id::TrackerId,
    endpoints::{self, format_endpoint},
    filter::{FilterPreset, FilteredTrackers, filter_trackers},
    schedule::Weekday,
    store::TrackerStore,
    timezone::get_local_today,
    tracker::{TrackerFormData, get_categorized_tracker, get_trackers_for_weekday},
};

/// The state needed by the tracker endpoints.
#[derive(Debug, Clone)]
pub struct TrackerEndpointState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub store: TrackerStore,
}

impl FromRef<AppState> for TrackerEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            store: state.store.clone(),
        }
    }
}

/// Query parameters for listing trackers.
#[derive(Debug, Default, Deserialize)]
pub struct TrackersQuery {
    /// Defaults to today.
    pub date: Option<Date>,
    pub search: Option<String>,
    #[serde(default)]
    pub filter: FilterPreset,
}

/// List the trackers scheduled on a day, grouped by category.
pub async fn get_trackers_endpoint(
    State(state): State<TrackerEndpointState>,
    Query(query): Query<TrackersQuery>,
) -> Result<Json<FilteredTrackers>, Error> {
    let today = get_local_today(&state.local_timezone)?;
    let query = query
        .filter
        .query(query.date.unwrap_or(today), today, query.search);

    let connection = state.store.connection()?;
    let trackers = get_trackers_for_weekday(Weekday::from(query.date.weekday()), &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve trackers: {error}"))?;

    let filtered = filter_trackers(trackers, &query, |tracker_id, date| {
        is_completed(tracker_id, date, &connection)
    })?;

    Ok(Json(filtered))
}

pub async fn create_tracker_endpoint(
    State(state): State<TrackerEndpointState>,
    Json(form): Json<TrackerFormData>,
) -> Result<Response, Error> {
    let new_tracker = form.validate()?;
    let tracker = state.store.create_tracker(&new_tracker)?;

    tracing::info!("Created tracker {} \"{}\"", tracker.id, tracker.name);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::TRACKER, tracker.id))],
        Json(tracker),
    )
        .into_response())
}

pub async fn get_tracker_endpoint(
    Path(tracker_id): Path<TrackerId>,
    State(state): State<TrackerEndpointState>,
) -> Result<Response, Error> {
    let connection = state.store.connection()?;
    let tracker = get_categorized_tracker(tracker_id, &connection)?;

    Ok(Json(tracker).into_response())
}

/// Replace a tracker's fields. The tracker keeps its completion records.
#[debug_handler]
pub async fn update_tracker_endpoint(
    Path(tracker_id): Path<TrackerId>,
    State(state): State<TrackerEndpointState>,
    Json(form): Json<TrackerFormData>,
) -> Result<Response, Error> {
    let new_tracker = form.validate()?;
    let tracker = state.store.update_tracker(tracker_id, &new_tracker)?;

    Ok(Json(tracker).into_response())
}

pub async fn delete_tracker_endpoint(
    Path(tracker_id): Path<TrackerId>,
    State(state): State<TrackerEndpointState>,
) -> Result<StatusCode, Error> {
    state.store.delete_tracker(tracker_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Request body for toggling a completion.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ToggleCompletionForm {
    /// Defaults to today.
    pub date: Option<Date>,
}

/// A tracker's completion state for one day.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionState {
    pub tracker_id: TrackerId,
    pub date: Date,
    pub completed: bool,
    /// The number of days the tracker has been completed on.
    pub completed_days: u32,
}

/// Mark a tracker as completed on a day, or unmark it if it already was.
#[debug_handler]
pub async fn toggle_completion_endpoint(
    Path(tracker_id): Path<TrackerId>,
    State(state): State<TrackerEndpointState>,
    Json(form): Json<ToggleCompletionForm>,
) -> Result<Json<CompletionState>, Error> {
    let today = get_local_today(&state.local_timezone)?;
    let date = form.date.unwrap_or(today);

    let toggled = state.store.toggle_completion_counted(tracker_id, date, today)?;

    Ok(Json(CompletionState {
        tracker_id,
        date,
        completed: toggled.completed,
        completed_days: toggled.completed_days,
    }))
}

/// The days a tracker was completed on.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionHistory {
    pub tracker_id: TrackerId,
    /// Oldest first.
    pub dates: Vec<Date>,
    pub count: usize,
}

pub async fn get_completions_endpoint(
    Path(tracker_id): Path<TrackerId>,
    State(state): State<TrackerEndpointState>,
) -> Result<Json<CompletionHistory>, Error> {
    let connection = state.store.connection()?;
    // Distinguish an unknown tracker from one that was never completed.
    get_categorized_tracker(tracker_id, &connection)?;
    let dates = get_completed_dates(tracker_id, &connection)?;

    Ok(Json(CompletionHistory {
        tracker_id,
        count: dates.len(),
        dates,
    }))
}

#[cfg(test)]
mod tracker_endpoint_tests {
    use axum::{
        Json,
        extract::{FromRef, Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use time::{Duration, macros::date};

    use crate::{
        Error,
        endpoints::{self, format_endpoint},
        schedule::Weekday,
        test_utils::{assert_status_ok, get_header, get_test_app_state, get_test_server},
        timezone::get_local_today,
        tracker::{Tracker, TrackerFormData},
    };

    use super::{
        CompletionHistory, CompletionState, TrackerEndpointState, TrackersQuery,
        get_tracker_endpoint, get_trackers_endpoint,
    };

    fn tracker_json(name: &str, category: &str, schedule: &[&str]) -> Value {
        json!({
            "name": name,
            "color": "#FD4C49",
            "emoji": "🧘",
            "schedule": schedule,
            "category": category,
        })
    }

    async fn create_tracker(server: &TestServer, body: &Value) -> Tracker {
        let response = server.post(endpoints::TRACKERS).json(body).await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Tracker>()
    }

    #[tokio::test]
    async fn create_tracker_returns_created_with_location() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::TRACKERS)
            .json(&tracker_json("Yoga", "Health", &["Monday", "Wednesday"]))
            .await;

        response.assert_status(StatusCode::CREATED);
        let tracker = response.json::<Tracker>();
        assert_eq!(tracker.name.as_ref(), "Yoga");
        assert_eq!(
            response.header("location"),
            format_endpoint(endpoints::TRACKER, tracker.id).as_str()
        );
    }

    #[tokio::test]
    async fn create_tracker_without_days_is_rejected() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::TRACKERS)
            .json(&tracker_json("Yoga", "Health", &[]))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"], Error::ScheduleRequired.to_string());
    }

    #[tokio::test]
    async fn list_groups_trackers_for_day() {
        let (server, _) = get_test_server();
        create_tracker(&server, &tracker_json("Yoga", "Health", &["Monday"])).await;
        create_tracker(&server, &tracker_json("Read", "Study", &["Tuesday"])).await;

        let response = server
            .get(endpoints::TRACKERS)
            .add_query_param("date", "2025-03-10")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["total"], 1);
        assert_eq!(body["sections"][0]["title"], "Health");
        assert_eq!(body["sections"][0]["uncategorized"], false);
        assert_eq!(body["sections"][0]["trackers"][0]["name"], "Yoga");
    }

    #[tokio::test]
    async fn list_searches_names() {
        let (server, _) = get_test_server();
        let every_day = [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ];
        create_tracker(&server, &tracker_json("Yoga", "Health", &every_day)).await;
        create_tracker(&server, &tracker_json("Read", "Study", &every_day)).await;

        let response = server
            .get(endpoints::TRACKERS)
            .add_query_param("search", "rea")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["total"], 1);
        assert_eq!(body["sections"][0]["title"], "Study");
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let (server, state) = get_test_server();
        let tracker = create_tracker(&server, &tracker_json("Yoga", "Health", &["Monday"])).await;
        let path = format_endpoint(endpoints::TRACKER_COMPLETIONS, tracker.id);
        let today = get_local_today(&state.local_timezone).unwrap();

        let first = server.post(&path).json(&json!({})).await;
        let second = server.post(&path).json(&json!({})).await;

        first.assert_status_ok();
        assert_eq!(
            first.json::<CompletionState>(),
            CompletionState {
                tracker_id: tracker.id,
                date: today,
                completed: true,
                completed_days: 1,
            }
        );
        let second = second.json::<CompletionState>();
        assert!(!second.completed);
        assert_eq!(second.completed_days, 0);
    }

    #[tokio::test]
    async fn toggle_future_date_is_rejected() {
        let (server, state) = get_test_server();
        let tracker = create_tracker(&server, &tracker_json("Yoga", "Health", &["Monday"])).await;
        let tomorrow = get_local_today(&state.local_timezone).unwrap() + Duration::days(1);

        let response = server
            .post(&format_endpoint(endpoints::TRACKER_COMPLETIONS, tracker.id))
            .json(&json!({ "date": tomorrow }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn completions_lists_dates() {
        let (server, _) = get_test_server();
        let tracker = create_tracker(&server, &tracker_json("Yoga", "Health", &["Monday"])).await;
        let path = format_endpoint(endpoints::TRACKER_COMPLETIONS, tracker.id);
        server
            .post(&path)
            .json(&json!({ "date": "2025-03-10" }))
            .await
            .assert_status_ok();

        let response = server.get(&path).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<CompletionHistory>(),
            CompletionHistory {
                tracker_id: tracker.id,
                dates: vec![date!(2025 - 03 - 10)],
                count: 1,
            }
        );
    }

    #[tokio::test]
    async fn completions_for_unknown_tracker_is_not_found() {
        let (server, _) = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRACKER_COMPLETIONS, 404))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn update_moves_tracker_to_new_category() {
        let (server, _) = get_test_server();
        let tracker = create_tracker(&server, &tracker_json("Yoga", "Health", &["Monday"])).await;

        let response = server
            .put(&format_endpoint(endpoints::TRACKER, tracker.id))
            .json(&tracker_json("Yoga", "Sport", &["Monday", "Friday"]))
            .await;

        response.assert_status_ok();
        let fetched = server
            .get(&format_endpoint(endpoints::TRACKER, tracker.id))
            .await
            .json::<Value>();
        assert_eq!(fetched["category"], "Sport");
        assert_eq!(fetched["schedule"], json!(["Monday", "Friday"]));
    }

    #[tokio::test]
    async fn update_missing_tracker_is_not_found() {
        let (server, _) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRACKER, 404))
            .json(&tracker_json("Yoga", "Health", &["Monday"]))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_tracker_then_get_is_not_found() {
        let (server, _) = get_test_server();
        let tracker = create_tracker(&server, &tracker_json("Yoga", "Health", &["Monday"])).await;
        let path = format_endpoint(endpoints::TRACKER, tracker.id);

        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server.get(&path).await.assert_status_not_found();
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn get_tracker_handler_returns_json() {
        let state = TrackerEndpointState::from_ref(&get_test_app_state());
        let form = TrackerFormData {
            name: "Read".to_owned(),
            color: "#34A853".to_owned(),
            emoji: "📚".to_owned(),
            schedule: [Weekday::Tuesday].into_iter().collect(),
            category: "Study".to_owned(),
        };
        let tracker = state
            .store
            .create_tracker(&form.validate().unwrap())
            .unwrap();

        let response = get_tracker_endpoint(Path(tracker.id), State(state))
            .await
            .into_response();

        assert_status_ok(&response);
        assert_eq!(get_header(&response, "content-type"), "application/json");
    }

    #[tokio::test]
    async fn invalid_timezone_is_server_error() {
        let mut state = TrackerEndpointState::from_ref(&get_test_app_state());
        state.local_timezone = "Middle/Earth".to_owned();

        let result = get_trackers_endpoint(State(state), Query(TrackersQuery::default())).await;

        assert_eq!(
            result.map(|Json(filtered)| filtered),
            Err(Error::InvalidTimezoneError("Middle/Earth".to_owned()))
        );
    }
}
