use axum::{body::Body, http::StatusCode, response::Response};
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::Value;

use crate::{AppState, build_router};

/// An app state backed by a fresh in-memory database, with the clock in UTC.
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "Etc/UTC").expect("Could not create app state")
}

/// A test server for the full router and the state it serves.
pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let state = get_test_app_state();
    let server =
        TestServer::new(build_router(state.clone())).expect("Could not create test server.");

    (server, state)
}

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let header_error_message = format!("Headers missing {header_name}");

    response
        .headers()
        .get(header_name)
        .expect(&header_error_message)
        .to_str()
        .expect("Could not convert to str")
        .to_string()
}

pub(crate) async fn parse_json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not JSON")
}
