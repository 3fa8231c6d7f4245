//! Summary statistics over all completion records.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    completion::{CompletionRecord, get_all_completions},
    database_id::TrackerId,
    schedule::Weekday,
    tracker::{Tracker, get_all_trackers},
};

/// The numbers shown on the statistics screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// The longest run of consecutive days with at least one completion.
    pub best_period: u32,
    /// Days on which every tracker scheduled for that weekday was completed.
    pub perfect_days: u32,
    /// The total number of completion records.
    pub completed_trackers: u32,
    /// The average number of completions per day with any completion, rounded down.
    pub average_value: u32,
}

impl Statistics {
    /// Whether there is nothing to show, i.e. no tracker has ever been completed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Compute the statistics for `trackers` from their completion records.
///
/// Only days with at least one completion can be perfect days.
pub fn compute_statistics(trackers: &[Tracker], completions: &[CompletionRecord]) -> Statistics {
    let mut completed_by_day: BTreeMap<Date, HashSet<TrackerId>> = BTreeMap::new();

    for record in completions {
        completed_by_day
            .entry(record.date)
            .or_default()
            .insert(record.tracker_id);
    }

    let mut best_period = 0;
    let mut current_period = 0;
    let mut previous_day: Option<Date> = None;

    for &day in completed_by_day.keys() {
        current_period = match previous_day.and_then(Date::next_day) {
            Some(expected) if expected == day => current_period + 1,
            _ => 1,
        };
        best_period = best_period.max(current_period);
        previous_day = Some(day);
    }

    let perfect_days = completed_by_day
        .iter()
        .filter(|(day, completed)| {
            let weekday = Weekday::from(day.weekday());

            trackers
                .iter()
                .filter(|tracker| tracker.schedule.contains(weekday))
                .all(|tracker| completed.contains(&tracker.id))
        })
        .count();

    let completed_trackers = completions.len();
    let average_value = completed_trackers
        .checked_div(completed_by_day.len())
        .unwrap_or(0);

    Statistics {
        best_period,
        perfect_days: saturating_u32(perfect_days),
        completed_trackers: saturating_u32(completed_trackers),
        average_value: saturating_u32(average_value),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Compute the statistics for all trackers in the database.
pub fn get_statistics(connection: &Connection) -> Result<Statistics, Error> {
    let trackers: Vec<Tracker> = get_all_trackers(connection)?
        .into_iter()
        .map(|categorized| categorized.tracker)
        .collect();
    let completions = get_all_completions(connection)?;

    Ok(compute_statistics(&trackers, &completions))
}

/// The state needed for the statistics endpoint.
#[derive(Debug, Clone)]
pub struct StatisticsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatisticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_statistics_endpoint(
    State(state): State<StatisticsState>,
) -> Result<Json<Statistics>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let statistics = get_statistics(&connection)
        .inspect_err(|error| tracing::error!("Could not compute statistics: {error}"))?;

    Ok(Json(statistics))
}
