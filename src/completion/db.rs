//! Database operations for completion records.
//!
//! A completion record marks a tracker as done on one calendar day. There is
//! at most one record per tracker and day.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TrackerId, tracker::get_tracker};

/// A tracker that was completed on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub tracker_id: TrackerId,
    pub date: Date,
}

/// Mark a tracker as completed on `date`.
///
/// Marking a tracker that is already completed on that day does nothing.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the tracker does not exist.
pub fn create_completion(
    tracker_id: TrackerId,
    date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .execute(
            "INSERT OR IGNORE INTO completion (tracker_id, date) VALUES (?1, ?2)",
            (tracker_id, date),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(())
}

/// Remove the completion record for `tracker_id` on `date`.
///
/// Returns whether a record was removed.
pub fn delete_completion(
    tracker_id: TrackerId,
    date: Date,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM completion WHERE tracker_id = ?1 AND date = ?2",
        (tracker_id, date),
    )?;

    Ok(rows_affected > 0)
}

/// Whether the tracker was completed on `date`.
pub fn is_completed(
    tracker_id: TrackerId,
    date: Date,
    connection: &Connection,
) -> Result<bool, Error> {
    let completed = connection
        .prepare("SELECT EXISTS(SELECT 1 FROM completion WHERE tracker_id = ?1 AND date = ?2)")?
        .query_row((tracker_id, date), |row| row.get(0))?;

    Ok(completed)
}

/// Flip the completion state of a tracker for one day.
///
/// Returns `true` if the tracker is now completed on `date`, `false` otherwise.
/// Calling this twice with the same arguments restores the original state.
///
/// # Errors
///
/// This function will return a:
/// - [Error::FutureDate] if `date` is after `today`,
/// - [Error::NotFound] if the tracker does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn toggle_completion(
    tracker_id: TrackerId,
    date: Date,
    today: Date,
    connection: &Connection,
) -> Result<bool, Error> {
    if date > today {
        return Err(Error::FutureDate(date));
    }

    let transaction = connection.unchecked_transaction()?;

    get_tracker(tracker_id, &transaction)?;

    let completed = if delete_completion(tracker_id, date, &transaction)? {
        false
    } else {
        create_completion(tracker_id, date, &transaction)?;
        true
    };

    transaction.commit()?;

    Ok(completed)
}

/// The number of days the tracker was completed on.
pub fn count_completions(tracker_id: TrackerId, connection: &Connection) -> Result<u32, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM completion WHERE tracker_id = ?1")?
        .query_row([tracker_id], |row| row.get(0))?;

    Ok(count)
}

/// The days the tracker was completed on, oldest first.
pub fn get_completed_dates(
    tracker_id: TrackerId,
    connection: &Connection,
) -> Result<Vec<Date>, Error> {
    connection
        .prepare("SELECT date FROM completion WHERE tracker_id = ?1 ORDER BY date ASC")?
        .query_map([tracker_id], |row| row.get(0))?
        .map(|maybe_date| maybe_date.map_err(|error| error.into()))
        .collect()
}

/// Every completion record, ordered by date.
pub fn get_all_completions(connection: &Connection) -> Result<Vec<CompletionRecord>, Error> {
    connection
        .prepare("SELECT tracker_id, date FROM completion ORDER BY date ASC, tracker_id ASC")?
        .query_map([], |row| {
            Ok(CompletionRecord {
                tracker_id: row.get(0)?,
                date: row.get(1)?,
            })
        })?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

/// Initialize the completion table.
///
/// Requires the tracker table.
pub fn create_completion_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS completion (
            id INTEGER PRIMARY KEY,
            tracker_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            UNIQUE(tracker_id, date),
            FOREIGN KEY(tracker_id) REFERENCES tracker(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_completion_date ON completion(date);",
    )?;

    Ok(())
}

#[cfg(test)]
mod completion_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::CategoryTitle,
        completion::{
            CompletionRecord, count_completions, create_completion, get_all_completions,
            get_completed_dates, is_completed, toggle_completion,
        },
        db::initialize,
        schedule::Schedule,
        tracker::{
            NewTracker, Tracker, TrackerColor, TrackerEmoji, TrackerName, create_tracker,
            delete_tracker,
        },
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn create_test_tracker(connection: &Connection) -> Tracker {
        create_tracker(
            &NewTracker {
                name: TrackerName::new_unchecked("Read"),
                color: TrackerColor::new_unchecked("#FD4C49"),
                emoji: TrackerEmoji::new_unchecked("📚"),
                schedule: Schedule::every_day(),
                category: CategoryTitle::new_unchecked("Study"),
            },
            connection,
        )
        .expect("Could not create test tracker")
    }

    #[test]
    fn toggle_once_completes() {
        let connection = get_test_connection();
        let tracker = create_test_tracker(&connection);
        let day = date!(2025 - 03 - 10);

        let completed = toggle_completion(tracker.id, day, day, &connection);

        assert_eq!(completed, Ok(true));
        assert_eq!(is_completed(tracker.id, day, &connection), Ok(true));
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let connection = get_test_connection();
        let tracker = create_test_tracker(&connection);
        let day = date!(2025 - 03 - 10);

        toggle_completion(tracker.id, day, day, &connection).unwrap();
        let completed = toggle_completion(tracker.id, day, day, &connection);

        assert_eq!(completed, Ok(false));
        assert_eq!(is_completed(tracker.id, day, &connection), Ok(false));
        assert_eq!(count_completions(tracker.id, &connection), Ok(0));
    }

    #[test]
    fn toggle_rejects_future_date() {
        let connection = get_test_connection();
        let tracker = create_test_tracker(&connection);
        let today = date!(2025 - 03 - 10);
        let tomorrow = date!(2025 - 03 - 11);

        let result = toggle_completion(tracker.id, tomorrow, today, &connection);

        assert_eq!(result, Err(Error::FutureDate(tomorrow)));
        assert_eq!(is_completed(tracker.id, tomorrow, &connection), Ok(false));
    }

    #[test]
    fn toggle_unknown_tracker_returns_not_found() {
        let connection = get_test_connection();
        let day = date!(2025 - 03 - 10);

        assert_eq!(
            toggle_completion(404, day, day, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn duplicate_completion_is_no_op() {
        let connection = get_test_connection();
        let tracker = create_test_tracker(&connection);
        let day = date!(2025 - 03 - 10);

        create_completion(tracker.id, day, &connection).unwrap();
        create_completion(tracker.id, day, &connection).unwrap();

        assert_eq!(count_completions(tracker.id, &connection), Ok(1));
    }

    #[test]
    fn completion_for_unknown_tracker_returns_not_found() {
        let connection = get_test_connection();

        let result = create_completion(404, date!(2025 - 03 - 10), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn completed_dates_are_sorted() {
        let connection = get_test_connection();
        let tracker = create_test_tracker(&connection);
        let today = date!(2025 - 03 - 10);
        for day in [date!(2025 - 03 - 09), date!(2025 - 03 - 01), today] {
            toggle_completion(tracker.id, day, today, &connection).unwrap();
        }

        let dates = get_completed_dates(tracker.id, &connection).unwrap();

        assert_eq!(
            dates,
            [date!(2025 - 03 - 01), date!(2025 - 03 - 09), today]
        );
    }

    #[test]
    fn deleting_tracker_deletes_its_records() {
        let connection = get_test_connection();
        let tracker = create_test_tracker(&connection);
        let other = create_test_tracker(&connection);
        let day = date!(2025 - 03 - 10);
        create_completion(tracker.id, day, &connection).unwrap();
        create_completion(other.id, day, &connection).unwrap();

        delete_tracker(tracker.id, &connection).unwrap();

        assert_eq!(
            get_all_completions(&connection),
            Ok(vec![CompletionRecord {
                tracker_id: other.id,
                date: day
            }])
        );
    }
}
