//! Database operations for trackers.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{CategoryTitle, get_or_create_category},
    database_id::TrackerId,
    schedule::Weekday,
    tracker::{CategorizedTracker, NewTracker, Tracker, TrackerColor, TrackerEmoji, TrackerName},
};

const SELECT_CATEGORIZED_TRACKERS: &str = "SELECT
        tracker.id,
        tracker.name,
        tracker.color,
        tracker.emoji,
        tracker.schedule,
        tracker.category_id,
        category.title
    FROM tracker
    LEFT JOIN category ON category.id = tracker.category_id";

/// Create a tracker and return it with its generated ID.
///
/// The tracker's category is looked up by title and created if needed.
///
/// # Errors
///
/// This function will return a:
/// - [Error::ScheduleRequired] if the tracker has no scheduled days,
/// - [Error::CategoryPersistenceError] if the category could not be created,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_tracker(new_tracker: &NewTracker, connection: &Connection) -> Result<Tracker, Error> {
    if new_tracker.schedule.is_empty() {
        return Err(Error::ScheduleRequired);
    }

    let transaction = connection.unchecked_transaction()?;

    let category = get_or_create_category(&new_tracker.category, &transaction)?;

    transaction.execute(
        "INSERT INTO tracker (name, color, emoji, schedule, category_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            new_tracker.name.as_ref(),
            new_tracker.color.as_ref(),
            new_tracker.emoji.as_ref(),
            new_tracker.schedule,
            category.id,
        ),
    )?;

    let id = transaction.last_insert_rowid();

    transaction.commit()?;

    Ok(Tracker {
        id,
        name: new_tracker.name.clone(),
        color: new_tracker.color.clone(),
        emoji: new_tracker.emoji.clone(),
        schedule: new_tracker.schedule,
        category_id: Some(category.id),
    })
}

/// Retrieve a single tracker by ID.
pub fn get_tracker(tracker_id: TrackerId, connection: &Connection) -> Result<Tracker, Error> {
    connection
        .prepare(
            "SELECT id, name, color, emoji, schedule, category_id FROM tracker WHERE id = :id;",
        )?
        .query_row(&[(":id", &tracker_id)], map_tracker_row)
        .map_err(|error| error.into())
}

/// Retrieve a single tracker with its category title.
pub fn get_categorized_tracker(
    tracker_id: TrackerId,
    connection: &Connection,
) -> Result<CategorizedTracker, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORIZED_TRACKERS} WHERE tracker.id = ?1;"
        ))?
        .query_row([tracker_id], map_categorized_row)
        .map_err(|error| error.into())
}

/// Retrieve all trackers with their category titles in the order they were created.
pub fn get_all_trackers(connection: &Connection) -> Result<Vec<CategorizedTracker>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORIZED_TRACKERS} ORDER BY tracker.id ASC;"
        ))?
        .query_map([], map_categorized_row)?
        .map(|maybe_tracker| maybe_tracker.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the trackers scheduled on `day` in the order they were created.
///
/// The schedule bitmask is matched in SQL, so trackers on other days are never loaded.
pub fn get_trackers_for_weekday(
    day: Weekday,
    connection: &Connection,
) -> Result<Vec<CategorizedTracker>, Error> {
    let day_mask: i16 = 1 << day.bit_position();

    connection
        .prepare(&format!(
            "{SELECT_CATEGORIZED_TRACKERS} WHERE (tracker.schedule & ?1) != 0 ORDER BY tracker.id ASC;"
        ))?
        .query_map([day_mask], map_categorized_row)?
        .map(|maybe_tracker| maybe_tracker.map_err(|error| error.into()))
        .collect()
}

/// Replace a tracker's fields, moving it to another category if the title changed.
///
/// # Errors
///
/// This function will return a:
/// - [Error::ScheduleRequired] if the tracker has no scheduled days,
/// - [Error::UpdateMissingTracker] if the tracker does not exist,
/// - [Error::CategoryPersistenceError] if the category could not be created,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_tracker(
    tracker_id: TrackerId,
    new_tracker: &NewTracker,
    connection: &Connection,
) -> Result<Tracker, Error> {
    if new_tracker.schedule.is_empty() {
        return Err(Error::ScheduleRequired);
    }

    let transaction = connection.unchecked_transaction()?;

    let category = get_or_create_category(&new_tracker.category, &transaction)?;

    let rows_affected = transaction.execute(
        "UPDATE tracker
         SET name = ?1, color = ?2, emoji = ?3, schedule = ?4, category_id = ?5
         WHERE id = ?6",
        (
            new_tracker.name.as_ref(),
            new_tracker.color.as_ref(),
            new_tracker.emoji.as_ref(),
            new_tracker.schedule,
            category.id,
            tracker_id,
        ),
    )?;

    if rows_affected == 0 {
        // Dropping the transaction rolls back the category that may have been created.
        return Err(Error::UpdateMissingTracker);
    }

    transaction.commit()?;

    Ok(Tracker {
        id: tracker_id,
        name: new_tracker.name.clone(),
        color: new_tracker.color.clone(),
        emoji: new_tracker.emoji.clone(),
        schedule: new_tracker.schedule,
        category_id: Some(category.id),
    })
}

/// Delete a tracker and its completion records.
pub fn delete_tracker(tracker_id: TrackerId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM tracker WHERE id = ?1", [tracker_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTracker);
    }

    Ok(())
}

/// Initialize the tracker table and indexes.
///
/// Requires the category table.
pub fn create_tracker_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS tracker (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            emoji TEXT NOT NULL,
            schedule INTEGER NOT NULL,
            category_id INTEGER,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tracker_category ON tracker(category_id);",
    )?;

    Ok(())
}

fn map_tracker_row(row: &Row) -> Result<Tracker, rusqlite::Error> {
    let id = row.get(0)?;
    let name: String = row.get(1)?;
    let color: String = row.get(2)?;
    let emoji: String = row.get(3)?;
    let schedule = row.get(4)?;
    let category_id = row.get(5)?;

    Ok(Tracker {
        id,
        name: TrackerName::new_unchecked(&name),
        color: TrackerColor::new_unchecked(&color),
        emoji: TrackerEmoji::new_unchecked(&emoji),
        schedule,
        category_id,
    })
}

fn map_categorized_row(row: &Row) -> Result<CategorizedTracker, rusqlite::Error> {
    let tracker = map_tracker_row(row)?;
    let category: Option<String> = row.get(6)?;

    Ok(CategorizedTracker {
        tracker,
        category: category.as_deref().map(CategoryTitle::new_unchecked),
    })
}
