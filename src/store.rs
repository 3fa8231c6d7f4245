//! The tracker store: serialized writes with change notifications.
//!
//! Every mutation goes through [TrackerStore], which holds the database lock
//! for the write, rebuilds the grouped tracker and category lists, diffs them
//! against the previously published lists and broadcasts one [StoreEvent].
//! Because the lock is held until the event is sent, subscribers never see the
//! changes of two mutations interleaved.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use serde::Serialize;
use time::Date;
use tokio::sync::broadcast;

use crate::{
    Error,
    category::{
        Category, CategoryTitle, delete_category, get_all_categories, get_or_create_category,
        rename_category,
    },
    completion::{count_completions, toggle_completion},
    database_id::{CategoryId, TrackerId},
    diff::{ListUpdate, Section, diff_snapshots},
    tracker::{
        CategorizedTracker, NewTracker, Tracker, create_tracker, delete_tracker, get_all_trackers,
        update_tracker,
    },
};

/// How many events a slow subscriber may fall behind before it starts missing events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

type TrackerSnapshot = Vec<Section<Option<CategoryTitle>, TrackerId>>;
type CategorySnapshot = Vec<Section<(), CategoryId>>;

/// A change published by [TrackerStore] after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// The grouped tracker list or the category list changed.
    ///
    /// Tracker sections are ordered like [crate::filter::filter_trackers]
    /// orders them, but include every tracker regardless of schedule.
    ListsChanged {
        trackers: ListUpdate,
        categories: ListUpdate,
    },
    /// A tracker was marked or unmarked as completed on `date`.
    CompletionChanged {
        tracker_id: TrackerId,
        date: Date,
        completed: bool,
    },
}

/// The outcome of [TrackerStore::toggle_completion_counted].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggledCompletion {
    /// Whether the tracker is now completed on the toggled day.
    pub completed: bool,
    /// The number of days the tracker has been completed on after the toggle.
    pub completed_days: u32,
}

#[derive(Debug, Default)]
struct Snapshots {
    trackers: TrackerSnapshot,
    categories: CategorySnapshot,
}

/// Single-writer access to trackers, categories and completion records.
#[derive(Debug, Clone)]
pub struct TrackerStore {
    db_connection: Arc<Mutex<Connection>>,
    snapshots: Arc<Mutex<Snapshots>>,
    sender: broadcast::Sender<StoreEvent>,
}

impl TrackerStore {
    /// Create a store for an initialized database.
    ///
    /// # Errors
    /// Returns an error if the current trackers and categories cannot be read.
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Result<Self, Error> {
        let snapshots = {
            let connection = lock_connection(&db_connection)?;

            Snapshots {
                trackers: tracker_snapshot(&get_all_trackers(&connection)?),
                categories: category_snapshot(&get_all_categories(&connection)?),
            }
        };

        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            db_connection,
            snapshots: Arc::new(Mutex::new(snapshots)),
            sender,
        })
    }

    /// Receive the events of all mutations made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Lock the database connection for reading.
    ///
    /// Writes should go through the store's methods so that they are announced.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        lock_connection(&self.db_connection)
    }

    /// Create a tracker, creating its category if needed.
    pub fn create_tracker(&self, new_tracker: &NewTracker) -> Result<Tracker, Error> {
        self.mutate(|connection| create_tracker(new_tracker, connection))
    }

    /// Replace a tracker's fields, possibly moving it to another category.
    pub fn update_tracker(
        &self,
        tracker_id: TrackerId,
        new_tracker: &NewTracker,
    ) -> Result<Tracker, Error> {
        self.mutate(|connection| update_tracker(tracker_id, new_tracker, connection))
    }

    /// Delete a tracker and its completion records.
    pub fn delete_tracker(&self, tracker_id: TrackerId) -> Result<(), Error> {
        self.mutate(|connection| delete_tracker(tracker_id, connection))
    }

    /// Get the category with `title`, creating it if it does not exist yet.
    pub fn create_category(&self, title: &CategoryTitle) -> Result<Category, Error> {
        self.mutate(|connection| get_or_create_category(title, connection))
    }

    pub fn rename_category(
        &self,
        category_id: CategoryId,
        new_title: &CategoryTitle,
    ) -> Result<Category, Error> {
        self.mutate(|connection| rename_category(category_id, new_title, connection))
    }

    /// Delete a category. Its trackers become uncategorized.
    pub fn delete_category(&self, category_id: CategoryId) -> Result<(), Error> {
        self.mutate(|connection| delete_category(category_id, connection))
    }

    /// Flip the completion state of a tracker on `date`, which must not be after `today`.
    ///
    /// Returns whether the tracker is now completed on `date`.
    pub fn toggle_completion(
        &self,
        tracker_id: TrackerId,
        date: Date,
        today: Date,
    ) -> Result<bool, Error> {
        self.toggle_completion_counted(tracker_id, date, today)
            .map(|toggled| toggled.completed)
    }

    /// Like [TrackerStore::toggle_completion], but also counts the tracker's
    /// completed days while still holding the lock, so the count always agrees
    /// with the toggle.
    pub fn toggle_completion_counted(
        &self,
        tracker_id: TrackerId,
        date: Date,
        today: Date,
    ) -> Result<ToggledCompletion, Error> {
        let connection = self.connection()?;

        let completed = toggle_completion(tracker_id, date, today, &connection)?;

        self.send(StoreEvent::CompletionChanged {
            tracker_id,
            date,
            completed,
        });

        let completed_days = count_completions(tracker_id, &connection)?;

        Ok(ToggledCompletion {
            completed,
            completed_days,
        })
    }

    fn mutate<T>(
        &self,
        operation: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let connection = self.connection()?;

        let result = operation(&connection)?;

        // The write has already happened, so a failure to announce it should
        // not be reported as a failed write.
        if let Err(error) = self.publish_list_changes(&connection) {
            tracing::error!("could not publish store changes: {error}");
        }

        Ok(result)
    }

    fn publish_list_changes(&self, connection: &Connection) -> Result<(), Error> {
        let trackers = tracker_snapshot(&get_all_trackers(connection)?);
        let categories = category_snapshot(&get_all_categories(connection)?);

        let mut snapshots = self.snapshots.lock().map_err(|error| {
            tracing::error!("could not acquire snapshot lock: {error}");
            Error::DatabaseLockError
        })?;

        let tracker_update = diff_snapshots(&snapshots.trackers, &trackers);
        let category_update = diff_snapshots(&snapshots.categories, &categories);

        snapshots.trackers = trackers;
        snapshots.categories = categories;

        if tracker_update.is_empty() && category_update.is_empty() {
            return Ok(());
        }

        self.send(StoreEvent::ListsChanged {
            trackers: tracker_update,
            categories: category_update,
        });

        Ok(())
    }

    fn send(&self, event: StoreEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("no subscribers for store event");
        }
    }
}

fn lock_connection(db_connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// Group trackers by category the same way the filter does, uncategorized last.
fn tracker_snapshot(trackers: &[CategorizedTracker]) -> TrackerSnapshot {
    let mut snapshot: TrackerSnapshot = Vec::new();

    let mut sorted: Vec<&CategorizedTracker> = trackers.iter().collect();
    // Stable sort, so trackers keep their persisted order within a category.
    sorted.sort_by(|a, b| {
        (a.category.is_none(), &a.category).cmp(&(b.category.is_none(), &b.category))
    });

    for tracker in sorted {
        match snapshot.last_mut() {
            Some(section) if section.key == tracker.category => {
                section.rows.push(tracker.tracker.id)
            }
            _ => snapshot.push(Section {
                key: tracker.category.clone(),
                rows: vec![tracker.tracker.id],
            }),
        }
    }

    snapshot
}

fn category_snapshot(categories: &[Category]) -> CategorySnapshot {
    vec![Section {
        key: (),
        rows: categories.iter().map(|category| category.id).collect(),
    }]
}
