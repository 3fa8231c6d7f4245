//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Date;

use crate::{Error, db::initialize, store::TrackerStore, timezone::get_local_today};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection, shared with [AppState::store].
    pub db_connection: Arc<Mutex<Connection>>,

    /// Serializes writes and announces changes to subscribers.
    pub store: TrackerStore,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, local_timezone: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let store = TrackerStore::new(connection.clone())?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            db_connection: connection,
            store,
        })
    }

    /// Today's date in the server's timezone.
    pub fn today(&self) -> Result<Date, Error> {
        get_local_today(&self.local_timezone)
    }
}
