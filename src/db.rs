//! Database initialization.

use rusqlite::Connection;

use crate::{
    Error, category::create_category_table, completion::create_completion_table,
    tracker::create_tracker_table,
};

/// Create the application's tables if they do not exist.
///
/// Foreign key enforcement is turned on for `connection`, which is needed for
/// deleting trackers and categories to clean up the rows that refer to them.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the statements fail.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_category_table(&transaction)?;
    create_tracker_table(&transaction)?;
    create_completion_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
