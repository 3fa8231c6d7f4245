//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryTitle},
    database_id::CategoryId,
};

/// Get the category with `title`, creating it if it does not exist yet.
///
/// Titles are matched exactly (case-sensitive).
///
/// # Errors
///
/// Returns an [Error::CategoryPersistenceError] if the category could not be
/// read or written.
pub fn get_or_create_category(
    title: &CategoryTitle,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT OR IGNORE INTO category (title) VALUES (?1);",
            (title.as_ref(),),
        )
        .map_err(|error| Error::CategoryPersistenceError(error.to_string()))?;

    get_category_by_title(title, connection)?.ok_or_else(|| {
        Error::CategoryPersistenceError(format!("category \"{title}\" missing after insert"))
    })
}

/// Retrieve a single category by ID.
///
/// # Errors
///
/// Returns an [Error::NotFound] if there is no category with `category_id`
/// or an [Error::CategoryPersistenceError] if the query fails.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, title FROM category WHERE id = :id;")
        .and_then(|mut statement| statement.query_row(&[(":id", &category_id)], map_row))
        .map_err(persistence_error)
}

/// Retrieve a single category by its exact title, if it exists.
///
/// # Errors
///
/// Returns an [Error::CategoryPersistenceError] if the query fails.
pub fn get_category_by_title(
    title: &CategoryTitle,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    let result = connection
        .prepare("SELECT id, title FROM category WHERE title = ?1;")
        .and_then(|mut statement| statement.query_row((title.as_ref(),), map_row));

    match result {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(Error::CategoryPersistenceError(error.to_string())),
    }
}

/// Retrieve all categories ordered by title.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, title FROM category ORDER BY title ASC;")
        .and_then(|mut statement| {
            let categories = statement
                .query_map([], map_row)?
                .collect::<Result<Vec<Category>, rusqlite::Error>>();
            categories
        })
        .map_err(persistence_error)
}

/// Change a category's title.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingCategory] if the category does not exist or
/// an [Error::DuplicateCategoryTitle] if another category already uses `new_title`.
pub fn rename_category(
    category_id: CategoryId,
    new_title: &CategoryTitle,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET title = ?1 WHERE id = ?2",
            (new_title.as_ref(), category_id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryTitle(new_title.to_string()),
            error => persistence_error(error),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(Category {
        id: category_id,
        title: new_title.clone(),
    })
}

/// Delete a category by ID.
///
/// Trackers in the category are kept and become uncategorized.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute("DELETE FROM category WHERE id = ?1", [category_id])
        .map_err(persistence_error)?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL UNIQUE
        );",
    )?;

    Ok(())
}

fn persistence_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
        error => {
            tracing::error!("category query failed: {error}");
            Error::CategoryPersistenceError(error.to_string())
        }
    }
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_title: String = row.get(1)?;
    let title = CategoryTitle::new_unchecked(&raw_title);

    Ok(Category { id, title })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            CategoryTitle, delete_category, get_all_categories, get_category,
            get_category_by_title, get_or_create_category, rename_category,
        },
    };

    use super::create_category_table;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).expect("Could not create category table");
        connection
    }

    #[test]
    fn get_or_create_creates_category() {
        let connection = get_test_db_connection();
        let title = CategoryTitle::new_unchecked("Health");

        let category = get_or_create_category(&title, &connection).expect("Could not create");

        assert!(category.id > 0);
        assert_eq!(category.title, title);
    }

    #[test]
    fn get_or_create_returns_existing_category() {
        let connection = get_test_db_connection();
        let title = CategoryTitle::new_unchecked("Health");

        let first = get_or_create_category(&title, &connection).unwrap();
        let second = get_or_create_category(&title, &connection).unwrap();

        assert_eq!(first, second);
        assert_eq!(get_all_categories(&connection).unwrap().len(), 1);
    }

    #[test]
    fn titles_are_case_sensitive() {
        let connection = get_test_db_connection();

        let upper = get_or_create_category(&CategoryTitle::new_unchecked("Sport"), &connection)
            .unwrap();
        let lower = get_or_create_category(&CategoryTitle::new_unchecked("sport"), &connection)
            .unwrap();

        assert_ne!(upper.id, lower.id);
    }

    #[test]
    fn get_or_create_without_table_is_persistence_error() {
        let connection = Connection::open_in_memory().unwrap();

        let result = get_or_create_category(&CategoryTitle::new_unchecked("Health"), &connection);

        assert!(matches!(result, Err(Error::CategoryPersistenceError(_))));
    }

    #[test]
    fn lookups_without_table_are_persistence_errors() {
        let connection = Connection::open_in_memory().unwrap();
        let title = CategoryTitle::new_unchecked("Health");

        assert!(matches!(
            get_category(1, &connection),
            Err(Error::CategoryPersistenceError(_))
        ));
        assert!(matches!(
            get_all_categories(&connection),
            Err(Error::CategoryPersistenceError(_))
        ));
        assert!(matches!(
            get_category_by_title(&title, &connection),
            Err(Error::CategoryPersistenceError(_))
        ));
    }

    #[test]
    fn writes_without_table_are_persistence_errors() {
        let connection = Connection::open_in_memory().unwrap();

        assert!(matches!(
            rename_category(1, &CategoryTitle::new_unchecked("Health"), &connection),
            Err(Error::CategoryPersistenceError(_))
        ));
        assert!(matches!(
            delete_category(1, &connection),
            Err(Error::CategoryPersistenceError(_))
        ));
    }

    #[test]
    fn get_by_title_returns_none_for_unknown_title() {
        let connection = get_test_db_connection();

        let category = get_category_by_title(&CategoryTitle::new_unchecked("Nope"), &connection);

        assert_eq!(category, Ok(None));
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(get_category(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_all_categories_orders_by_title() {
        let connection = get_test_db_connection();
        for title in ["Study", "Health", "Chores"] {
            get_or_create_category(&CategoryTitle::new_unchecked(title), &connection).unwrap();
        }

        let titles: Vec<String> = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.title.to_string())
            .collect();

        assert_eq!(titles, ["Chores", "Health", "Study"]);
    }

    #[test]
    fn rename_category_succeeds() {
        let connection = get_test_db_connection();
        let category =
            get_or_create_category(&CategoryTitle::new_unchecked("Old"), &connection).unwrap();
        let new_title = CategoryTitle::new_unchecked("New");

        let renamed = rename_category(category.id, &new_title, &connection).unwrap();

        assert_eq!(renamed.title, new_title);
        assert_eq!(get_category(category.id, &connection), Ok(renamed));
    }

    #[test]
    fn rename_to_existing_title_fails() {
        let connection = get_test_db_connection();
        get_or_create_category(&CategoryTitle::new_unchecked("Health"), &connection).unwrap();
        let other =
            get_or_create_category(&CategoryTitle::new_unchecked("Study"), &connection).unwrap();

        let result = rename_category(
            other.id,
            &CategoryTitle::new_unchecked("Health"),
            &connection,
        );

        assert_eq!(
            result,
            Err(Error::DuplicateCategoryTitle("Health".to_owned()))
        );
    }

    #[test]
    fn rename_missing_category_fails() {
        let connection = get_test_db_connection();

        let result = rename_category(999, &CategoryTitle::new_unchecked("New"), &connection);

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_db_connection();
        let category =
            get_or_create_category(&CategoryTitle::new_unchecked("Gone"), &connection).unwrap();

        assert_eq!(delete_category(category.id, &connection), Ok(()));
        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_category_fails() {
        let connection = get_test_db_connection();

        assert_eq!(
            delete_category(999, &connection),
            Err(Error::DeleteMissingCategory)
        );
    }
}
