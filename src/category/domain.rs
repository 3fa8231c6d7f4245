//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId};

/// The title used for trackers that have lost their category, e.g. because the
/// category was deleted.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A validated, non-empty category title.
///
/// Titles are compared exactly, so "Sport" and "sport" are different categories.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryTitle(String);

impl CategoryTitle {
    /// Create a category title.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryTitle] if `title` is
    /// empty or only whitespace.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyCategoryTitle)
        } else {
            Ok(Self(title.to_string()))
        }
    }

    /// Create a category title without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl AsRef<str> for CategoryTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryTitle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryTitle::new(s)
    }
}

impl TryFrom<String> for CategoryTitle {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CategoryTitle::new(&value)
    }
}

impl From<CategoryTitle> for String {
    fn from(title: CategoryTitle) -> Self {
        title.0
    }
}

impl Display for CategoryTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named group of trackers, e.g. "Health" or "Study".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub title: CategoryTitle,
}

/// Request body for category creation and renaming.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub title: String,
}

#[cfg(test)]
mod category_title_tests {
    use crate::{Error, category::CategoryTitle};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(CategoryTitle::new(""), Err(Error::EmptyCategoryTitle));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(CategoryTitle::new("\n\t \r"), Err(Error::EmptyCategoryTitle));
    }

    #[test]
    fn new_trims_whitespace() {
        let title = CategoryTitle::new("  Health ").unwrap();

        assert_eq!(title.as_ref(), "Health");
    }

    #[test]
    fn deserialize_rejects_empty_title() {
        let title = serde_json::from_str::<CategoryTitle>(r#""   ""#);

        assert!(title.is_err());
    }
}
