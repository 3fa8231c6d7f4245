//! Core tracker domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    category::CategoryTitle,
    database_id::{CategoryId, TrackerId},
    schedule::Schedule,
};

/// The maximum number of characters (grapheme clusters) in a tracker name.
pub const MAX_TRACKER_NAME_LENGTH: usize = 38;

/// A validated tracker name: not empty and at most [MAX_TRACKER_NAME_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct TrackerName(String);

impl TrackerName {
    /// Create a tracker name.
    ///
    /// Leading and trailing whitespace is removed before validation. Length is
    /// measured in user-perceived characters, so "🧘‍♀️" counts as one.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::EmptyTrackerName] if `name` is empty or only whitespace,
    /// - or [Error::TrackerNameTooLong] if `name` is longer than [MAX_TRACKER_NAME_LENGTH].
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyTrackerName);
        }

        let length = name.graphemes(true).count();
        if length > MAX_TRACKER_NAME_LENGTH {
            return Err(Error::TrackerNameTooLong(length));
        }

        Ok(Self(name.to_owned()))
    }

    /// Create a tracker name without validation.
    ///
    /// The caller should ensure that the name is valid.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Whether the name contains `needle`, ignoring case.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl AsRef<str> for TrackerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrackerName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TrackerName::new(&value)
    }
}

impl From<TrackerName> for String {
    fn from(name: TrackerName) -> Self {
        name.0
    }
}

impl Display for TrackerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A colour in the form `#RRGGBB`, stored in upper case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct TrackerColor(String);

impl TrackerColor {
    /// Parse a hex colour string. The leading '#' is optional.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidColor] if `color` is not six hexadecimal digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let trimmed = color.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(color.to_owned()));
        }

        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    /// Create a colour without validation.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl AsRef<str> for TrackerColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrackerColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TrackerColor::new(&value)
    }
}

impl From<TrackerColor> for String {
    fn from(color: TrackerColor) -> Self {
        color.0
    }
}

/// A single emoji used as the tracker's icon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct TrackerEmoji(String);

impl TrackerEmoji {
    /// Create an emoji.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidEmoji] if `emoji` is not exactly one
    /// non-whitespace, non-alphanumeric character.
    pub fn new(emoji: &str) -> Result<Self, Error> {
        let trimmed = emoji.trim();
        let mut graphemes = trimmed.graphemes(true);

        match (graphemes.next(), graphemes.next()) {
            (Some(glyph), None) if !glyph.chars().all(char::is_alphanumeric) => {
                Ok(Self(glyph.to_owned()))
            }
            _ => Err(Error::InvalidEmoji(emoji.to_owned())),
        }
    }

    /// Create an emoji without validation.
    pub fn new_unchecked(emoji: &str) -> Self {
        Self(emoji.to_owned())
    }
}

impl AsRef<str> for TrackerEmoji {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrackerEmoji {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TrackerEmoji::new(&value)
    }
}

impl From<TrackerEmoji> for String {
    fn from(emoji: TrackerEmoji) -> Self {
        emoji.0
    }
}

/// A habit the user wants to keep, e.g. "Yoga" on Mondays and Wednesdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    pub id: TrackerId,
    pub name: TrackerName,
    pub color: TrackerColor,
    pub emoji: TrackerEmoji,
    pub schedule: Schedule,
    /// `None` when the tracker's category has been deleted.
    pub category_id: Option<CategoryId>,
}

/// A tracker together with the title of the category that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedTracker {
    #[serde(flatten)]
    pub tracker: Tracker,
    pub category: Option<CategoryTitle>,
}

/// The validated fields for creating or updating a tracker.
///
/// The category is looked up by title and created if it does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTracker {
    pub name: TrackerName,
    pub color: TrackerColor,
    pub emoji: TrackerEmoji,
    pub schedule: Schedule,
    pub category: CategoryTitle,
}

/// Request body for tracker creation and editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerFormData {
    pub name: String,
    pub color: String,
    pub emoji: String,
    pub schedule: Schedule,
    pub category: String,
}

impl TrackerFormData {
    /// Validate the form fields.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the first invalid field, or
    /// [Error::ScheduleRequired] if no day was selected.
    pub fn validate(self) -> Result<NewTracker, Error> {
        let name = TrackerName::new(&self.name)?;
        let color = TrackerColor::new(&self.color)?;
        let emoji = TrackerEmoji::new(&self.emoji)?;
        let category = CategoryTitle::new(&self.category)?;

        if self.schedule.is_empty() {
            return Err(Error::ScheduleRequired);
        }

        Ok(NewTracker {
            name,
            color,
            emoji,
            schedule: self.schedule,
            category,
        })
    }
}
