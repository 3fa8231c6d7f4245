//! Selecting and grouping the trackers to show for a day.
//!
//! The filter never touches the database directly. Callers pass in the tracker
//! rows and a lookup for completion state, which keeps the rules here testable
//! without SQLite.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{CategoryTitle, UNCATEGORIZED_LABEL},
    database_id::TrackerId,
    schedule::weekday_from_calendar_index,
    tracker::{CategorizedTracker, Tracker},
};

/// Which trackers to keep based on whether they were completed on the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionFilter {
    #[default]
    Any,
    Completed,
    NotCompleted,
}

/// The filter options offered to users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPreset {
    /// Every tracker scheduled on the selected day.
    #[default]
    All,
    /// Every tracker scheduled today, regardless of the selected day.
    Today,
    /// Trackers completed on the selected day.
    Completed,
    /// Trackers not yet completed on the selected day.
    NotCompleted,
}

impl FilterPreset {
    /// Build the query for this preset given the selected day and today's date.
    pub fn query(self, selected_date: Date, today: Date, search: Option<String>) -> TrackerQuery {
        let (date, completion) = match self {
            FilterPreset::All => (selected_date, CompletionFilter::Any),
            FilterPreset::Today => (today, CompletionFilter::Any),
            FilterPreset::Completed => (selected_date, CompletionFilter::Completed),
            FilterPreset::NotCompleted => (selected_date, CompletionFilter::NotCompleted),
        };

        TrackerQuery {
            date,
            search,
            completion,
        }
    }
}

/// The parameters for [filter_trackers].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerQuery {
    pub date: Date,
    /// Case-insensitive text that tracker names must contain. Ignored if empty.
    pub search: Option<String>,
    pub completion: CompletionFilter,
}

impl TrackerQuery {
    /// A query for every tracker scheduled on `date`.
    pub fn for_date(date: Date) -> Self {
        Self {
            date,
            search: None,
            completion: CompletionFilter::Any,
        }
    }
}

/// The trackers of one category that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerSection {
    pub title: String,
    /// Whether this is the bucket for trackers without a category, as opposed
    /// to a real category that may have the same title.
    pub uncategorized: bool,
    pub trackers: Vec<Tracker>,
}

/// The result of [filter_trackers].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredTrackers {
    pub date: Date,
    pub sections: Vec<TrackerSection>,
    /// The number of trackers across all sections.
    pub total: usize,
}

impl FilteredTrackers {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Select the trackers to show for `query` and group them by category.
///
/// Trackers are kept if they are scheduled on the query's weekday, their name
/// contains the search text (ignoring case), and their completion state matches.
/// Categories are ordered by title, with uncategorized trackers last, and keep
/// the input order of their trackers. Categories without matching trackers are
/// left out.
///
/// `is_completed` is only called when the query filters on completion.
///
/// # Errors
///
/// Returns any error from `is_completed`.
pub fn filter_trackers<F>(
    trackers: impl IntoIterator<Item = CategorizedTracker>,
    query: &TrackerQuery,
    mut is_completed: F,
) -> Result<FilteredTrackers, Error>
where
    F: FnMut(TrackerId, Date) -> Result<bool, Error>,
{
    let weekday = weekday_from_calendar_index(query.date.weekday().number_from_sunday())?;
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty());

    // `None` sorts before `Some`, so the key is inverted to put uncategorized last.
    let mut groups: BTreeMap<(bool, Option<CategoryTitle>), Vec<Tracker>> = BTreeMap::new();
    let mut total = 0;

    for CategorizedTracker { tracker, category } in trackers {
        if !tracker.schedule.contains(weekday) {
            continue;
        }

        if let Some(search) = search {
            if !tracker.name.contains_ignore_case(search) {
                continue;
            }
        }

        let keep = match query.completion {
            CompletionFilter::Any => true,
            CompletionFilter::Completed => is_completed(tracker.id, query.date)?,
            CompletionFilter::NotCompleted => !is_completed(tracker.id, query.date)?,
        };

        if !keep {
            continue;
        }

        total += 1;
        groups
            .entry((category.is_none(), category))
            .or_default()
            .push(tracker);
    }

    let sections = groups
        .into_iter()
        .map(|((uncategorized, category), trackers)| TrackerSection {
            title: category
                .map(String::from)
                .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned()),
            uncategorized,
            trackers,
        })
        .collect();

    Ok(FilteredTrackers {
        date: query.date,
        sections,
        total,
    })
}
