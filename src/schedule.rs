//! Weekday schedules and their compact bitmask encoding.
//!
//! A [Schedule] is stored in the database as a 16-bit signed integer where bit
//! [Weekday::bit_position] is set iff the tracker is active on that day. The
//! bit positions start at Sunday, matching the calendar weekday numbering
//! where 1 is Sunday, so they must not be reordered.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All weekdays in bit order, i.e. starting from Sunday.
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// All weekdays in the order they are listed to users, starting from Monday.
    pub const DISPLAY_ORDER: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// The bit that represents this day in a schedule bitmask.
    pub fn bit_position(self) -> u8 {
        match self {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }

    /// The three-letter abbreviation shown in schedule summaries.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sun",
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
        }
    }

    /// The full name of the day.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    fn mask(self) -> i16 {
        1 << self.bit_position()
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Convert a 1-based calendar weekday index (1 = Sunday, 7 = Saturday) to a [Weekday].
///
/// # Errors
///
/// Returns [Error::InvalidCalendarIndex] if `index` is not in `1..=7`.
pub fn weekday_from_calendar_index(index: u8) -> Result<Weekday, Error> {
    match index {
        1 => Ok(Weekday::Sunday),
        2 => Ok(Weekday::Monday),
        3 => Ok(Weekday::Tuesday),
        4 => Ok(Weekday::Wednesday),
        5 => Ok(Weekday::Thursday),
        6 => Ok(Weekday::Friday),
        7 => Ok(Weekday::Saturday),
        invalid => Err(Error::InvalidCalendarIndex(invalid)),
    }
}

impl From<time::Weekday> for Weekday {
    fn from(weekday: time::Weekday) -> Self {
        match weekday {
            time::Weekday::Sunday => Weekday::Sunday,
            time::Weekday::Monday => Weekday::Monday,
            time::Weekday::Tuesday => Weekday::Tuesday,
            time::Weekday::Wednesday => Weekday::Wednesday,
            time::Weekday::Thursday => Weekday::Thursday,
            time::Weekday::Friday => Weekday::Friday,
            time::Weekday::Saturday => Weekday::Saturday,
        }
    }
}

/// The set of weekdays on which a tracker is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Schedule {
    mask: i16,
}

impl Schedule {
    /// A schedule with no days selected.
    pub fn empty() -> Self {
        Self { mask: 0 }
    }

    /// A schedule with all seven days selected.
    pub fn every_day() -> Self {
        Weekday::ALL.into_iter().collect()
    }

    /// Encode the schedule as a bitmask.
    pub fn encode(&self) -> i16 {
        self.mask
    }

    /// Decode a bitmask into a schedule.
    ///
    /// Bits outside of positions 0 to 6, including the sign bit, are ignored.
    pub fn decode(mask: i16) -> Self {
        Weekday::ALL
            .into_iter()
            .filter(|day| mask & day.mask() != 0)
            .collect()
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.mask & day.mask() != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.mask |= day.mask();
    }

    pub fn remove(&mut self, day: Weekday) {
        self.mask &= !day.mask();
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn is_every_day(&self) -> bool {
        *self == Self::every_day()
    }

    /// The number of days in the schedule.
    pub fn len(&self) -> usize {
        self.days().count()
    }

    /// The selected days in display order, i.e. starting from Monday.
    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        Weekday::DISPLAY_ORDER
            .into_iter()
            .filter(|day| self.contains(*day))
    }

    /// A short summary of the schedule, e.g. "Mon, Wed, Fri".
    ///
    /// A schedule with every day selected is summarised as "Every day".
    pub fn label(&self) -> String {
        if self.is_every_day() {
            return "Every day".to_owned();
        }

        self.days()
            .map(Weekday::abbreviation)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<Weekday> for Schedule {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut schedule = Schedule::empty();

        for day in iter {
            schedule.insert(day);
        }

        schedule
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Schedule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.days())
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = Vec::<Weekday>::deserialize(deserializer)?;

        Ok(days.into_iter().collect())
    }
}

impl ToSql for Schedule {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.encode()))
    }
}

impl FromSql for Schedule {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i16::column_result(value).map(Schedule::decode)
    }
}
