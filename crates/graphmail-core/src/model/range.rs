//! Inclusive date-time ranges used by search and calendar queries.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::time::{is_date_only, parse_timestamp};
use crate::error::{Error, Result};

/// Inclusive `[start, end]` range of UTC timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `end` precedes `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidInput(format!(
                "date range ends before it starts: {start} > {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering whole days, from midnight of `start` to the
    /// last second of `end`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `end` precedes `start` or lies at
    /// the edge of the representable calendar.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(start.and_time(NaiveTime::MIN), end_of_day(end)?)
    }

    /// Parses a range from two boundary strings.
    ///
    /// A bare `YYYY-MM-DD` end bound covers the whole day.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for unparseable or inverted bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_timestamp(start)?, parse_end_bound(end)?)
    }

    /// Range start.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Range end (inclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Returns true if `value` falls inside the range, bounds included.
    #[must_use]
    pub fn contains(&self, value: &NaiveDateTime) -> bool {
        *value >= self.start && *value <= self.end
    }
}

/// Parses an inclusive upper bound; a bare `YYYY-MM-DD` means the last
/// second of that day.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for an unparseable timestamp, or a date
/// whose end cannot be represented.
pub fn parse_end_bound(input: &str) -> Result<NaiveDateTime> {
    let value = parse_timestamp(input)?;
    if is_date_only(input) {
        end_of_day(value.date())
    } else {
        Ok(value)
    }
}

fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime> {
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::days(1))
        .and_then(|next| next.checked_sub_signed(Duration::seconds(1)))
        .ok_or_else(|| Error::InvalidInput(format!("date {date} is out of range")))
}
