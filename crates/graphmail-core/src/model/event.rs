//! Calendar event models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A calendar event as fetched from the default calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Graph event identifier.
    pub id: String,
    /// Subject line.
    pub subject: String,
    /// Start time (UTC).
    #[serde(rename = "start_time", with = "super::time::timestamp")]
    pub start: NaiveDateTime,
    /// End time (UTC).
    #[serde(rename = "end_time", with = "super::time::timestamp")]
    pub end: NaiveDateTime,
    /// Location display name.
    pub location: String,
    /// Organizer address.
    pub organizer: String,
    /// Attendee addresses, when the server returned any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    /// Body content, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// An event to create on the default calendar.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Subject line.
    pub subject: String,
    /// Start time (UTC).
    pub start: NaiveDateTime,
    /// End time (UTC).
    pub end: NaiveDateTime,
    /// Location display name.
    pub location: String,
    /// Attendee addresses.
    pub attendees: Vec<String>,
    /// Optional body.
    pub body: Option<String>,
}

impl NewEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        location: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            start,
            end,
            location: location.into(),
            attendees: Vec::new(),
            body: None,
        }
    }

    /// Adds an attendee.
    #[must_use]
    pub fn attendee(mut self, address: impl Into<String>) -> Self {
        self.attendees.push(address.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Checks that the event can be created.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the event ends before it starts.
    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(Error::InvalidInput(format!(
                "event ends ({}) before it starts ({})",
                super::format_timestamp(&self.end),
                super::format_timestamp(&self.start)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;

    #[test]
    fn test_new_event_builder() {
        let event = NewEvent::new(
            "Standup",
            parse_timestamp("2024-01-15 09:00:00").unwrap(),
            parse_timestamp("2024-01-15 09:15:00").unwrap(),
            "Room 1",
        )
        .attendee("a@example.com")
        .body("Daily");

        assert_eq!(event.attendees, vec!["a@example.com"]);
        assert_eq!(event.body.as_deref(), Some("Daily"));
        event.validate().unwrap();
    }

    #[test]
    fn test_new_event_rejects_inverted_window() {
        let event = NewEvent::new(
            "Backwards",
            parse_timestamp("2024-01-15 10:00:00").unwrap(),
            parse_timestamp("2024-01-15 09:00:00").unwrap(),
            "",
        );
        assert!(matches!(event.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_calendar_event_serialization_skips_absent_optionals() {
        let event = CalendarEvent {
            id: "AAMkE".into(),
            subject: "Review".into(),
            start: parse_timestamp("2024-01-15 09:00:00").unwrap(),
            end: parse_timestamp("2024-01-15 10:00:00").unwrap(),
            location: "Room 2".into(),
            organizer: "lead@example.com".into(),
            attendees: None,
            body: None,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["start_time"], "2024-01-15 09:00:00");
        assert_eq!(value["end_time"], "2024-01-15 10:00:00");
        assert!(value.get("attendees").is_none());
        assert!(value.get("body").is_none());
    }
}
