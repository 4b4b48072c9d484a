//! Default-calendar operations.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::{debug, info};

use super::wire::{Collection, EVENT_FIELDS, GraphEvent, Resource, event_payload};
use super::{GraphMailClient, segment};
use crate::error::{Error, Result};
use crate::model::time::graph_local_datetime;
use crate::model::{CalendarEvent, DateRange, NewEvent};
use crate::query::{GraphRequest, Query, odata_string};

/// Length of the default listing window.
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Listing window for optional bounds: `start` defaults to midnight of
/// `today`, `end` to `start` plus seven days.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the resulting end precedes the start, or
/// the default end falls outside the representable calendar.
pub fn default_window(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    today: NaiveDate,
) -> Result<DateRange> {
    let start = start.unwrap_or_else(|| today.and_time(NaiveTime::MIN));
    let end = match end {
        Some(end) => end,
        None => start
            .checked_add_signed(Duration::days(DEFAULT_WINDOW_DAYS))
            .ok_or_else(|| Error::InvalidInput(format!("no default end for start {start}")))?,
    };
    DateRange::new(start, end)
}

impl GraphMailClient {
    /// Lists events that start and end inside the window, ordered by start.
    ///
    /// Missing bounds follow [`default_window`] with today's UTC date.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is unauthenticated, the window is
    /// inverted, or the request fails.
    pub async fn list_events(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        max_count: usize,
    ) -> Result<Vec<CalendarEvent>> {
        self.inner()?;
        let window = default_window(start, end, Utc::now().date_naive())?;
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let query = Query::new()
            .filter(format!(
                "start/dateTime ge {} and end/dateTime le {}",
                odata_string(&graph_local_datetime(&window.start())),
                odata_string(&graph_local_datetime(&window.end()))
            ))
            .order_by("start/dateTime", false)
            .select(EVENT_FIELDS)
            .top(max_count);
        let request = GraphRequest::get(self.user_path("/calendar/events"))
            .with_query(&query)
            .with_header("Prefer", "outlook.timezone=\"UTC\"");

        let page: Collection<GraphEvent> = self.get_json(&request, "calendar").await?;
        let events: Vec<CalendarEvent> = page
            .value
            .into_iter()
            .filter_map(GraphEvent::into_event)
            .filter(|e| e.start >= window.start() && e.end <= window.end())
            .take(max_count)
            .collect();

        debug!(
            start = %window.start(),
            end = %window.end(),
            count = events.len(),
            "Listed events"
        );
        Ok(events)
    }

    /// Creates an event on the default calendar. Returns the event id.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is invalid or Graph rejects it.
    pub async fn add_event(&self, event: &NewEvent) -> Result<String> {
        self.inner()?;
        event.validate()?;

        let request = GraphRequest::post(self.user_path("/calendar/events"))
            .with_json(event_payload(event, self.config.body_type));
        let created: Resource = self.get_json(&request, "calendar").await?;

        info!(id = %created.id, subject = %event.subject, "Added event");
        Ok(created.id)
    }

    /// Deletes an event from the default calendar.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown event.
    pub async fn remove_event(&self, event_id: &str) -> Result<()> {
        self.inner()?;
        let id = event_id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("event id is empty".into()));
        }

        let path = self.user_path(&format!("/calendar/events/{}", segment(id)));
        let lookup = GraphRequest::get(&path).with_query(&Query::new().select(&["id"]));
        let _: Resource = self.get_json(&lookup, id).await?;

        self.execute(&GraphRequest::delete(path), id).await?;
        info!(id, "Removed event");
        Ok(())
    }
}
