//! Graph JSON shapes and their conversion into domain values.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::time::{graph_local_datetime, parse_graph_datetime};
use crate::model::{
    AttachmentFile, BodyType, CalendarEvent, EmailMessage, NewEvent, OutgoingMessage,
};

/// Largest file sent inline; Graph caps inline attachments at 3 MB.
pub const MAX_INLINE_ATTACHMENT_BYTES: u64 = 3 * 1024 * 1024;

/// `OData` type tag of inline file attachments.
const FILE_ATTACHMENT_TYPE: &str = "#microsoft.graph.fileAttachment";

/// Message fields requested for listings and searches.
pub const MESSAGE_FIELDS: &[&str] = &["id", "subject", "body", "from", "sender", "receivedDateTime"];

/// Event fields requested for calendar listings.
pub const EVENT_FIELDS: &[&str] = &[
    "id",
    "subject",
    "start",
    "end",
    "location",
    "organizer",
    "attendees",
    "body",
];

/// A page of a Graph collection.
#[derive(Debug, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Any created or fetched resource; only the id is read.
#[derive(Debug, Deserialize)]
pub struct Resource {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[serde(default)]
    pub email_address: EmailAddress,
}

impl Recipient {
    fn address(self) -> Option<String> {
        self.email_address.address
    }
}

#[derive(Debug, Deserialize)]
pub struct AttachmentName {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMessage {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<ItemBody>,
    #[serde(default)]
    pub from: Option<Recipient>,
    #[serde(default)]
    pub sender: Option<Recipient>,
    #[serde(default)]
    pub received_date_time: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentName>,
}

impl GraphMessage {
    /// Converts into a domain message; `None` (logged) if the receive time
    /// is missing or malformed.
    pub fn into_message(self) -> Option<EmailMessage> {
        let Some(received) = self
            .received_date_time
            .as_deref()
            .and_then(parse_graph_datetime)
        else {
            warn!(id = %self.id, "Skipping message without a valid receivedDateTime");
            return None;
        };

        let sender = self
            .from
            .and_then(Recipient::address)
            .or_else(|| self.sender.and_then(Recipient::address))
            .unwrap_or_default();

        Some(EmailMessage {
            id: self.id,
            sender,
            subject: self.subject.unwrap_or_default(),
            body: self.body.and_then(|b| b.content).unwrap_or_default(),
            attachments: self.attachments.into_iter().filter_map(|a| a.name).collect(),
            received,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEvent {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub start: Option<DateTimeTimeZone>,
    #[serde(default)]
    pub end: Option<DateTimeTimeZone>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub organizer: Option<Recipient>,
    #[serde(default)]
    pub attendees: Vec<Recipient>,
    #[serde(default)]
    pub body: Option<ItemBody>,
}

impl GraphEvent {
    /// Converts into a domain event; `None` (logged) if either bound is
    /// missing or malformed.
    pub fn into_event(self) -> Option<CalendarEvent> {
        let start = self
            .start
            .as_ref()
            .and_then(|t| parse_graph_datetime(&t.date_time));
        let end = self
            .end
            .as_ref()
            .and_then(|t| parse_graph_datetime(&t.date_time));
        let (Some(start), Some(end)) = (start, end) else {
            warn!(id = %self.id, "Skipping event without valid start/end");
            return None;
        };

        let attendees: Vec<String> = self
            .attendees
            .into_iter()
            .filter_map(Recipient::address)
            .collect();

        Some(CalendarEvent {
            id: self.id,
            subject: self.subject.unwrap_or_default(),
            start,
            end,
            location: self
                .location
                .and_then(|l| l.display_name)
                .unwrap_or_default(),
            organizer: self
                .organizer
                .and_then(Recipient::address)
                .unwrap_or_default(),
            attendees: (!attendees.is_empty()).then_some(attendees),
            body: self
                .body
                .and_then(|b| b.content)
                .filter(|c| !c.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphAttachment {
    #[serde(rename = "@odata.type", default)]
    pub odata_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "contentBytes", default)]
    pub content_bytes: Option<String>,
}

impl GraphAttachment {
    /// Decodes an inline file attachment; `Ok(None)` for attachment kinds
    /// without inline content.
    pub fn into_file(self) -> Result<Option<AttachmentFile>> {
        let Some(encoded) = self.content_bytes else {
            warn!(
                name = ?self.name,
                kind = ?self.odata_type,
                "Skipping attachment without inline content"
            );
            return Ok(None);
        };
        let content = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("attachment content is not base64: {e}")))?;
        Ok(Some(AttachmentFile {
            name: self.name.unwrap_or_default(),
            content,
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFolder {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

fn recipients(addresses: &[String]) -> Vec<Value> {
    addresses
        .iter()
        .map(|address| json!({ "emailAddress": { "address": address } }))
        .collect()
}

/// Reads a local file into an inline attachment payload.
pub async fn file_attachment(path: &Path) -> Result<Value> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_INLINE_ATTACHMENT_BYTES {
        return Err(Error::InvalidInput(format!(
            "{} is {} bytes; inline attachments are limited to {MAX_INLINE_ATTACHMENT_BYTES}",
            path.display(),
            metadata.len()
        )));
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("{} has no file name", path.display())))?;
    let bytes = tokio::fs::read(path).await?;

    Ok(json!({
        "@odata.type": FILE_ATTACHMENT_TYPE,
        "name": name,
        "contentBytes": STANDARD.encode(bytes),
    }))
}

/// Builds a Graph message resource from an outgoing message.
pub async fn message_payload(message: &OutgoingMessage, body_type: BodyType) -> Result<Value> {
    let mut payload = json!({
        "subject": message.subject,
        "body": { "contentType": body_type.as_graph(), "content": message.body },
        "toRecipients": recipients(&message.to),
    });

    if let Some(importance) = message.importance {
        payload["importance"] = json!(importance.as_str());
    }

    if !message.attachments.is_empty() {
        let mut attachments = Vec::with_capacity(message.attachments.len());
        for path in &message.attachments {
            attachments.push(file_attachment(path).await?);
        }
        payload["attachments"] = Value::Array(attachments);
    }

    Ok(payload)
}

/// Builds a Graph event resource.
pub fn event_payload(event: &NewEvent, body_type: BodyType) -> Value {
    let attendees: Vec<Value> = event
        .attendees
        .iter()
        .map(|address| json!({ "emailAddress": { "address": address }, "type": "required" }))
        .collect();

    let mut payload = json!({
        "subject": event.subject,
        "start": { "dateTime": graph_local_datetime(&event.start), "timeZone": "UTC" },
        "end": { "dateTime": graph_local_datetime(&event.end), "timeZone": "UTC" },
        "location": { "displayName": event.location },
        "attendees": attendees,
    });

    if let Some(body) = &event.body {
        payload["body"] = json!({ "contentType": body_type.as_graph(), "content": body });
    }

    payload
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Importance, parse_timestamp};
    use std::io::Write;

    #[test]
    fn test_message_conversion_prefers_from() {
        let raw = json!({
            "id": "AAMk1",
            "subject": "Hi",
            "body": {"contentType": "html", "content": "<p>Test</p>"},
            "from": {"emailAddress": {"name": "A", "address": "a@example.com"}},
            "sender": {"emailAddress": {"address": "delegate@example.com"}},
            "receivedDateTime": "2024-01-15T09:30:00Z",
            "attachments": [{"name": "a.txt"}, {"name": "b.pdf"}]
        });

        let message: GraphMessage = serde_json::from_value(raw).unwrap();
        let message = message.into_message().unwrap();
        assert_eq!(message.sender, "a@example.com");
        assert_eq!(message.body, "<p>Test</p>");
        assert_eq!(message.attachments, vec!["a.txt", "b.pdf"]);
        assert_eq!(message.received, parse_timestamp("2024-01-15 09:30:00").unwrap());
    }

    #[test]
    fn test_message_without_received_time_is_skipped() {
        let message: GraphMessage = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert!(message.into_message().is_none());
    }

    #[test]
    fn test_event_conversion() {
        let raw = json!({
            "id": "AAMkE",
            "subject": "Review",
            "start": {"dateTime": "2024-01-15T09:00:00.0000000", "timeZone": "UTC"},
            "end": {"dateTime": "2024-01-15T10:00:00.0000000", "timeZone": "UTC"},
            "location": {"displayName": "Room 2"},
            "organizer": {"emailAddress": {"address": "lead@example.com"}},
            "attendees": [],
            "body": {"content": ""}
        });

        let event: GraphEvent = serde_json::from_value(raw).unwrap();
        let event = event.into_event().unwrap();
        assert_eq!(event.location, "Room 2");
        assert_eq!(event.organizer, "lead@example.com");
        assert_eq!(event.attendees, None);
        assert_eq!(event.body, None);
    }

    #[test]
    fn test_attachment_decoding() {
        let raw = json!({
            "@odata.type": "#microsoft.graph.fileAttachment",
            "name": "hello.txt",
            "contentBytes": "aGVsbG8="
        });
        let attachment: GraphAttachment = serde_json::from_value(raw).unwrap();
        let file = attachment.into_file().unwrap().unwrap();
        assert_eq!(file.name, "hello.txt");
        assert_eq!(file.content, b"hello");
    }

    #[test]
    fn test_item_attachment_is_skipped() {
        let raw = json!({"@odata.type": "#microsoft.graph.itemAttachment", "name": "Fwd"});
        let attachment: GraphAttachment = serde_json::from_value(raw).unwrap();
        assert!(attachment.into_file().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_message_payload_with_attachment() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        let message = OutgoingMessage::new("Hi", "Test")
            .to("a@example.com")
            .attach(file.path())
            .importance(Importance::High);

        let payload = message_payload(&message, BodyType::Text).await.unwrap();
        assert_eq!(payload["body"]["contentType"], "Text");
        assert_eq!(payload["importance"], "high");
        assert_eq!(
            payload["toRecipients"][0]["emailAddress"]["address"],
            "a@example.com"
        );
        assert_eq!(payload["attachments"][0]["contentBytes"], "aGVsbG8=");
        assert_eq!(payload["attachments"][0]["@odata.type"], FILE_ATTACHMENT_TYPE);
    }

    #[tokio::test]
    async fn test_message_payload_missing_file_fails() {
        let message = OutgoingMessage::new("Hi", "Test")
            .to("a@example.com")
            .attach("/definitely/not/here.bin");
        assert!(matches!(
            message_payload(&message, BodyType::Html).await,
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_event_payload() {
        let event = NewEvent::new(
            "Standup",
            parse_timestamp("2024-01-15 09:00:00").unwrap(),
            parse_timestamp("2024-01-15 09:15:00").unwrap(),
            "Room 1",
        )
        .attendee("a@example.com");

        let payload = event_payload(&event, BodyType::Html);
        assert_eq!(payload["start"]["dateTime"], "2024-01-15T09:00:00");
        assert_eq!(payload["start"]["timeZone"], "UTC");
        assert_eq!(payload["location"]["displayName"], "Room 1");
        assert_eq!(payload["attendees"][0]["type"], "required");
        assert!(payload.get("body").is_none());
    }
}
