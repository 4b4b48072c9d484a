//! Mail message models.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A message as fetched from the mailbox.
///
/// Immutable snapshot of the remote message at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Graph message identifier.
    pub id: String,
    /// Sender address.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Body content (HTML or text, as stored by the server).
    pub body: String,
    /// Attachment file names, in server order.
    pub attachments: Vec<String>,
    /// Time the message was received (UTC).
    #[serde(rename = "received_time", with = "super::time::timestamp")]
    pub received: NaiveDateTime,
}

/// Message importance flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Low importance.
    Low,
    /// Normal importance.
    #[default]
    Normal,
    /// High importance.
    High,
}

impl Importance {
    /// Graph wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl FromStr for Importance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(Error::InvalidInput(format!(
                "importance must be low, normal or high, got '{other}'"
            ))),
        }
    }
}

/// Content type used for bodies the client writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// HTML body.
    #[default]
    Html,
    /// Plain text body.
    Text,
}

impl BodyType {
    /// Graph `contentType` value.
    #[must_use]
    pub const fn as_graph(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Text => "Text",
        }
    }
}

/// A message to send or save as a draft.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Body content.
    pub body: String,
    /// Local files to attach.
    pub attachments: Vec<PathBuf>,
    /// Optional importance flag.
    pub importance: Option<Importance>,
}

impl OutgoingMessage {
    /// Creates a new outgoing message.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds a file attachment.
    #[must_use]
    pub fn attach(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    /// Sets the importance flag.
    #[must_use]
    pub const fn importance(mut self, importance: Importance) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Checks that the message can be submitted.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if there is no usable recipient.
    pub fn validate(&self) -> crate::Result<()> {
        if self.to.is_empty() {
            return Err(Error::InvalidInput("no recipients specified".into()));
        }
        if let Some(bad) = self.to.iter().find(|addr| !addr.contains('@')) {
            return Err(Error::InvalidInput(format!(
                "invalid recipient address: {bad}"
            )));
        }
        Ok(())
    }
}

/// An attachment fetched from a message; transient, dropped after writing.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    /// Reported file name.
    pub name: String,
    /// Decoded content.
    pub content: Vec<u8>,
}

impl std::fmt::Debug for AttachmentFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentFile")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .finish()
    }
}
