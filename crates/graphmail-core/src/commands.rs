//! Named commands over a [`GraphMailClient`].
//!
//! Each command has a stable human-readable name and takes its arguments as
//! a JSON object. Results follow a fixed contract: query commands return a
//! JSON array, empty on any failure; mutation commands return one of two
//! fixed strings. Causes are logged, never returned.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::GraphMailClient;
use crate::error::{Error, Result};
use crate::model::{
    DateRange, Importance, NewEvent, OutgoingMessage, parse_end_bound, parse_timestamp,
};

/// Every operation exposed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// List messages of a folder.
    GetEmails,
    /// Send a message.
    SendEmail,
    /// Move a message to another folder.
    MoveEmail,
    /// Save a message as a draft.
    CreateDraftEmail,
    /// Delete a message.
    DeleteEmail,
    /// Search a folder.
    SearchEmails,
    /// Reply to a message.
    ReplyToEmail,
    /// Download a message's attachments.
    ProcessAttachments,
    /// List calendar events.
    GetCalendarItems,
    /// Create a calendar event.
    AddCalendarItem,
    /// Delete a calendar event.
    RemoveCalendarItem,
}

impl Command {
    /// All commands in registration order.
    pub const ALL: [Self; 11] = [
        Self::GetEmails,
        Self::SendEmail,
        Self::MoveEmail,
        Self::CreateDraftEmail,
        Self::DeleteEmail,
        Self::SearchEmails,
        Self::ReplyToEmail,
        Self::ProcessAttachments,
        Self::GetCalendarItems,
        Self::AddCalendarItem,
        Self::RemoveCalendarItem,
    ];

    /// Stable command name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetEmails => "Microsoft - Get Emails",
            Self::SendEmail => "Microsoft - Send Email",
            Self::MoveEmail => "Microsoft - Move Email to Folder",
            Self::CreateDraftEmail => "Microsoft - Create Draft Email",
            Self::DeleteEmail => "Microsoft - Delete Email",
            Self::SearchEmails => "Microsoft - Search Emails",
            Self::ReplyToEmail => "Microsoft - Reply to Email",
            Self::ProcessAttachments => "Microsoft - Process Attachments",
            Self::GetCalendarItems => "Microsoft - Get Calendar Items",
            Self::AddCalendarItem => "Microsoft - Add Calendar Item",
            Self::RemoveCalendarItem => "Microsoft - Remove Calendar Item",
        }
    }

    /// Looks a command up by its exact name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Returns true for commands that read and return a list.
    #[must_use]
    pub const fn is_query(self) -> bool {
        matches!(
            self,
            Self::GetEmails
                | Self::SearchEmails
                | Self::ProcessAttachments
                | Self::GetCalendarItems
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_folder() -> String {
    "Inbox".to_string()
}

const fn default_count() -> usize {
    10
}

/// One address or a list of addresses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(address) => vec![address],
            Self::Many(addresses) => addresses,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetEmailsArgs {
    #[serde(default = "default_folder")]
    folder_name: String,
    #[serde(default = "default_count")]
    max_emails: usize,
    #[serde(default = "default_count")]
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct ComposeArgs {
    recipient: Recipients,
    subject: String,
    body: String,
    #[serde(default)]
    attachments: Vec<PathBuf>,
    #[serde(default)]
    priority: Option<String>,
}

impl ComposeArgs {
    fn into_message(self) -> Result<OutgoingMessage> {
        let mut message = OutgoingMessage::new(self.subject, self.body);
        message.to = self.recipient.into_vec();
        message.attachments = self.attachments;
        if let Some(priority) = self.priority.filter(|p| !p.trim().is_empty()) {
            message = message.importance(priority.parse::<Importance>()?);
        }
        Ok(message)
    }
}

#[derive(Debug, Deserialize)]
struct MoveArgs {
    message_id: String,
    destination_folder: String,
}

#[derive(Debug, Deserialize)]
struct MessageIdArgs {
    message_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_folder")]
    folder_name: String,
    #[serde(default = "default_count")]
    max_emails: usize,
    #[serde(default)]
    date_range: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct ReplyArgs {
    message_id: String,
    body: String,
    #[serde(default)]
    attachments: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CalendarArgs {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default = "default_count")]
    max_items: usize,
}

#[derive(Debug, Deserialize)]
struct AddEventArgs {
    subject: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    attendees: Option<Vec<String>>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoveEventArgs {
    item_id: String,
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Static name-to-operation table bound to one client.
///
/// Holds every [`Command`] when the client is authenticated and none
/// otherwise.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    client: GraphMailClient,
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// Builds the registry for `client`.
    #[must_use]
    pub fn new(client: &GraphMailClient) -> Self {
        let commands = if client.is_authenticated() {
            Command::ALL.to_vec()
        } else {
            Vec::new()
        };
        debug!(count = commands.len(), "Registered commands");
        Self {
            client: client.clone(),
            commands,
        }
    }

    /// Registered command names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|c| c.name())
    }

    /// Returns true if a command with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Returns true if the registry holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<Command> {
        Command::from_name(name).filter(|c| self.commands.contains(c))
    }

    /// Runs the named command with JSON arguments.
    ///
    /// Operation failures, including invalid arguments, are folded into the
    /// command's failure result.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCommand` if no command with this name is
    /// registered.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        let command = self
            .lookup(name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))?;
        debug!(%command, "Invoking command");

        let client = &self.client;
        let result = match command {
            Command::GetEmails => {
                query(command, async {
                    let a: GetEmailsArgs = parse_args(args)?;
                    let messages = client
                        .list_messages(&a.folder_name, a.max_emails, a.page_size)
                        .await?;
                    Ok(serde_json::to_value(messages)?)
                })
                .await
            }
            Command::SearchEmails => {
                query(command, async {
                    let a: SearchArgs = parse_args(args)?;
                    let range = a
                        .date_range
                        .map(|(start, end)| DateRange::parse(&start, &end))
                        .transpose()?;
                    let messages = client
                        .search_messages(&a.query, &a.folder_name, a.max_emails, range.as_ref())
                        .await?;
                    Ok(serde_json::to_value(messages)?)
                })
                .await
            }
            Command::ProcessAttachments => {
                query(command, async {
                    let a: MessageIdArgs = parse_args(args)?;
                    let paths: Vec<String> = client
                        .save_attachments(&a.message_id)
                        .await?
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect();
                    Ok(serde_json::to_value(paths)?)
                })
                .await
            }
            Command::GetCalendarItems => {
                query(command, async {
                    let a: CalendarArgs = parse_args(args)?;
                    let start = a.start_date.as_deref().map(parse_timestamp).transpose()?;
                    let end = a.end_date.as_deref().map(parse_end_bound).transpose()?;
                    let events = client.list_events(start, end, a.max_items).await?;
                    Ok(serde_json::to_value(events)?)
                })
                .await
            }
            Command::SendEmail => {
                mutation(
                    command,
                    async {
                        let message = parse_args::<ComposeArgs>(args)?.into_message()?;
                        client.send_message(&message).await
                    },
                    |()| "Email sent successfully.".to_string(),
                    "Failed to send email.",
                )
                .await
            }
            Command::CreateDraftEmail => {
                mutation(
                    command,
                    async {
                        let message = parse_args::<ComposeArgs>(args)?.into_message()?;
                        client.create_draft(&message).await
                    },
                    |_| "Draft email created successfully.".to_string(),
                    "Failed to create draft email.",
                )
                .await
            }
            Command::MoveEmail => {
                mutation(
                    command,
                    async {
                        let a: MoveArgs = parse_args(args)?;
                        client
                            .move_message(&a.message_id, &a.destination_folder)
                            .await?;
                        Ok(a.destination_folder)
                    },
                    |folder| format!("Email moved to {folder} folder."),
                    "Failed to move email.",
                )
                .await
            }
            Command::DeleteEmail => {
                mutation(
                    command,
                    async {
                        let a: MessageIdArgs = parse_args(args)?;
                        client.delete_message(&a.message_id).await
                    },
                    |()| "Email deleted successfully.".to_string(),
                    "Failed to delete email.",
                )
                .await
            }
            Command::ReplyToEmail => {
                mutation(
                    command,
                    async {
                        let a: ReplyArgs = parse_args(args)?;
                        client
                            .reply_to_message(&a.message_id, &a.body, &a.attachments)
                            .await
                    },
                    |()| "Reply sent successfully.".to_string(),
                    "Failed to send reply.",
                )
                .await
            }
            Command::AddCalendarItem => {
                mutation(
                    command,
                    async {
                        let a: AddEventArgs = parse_args(args)?;
                        let mut event = NewEvent::new(
                            a.subject,
                            parse_timestamp(&a.start_time)?,
                            parse_timestamp(&a.end_time)?,
                            a.location,
                        );
                        event.attendees = a.attendees.unwrap_or_default();
                        event.body = a.body;
                        client.add_event(&event).await
                    },
                    |_| "Calendar item added successfully.".to_string(),
                    "Failed to add calendar item.",
                )
                .await
            }
            Command::RemoveCalendarItem => {
                mutation(
                    command,
                    async {
                        let a: RemoveEventArgs = parse_args(args)?;
                        client.remove_event(&a.item_id).await
                    },
                    |()| "Calendar item removed successfully.".to_string(),
                    "Failed to remove calendar item.",
                )
                .await
            }
        };

        Ok(result)
    }
}

/// Runs a query command; any failure becomes an empty list.
async fn query(command: Command, op: impl Future<Output = Result<Value>>) -> Value {
    match op.await {
        Ok(value) => value,
        Err(e) => {
            warn!(%command, "Command failed: {e}");
            Value::Array(Vec::new())
        }
    }
}

/// Runs a mutation command and renders its fixed outcome string.
async fn mutation<T>(
    command: Command,
    op: impl Future<Output = Result<T>>,
    success: impl FnOnce(T) -> String,
    failure: &str,
) -> Value {
    match op.await {
        Ok(value) => Value::String(success(value)),
        Err(e) => {
            warn!(%command, "Command failed: {e}");
            Value::String(failure.to_string())
        }
    }
}
