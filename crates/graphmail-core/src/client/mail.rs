//! Message operations.

use std::path::PathBuf;

use serde_json::json;
use tracing::{debug, info, warn};

use super::wire::{
    Collection, GraphAttachment, GraphMessage, MESSAGE_FIELDS, Resource, file_attachment,
    message_payload,
};
use super::{GraphMailClient, segment};
use crate::attachments::AttachmentStore;
use crate::error::{Error, Result};
use crate::model::time::odata_datetime;
use crate::model::{DateRange, EmailMessage, OutgoingMessage};
use crate::query::{GraphRequest, Query, page_plan};

/// Expansion returning only attachment names alongside each message.
const ATTACHMENT_NAMES: &str = "attachments($select=name)";

/// Largest `$top` Graph honours for message listings.
pub const MAX_PAGE_SIZE: usize = 1000;

impl GraphMailClient {
    /// Lists up to `max_count` messages of a folder, newest first.
    ///
    /// Pages of `page_size` (at most [`MAX_PAGE_SIZE`]) are fetched in
    /// sequence; a short page ends the listing early.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is unauthenticated, the folder does
    /// not exist, or a page request fails. No partial results are returned.
    pub async fn list_messages(
        &self,
        folder: &str,
        max_count: usize,
        page_size: usize,
    ) -> Result<Vec<EmailMessage>> {
        self.inner()?;
        let folder_id = self.resolve_folder(folder).await?;
        let path = self.user_path(&format!("/mailFolders/{}/messages", segment(&folder_id)));

        let mut messages = Vec::new();
        for (skip, top) in page_plan(max_count, page_size.min(MAX_PAGE_SIZE)) {
            let query = Query::new()
                .order_by("receivedDateTime", true)
                .select(MESSAGE_FIELDS)
                .expand(ATTACHMENT_NAMES)
                .skip(skip)
                .top(top);
            let page: Collection<GraphMessage> = self
                .get_json(&GraphRequest::get(&path).with_query(&query), folder)
                .await?;

            let fetched = page.value.len();
            messages.extend(page.value.into_iter().filter_map(GraphMessage::into_message));
            if fetched < top {
                debug!(folder, skip, fetched, "Short page, stopping");
                break;
            }
        }

        debug!(folder, count = messages.len(), "Listed messages");
        Ok(messages)
    }

    /// Searches a folder by free text and/or an inclusive receive-time range.
    ///
    /// Results keep the server's order and are capped at `max_count`.
    ///
    /// With both text and a range, only the text goes to Graph and the range
    /// is applied to the first `max_count` hits afterwards. In-range messages
    /// ranked below those hits are not returned, so the result can be empty
    /// even when the folder holds matches inside the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is unauthenticated, the folder does
    /// not exist, or the request fails.
    pub async fn search_messages(
        &self,
        text: &str,
        folder: &str,
        max_count: usize,
        date_range: Option<&DateRange>,
    ) -> Result<Vec<EmailMessage>> {
        self.inner()?;
        if max_count == 0 {
            return Ok(Vec::new());
        }
        let folder_id = self.resolve_folder(folder).await?;
        let path = self.user_path(&format!("/mailFolders/{}/messages", segment(&folder_id)));

        let mut query = Query::new()
            .select(MESSAGE_FIELDS)
            .expand(ATTACHMENT_NAMES)
            .top(max_count);
        let text = text.trim();
        if !text.is_empty() {
            query = query.search(text);
        } else if let Some(range) = date_range {
            // Graph rejects $filter together with $search on messages, so the
            // range only goes to the server when there is no text.
            query = query.filter(format!(
                "receivedDateTime ge {} and receivedDateTime le {}",
                odata_datetime(&range.start()),
                odata_datetime(&range.end())
            ));
        }

        let page: Collection<GraphMessage> = self
            .get_json(&GraphRequest::get(&path).with_query(&query), folder)
            .await?;

        let messages: Vec<EmailMessage> = page
            .value
            .into_iter()
            .filter_map(GraphMessage::into_message)
            .filter(|m| date_range.is_none_or(|r| r.contains(&m.received)))
            .take(max_count)
            .collect();

        debug!(folder, text, count = messages.len(), "Searched messages");
        Ok(messages)
    }

    /// Sends a new message and keeps a copy in Sent Items.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is invalid, an attachment cannot be
    /// read, or Graph rejects the request.
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<()> {
        self.inner()?;
        message.validate()?;

        let payload = message_payload(message, self.config.body_type).await?;
        let request = GraphRequest::post(self.user_path("/sendMail")).with_json(json!({
            "message": payload,
            "saveToSentItems": true,
        }));
        self.execute(&request, "sendMail").await?;

        info!(
            recipients = message.to.len(),
            attachments = message.attachments.len(),
            "Sent message"
        );
        Ok(())
    }

    /// Saves a message to Drafts without sending it. Returns the draft id.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is invalid, an attachment cannot be
    /// read, or Graph rejects the request.
    pub async fn create_draft(&self, message: &OutgoingMessage) -> Result<String> {
        self.inner()?;
        message.validate()?;

        let payload = message_payload(message, self.config.body_type).await?;
        let request = GraphRequest::post(self.user_path("/messages")).with_json(payload);
        let draft: Resource = self.get_json(&request, "messages").await?;

        info!(id = %draft.id, "Created draft");
        Ok(draft.id)
    }

    /// Moves a message to the named folder. Returns the moved message's id,
    /// which Graph may change on move.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown message or folder.
    pub async fn move_message(&self, message_id: &str, destination_folder: &str) -> Result<String> {
        let path = self.resolve_message(message_id).await?;
        let destination = self.resolve_folder(destination_folder).await?;

        let request = GraphRequest::post(format!("{path}/move"))
            .with_json(json!({ "destinationId": destination }));
        let moved: Resource = self.get_json(&request, message_id).await?;

        info!(id = message_id, folder = destination_folder, "Moved message");
        Ok(moved.id)
    }

    /// Deletes a message.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown message.
    pub async fn delete_message(&self, message_id: &str) -> Result<()> {
        let path = self.resolve_message(message_id).await?;
        self.execute(&GraphRequest::delete(path), message_id).await?;
        info!(id = message_id, "Deleted message");
        Ok(())
    }

    /// Replies to the sender of a message, optionally with attachments.
    ///
    /// The reply is created as a draft, completed, then sent. If completing
    /// it fails the draft is removed again.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown message, or the first failure
    /// while building or sending the reply.
    pub async fn reply_to_message(
        &self,
        message_id: &str,
        body: &str,
        attachments: &[PathBuf],
    ) -> Result<()> {
        let path = self.resolve_message(message_id).await?;

        let request =
            GraphRequest::post(format!("{path}/createReply")).with_json(json!({ "comment": body }));
        let draft: Resource = self.get_json(&request, message_id).await?;
        let draft_path = self.user_path(&format!("/messages/{}", segment(&draft.id)));

        if let Err(e) = self.complete_reply(&draft_path, attachments).await {
            warn!(id = message_id, "Reply failed, discarding draft: {e}");
            if let Err(cleanup) = self
                .execute(&GraphRequest::delete(&draft_path), &draft.id)
                .await
            {
                warn!(draft = %draft.id, "Failed to discard reply draft: {cleanup}");
            }
            return Err(e);
        }

        info!(id = message_id, attachments = attachments.len(), "Sent reply");
        Ok(())
    }

    async fn complete_reply(&self, draft_path: &str, attachments: &[PathBuf]) -> Result<()> {
        for file in attachments {
            let request = GraphRequest::post(format!("{draft_path}/attachments"))
                .with_json(file_attachment(file).await?);
            self.execute(&request, draft_path).await?;
        }
        self.execute(&GraphRequest::post(format!("{draft_path}/send")), draft_path)
            .await?;
        Ok(())
    }

    /// Downloads every file attachment of a message into the configured
    /// attachments directory.
    ///
    /// Files are named after the attachment; a later attachment with the same
    /// name overwrites an earlier one. One path is returned per attachment
    /// written, so duplicates appear more than once.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown message, or the first
    /// download, decoding or filesystem failure.
    pub async fn save_attachments(&self, message_id: &str) -> Result<Vec<PathBuf>> {
        let path = self.resolve_message(message_id).await?;
        let listing: Collection<GraphAttachment> = self
            .get_json(&GraphRequest::get(format!("{path}/attachments")), message_id)
            .await?;

        let store = AttachmentStore::new(&self.config.attachments_dir);
        let mut saved = Vec::with_capacity(listing.value.len());
        for attachment in listing.value {
            if let Some(file) = attachment.into_file()? {
                saved.push(store.save(&file).await?);
            }
        }

        info!(id = message_id, count = saved.len(), "Saved attachments");
        Ok(saved)
    }

    /// Confirms a message exists and returns its resource path.
    async fn resolve_message(&self, message_id: &str) -> Result<String> {
        self.inner()?;
        let id = message_id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("message id is empty".into()));
        }

        let path = self.user_path(&format!("/messages/{}", segment(id)));
        let request = GraphRequest::get(&path).with_query(&Query::new().select(&["id"]));
        let _: Resource = self.get_json(&request, id).await?;
        Ok(path)
    }
}
