//! Mail folder name resolution.

use tracing::debug;

use super::wire::{Collection, GraphFolder};
use super::GraphMailClient;
use crate::error::{Error, Result};
use crate::query::{GraphRequest, Query, odata_string};

/// Display names of folders Graph addresses by a well-known id.
const WELL_KNOWN_FOLDERS: &[(&str, &str)] = &[
    ("Inbox", "inbox"),
    ("Sent Items", "sentitems"),
    ("Drafts", "drafts"),
    ("Deleted Items", "deleteditems"),
    ("Junk Email", "junkemail"),
    ("Archive", "archive"),
    ("Outbox", "outbox"),
];

/// Maps a folder display name to its Graph well-known id, ignoring case.
#[must_use]
pub fn well_known_folder(display_name: &str) -> Option<&'static str> {
    let name = display_name.trim();
    WELL_KNOWN_FOLDERS
        .iter()
        .find(|(display, _)| display.eq_ignore_ascii_case(name))
        .map(|&(_, id)| id)
}

impl GraphMailClient {
    /// Resolves a folder display name to an id usable in folder paths.
    pub(super) async fn resolve_folder(&self, display_name: &str) -> Result<String> {
        if let Some(id) = well_known_folder(display_name) {
            return Ok(id.to_string());
        }

        let name = display_name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("folder name is empty".into()));
        }

        let request = GraphRequest::get(self.user_path("/mailFolders")).with_query(
            &Query::new()
                .filter(format!("displayName eq {}", odata_string(name)))
                .select(&["id", "displayName"])
                .top(1),
        );
        let folders: Collection<GraphFolder> = self.get_json(&request, name).await?;

        let folder = folders
            .value
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("folder {name}")))?;
        debug!(name, id = %folder.id, display = ?folder.display_name, "Resolved folder");
        Ok(folder.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_folders() {
        assert_eq!(well_known_folder("Inbox"), Some("inbox"));
        assert_eq!(well_known_folder("sent items"), Some("sentitems"));
        assert_eq!(well_known_folder(" Deleted Items "), Some("deleteditems"));
        assert_eq!(well_known_folder("Junk Email"), Some("junkemail"));
    }

    #[test]
    fn test_custom_folder_is_not_well_known() {
        assert_eq!(well_known_folder("Receipts"), None);
        assert_eq!(well_known_folder(""), None);
    }
}
