//! Local storage for downloaded attachments.

use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::model::AttachmentFile;

/// File name used when an attachment reports no usable name.
const FALLBACK_NAME: &str = "attachment";

/// Writes attachments into one directory, created on first use.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path an attachment with this reported name is written to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(file_name(name))
    }

    /// Writes `file`, replacing any existing file of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub async fn save(&self, file: &AttachmentFile) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&file.name);
        tokio::fs::write(&path, &file.content).await?;
        debug!(path = %path.display(), bytes = file.content.len(), "Saved attachment");
        Ok(path)
    }
}

/// Last path component of a reported attachment name.
///
/// Both `/` and `\` count as separators so names cannot leave the store
/// directory.
fn file_name(name: &str) -> &str {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match last {
        "" | "." | ".." => FALLBACK_NAME,
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_keeps_plain_names() {
        assert_eq!(file_name("report.pdf"), "report.pdf");
        assert_eq!(file_name("Q1 summary.xlsx"), "Q1 summary.xlsx");
    }

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(file_name("../../etc/passwd"), "passwd");
        assert_eq!(file_name("C:\\Users\\a\\invoice.pdf"), "invoice.pdf");
    }

    #[test]
    fn test_file_name_fallback() {
        assert_eq!(file_name(""), FALLBACK_NAME);
        assert_eq!(file_name("dir/"), FALLBACK_NAME);
        assert_eq!(file_name(".."), FALLBACK_NAME);
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(root.path().join("nested/attachments"));

        let first = AttachmentFile {
            name: "a.txt".into(),
            content: b"first".to_vec(),
        };
        let second = AttachmentFile {
            name: "a.txt".into(),
            content: b"second".to_vec(),
        };

        let p1 = store.save(&first).await.unwrap();
        let p2 = store.save(&second).await.unwrap();
        assert_eq!(p1, p2);
        assert_eq!(std::fs::read(&p1).unwrap(), b"second");
    }
}
