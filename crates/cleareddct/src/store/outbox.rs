//! Outbox of generated messages.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

use super::{read_json, write_json, write_text};

/// The three header lines at the top of an exported outbox.
///
/// Any of them may be empty; the line is still emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportHeader {
    /// Name of the person sending the export.
    pub sender_name: String,
    /// Message originator address.
    pub originator: String,
    /// Lesson number.
    pub lesson: String,
}

impl ExportHeader {
    /// The header lines, in file order.
    #[must_use]
    pub fn lines(&self) -> [&str; 3] {
        [
            self.sender_name.as_str(),
            self.originator.as_str(),
            self.lesson.as_str(),
        ]
    }
}

/// Ordered log of generated messages.
///
/// Backed by a JSON array of strings. Messages are opaque once generated.
#[derive(Debug)]
pub struct OutboxStore {
    /// Path to the backing file.
    path: PathBuf,
    /// In-memory copy of the backing file.
    messages: Vec<String>,
}

impl OutboxStore {
    /// Open the outbox at `path`, loading its current contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            messages: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Re-read the backing file, replacing the in-memory copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&mut self) -> Result<&[String]> {
        self.messages = read_json(&self.path)?.unwrap_or_default();
        debug!(
            "Loaded {} outbox message(s) from {}",
            self.messages.len(),
            self.path.display()
        );
        Ok(&self.messages)
    }

    /// Replace the whole sequence and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn save(&mut self, messages: Vec<String>) -> Result<()> {
        self.messages = messages;
        self.persist()
    }

    /// Messages in the order they were generated.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check whether the outbox is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Add a message to the end of the outbox and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn append(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        debug!("Appending to outbox: {message}");
        self.messages.push(message);
        self.persist()
    }

    /// Remove every message and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn clear(&mut self) -> Result<()> {
        let count = self.messages.len();
        self.messages.clear();
        self.persist()?;
        info!("Cleared {count} message(s) from outbox");
        Ok(())
    }

    /// Render the outbox as text: header lines, a blank line, then one
    /// message per line.
    ///
    /// The result has no trailing newline.
    #[must_use]
    pub fn export<S: AsRef<str>>(&self, header_lines: &[S]) -> String {
        let header = header_lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        format!("{header}\n\n{}", self.messages.join("\n"))
    }

    /// Write [`OutboxStore::export`] to `path`.
    ///
    /// Every message line is newline-terminated; an empty outbox leaves the
    /// file ending in the blank line after the header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_to_file(&self, header: &ExportHeader, path: &Path) -> Result<String> {
        let mut content = self.export(&header.lines());
        if !self.messages.is_empty() {
            content.push('\n');
        }
        write_text(path, &content)?;
        info!(
            "Exported {} message(s) to {}",
            self.messages.len(),
            path.display()
        );
        Ok(content)
    }

    fn persist(&self) -> Result<()> {
        write_json(&self.path, &self.messages)
    }
}
