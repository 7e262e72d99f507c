//! Whole-file JSON persistence for flight plans and the outbox.
//!
//! Every store follows the same pattern: the backing file is read in full
//! when the store is opened, mutated in memory, and rewritten in full after
//! each change. There is no locking and no atomic replace. Two processes
//! writing the same file race, and the last writer wins.
//!
//! A missing file is an empty store. A file that exists but cannot be read
//! or parsed is an error, so a damaged store is never silently replaced by
//! an empty one.

pub mod outbox;
pub mod plans;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};

pub use outbox::{ExportHeader, OutboxStore};
pub use plans::FlightPlanStore;

/// Read a JSON document, returning `None` if the file does not exist.
///
/// # Errors
///
/// Returns [`Error::StoreRead`] if the file exists but cannot be read and
/// [`Error::StoreCorrupt`] if it does not parse as `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("No store at {}, starting empty", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(Error::StoreRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let value = serde_json::from_str(&content).map_err(|source| Error::StoreCorrupt {
        path: path.to_path_buf(),
        source,
    })?;
    trace!("Read {} bytes from {}", content.len(), path.display());
    Ok(Some(value))
}

/// Overwrite `path` with the pretty-printed JSON form of `value`.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the value
/// cannot be serialized, or the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(path, &json)
}

/// Overwrite `path` with `content`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(path, content).map_err(|source| Error::StoreWrite {
        path: path.to_path_buf(),
        source,
    })?;
    trace!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// A unique scratch path under the system temp directory.
#[cfg(test)]
pub(crate) fn test_path(name: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir()
        .join(format!("cleareddct_test_{}_{n}", std::process::id()))
        .join(name)
}

/// Remove the scratch directory created by [`test_path`].
#[cfg(test)]
pub(crate) fn cleanup(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::remove_dir_all(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file_is_none() {
        let path = test_path("missing.json");
        let value: Option<Vec<String>> = read_json(&path).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let path = test_path("roundtrip.json");
        write_json(&path, &vec!["m1".to_string()]).unwrap();

        let value: Option<Vec<String>> = read_json(&path).unwrap();
        assert_eq!(value, Some(vec!["m1".to_string()]));
        cleanup(&path);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let path = test_path("nested/deeper/store.json");
        write_json(&path, &Vec::<String>::new()).unwrap();
        assert!(path.exists());

        if let Some(nested) = path.parent().and_then(Path::parent) {
            cleanup(nested);
        }
    }

    #[test]
    fn test_read_corrupt_file() {
        let path = test_path("corrupt.json");
        write_text(&path, "{ not json").unwrap();

        let err = read_json::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, Error::StoreCorrupt { .. }));
        cleanup(&path);
    }

    #[test]
    fn test_read_wrong_shape() {
        let path = test_path("shape.json");
        write_text(&path, r#"{"a": 1}"#).unwrap();

        let err = read_json::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, Error::StoreCorrupt { .. }));
        cleanup(&path);
    }

    #[test]
    fn test_read_directory_is_read_error() {
        let path = test_path("dir.json");
        std::fs::create_dir_all(&path).unwrap();

        let err = read_json::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, Error::StoreRead { .. }));
        cleanup(&path);
    }

    #[test]
    fn test_write_into_directory_fails() {
        let path = test_path("occupied");
        std::fs::create_dir_all(&path).unwrap();

        let err = write_text(&path, "x").unwrap_err();
        assert!(matches!(err, Error::StoreWrite { .. }));
        cleanup(&path);
    }
}
