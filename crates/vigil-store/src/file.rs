//! Durable result store on the local filesystem.
//!
//! Layout under the store directory:
//!
//! - `{qualified_name}.json`: latest result, replaced atomically by writing a
//!   temp file in the same directory and renaming it over the old one
//! - `{qualified_name}.history.jsonl`: one result per line, oldest first,
//!   trimmed to the history limit

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_jsonlines::JsonLinesWriter;
use tempfile::NamedTempFile;
use vigil_core::entities::RunResult;

use crate::error::StoreError;
use crate::{ResultStore, validate_name};

const LATEST_SUFFIX: &str = ".json";
const HISTORY_SUFFIX: &str = ".history.jsonl";

/// Results persisted as JSON files.
#[derive(Debug)]
pub struct FileResultStore {
    dir: PathBuf,
    history_limit: usize,
    // Serializes writers; readers never take it.
    write_lock: Mutex<()>,
}

impl FileResultStore {
    /// Open a store rooted at `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>, history_limit: usize) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self {
            dir,
            history_limit,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn latest_path(&self, qualified_name: &str) -> PathBuf {
        self.dir.join(format!("{qualified_name}{LATEST_SUFFIX}"))
    }

    fn history_path(&self, qualified_name: &str) -> PathBuf {
        self.dir.join(format!("{qualified_name}{HISTORY_SUFFIX}"))
    }

    fn write_latest(&self, result: &RunResult) -> Result<(), StoreError> {
        let path = self.latest_path(&result.qualified_name);
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        serde_json::to_writer_pretty(temp.as_file_mut(), result)
            .map_err(|e| StoreError::Other(e.into()))?;
        temp.as_file_mut()
            .flush()
            .map_err(|e| StoreError::io(temp.path(), e))?;
        temp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;
        Ok(())
    }

    fn append_history(&self, result: &RunResult) -> Result<(), StoreError> {
        let path = self.history_path(&result.qualified_name);
        serde_jsonlines::append_json_lines(&path, [result]).map_err(|e| StoreError::io(&path, e))?;

        let entries = self.read_history(&path)?;
        if entries.len() > self.history_limit {
            let keep = &entries[entries.len() - self.history_limit..];
            let mut temp =
                NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
            {
                let mut writer = JsonLinesWriter::new(temp.as_file_mut());
                writer
                    .write_all(keep)
                    .map_err(|e| StoreError::io(&path, e))?;
                writer.flush().map_err(|e| StoreError::io(&path, e))?;
            }
            temp.persist(&path)
                .map_err(|e| StoreError::io(&path, e.error))?;
        }
        Ok(())
    }

    fn read_history(&self, path: &Path) -> Result<Vec<RunResult>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines(path)
            .map_err(|e| StoreError::io(path, e))?
            .collect::<std::io::Result<Vec<RunResult>>>()
            .map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl ResultStore for FileResultStore {
    fn put(&self, result: &RunResult) -> Result<(), StoreError> {
        validate_name(&result.qualified_name)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_latest(result)?;
        if self.history_limit > 0 {
            self.append_history(result)?;
        }
        tracing::debug!(
            unit = %result.qualified_name,
            run_id = result.run_id,
            dir = %self.dir.display(),
            "result persisted"
        );
        Ok(())
    }

    fn get(&self, qualified_name: &str) -> Result<Option<RunResult>, StoreError> {
        validate_name(qualified_name)?;
        let path = self.latest_path(qualified_name);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path,
                reason: e.to_string(),
            })
    }

    fn history(&self, qualified_name: &str) -> Result<Vec<RunResult>, StoreError> {
        validate_name(qualified_name)?;
        if self.history_limit == 0 {
            return Ok(Vec::new());
        }
        let entries = self.read_history(&self.history_path(qualified_name))?;
        let skip = entries.len().saturating_sub(self.history_limit);
        Ok(entries.into_iter().skip(skip).collect())
    }

    fn delete(&self, qualified_name: &str) -> Result<bool, StoreError> {
        validate_name(qualified_name)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        for path in [self.latest_path(qualified_name), self.history_path(qualified_name)] {
            match std::fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(&path, e)),
            }
        }
        Ok(removed)
    }

    fn names(&self) -> Result<Vec<String>, StoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(LATEST_SUFFIX)
                && validate_name(name).is_ok()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_use_qualified_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileResultStore::open(dir.path(), 3).unwrap();
        assert_eq!(
            store.latest_path("net.CablingReport"),
            dir.path().join("net.CablingReport.json")
        );
        assert_eq!(
            store.history_path("net.CablingReport"),
            dir.path().join("net.CablingReport.history.jsonl")
        );
    }

    #[test]
    fn open_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join(".vigil/results");
        let store = FileResultStore::open(&nested, 3).unwrap();
        assert!(store.dir().is_dir());
    }
}
