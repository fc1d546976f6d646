use std::path::{Path, PathBuf};

use crate::background::types::{ImageId, ImageRecord};

/// Storage substrate for background image records.
///
/// A key-value surface keyed by [`ImageId`]: atomic put/delete plus a full
/// scan. The store layers ordering, validation, and notification policy on
/// top of this.
pub trait RecordStorage: Send + Sync {
    /// Durably write a record, replacing any previous value under its id.
    fn put(&self, record: &ImageRecord) -> Result<(), String>;

    /// Durably delete the record under `id`. Deleting an absent id is a
    /// no-op at this layer; existence is the store's concern.
    fn delete(&self, id: &ImageId) -> Result<(), String>;

    /// Read every stored record, in no particular order.
    fn scan(&self) -> Result<Vec<ImageRecord>, String>;
}

/// Filesystem-backed storage: one JSON document per record.
///
/// Writes go to a `.tmp` sibling first and are renamed into place, so a
/// record file is always either the old or the new version.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, id: &ImageId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read_record(path: &Path) -> Result<ImageRecord, String> {
        let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    }
}

impl RecordStorage for FileStorage {
    fn put(&self, record: &ImageRecord) -> Result<(), String> {
        let json = serde_json::to_string_pretty(record).map_err(|e| e.to_string())?;

        std::fs::create_dir_all(&self.dir).map_err(|e| e.to_string())?;

        let path = self.record_path(&record.id);
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| e.to_string())?;
        std::fs::rename(&tmp_path, &path).map_err(|e| e.to_string())?;

        Ok(())
    }

    fn delete(&self, id: &ImageId) -> Result<(), String> {
        match std::fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn scan(&self) -> Result<Vec<ImageRecord>, String> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut records = Vec::new();
        let entries = std::fs::read_dir(&self.dir).map_err(|e| e.to_string())?;
        for entry in entries {
            let entry = entry.map_err(|e| e.to_string())?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // One unreadable entry costs one record, not the library.
                    tracing::warn!("Skipping unreadable record {}: {e}", path.display());
                }
            }
        }
        Ok(records)
    }
}
