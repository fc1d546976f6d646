use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::background::error::{Result, StoreError};
use crate::background::storage::{FileStorage, RecordStorage};
use crate::background::types::{ImageId, ImageRecord, StoreEvent};
use crate::codec;

/// Capacity of the change-notification channel. Consumers that lag past
/// this re-pull a full `list()` snapshot anyway.
const EVENT_CAPACITY: usize = 32;

/// Ordered, persisted collection of background images.
///
/// The store is the sole mutator of persisted image state. Mutations hold a
/// single writer lock across the validate-persist-publish sequence, so
/// readers never observe a partially applied add or remove, and the
/// in-memory view never diverges from the last successfully persisted state.
pub struct BackgroundStore {
    storage: Box<dyn RecordStorage>,
    inner: Mutex<Inner>,
    events: broadcast::Sender<StoreEvent>,
}

/// Records ordered ascending by `(created_at, seq)`.
struct Inner {
    records: Vec<ImageRecord>,
    next_seq: u64,
}

impl BackgroundStore {
    /// Open a store over the given substrate, rebuilding order from the
    /// persisted records and resuming the insertion sequence.
    pub fn open(storage: impl RecordStorage + 'static) -> Result<Self> {
        let mut records = storage.scan().map_err(StoreError::Persistence)?;
        records.sort_by_key(ImageRecord::sort_key);
        let next_seq = records.iter().map(|r| r.seq + 1).max().unwrap_or(0);

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            storage: Box::new(storage),
            inner: Mutex::new(Inner { records, next_seq }),
            events,
        })
    }

    /// Open a store over [`FileStorage`] rooted at `dir`.
    pub fn with_dir(dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::open(FileStorage::new(dir))
    }

    /// Subscribe to change notifications.
    ///
    /// One event is published per successful mutation, after the durable
    /// commit; consumers re-pull [`list`](Self::list) on receipt rather than
    /// holding a live view.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Ordered snapshot of all records, ascending by creation time with
    /// ties in insertion order. Later mutations do not affect a snapshot
    /// already returned.
    pub fn list(&self) -> Vec<ImageRecord> {
        self.inner.lock().records.clone()
    }

    /// Number of stored images.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Whether the store holds no images.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Insert a new background image.
    ///
    /// The payload must be non-empty and decodable, otherwise
    /// `InvalidImage`. On success the record is durably persisted before
    /// this returns; a substrate failure surfaces `Persistence` and leaves
    /// the store unchanged.
    pub fn add(&self, payload: Vec<u8>) -> Result<ImageRecord> {
        if payload.is_empty() {
            return Err(StoreError::InvalidImage("empty payload".to_string()));
        }
        codec::decode(&payload).map_err(|e| StoreError::InvalidImage(e.to_string()))?;

        let mut inner = self.inner.lock();
        let record = ImageRecord {
            id: ImageId::generate(),
            created_at: Utc::now(),
            seq: inner.next_seq,
            payload,
        };

        // Persist first; memory and subscribers only see committed records.
        self.storage.put(&record).map_err(StoreError::Persistence)?;

        inner.next_seq += 1;
        let pos = inner
            .records
            .partition_point(|r| r.sort_key() <= record.sort_key());
        inner.records.insert(pos, record.clone());

        // Published under the writer lock so notification order matches
        // persistence order. Send only fails with no subscribers.
        let _ = self.events.send(StoreEvent::Added { id: record.id });

        Ok(record)
    }

    /// Delete the record with the given id.
    ///
    /// Unknown ids fail with `NotFound` and change nothing, so deleting an
    /// already-deleted item is safe for the caller to ignore. A substrate
    /// failure surfaces `Persistence` with the record still present.
    pub fn remove(&self, id: ImageId) -> Result<()> {
        let mut inner = self.inner.lock();
        let pos = inner
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        self.storage.delete(&id).map_err(StoreError::Persistence)?;
        inner.records.remove(pos);

        let _ = self.events.send(StoreEvent::Removed { id });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    /// In-memory substrate with switchable failure modes.
    #[derive(Default)]
    struct MemoryStorage {
        records: StdMutex<HashMap<ImageId, ImageRecord>>,
        fail_put: bool,
        fail_delete: bool,
    }

    impl MemoryStorage {
        fn failing_put() -> Self {
            Self {
                fail_put: true,
                ..Default::default()
            }
        }

        fn failing_delete() -> Self {
            Self {
                fail_delete: true,
                ..Default::default()
            }
        }
    }

    impl RecordStorage for MemoryStorage {
        fn put(&self, record: &ImageRecord) -> std::result::Result<(), String> {
            if self.fail_put {
                return Err("disk full".to_string());
            }
            self.records
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            Ok(())
        }

        fn delete(&self, id: &ImageId) -> std::result::Result<(), String> {
            if self.fail_delete {
                return Err("permission denied".to_string());
            }
            self.records.lock().unwrap().remove(id);
            Ok(())
        }

        fn scan(&self) -> std::result::Result<Vec<ImageRecord>, String> {
            Ok(self.records.lock().unwrap().values().cloned().collect())
        }
    }

    /// Helper: create a store backed by a temp directory.
    fn temp_store() -> (BackgroundStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = BackgroundStore::with_dir(dir.path().join("backgrounds")).unwrap();
        (store, dir)
    }

    fn valid_payload() -> Vec<u8> {
        codec::tiny_jpeg()
    }

    /// A second distinct valid payload (synthetic gradient, JPEG-encoded).
    fn other_valid_payload() -> Vec<u8> {
        let mut pixels = Vec::with_capacity(8 * 8 * 3);
        for y in 0..8u32 {
            for x in 0..8u32 {
                pixels.push((x * 30) as u8);
                pixels.push((y * 30) as u8);
                pixels.push(200);
            }
        }
        codec::encode_jpeg(
            &codec::Bitmap {
                width: 8,
                height: 8,
                pixels,
            },
            90,
        )
        .unwrap()
    }

    // --- add/list tests ---

    #[test]
    fn add_then_list_contains_exactly_the_new_record() {
        let (store, _dir) = temp_store();
        let payload = valid_payload();
        let record = store.add(payload.clone()).unwrap();

        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.id);
        // Round-trip: the stored payload decodes to the same bitmap.
        assert_eq!(
            codec::decode(&listed[0].payload).unwrap(),
            codec::decode(&payload).unwrap()
        );
    }

    #[test]
    fn add_rejects_empty_payload() {
        let (store, _dir) = temp_store();
        let result = store.add(vec![]);
        assert!(matches!(result, Err(StoreError::InvalidImage(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn add_rejects_undecodable_payload() {
        let (store, _dir) = temp_store();
        let result = store.add(b"not an image at all".to_vec());
        assert!(matches!(result, Err(StoreError::InvalidImage(_))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn list_is_ordered_by_insertion() {
        let (store, _dir) = temp_store();
        let a = store.add(valid_payload()).unwrap();
        let b = store.add(other_valid_payload()).unwrap();
        let c = store.add(valid_payload()).unwrap();

        let ids: Vec<ImageId> = store.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);

        let listed = store.list();
        assert!(listed.windows(2).all(|w| w[0].sort_key() <= w[1].sort_key()));
    }

    #[test]
    fn identical_timestamps_preserve_insertion_order() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("backgrounds"));

        // Two records stamped at the same instant, written out of order.
        let stamp = Utc::now();
        let first = ImageRecord {
            id: ImageId::generate(),
            created_at: stamp,
            seq: 0,
            payload: valid_payload(),
        };
        let second = ImageRecord {
            id: ImageId::generate(),
            created_at: stamp,
            seq: 1,
            payload: valid_payload(),
        };
        storage.put(&second).unwrap();
        storage.put(&first).unwrap();

        let store = BackgroundStore::open(storage).unwrap();
        let ids: Vec<ImageId> = store.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn list_returns_a_snapshot_not_a_live_view() {
        let (store, _dir) = temp_store();
        store.add(valid_payload()).unwrap();

        let snapshot = store.list();
        store.add(other_valid_payload()).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.list().len(), 2);
    }

    // --- remove tests ---

    #[test]
    fn remove_deletes_exactly_that_record() {
        let (store, _dir) = temp_store();
        let a = store.add(valid_payload()).unwrap();
        let b = store.add(other_valid_payload()).unwrap();
        let c = store.add(valid_payload()).unwrap();

        store.remove(b.id).unwrap();

        let ids: Vec<ImageId> = store.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn remove_of_unknown_id_returns_not_found_and_changes_nothing() {
        let (store, _dir) = temp_store();
        store.add(valid_payload()).unwrap();

        let result = store.remove(ImageId::generate());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_twice_fails_the_second_time() {
        let (store, _dir) = temp_store();
        let record = store.add(valid_payload()).unwrap();

        store.remove(record.id).unwrap();
        let result = store.remove(record.id);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    // --- persistence failure tests ---

    #[test]
    fn failed_add_leaves_the_store_unchanged() {
        let store = BackgroundStore::open(MemoryStorage::failing_put()).unwrap();

        let result = store.add(valid_payload());
        assert!(matches!(result, Err(StoreError::Persistence(_))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn failed_delete_keeps_the_record() {
        let store = BackgroundStore::open(MemoryStorage::failing_delete()).unwrap();
        let record = store.add(valid_payload()).unwrap();

        let result = store.remove(record.id);
        assert!(matches!(result, Err(StoreError::Persistence(_))));
        assert_eq!(store.len(), 1);
    }

    // --- notification tests ---

    #[test]
    fn successful_mutations_notify_in_order() {
        let (store, _dir) = temp_store();
        let mut events = store.subscribe();

        let record = store.add(valid_payload()).unwrap();
        store.remove(record.id).unwrap();

        assert_eq!(events.try_recv().unwrap(), StoreEvent::Added { id: record.id });
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::Removed { id: record.id }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn failed_mutations_do_not_notify() {
        let store = BackgroundStore::open(MemoryStorage::failing_put()).unwrap();
        let mut events = store.subscribe();

        let _ = store.add(valid_payload());
        let _ = store.remove(ImageId::generate());

        assert!(events.try_recv().is_err());
    }

    // --- durability tests ---

    #[test]
    fn reopening_preserves_records_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backgrounds");

        let store = BackgroundStore::with_dir(&path).unwrap();
        let a = store.add(valid_payload()).unwrap();
        let b = store.add(other_valid_payload()).unwrap();
        drop(store);

        let reopened = BackgroundStore::with_dir(&path).unwrap();
        let ids: Vec<ImageId> = reopened.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        // The insertion sequence resumes past the persisted records.
        let c = reopened.add(valid_payload()).unwrap();
        assert!(c.seq > b.seq);
    }

    #[test]
    fn removed_records_stay_gone_after_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backgrounds");

        let store = BackgroundStore::with_dir(&path).unwrap();
        let a = store.add(valid_payload()).unwrap();
        let b = store.add(other_valid_payload()).unwrap();
        store.remove(a.id).unwrap();
        drop(store);

        let reopened = BackgroundStore::with_dir(&path).unwrap();
        let ids: Vec<ImageId> = reopened.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id]);
    }

    // --- concurrency tests ---

    #[test]
    fn concurrent_adds_all_land() {
        use std::sync::Arc;

        let dir = TempDir::new().unwrap();
        let store = Arc::new(BackgroundStore::with_dir(dir.path().join("backgrounds")).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        store.add(codec::tiny_jpeg()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let listed = store.list();
        assert_eq!(listed.len(), 20);

        // All ids unique, order fully sorted.
        let mut ids: Vec<ImageId> = listed.iter().map(|r| r.id).collect();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert!(listed.windows(2).all(|w| w[0].sort_key() <= w[1].sort_key()));
    }

    // --- end-to-end scenario ---

    #[test]
    fn add_add_list_remove_list_scenario() {
        let (store, _dir) = temp_store();
        assert!(store.is_empty());

        let img_a = store.add(valid_payload()).unwrap();
        let img_b = store.add(other_valid_payload()).unwrap();

        let ids: Vec<ImageId> = store.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![img_a.id, img_b.id]);

        store.remove(img_a.id).unwrap();
        let ids: Vec<ImageId> = store.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![img_b.id]);
    }
}
