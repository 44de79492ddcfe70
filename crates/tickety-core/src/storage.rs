//! Durable local key-value slots and the ticket repository built on them.
//!
//! The repository stores the whole collection under a single key as a JSON
//! array of ticket records. Reads are absent-or-whole: a value that is missing,
//! unreadable, or not a well-formed ticket collection loads as `None`, never
//! as a partially repaired list. Writes replace the previous value entirely.
//!
//! # Failure policy
//!
//! [`TicketRepository::load`] and [`TicketRepository::save`] never return
//! errors. Failures are logged with `tracing` and absorbed so the in-memory
//! store stays authoritative for the session. The `try_*` variants expose the
//! underlying [`StorageError`] for callers that want to inspect it.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::StorageError;
use crate::model::Ticket;

/// Key the ticket collection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "tickety_tickets_v1";

/// True when `key` can name a slot file: non-empty, no leading dot, only
/// `[A-Za-z0-9._-]`.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// A durable string slot addressed by key.
pub trait KeyValueSlot {
    /// Read the value stored under `key`, `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage rejects the write.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// File-backed slots
// ---------------------------------------------------------------------------

/// Slots stored as `<dir>/<key>.json`, one file per key.
///
/// Writes go to a sibling temp file which is then renamed over the target, so
/// an interrupted write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] for keys that are not plain file
    /// names (empty, or containing anything beyond `[A-Za-z0-9._-]`).
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_key(key) {
            return Err(StorageError::Unavailable(format!(
                "invalid storage key '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory slots
// ---------------------------------------------------------------------------

/// In-memory slots for tests and embedding.
///
/// Clones share the same map, so a test can keep a handle while the store owns
/// another. Writes can be made to fail to simulate a full or disabled store.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with [`StorageError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Place a raw value under `key`, bypassing the failure switch.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.values.borrow_mut().insert(key.to_string(), value.into());
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.insert_raw(key, value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ticket repository
// ---------------------------------------------------------------------------

/// Persistence adapter for the ticket collection.
pub struct TicketRepository {
    slot: Box<dyn KeyValueSlot>,
    key: String,
}

impl std::fmt::Debug for TicketRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketRepository")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl TicketRepository {
    /// Repository over `slot` using [`DEFAULT_STORAGE_KEY`].
    pub fn new(slot: impl KeyValueSlot + 'static) -> Self {
        Self::with_key(slot, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(slot: impl KeyValueSlot + 'static, key: impl Into<String>) -> Self {
        Self {
            slot: Box::new(slot),
            key: key.into(),
        }
    }

    /// Key the collection is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and validate the stored collection.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] when the stored value is not a
    /// well-formed ticket collection, or the slot's own error when it cannot
    /// be read.
    pub fn try_load(&self) -> Result<Option<Vec<Ticket>>, StorageError> {
        let Some(raw) = self.slot.read(&self.key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let tickets: Vec<Ticket> =
            serde_json::from_str(&raw).map_err(|err| self.corrupt(err.to_string()))?;
        self.check_well_formed(&tickets)?;
        Ok(Some(tickets))
    }

    /// Load the stored collection, or `None` when there is no usable prior state.
    #[must_use]
    pub fn load(&self) -> Option<Vec<Ticket>> {
        match self.try_load() {
            Ok(Some(tickets)) => {
                tracing::debug!(key = %self.key, count = tickets.len(), "loaded tickets");
                Some(tickets)
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored tickets");
                None
            }
            Err(err) => {
                tracing::warn!(
                    key = %self.key,
                    code = %err.code(),
                    error = %err,
                    "ignoring unreadable ticket state"
                );
                None
            }
        }
    }

    /// Serialize and write the full collection.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the slot write fails.
    pub fn try_save(&self, tickets: &[Ticket]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(tickets).map_err(StorageError::Serialize)?;
        self.slot.write(&self.key, &raw)
    }

    /// Write the full collection, logging and absorbing any failure.
    pub fn save(&self, tickets: &[Ticket]) {
        if let Err(err) = self.try_save(tickets) {
            tracing::warn!(
                key = %self.key,
                code = %err.code(),
                error = %err,
                "failed to persist tickets; continuing in memory"
            );
        }
    }

    fn check_well_formed(&self, tickets: &[Ticket]) -> Result<(), StorageError> {
        let mut seen = HashSet::with_capacity(tickets.len());
        for ticket in tickets {
            if ticket.id.is_empty() {
                return Err(self.corrupt("ticket with empty id".to_string()));
            }
            if !seen.insert(ticket.id.as_str()) {
                return Err(self.corrupt(format!("duplicate ticket id '{}'", ticket.id)));
            }
            if ticket.created_at > ticket.updated_at {
                return Err(self.corrupt(format!(
                    "ticket '{}' updated before it was created",
                    ticket.id
                )));
            }
        }
        Ok(())
    }

    fn corrupt(&self, reason: String) -> StorageError {
        StorageError::Corrupt {
            key: self.key.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status};
    use chrono::{TimeZone, Utc};

    fn ticket(id: &str) -> Ticket {
        let at = Utc.with_ymd_and_hms(2025, 2, 2, 8, 0, 0).unwrap();
        Ticket {
            id: id.to_string(),
            title: format!("Ticket {id}"),
            description: "desc".to_string(),
            status: Status::Open,
            priority: Priority::Low,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn missing_value_loads_as_absent() {
        let repo = TicketRepository::new(MemorySlot::new());
        assert!(repo.try_load().unwrap().is_none());
        assert!(repo.load().is_none());
    }

    #[test]
    fn empty_value_loads_as_absent() {
        let slot = MemorySlot::new();
        slot.insert_raw(DEFAULT_STORAGE_KEY, "   ");
        let repo = TicketRepository::new(slot);
        assert!(repo.try_load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let slot = MemorySlot::new();
        let repo = TicketRepository::new(slot.clone());
        let tickets = vec![ticket("b"), ticket("a")];
        repo.try_save(&tickets).unwrap();

        assert_eq!(repo.load(), Some(tickets));
        assert!(slot.get_raw(DEFAULT_STORAGE_KEY).unwrap().starts_with('['));
    }

    #[test]
    fn empty_collection_is_prior_state() {
        let repo = TicketRepository::new(MemorySlot::new());
        repo.save(&[]);
        assert_eq!(repo.load(), Some(Vec::new()));
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let slot = MemorySlot::new();
        slot.insert_raw(DEFAULT_STORAGE_KEY, "{not json");
        let repo = TicketRepository::new(slot);
        assert!(matches!(repo.try_load(), Err(StorageError::Corrupt { .. })));
        assert!(repo.load().is_none());
    }

    #[test]
    fn non_array_is_corrupt() {
        let slot = MemorySlot::new();
        slot.insert_raw(DEFAULT_STORAGE_KEY, r#"{"id":"a"}"#);
        let repo = TicketRepository::new(slot);
        assert!(repo.load().is_none());
    }

    #[test]
    fn one_bad_record_rejects_whole_collection() {
        let mut value = serde_json::to_value(vec![ticket("a"), ticket("b")]).unwrap();
        value[1]["status"] = serde_json::json!("archived");
        let slot = MemorySlot::new();
        slot.insert_raw(DEFAULT_STORAGE_KEY, value.to_string());
        let repo = TicketRepository::new(slot);
        assert!(repo.load().is_none());
    }

    #[test]
    fn missing_field_rejects_collection() {
        let mut value = serde_json::to_value(vec![ticket("a")]).unwrap();
        value[0].as_object_mut().unwrap().remove("updatedAt");
        let slot = MemorySlot::new();
        slot.insert_raw(DEFAULT_STORAGE_KEY, value.to_string());
        assert!(TicketRepository::new(slot).load().is_none());
    }

    #[test]
    fn duplicate_ids_are_corrupt() {
        let slot = MemorySlot::new();
        let repo = TicketRepository::new(slot);
        repo.try_save(&[ticket("a"), ticket("a")]).unwrap();
        let err = repo.try_load().unwrap_err();
        assert!(err.to_string().contains("duplicate ticket id 'a'"));
    }

    #[test]
    fn inverted_timestamps_are_corrupt() {
        let mut bad = ticket("a");
        bad.updated_at = bad.created_at - chrono::Duration::seconds(1);
        let repo = TicketRepository::new(MemorySlot::new());
        repo.try_save(&[bad]).unwrap();
        assert!(repo.load().is_none());
    }

    #[test]
    fn failed_write_is_absorbed() {
        let slot = MemorySlot::new();
        let repo = TicketRepository::new(slot.clone());
        repo.save(&[ticket("a")]);

        slot.set_fail_writes(true);
        repo.save(&[ticket("b")]);
        assert!(matches!(
            repo.try_save(&[ticket("b")]),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(repo.load(), Some(vec![ticket("a")]));
    }

    #[test]
    fn custom_key_is_isolated() {
        let slot = MemorySlot::new();
        let default_repo = TicketRepository::new(slot.clone());
        let other = TicketRepository::with_key(slot, "other");
        other.save(&[ticket("x")]);
        assert_eq!(other.key(), "other");
        assert!(default_repo.load().is_none());
    }

    #[test]
    fn file_slot_roundtrips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("nested"));
        assert!(slot.read("k").unwrap().is_none());

        slot.write("k", "first").unwrap();
        slot.write("k", "second").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("second"));
        assert!(dir.path().join("nested/k.json").exists());
        assert!(!dir.path().join("nested/k.json.tmp").exists());
    }

    #[test]
    fn file_slot_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path());
        assert!(slot.path_for("../escape").is_err());
        assert!(slot.path_for("").is_err());
        assert!(slot.path_for(".hidden").is_err());
        assert!(slot.path_for("tickety_tickets_v1").is_ok());
    }

    #[test]
    fn file_slot_unreadable_bytes_load_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{DEFAULT_STORAGE_KEY}.json")), [0xff, 0xfe])
            .unwrap();
        let repo = TicketRepository::new(FileSlot::new(dir.path()));
        assert!(repo.try_load().is_err());
        assert!(repo.load().is_none());
    }
}
