//! Name Store Module
//!
//! In-memory record sequence with a dirty flag, persisted to a JSON file.
//!
//! All access to the records and the flag goes through a single mutex. The
//! mutex is also held while `flush` writes the file, so a slow disk delays
//! concurrent `add` calls until the write finishes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::store::record::current_timestamp;
use crate::store::{NameRecord, PersistenceStats};

// == Store State ==
/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct StoreState {
    /// Records in insertion order
    records: Vec<NameRecord>,
    /// Set whenever `records` differs from the file
    dirty: bool,
    /// Set once the store has been shut down
    closed: bool,
    /// Flush counters
    stats: PersistenceStats,
}

impl StoreState {
    /// Writes the records if dirty. Returns whether the file was written.
    fn flush_to(&mut self, path: &Path) -> Result<bool, StoreError> {
        if !self.dirty {
            return Ok(false);
        }

        match write_records(path, &self.records) {
            Ok(()) => {
                self.dirty = false;
                self.stats.record_flush(current_timestamp());
                info!("Saved {} names to {}", self.records.len(), path.display());
                Ok(true)
            }
            Err(err) => {
                self.stats.record_failure();
                Err(err)
            }
        }
    }
}

// == Name Store ==
/// Append-only store of generated names backed by a JSON file.
#[derive(Debug)]
pub struct NameStore {
    /// Backing file
    path: PathBuf,
    /// Records, dirty flag and counters
    state: Mutex<StoreState>,
}

impl NameStore {
    // == Load ==
    /// Opens the store, reading any records already in `path`.
    ///
    /// A missing file starts an empty store. A file that cannot be read or
    /// parsed also starts an empty store, with a warning logged.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match read_records(&path) {
            Ok(Some(records)) => {
                info!("Loaded {} names from {}", records.len(), path.display());
                records
            }
            Ok(None) => {
                info!(
                    "Database file {} does not exist, starting with empty store",
                    path.display()
                );
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "Error loading database {}: {}; starting with empty store",
                    path.display(),
                    err
                );
                Vec::new()
            }
        };

        Self {
            path,
            state: Mutex::new(StoreState {
                records,
                ..StoreState::default()
            }),
        }
    }

    // == Add ==
    /// Appends a record and returns its index.
    ///
    /// Fills in the timestamp when the record has none. Never touches disk.
    pub fn add(&self, mut record: NameRecord) -> Result<usize, StoreError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(StoreError::Closed);
        }

        record.ensure_timestamp();
        state.records.push(record);
        state.dirty = true;
        Ok(state.records.len() - 1)
    }

    // == Count ==
    /// Returns the number of records.
    pub fn count(&self) -> usize {
        self.state.lock().records.len()
    }

    // == All ==
    /// Returns a copy of every record in insertion order.
    pub fn all(&self) -> Vec<NameRecord> {
        self.state.lock().records.clone()
    }

    // == Dirty ==
    /// Returns true if there are records not yet written to the file.
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    // == Flush ==
    /// Writes every record to the backing file if the store is dirty.
    ///
    /// Returns `Ok(false)` without touching the file when nothing changed.
    /// On failure the dirty flag stays set so a later flush retries.
    pub fn flush(&self) -> Result<bool, StoreError> {
        self.state.lock().flush_to(&self.path)
    }

    // == Clear ==
    /// Drops every record and immediately writes the empty sequence.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.records.clear();
        state.dirty = true;
        state.flush_to(&self.path).map(|_| ())
    }

    // == Close ==
    /// Performs a final flush and rejects any further `add` calls.
    pub fn close(&self) -> Result<bool, StoreError> {
        let mut state = self.state.lock();
        state.closed = true;
        state.flush_to(&self.path)
    }

    // == Stats ==
    /// Returns current persistence statistics.
    pub fn stats(&self) -> PersistenceStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.dirty = state.dirty;
        stats
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// == File Helpers ==
/// Reads the backing file. `Ok(None)` means it does not exist.
fn read_records(path: &Path) -> Result<Option<Vec<NameRecord>>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let records = serde_json::from_slice(&bytes)?;
    Ok(Some(records))
}

/// Overwrites the backing file through a temp file and rename.
fn write_records(path: &Path, records: &[NameRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path);
    let bytes = serde_json::to_vec_pretty(records)?;
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
