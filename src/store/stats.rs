//! Persistence Statistics Module
//!
//! Tracks how the name store's flushes to disk are going.

use serde::Serialize;

// == Persistence Stats ==
/// Flush counters for the name store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceStats {
    /// Whether in-memory records differ from the file
    pub dirty: bool,
    /// Number of successful writes of the backing file
    pub flushes: u64,
    /// Number of writes that failed
    pub failed_flushes: u64,
    /// Time of the last successful write (RFC 3339)
    pub last_flush: Option<String>,
}

impl PersistenceStats {
    // == Constructor ==
    /// Creates a new PersistenceStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Flush ==
    /// Counts a successful write made at `at`.
    pub fn record_flush(&mut self, at: String) {
        self.flushes += 1;
        self.last_flush = Some(at);
    }

    // == Record Failure ==
    /// Counts a failed write.
    pub fn record_failure(&mut self) {
        self.failed_flushes += 1;
    }
}
