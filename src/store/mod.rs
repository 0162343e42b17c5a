//! Store Module
//!
//! Provides the in-memory name store with JSON file persistence.

mod name_store;
mod record;
mod stats;


// Re-export public types
pub use name_store::NameStore;
pub use record::{current_timestamp, NameRecord};
pub use stats::PersistenceStats;
