//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Auto-save: Flushes the name store to its JSON file at a fixed interval

mod persist;

pub use persist::{spawn_persistence_task, PersistenceWorker, SHUTDOWN_TIMEOUT};
