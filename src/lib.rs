//! Leprechaun Name Generator
//!
//! Generates leprechaun names, keeps them in a JSON-backed store that is
//! flushed to disk periodically, and renders PDF certificates from HTML
//! templates.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod names;
pub mod pdf;
pub mod store;
pub mod tasks;
pub mod templates;

pub use api::AppState;
pub use config::Config;
pub use store::{NameRecord, NameStore};
pub use tasks::spawn_persistence_task;
