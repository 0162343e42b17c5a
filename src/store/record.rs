//! Name Record Module
//!
//! Defines a single generated name as it is kept in memory and on disk.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

// == Name Record ==
/// One generated leprechaun name.
///
/// Records are identified only by their position in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRecord {
    /// First name as submitted, or "Random"
    pub first_name: String,
    /// Last name as submitted, or "Random"
    pub last_name: String,
    /// The generated name
    pub leprechaun_name: String,
    /// ISO-8601 creation time, filled in by the store when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Client address the request came from; empty when unknown
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ip: String,
}

impl NameRecord {
    // == Constructor ==
    /// Creates a record without a timestamp.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        leprechaun_name: impl Into<String>,
        ip: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            leprechaun_name: leprechaun_name.into(),
            timestamp: None,
            ip: ip.into(),
        }
    }

    /// Sets an explicit timestamp.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    // == Timestamp Fill ==
    /// Stamps the record with the current time unless it already has one.
    pub(crate) fn ensure_timestamp(&mut self) {
        let missing = self.timestamp.as_deref().map_or(true, str::is_empty);
        if missing {
            self.timestamp = Some(current_timestamp());
        }
    }
}

/// Reads `null` as an empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// == Utility Functions ==
/// Returns the current time as an RFC 3339 string.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339()
}
