//! Response DTOs for the name generator API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::store::PersistenceStats;

/// Outcome of saving a generated name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Success,
    Warning,
}

/// Response body for name generation (POST /generate)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// The generated name
    pub leprechaun_name: String,
    /// Whether the name was recorded
    pub save_status: SaveStatus,
    /// Human readable save outcome
    pub save_message: String,
}

impl GenerateResponse {
    /// Response for a name stored at `index`
    pub fn saved(leprechaun_name: impl Into<String>, index: usize) -> Self {
        Self {
            leprechaun_name: leprechaun_name.into(),
            save_status: SaveStatus::Success,
            save_message: format!("Name saved successfully (ID: {})", index),
        }
    }

    /// Response for a name that could not be stored
    pub fn unsaved(leprechaun_name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            leprechaun_name: leprechaun_name.into(),
            save_status: SaveStatus::Warning,
            save_message: format!("Error saving to database: {}", error),
        }
    }
}

/// Per-route request limits as shown to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimits {
    pub name_generation: String,
    pub pdf_generation: String,
}

impl RateLimits {
    pub fn per_minute(name_generation: u32, pdf_generation: u32) -> Self {
        Self {
            name_generation: format!("{} per minute", name_generation),
            pdf_generation: format!("{} per minute", pdf_generation),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Number of names in the store
    pub total_names_generated: usize,
    pub app_name: String,
    pub app_version: String,
    /// Certificate templates that can be requested
    pub templates_available: Vec<String>,
    pub rate_limits: RateLimits,
    /// Flush counters of the name store
    pub persistence: PersistenceStats,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether the in-memory name store is active
    pub cache: String,
    /// Number of certificate templates held in memory
    pub templates_loaded: usize,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(templates_loaded: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache: "enabled".to_string(),
            templates_loaded,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Optional hint for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
