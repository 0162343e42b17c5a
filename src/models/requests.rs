//! Request DTOs for the name generator API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for name generation (POST /generate)
///
/// Both fields are optional; a missing or blank part yields a fully random name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// First name to build on
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name to build on
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Request body for certificate download (POST /download-pdf)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfRequest {
    /// Name printed on the certificate
    #[serde(default)]
    pub name: Option<String>,
    /// Template to use; unknown names fall back to the default
    #[serde(default)]
    pub template: Option<String>,
}

impl PdfRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => None,
            _ => Some("Name is required".to_string()),
        }
    }
}
