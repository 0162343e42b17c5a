//! Request Extractors
//!
//! JSON body extraction that reports failures in the API's error format.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

/// Message for a request without a JSON body
pub const NO_JSON_DATA: &str = "No JSON data provided";

/// Message for a body that is not valid JSON for the endpoint
pub const INVALID_JSON_DATA: &str = "Invalid JSON data";

/// JSON request body.
///
/// Like [`axum::Json`], but a missing content type, an empty body or
/// unparseable JSON becomes an [`AppError::InvalidRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::InvalidRequest(NO_JSON_DATA.to_string()));
        }

        serde_json::from_slice(&bytes).map(AppJson).map_err(|err| {
            debug!("Rejected request body: {}", err);
            AppError::InvalidRequest(INVALID_JSON_DATA.to_string())
        })
    }
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("application/json")
        || mime
            .rsplit_once('+')
            .is_some_and(|(_, suffix)| suffix.eq_ignore_ascii_case("json"))
}
