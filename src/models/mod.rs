//! Request and Response models for the name generator API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{GenerateRequest, PdfRequest};
pub use responses::{
    ErrorResponse, GenerateResponse, HealthResponse, RateLimits, SaveStatus, StatsResponse,
};
