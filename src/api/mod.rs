//! API Module
//!
//! HTTP handlers and routing for the name generator REST API.
//!
//! # Endpoints
//! - `POST /generate` - Generate and record a leprechaun name
//! - `POST /download-pdf` - Download a certificate PDF
//! - `GET /stats` - Application statistics
//! - `GET /health` - Health check endpoint

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use extract::AppJson;
pub use handlers::*;
pub use routes::create_router;
