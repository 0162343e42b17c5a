//! API Routes
//!
//! Configures the Axum router with all name generator endpoints.

use axum::{
    handler::HandlerWithoutStateExt,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::AppError;

use super::handlers::{
    download_pdf_handler, generate_handler, health_handler, stats_handler, AppState,
};
use super::middleware::{rate_limit_middleware, security_header_layers, RateLimit};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /generate` - Generate and record a leprechaun name
/// - `POST /download-pdf` - Render a certificate PDF
/// - `GET /stats` - Name count and persistence statistics
/// - `GET /health` - Health check endpoint
/// - anything else - Static files (index page), JSON 404 when missing
///
/// # Middleware
/// - Rate limiting per client IP, with separate quotas for name and PDF generation
/// - Security headers on every response
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let enabled = config.rate_limit_enabled;

    let trust_proxy = config.trust_proxy;

    let generate_limit =
        RateLimit::new(config.rate_limit_generate, enabled).trusting_proxy(trust_proxy);
    let pdf_limit = RateLimit::new(config.rate_limit_pdf, enabled).trusting_proxy(trust_proxy);
    let default_limit = RateLimit::new(config.rate_limit_default, enabled)
        .and_per_hour(config.rate_limit_default_hourly)
        .trusting_proxy(trust_proxy);

    let static_files = ServeDir::new(&config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found_handler.into_service());

    let general = Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback_service(static_files)
        .layer(from_fn_with_state(default_limit, rate_limit_middleware));

    let mut router = Router::new()
        .route(
            "/generate",
            post(generate_handler)
                .route_layer(from_fn_with_state(generate_limit, rate_limit_middleware)),
        )
        .route(
            "/download-pdf",
            post(download_pdf_handler)
                .route_layer(from_fn_with_state(pdf_limit, rate_limit_middleware)),
        )
        .merge(general);

    for layer in security_header_layers() {
        router = router.layer(layer);
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found_handler() -> AppError {
    AppError::NotFound
}
