//! API Handlers
//!
//! HTTP request handlers for each name generator endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use tracing::{info, warn};

use crate::config::{Config, APP_NAME, APP_VERSION};
use crate::error::{AppError, Result};
use crate::models::{
    GenerateRequest, GenerateResponse, HealthResponse, PdfRequest, RateLimits, StatsResponse,
};
use crate::names::{generate_leprechaun_name, sanitize_input, validate_input};
use crate::pdf::{
    certificate_filename, fill_template, resolve_template_name, CommandRenderer, PdfRenderer,
};
use crate::store::{NameRecord, NameStore};
use crate::templates::{add_watermark, TemplateCache};

use super::extract::AppJson;
use super::middleware::client_ip;

/// Stored in place of a name part the user left blank
const RANDOM_PLACEHOLDER: &str = "Random";

/// Application state shared across all handlers.
///
/// Every component is built once in `main` and handed in here.
#[derive(Clone)]
pub struct AppState {
    /// Generated names and their persistence
    pub store: Arc<NameStore>,
    /// Certificate templates
    pub templates: Arc<TemplateCache>,
    /// HTML to PDF conversion
    pub renderer: Arc<dyn PdfRenderer>,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        store: Arc<NameStore>,
        templates: TemplateCache,
        renderer: Arc<dyn PdfRenderer>,
        config: Config,
    ) -> Self {
        Self {
            store,
            templates: Arc::new(templates),
            renderer,
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Loads the templates from disk and renders through the configured command.
    pub fn from_config(config: &Config, store: Arc<NameStore>) -> Self {
        let templates = TemplateCache::load(&config.template_dir);
        let renderer = Arc::new(CommandRenderer::weasyprint(&config.pdf_render_command));
        Self::new(store, templates, renderer, config.clone())
    }
}

/// Handler for POST /generate
///
/// Generates a leprechaun name and records it. A failure to record is
/// reported as a warning; the name is returned either way.
pub async fn generate_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    AppJson(req): AppJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let first_name = sanitize_input(req.first_name.as_deref().unwrap_or_default());
    let last_name = sanitize_input(req.last_name.as_deref().unwrap_or_default());

    // Blank parts are allowed; anything else must look like a name
    if !first_name.is_empty() && !validate_input(&first_name) {
        return Err(AppError::InvalidRequest("Invalid first name format".to_string()));
    }
    if !last_name.is_empty() && !validate_input(&last_name) {
        return Err(AppError::InvalidRequest("Invalid last name format".to_string()));
    }

    let leprechaun_name = generate_leprechaun_name(&first_name, &last_name, &mut rand::rng());

    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let ip = client_ip(&headers, peer, state.config.trust_proxy)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let record = NameRecord::new(
        or_random(first_name),
        or_random(last_name),
        leprechaun_name.clone(),
        ip,
    );

    // The store lock is held across flushes, so adding may block on disk I/O
    let store = Arc::clone(&state.store);
    let saved = tokio::task::spawn_blocking(move || store.add(record))
        .await
        .map_err(|err| AppError::Internal(format!("save task failed: {err}")))?;

    let response = match saved {
        Ok(index) => GenerateResponse::saved(leprechaun_name, index),
        Err(err) => {
            warn!("Failed to save name: {}", err);
            GenerateResponse::unsaved(leprechaun_name, err)
        }
    };

    Ok(Json(response))
}

fn or_random(part: String) -> String {
    if part.is_empty() {
        RANDOM_PLACEHOLDER.to_string()
    } else {
        part
    }
}

/// Handler for POST /download-pdf
///
/// Renders a certificate for the given name and returns it as an attachment.
pub async fn download_pdf_handler(
    State(state): State<AppState>,
    AppJson(req): AppJson<PdfRequest>,
) -> Result<Response> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let name = sanitize_input(req.name.as_deref().unwrap_or_default());
    if !validate_input(&name) {
        return Err(AppError::InvalidRequest("Invalid name format".to_string()));
    }

    let template_name = resolve_template_name(req.template.as_deref());
    let template = state
        .templates
        .get(template_name)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| AppError::TemplateNotFound(template_name.to_string()))?;

    let mut html = fill_template(&template, &name, Local::now().date_naive());
    if let Some(text) = &state.config.watermark_text {
        html = add_watermark(&html, text);
    }

    let pdf = state.renderer.render(&html).await?;
    info!("PDF generated for name: {}, template: {}", name, template_name);

    let disposition = format!("attachment; filename=\"{}\"", certificate_filename());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns name counts, app details and persistence counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        total_names_generated: state.store.count(),
        app_name: APP_NAME.to_string(),
        app_version: APP_VERSION.to_string(),
        templates_available: state.templates.names(),
        rate_limits: RateLimits::per_minute(
            state.config.rate_limit_generate,
            state.config.rate_limit_pdf,
        ),
        persistence: state.store.stats(),
    })
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.templates.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::models::SaveStatus;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Renderer that echoes the HTML back as the "PDF"
    struct EchoRenderer;

    #[async_trait]
    impl PdfRenderer for EchoRenderer {
        async fn render(&self, html: &str) -> std::result::Result<Vec<u8>, RenderError> {
            Ok(html.as_bytes().to_vec())
        }
    }

    fn test_state(dir: &TempDir) -> AppState {
        let store = Arc::new(NameStore::load(dir.path().join("names.json")));
        let templates = TemplateCache::from_contents([
            ("classic-emerald", "<h1>{{name}}</h1><p>{{date}}</p>"),
            ("pot-of-gold", "<h1>Gold for {{name}}</h1>"),
            ("rainbow-magic", ""),
        ]);
        AppState::new(store, templates, Arc::new(EchoRenderer), Config::default())
    }

    fn generate_request(first: Option<&str>, last: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_generate_saves_record() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let response = generate_handler(
            State(state.clone()),
            None,
            HeaderMap::new(),
            AppJson(generate_request(Some(" Finn "), Some("Murphy"))),
        )
        .await
        .unwrap();

        assert!(response.leprechaun_name.starts_with("Finn "));
        assert_eq!(response.save_status, SaveStatus::Success);
        assert_eq!(response.save_message, "Name saved successfully (ID: 0)");

        let records = state.store.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first_name, "Finn");
        assert_eq!(records[0].leprechaun_name, response.leprechaun_name);
        assert_eq!(records[0].ip, "unknown");
    }

    #[tokio::test]
    async fn test_generate_blank_parts_stored_as_random() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        generate_handler(
            State(state.clone()),
            None,
            HeaderMap::new(),
            AppJson(generate_request(None, Some("  "))),
        )
        .await
        .unwrap();

        let record = &state.store.all()[0];
        assert_eq!(record.first_name, "Random");
        assert_eq!(record.last_name, "Random");
    }

    fn forwarded_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.9.0.1, 203.0.113.9".parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_generate_records_peer_ip_over_forwarded_header() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let peer: SocketAddr = "192.0.2.44:51000".parse().unwrap();

        generate_handler(
            State(state.clone()),
            Some(ConnectInfo(peer)),
            forwarded_headers(),
            AppJson(generate_request(Some("Aoife"), Some("Kelly"))),
        )
        .await
        .unwrap();

        assert_eq!(state.store.all()[0].ip, "192.0.2.44");
    }

    #[tokio::test]
    async fn test_generate_records_last_hop_behind_trusted_proxy() {
        let dir = TempDir::new().unwrap();
        let mut state = test_state(&dir);
        state.config = Arc::new(Config {
            trust_proxy: true,
            ..Config::default()
        });

        generate_handler(
            State(state.clone()),
            None,
            forwarded_headers(),
            AppJson(generate_request(Some("Aoife"), Some("Kelly"))),
        )
        .await
        .unwrap();

        assert_eq!(state.store.all()[0].ip, "203.0.113.9");
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_names() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let result = generate_handler(
            State(state.clone()),
            None,
            HeaderMap::new(),
            AppJson(generate_request(Some("R2-D2"), None)),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(msg)) if msg == "Invalid first name format"));

        let result = generate_handler(
            State(state.clone()),
            None,
            HeaderMap::new(),
            AppJson(generate_request(Some("Finn"), Some("<b>"))),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(msg)) if msg == "Invalid last name format"));

        assert_eq!(state.store.count(), 0);
    }

    #[tokio::test]
    async fn test_generate_closed_store_warns() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.store.close().unwrap();

        let response = generate_handler(
            State(state.clone()),
            None,
            HeaderMap::new(),
            AppJson(generate_request(Some("Finn"), Some("Murphy"))),
        )
        .await
        .unwrap();

        assert_eq!(response.save_status, SaveStatus::Warning);
        assert!(response.save_message.starts_with("Error saving to database"));
        assert!(!response.leprechaun_name.is_empty());
    }

    #[tokio::test]
    async fn test_download_pdf_renders_template() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let req = PdfRequest {
            name: Some("Finn Murphy".to_string()),
            template: Some("pot-of-gold".to_string()),
        };
        let response = download_pdf_handler(State(state), AppJson(req)).await.unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"leprechaun-certificate-"));
        assert_eq!(body_string(response).await, "<h1>Gold for Finn Murphy</h1>");
    }

    #[tokio::test]
    async fn test_download_pdf_unknown_template_uses_default() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let req = PdfRequest {
            name: Some("Finn".to_string()),
            template: Some("shamrock".to_string()),
        };
        let response = download_pdf_handler(State(state), AppJson(req)).await.unwrap();
        let body = body_string(response).await;

        assert!(body.starts_with("<h1>Finn</h1><p>"));
        assert!(!body.contains("{{date}}"));
    }

    #[tokio::test]
    async fn test_download_pdf_empty_template_is_error() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let req = PdfRequest {
            name: Some("Finn".to_string()),
            template: Some("rainbow-magic".to_string()),
        };
        let result = download_pdf_handler(State(state), AppJson(req)).await;
        assert!(matches!(result, Err(AppError::TemplateNotFound(name)) if name == "rainbow-magic"));
    }

    #[tokio::test]
    async fn test_download_pdf_adds_watermark() {
        let dir = TempDir::new().unwrap();
        let mut state = test_state(&dir);
        state.config = Arc::new(Config {
            watermark_text: Some("FREE VERSION".to_string()),
            ..Config::default()
        });

        let req = PdfRequest {
            name: Some("Finn".to_string()),
            template: None,
        };
        let response = download_pdf_handler(State(state), AppJson(req)).await.unwrap();
        assert!(body_string(response).await.contains("FREE VERSION"));
    }

    #[tokio::test]
    async fn test_download_pdf_requires_valid_name() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let result = download_pdf_handler(State(state.clone()), AppJson(PdfRequest::default())).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(msg)) if msg == "Name is required"));

        let req = PdfRequest {
            name: Some("Finn <3".to_string()),
            template: None,
        };
        let result = download_pdf_handler(State(state), AppJson(req)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(msg)) if msg == "Invalid name format"));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state
            .store
            .add(NameRecord::new("A", "B", "A B", "127.0.0.1"))
            .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.total_names_generated, 1);
        assert_eq!(response.app_name, APP_NAME);
        assert_eq!(response.templates_available.len(), 3);
        assert!(response.persistence.dirty);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let dir = TempDir::new().unwrap();
        let response = health_handler(State(test_state(&dir))).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.templates_loaded, 3);
    }
}
