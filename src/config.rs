//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application name reported by the stats endpoint
pub const APP_NAME: &str = "Leprechaun Name Generator";

/// Application version reported by the stats endpoint
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Template used when the requested one is not allowed
pub const DEFAULT_TEMPLATE: &str = "classic-emerald";

/// Certificate templates and the files they are loaded from
pub const TEMPLATE_FILES: [(&str, &str); 3] = [
    ("classic-emerald", "classic-emerald-template.html"),
    ("pot-of-gold", "pot-of-gold-template.html"),
    ("rainbow-magic", "rainbow-magic-template.html"),
];

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file backing the name store
    pub db_file: PathBuf,
    /// Seconds between automatic flushes of the name store
    pub auto_save_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Directory holding the certificate templates
    pub template_dir: PathBuf,
    /// Directory served for the index page and assets
    pub static_dir: PathBuf,
    /// External command turning HTML on stdin into PDF on stdout
    pub pdf_render_command: String,
    /// Whether per-client rate limiting is enforced
    pub rate_limit_enabled: bool,
    /// Name generation requests allowed per client per minute
    pub rate_limit_generate: u32,
    /// PDF downloads allowed per client per minute
    pub rate_limit_pdf: u32,
    /// Requests per client per minute on every other route
    pub rate_limit_default: u32,
    /// Requests per client per hour on every other route
    pub rate_limit_default_hourly: u32,
    /// Take the client address from the last `X-Forwarded-For` hop.
    /// Only enable behind a reverse proxy that appends that header.
    pub trust_proxy: bool,
    /// Optional watermark stamped onto certificates
    pub watermark_text: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DB_FILE` - Name store file (default: names.json)
    /// - `DB_AUTO_SAVE_INTERVAL` - Flush interval in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `PDF_TEMPLATE_DIR` - Certificate template directory (default: pdf-templates)
    /// - `STATIC_DIR` - Static file directory (default: static)
    /// - `PDF_RENDER_COMMAND` - HTML to PDF command (default: weasyprint)
    /// - `RATE_LIMIT_ENABLED` - Enforce rate limits (default: true)
    /// - `RATE_LIMIT_GENERATE_PER_MINUTE` - (default: 10)
    /// - `RATE_LIMIT_PDF_PER_MINUTE` - (default: 5)
    /// - `RATE_LIMIT_DEFAULT_PER_MINUTE` - (default: 20)
    /// - `RATE_LIMIT_DEFAULT_PER_HOUR` - (default: 100)
    /// - `TRUST_PROXY` - Honor `X-Forwarded-For` from a reverse proxy (default: false)
    /// - `WATERMARK_TEXT` - Certificate watermark (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            db_file: env::var("DB_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_file),
            auto_save_interval: parse_var("DB_AUTO_SAVE_INTERVAL")
                .unwrap_or(defaults.auto_save_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            template_dir: env::var("PDF_TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_dir),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            pdf_render_command: env::var("PDF_RENDER_COMMAND")
                .unwrap_or(defaults.pdf_render_command),
            rate_limit_enabled: env::var("RATE_LIMIT_ENABLED")
                .ok()
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.rate_limit_enabled),
            rate_limit_generate: parse_var("RATE_LIMIT_GENERATE_PER_MINUTE")
                .unwrap_or(defaults.rate_limit_generate),
            rate_limit_pdf: parse_var("RATE_LIMIT_PDF_PER_MINUTE")
                .unwrap_or(defaults.rate_limit_pdf),
            rate_limit_default: parse_var("RATE_LIMIT_DEFAULT_PER_MINUTE")
                .unwrap_or(defaults.rate_limit_default),
            rate_limit_default_hourly: parse_var("RATE_LIMIT_DEFAULT_PER_HOUR")
                .unwrap_or(defaults.rate_limit_default_hourly),
            trust_proxy: env::var("TRUST_PROXY")
                .ok()
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(defaults.trust_proxy),
            watermark_text: env::var("WATERMARK_TEXT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Flush interval as a Duration.
    pub fn auto_save_period(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_file: PathBuf::from("names.json"),
            auto_save_interval: 300,
            server_port: 5000,
            template_dir: PathBuf::from("pdf-templates"),
            static_dir: PathBuf::from("static"),
            pdf_render_command: "weasyprint".to_string(),
            rate_limit_enabled: true,
            rate_limit_generate: 10,
            rate_limit_pdf: 5,
            rate_limit_default: 20,
            rate_limit_default_hourly: 100,
            trust_proxy: false,
            watermark_text: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.db_file, PathBuf::from("names.json"));
        assert_eq!(config.auto_save_interval, 300);
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.rate_limit_generate, 10);
        assert_eq!(config.rate_limit_pdf, 5);
        assert_eq!(config.rate_limit_default, 20);
        assert_eq!(config.rate_limit_default_hourly, 100);
        assert!(config.rate_limit_enabled);
        assert!(!config.trust_proxy);
        assert!(config.watermark_text.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DB_FILE");
        env::remove_var("DB_AUTO_SAVE_INTERVAL");
        env::remove_var("SERVER_PORT");
        env::remove_var("RATE_LIMIT_ENABLED");
        env::remove_var("WATERMARK_TEXT");
        env::remove_var("TRUST_PROXY");

        let config = Config::from_env();
        assert_eq!(config.db_file, PathBuf::from("names.json"));
        assert_eq!(config.auto_save_interval, 300);
        assert_eq!(config.server_port, 5000);
        assert!(config.rate_limit_enabled);
        assert!(!config.trust_proxy);
        assert!(config.watermark_text.is_none());
    }

    #[test]
    fn test_auto_save_period_never_zero() {
        let config = Config {
            auto_save_interval: 0,
            ..Config::default()
        };
        assert_eq!(config.auto_save_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_template_files_cover_default() {
        assert!(TEMPLATE_FILES.iter().any(|(name, _)| *name == DEFAULT_TEMPLATE));
    }
}
