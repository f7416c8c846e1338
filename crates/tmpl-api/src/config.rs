//! API configuration.

/// Path the rendering webhook is served on.
pub const WEBHOOK_PATH: &str = "/api/webhooks/creatomate";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Public base URL the rendering service calls back on
    pub webhook_base_url: Option<String>,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Emit logs as JSON lines instead of ANSI text
    pub json_logs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 10 * 1024 * 1024, // 10MB
            environment: "development".to_string(),
            webhook_base_url: None,
            metrics_enabled: true,
            json_logs: false,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            webhook_base_url: std::env::var("WEBHOOK_BASE_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Full webhook URL sent with render requests, if a base URL is configured.
    pub fn webhook_url(&self) -> Option<String> {
        self.webhook_base_url
            .as_deref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), WEBHOOK_PATH))
    }
}
