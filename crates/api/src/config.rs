use persistence::{GatewayOptions, Settings};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use domain::models::SchoolSelection;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Inventory and registry endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Inventory script endpoint. Empty means demo storage.
    #[serde(default)]
    pub script_url: String,

    /// Registry script endpoint; falls back to `script_url`.
    #[serde(default)]
    pub admin_script_url: String,

    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,

    /// Timeout applied to every backend call.
    #[serde(default = "default_backend_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_inline_image_bytes")]
    pub max_inline_image_bytes: usize,

    #[serde(default = "default_max_upload_image_bytes")]
    pub max_upload_image_bytes: usize,

    #[serde(default = "default_known_schools")]
    pub known_schools: Vec<String>,

    #[serde(default = "default_school")]
    pub default_school: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Admin,
    School,
}

/// Who this process serves.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_kind")]
    pub kind: SessionKind,

    /// Access code of the school, required for a school session.
    #[serde(default)]
    pub school_code: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_demo_mode() -> bool {
    true
}
fn default_backend_timeout() -> u64 {
    30
}
fn default_max_inline_image_bytes() -> usize {
    4_000_000
}
fn default_max_upload_image_bytes() -> usize {
    3 * 1024 * 1024
}
fn default_known_schools() -> Vec<String> {
    GatewayOptions::default().known_schools
}
fn default_school() -> String {
    GatewayOptions::default().default_school
}
fn default_session_kind() -> SessionKind {
    SessionKind::Admin
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with EDUKIT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("EDUKIT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("backend.known_schools")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides, without
    /// touching the file system. Validation is left to the caller.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 60

            [logging]
            level = "info"
            format = "pretty"

            [backend]
            script_url = ""
            admin_script_url = ""
            demo_mode = true
            request_timeout_secs = 30
            max_inline_image_bytes = 4000000
            max_upload_image_bytes = 3145728
            known_schools = ["대건고", "신송고", "중산중", "신현중", "이음초", "DefaultSchool"]
            default_school = "대건고"

            [session]
            kind = "admin"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.server.request_timeout_secs == 0 || self.backend.request_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Request timeouts must be at least one second".to_string(),
            ));
        }

        if self.backend.max_inline_image_bytes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "backend.max_inline_image_bytes cannot be 0".to_string(),
            ));
        }

        if self.backend.known_schools.is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "backend.known_schools must list at least one school".to_string(),
            ));
        }

        if self.session.kind == SessionKind::School && self.school_code().is_none() {
            return Err(ConfigValidationError::MissingRequired(
                "EDUKIT__SESSION__SCHOOL_CODE must be set for a school session".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }

    /// The configured school access code, ignoring blanks.
    pub fn school_code(&self) -> Option<&str> {
        self.session
            .school_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            request_timeout: Duration::from_secs(self.backend.request_timeout_secs),
            max_inline_image_bytes: self.backend.max_inline_image_bytes,
            max_upload_image_bytes: self.backend.max_upload_image_bytes,
            known_schools: self.backend.known_schools.clone(),
            default_school: self.backend.default_school.clone(),
            admin_script_url: self.backend.admin_script_url.clone(),
        }
    }

    /// Settings used when the key-value store holds nothing yet.
    pub fn default_settings(&self) -> Settings {
        Settings {
            script_url: self.backend.script_url.clone(),
            demo_mode: self.backend.demo_mode,
            selected_school: SchoolSelection::All,
        }
    }
}
