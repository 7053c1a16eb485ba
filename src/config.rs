//! Configuration loading and constants.
//!
//! Settings come from three places: an optional TOML file (listen address,
//! logging format, UI and template settings), command line overrides applied
//! in `main`, and process environment variables read once at startup
//! (`READY_AFTER`, `CORS_ORIGINS`). `AppConfig` is the root configuration struct.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use const_format::formatcp;
use serde::{Deserialize, Serialize};

use crate::identity::EnvSource;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Probe and identity responses must never be served from a cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Dashboard is per-visit (it bumps the counter), so revalidate every time
pub const HTTP_CACHE_DASHBOARD_MAX_AGE: u32 = 0;

pub const CACHE_CONTROL_DASHBOARD: &str = formatcp!(
    "private, max-age={}, must-revalidate",
    HTTP_CACHE_DASHBOARD_MAX_AGE
);

// =============================================================================
// Readiness
// =============================================================================

/// Environment variable holding the readiness delay in seconds
pub const READY_AFTER_VAR: &str = "READY_AFTER";

/// Readiness delay used when `READY_AFTER` is missing or unusable
pub const DEFAULT_READY_AFTER_SECS: u64 = 5;

// =============================================================================
// Instance Identity
// =============================================================================

pub const POD_NAME_VAR: &str = "POD_NAME";
pub const NODE_NAME_VAR: &str = "NODE_NAME";
pub const APP_ENV_VAR: &str = "APP_ENV";
pub const SERVICE_NAME_VAR: &str = "SERVICE_NAME";

/// Substituted for any identity field that is unset or empty
pub const UNKNOWN: &str = "unknown";

// =============================================================================
// CORS
// =============================================================================

/// Environment variable holding the comma-separated origin allow-list
pub const CORS_ORIGINS_VAR: &str = "CORS_ORIGINS";

/// Allow-list used when `CORS_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGINS: &str = "*";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Glob pattern for template files
pub const TEMPLATE_GLOB: &str = "templates/**/*";

/// Template rendered for the dashboard page
pub const DASHBOARD_TEMPLATE: &str = "index.html";

/// Default log filter when neither --log-level nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "kube_inspector=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Default listen host
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Dashboard title
pub const DEFAULT_TITLE: &str = "Kubernetes Inspector";

/// Seconds allowed for in-flight requests to finish on shutdown
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

// Time unit constants (in seconds) for the duration filter
/// Seconds in a minute
pub const SECONDS_PER_MINUTE: u64 = 60;
/// Seconds in an hour
pub const SECONDS_PER_HOUR: u64 = 3600;
/// Seconds in a day
pub const SECONDS_PER_DAY: u64 = 86400;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Readiness delay, populated from the environment
    #[serde(skip)]
    pub readiness: ReadinessConfig,
    /// CORS allow-list, populated from the environment
    #[serde(skip)]
    pub cors: CorsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }

    /// Parse host and port into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid http.host or http.port ({}:{}): {}",
                    self.host, self.port, e
                ))
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Page title shown on the dashboard
    #[serde(default = "UiConfig::default_title")]
    pub title: String,
    /// Version string, populated at runtime
    #[serde(skip_deserializing, default = "UiConfig::default_version")]
    pub version: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            version: Self::default_version(),
        }
    }
}

impl UiConfig {
    fn default_title() -> String {
        DEFAULT_TITLE.to_string()
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    /// Glob used to load Tera templates
    #[serde(default = "TemplateConfig::default_glob")]
    pub glob: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            glob: Self::default_glob(),
        }
    }
}

impl TemplateConfig {
    fn default_glob() -> String {
        TEMPLATE_GLOB.to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Seconds to wait after process start before reporting ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessConfig {
    pub delay_secs: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_READY_AFTER_SECS,
        }
    }
}

impl ReadinessConfig {
    pub fn new(delay_secs: u64) -> Self {
        Self { delay_secs }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Parse the `READY_AFTER` value.
///
/// A missing value silently yields the default. A value that is not an
/// integer, or is negative, logs a warning and yields the default. There is
/// no upper bound: values too large for `u64` saturate to `u64::MAX`.
pub fn parse_ready_after(raw: Option<&str>) -> ReadinessConfig {
    let Some(raw) = raw else {
        return ReadinessConfig::default();
    };

    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        tracing::warn!(
            value = %raw,
            default = DEFAULT_READY_AFTER_SECS,
            "Invalid READY_AFTER value, using default"
        );
        return ReadinessConfig::default();
    }

    // "-0" is zero, not negative
    if negative && digits.bytes().any(|b| b != b'0') {
        tracing::warn!(
            value = %raw,
            default = DEFAULT_READY_AFTER_SECS,
            "READY_AFTER must be non-negative, using default"
        );
        return ReadinessConfig::default();
    }

    // Only overflow can fail here, since digits are validated above
    let secs = digits.parse::<u64>().unwrap_or(u64::MAX);
    ReadinessConfig::new(secs)
}

/// Origins allowed to make cross-origin requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    #[default]
    AnyOrigin,
    Origins(Vec<String>),
}

/// Parse the comma-separated `CORS_ORIGINS` allow-list.
///
/// `*` anywhere in the list, or a list with no usable entries, allows any origin.
pub fn parse_cors_origins(raw: Option<&str>) -> CorsConfig {
    let raw = raw.unwrap_or(DEFAULT_CORS_ORIGINS);
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsConfig::AnyOrigin
    } else {
        CorsConfig::Origins(origins)
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment settings.
    pub fn load<P: AsRef<Path>>(path: Option<P>, env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(env);
        Ok(config)
    }

    /// Load only the file-backed settings, using defaults when no path is given.
    ///
    /// Environment settings are left at their defaults so that `main` can set
    /// up logging before `apply_env` emits any warnings.
    pub fn from_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                toml::from_str::<AppConfig>(&contents)?
            }
            None => AppConfig::default(),
        };

        config.http.socket_addr()?;
        Ok(config)
    }

    /// Read the startup-time environment settings.
    pub fn apply_env(&mut self, env: &dyn EnvSource) {
        self.readiness = parse_ready_after(env.var(READY_AFTER_VAR).as_deref());
        self.cors = parse_cors_origins(env.var(CORS_ORIGINS_VAR).as_deref());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_ready_after_valid() {
        assert_eq!(parse_ready_after(Some("10")).delay_secs, 10);
        assert_eq!(parse_ready_after(Some("0")).delay_secs, 0);
        assert_eq!(parse_ready_after(Some(" 7 ")).delay_secs, 7);
    }

    #[test]
    fn test_parse_ready_after_falls_back_to_default() {
        assert_eq!(parse_ready_after(None).delay_secs, DEFAULT_READY_AFTER_SECS);
        assert_eq!(parse_ready_after(Some("invalid")).delay_secs, 5);
        assert_eq!(parse_ready_after(Some("-5")).delay_secs, 5);
        assert_eq!(parse_ready_after(Some("")).delay_secs, 5);
        assert_eq!(parse_ready_after(Some("2.5")).delay_secs, 5);
    }

    #[test]
    fn test_parse_ready_after_has_no_upper_bound() {
        assert_eq!(parse_ready_after(Some("86400")).delay_secs, 86400);
        assert_eq!(
            parse_ready_after(Some("10000000000000000000")).delay_secs,
            10_000_000_000_000_000_000u64
        );
        assert_eq!(
            parse_ready_after(Some("18446744073709551615")).delay_secs,
            u64::MAX
        );
        assert_eq!(
            parse_ready_after(Some("99999999999999999999999")).delay_secs,
            u64::MAX
        );
    }

    #[test]
    fn test_parse_ready_after_signs() {
        assert_eq!(parse_ready_after(Some("+10")).delay_secs, 10);
        assert_eq!(parse_ready_after(Some("-0")).delay_secs, 0);
        assert_eq!(parse_ready_after(Some("-99999999999999999999")).delay_secs, 5);
        assert_eq!(parse_ready_after(Some("-")).delay_secs, 5);
        assert_eq!(parse_ready_after(Some("1 0")).delay_secs, 5);
    }

    #[test]
    fn test_parse_cors_origins() {
        assert_eq!(parse_cors_origins(None), CorsConfig::AnyOrigin);
        assert_eq!(parse_cors_origins(Some("*")), CorsConfig::AnyOrigin);
        assert_eq!(parse_cors_origins(Some(" , ")), CorsConfig::AnyOrigin);
        assert_eq!(
            parse_cors_origins(Some("https://a.example, https://b.example")),
            CorsConfig::Origins(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert_eq!(
            parse_cors_origins(Some("https://a.example,*")),
            CorsConfig::AnyOrigin
        );
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let env: HashMap<String, String> = HashMap::new();
        let config = AppConfig::load(None::<&str>, &env).unwrap();
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.readiness, ReadinessConfig::default());
        assert_eq!(config.cors, CorsConfig::AnyOrigin);
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_load_from_file_and_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[http]\nhost = \"127.0.0.1\"\nport = 9090\n\n[logging]\nformat = \"json\"\n\n[ui]\ntitle = \"Cluster demo\""
        )
        .unwrap();

        let env: HashMap<String, String> = [
            (READY_AFTER_VAR.to_string(), "12".to_string()),
            (CORS_ORIGINS_VAR.to_string(), "https://a.example".to_string()),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::load(Some(file.path()), &env).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(
            config.http.socket_addr().unwrap(),
            "127.0.0.1:9090".parse::<SocketAddr>().unwrap()
        );
        assert!(config.logging.is_json());
        assert_eq!(config.ui.title, "Cluster demo");
        assert_eq!(config.templates.glob, TEMPLATE_GLOB);
        assert_eq!(config.readiness.delay_secs, 12);
        assert_eq!(
            config.cors,
            CorsConfig::Origins(vec!["https://a.example".to_string()])
        );
    }

    #[test]
    fn test_load_rejects_bad_host() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nhost = \"not a host\"").unwrap();

        let env: HashMap<String, String> = HashMap::new();
        let err = AppConfig::load(Some(file.path()), &env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let env: HashMap<String, String> = HashMap::new();
        let err = AppConfig::load(Some("/nonexistent/kube-inspector.toml"), &env).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
