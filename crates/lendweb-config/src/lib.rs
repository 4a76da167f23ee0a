//! Configuration management for lendweb
//!
//! Settings for the server, the ledger collaborator, the legacy wire
//! format and the command-line data-access client, read from one YAML file.
//! Every section and field is optional.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wrap the router in a permissive CORS layer
    #[serde(default = "default_false")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// In-memory ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Seed the ledger with sample loans on startup
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    /// First key (inclusive) scanned by "list all"
    #[serde(default = "default_range_start")]
    pub range_start: String,
    /// Last key (exclusive) scanned by "list all"
    #[serde(default = "default_range_end")]
    pub range_end: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            range_start: default_range_start(),
            range_end: default_range_end(),
        }
    }
}

fn default_range_start() -> String {
    "0".to_string()
}

fn default_range_end() -> String {
    "999".to_string()
}

/// Wire compatibility settings for the legacy routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireConfig {
    /// Answer known failures with the plain-text sentinel strings
    #[serde(default = "default_true")]
    pub legacy_sentinels: bool,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self { legacy_sentinels: true }
    }
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Data-access client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the loan service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Which endpoint family the client talks to
    #[serde(default)]
    pub protocol: Protocol,
    /// Request timeout in seconds; absent means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            protocol: Protocol::default(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

/// Endpoint family used by the data-access client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// `GET /get_loan/:id`, `GET /add_loan/:loan`, ... with hyphen-joined segments
    #[default]
    Legacy,
    /// JSON endpoints under `/api/loans`
    Structured,
}

impl std::str::FromStr for Protocol {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Protocol::Legacy),
            "structured" => Ok(Protocol::Structured),
            _ => Err(format!("Invalid protocol: {}", s)),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Legacy => write!(f, "legacy"),
            Protocol::Structured => write!(f, "structured"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger settings
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Legacy wire settings
    #[serde(default)]
    pub wire: WireConfig,
    /// Data-access client settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Read, parse and validate `path`
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound { path: path.display().to_string() });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.ledger.range_start >= self.ledger.range_end {
            return Err(ConfigError::InvalidValue {
                field: "ledger.range_start".to_string(),
                reason: "Range start must sort before range end".to_string(),
            });
        }

        let base_url = &self.client.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "client.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.client.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "client.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0; omit it to disable".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.client.protocol, Protocol::Legacy);
        assert!(config.wire.legacy_sentinels);
        assert_eq!(config.ledger.range_end, "999");
    }

    #[test]
    fn test_empty_sections_use_defaults() {
        let config = Config::from_yaml("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.ledger.seed_demo_data);
        assert_eq!(config.client.timeout_secs, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_structured_protocol() {
        let config = Config::from_yaml("client:\n  protocol: structured\n  timeout_secs: 5\n").unwrap();
        assert_eq!(config.client.protocol, Protocol::Structured);
        assert_eq!(config.client.timeout_secs, Some(5));
    }

    #[test]
    fn test_protocol_from_str() {
        assert_eq!("LEGACY".parse::<Protocol>().unwrap(), Protocol::Legacy);
        assert_eq!("structured".parse::<Protocol>().unwrap(), Protocol::Structured);
        assert!("soap".parse::<Protocol>().is_err());
        assert_eq!(Protocol::Structured.to_string(), "structured");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        let mut config = Config::default();
        config.ledger.range_start = "999".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.client.base_url = "ftp://ledger".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.client.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(PathBuf::from("/nonexistent/lendweb.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
