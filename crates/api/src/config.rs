use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub limits: LimitsConfig,
    pub anti_theft: AntiTheftConfig,
    pub sos: SosConfig,
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

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Per-device rate limit on anti-theft command endpoints. Zero
    /// disables limiting. Protects confirmation codes against online
    /// brute force.
    #[serde(default = "default_command_rate_limit")]
    pub command_rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_geofences_per_user")]
    pub max_geofences_per_user: usize,

    #[serde(default = "default_max_sos_contacts")]
    pub max_sos_contacts: usize,

    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AntiTheftConfig {
    /// Shared secret authorizing wipe and remote-wipe. Required; only
    /// its SHA-256 digest is held in memory after startup.
    pub wipe_secret: String,

    /// How long to wait for the device to acknowledge a play-sound
    /// command before reporting it unacknowledged.
    #[serde(default = "default_play_sound_timeout_ms")]
    pub play_sound_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SosConfig {
    /// Delivery provider: "gateway" posts to the configured SMS/email
    /// webhook endpoints, "console" logs (development default).
    #[serde(default = "default_sos_provider")]
    pub provider: String,

    /// Bound on each contact's delivery attempt; expiry is reported as a
    /// failed dispatch, never escalated to the whole call.
    #[serde(default = "default_per_contact_timeout_ms")]
    pub per_contact_timeout_ms: u64,

    #[serde(default)]
    pub sms_gateway_url: String,

    #[serde(default)]
    pub email_gateway_url: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_command_rate_limit() -> u32 {
    30
}
fn default_max_geofences_per_user() -> usize {
    50
}
fn default_max_sos_contacts() -> usize {
    20
}
fn default_max_message_length() -> usize {
    500
}
fn default_play_sound_timeout_ms() -> u64 {
    5_000
}
fn default_sos_provider() -> String {
    "console".to_string()
}
fn default_per_contact_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Error)]
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
    /// 3. Environment variables with TRINETRA__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TRINETRA").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Creates a config entirely from embedded defaults and overrides,
    /// without relying on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            command_rate_limit_per_minute = 30

            [limits]
            max_geofences_per_user = 50
            max_sos_contacts = 20
            max_message_length = 500

            [anti_theft]
            wipe_secret = "TEST-WIPE-SECRET"
            play_sound_timeout_ms = 100

            [sos]
            provider = "console"
            per_contact_timeout_ms = 100
            sms_gateway_url = ""
            email_gateway_url = ""
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.anti_theft.wipe_secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "TRINETRA__ANTI_THEFT__WIPE_SECRET environment variable must be set".to_string(),
            ));
        }

        if self.sos.provider == "gateway"
            && self.sos.sms_gateway_url.is_empty()
            && self.sos.email_gateway_url.is_empty()
        {
            return Err(ConfigValidationError::InvalidValue(
                "sos.provider is 'gateway' but no gateway URL is configured".to_string(),
            ));
        }

        if self.sos.per_contact_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "sos.per_contact_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_for_test_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.anti_theft.wipe_secret, "TEST-WIPE-SECRET");
        assert_eq!(config.sos.provider, "console");
    }

    #[test]
    fn test_load_for_test_overrides() {
        let config = Config::load_for_test(&[
            ("server.port", "9090"),
            ("security.command_rate_limit_per_minute", "5"),
        ])
        .expect("Failed to load config");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.security.command_rate_limit_per_minute, 5);
    }

    #[test]
    fn test_validate_rejects_empty_wipe_secret() {
        let mut config = Config::load_for_test(&[]).unwrap();
        config.anti_theft.wipe_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_gateway_without_urls() {
        let mut config = Config::load_for_test(&[]).unwrap();
        config.sos.provider = "gateway".to_string();
        assert!(config.validate().is_err());

        config.sos.sms_gateway_url = "https://gateway.example.com/sms".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("server.host", "127.0.0.1")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    }
}
