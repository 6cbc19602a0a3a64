//! Server configuration loading from file and environment variables.
//!
//! Configuration is read once at process start and immutable
//! thereafter. A missing required value (speech credential/region,
//! agent endpoint/identifier/token) is a startup-time fatal error, not
//! a per-request error.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use voxbridge_voice::{AgentConfig, SpeechConfig};

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Azure Speech settings (recognition and synthesis).
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Remote agent settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "voxbridge_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required value is absent from both file and environment.
    #[error("missing required configuration value: {0}")]
    MissingRequired(&'static str),
}

/// Loads configuration from a TOML file, falling back to defaults,
/// then applies environment overrides and validates required values.
///
/// Environment variable overrides:
/// - `VOXBRIDGE_HOST` / `VOXBRIDGE_PORT` override `server.*`
/// - `SPEECH_KEY`, `SPEECH_REGION`, `SPEECH_ENDPOINT` override `speech.*`
/// - `AI_PROJECT_ENDPOINT`, `AGENT_ID`, `AGENT_API_KEY` override `agent.*`
/// - `VOXBRIDGE_LOG_LEVEL` overrides `logging.level`
/// - `VOXBRIDGE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or
/// parsed, or if a required value is still empty after overrides.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(host) = std::env::var("VOXBRIDGE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("VOXBRIDGE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(key) = std::env::var("SPEECH_KEY") {
        config.speech.key = key;
    }
    if let Ok(region) = std::env::var("SPEECH_REGION") {
        config.speech.region = region;
    }
    if let Ok(endpoint) = std::env::var("SPEECH_ENDPOINT") {
        if !endpoint.trim().is_empty() {
            config.speech.endpoint = Some(endpoint);
        }
    }
    if let Ok(endpoint) = std::env::var("AI_PROJECT_ENDPOINT") {
        config.agent.project_endpoint = endpoint;
    }
    if let Ok(agent_id) = std::env::var("AGENT_ID") {
        config.agent.agent_id = agent_id;
    }
    if let Ok(api_key) = std::env::var("AGENT_API_KEY") {
        config.agent.api_key = api_key;
    }
    if let Ok(level) = std::env::var("VOXBRIDGE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("VOXBRIDGE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.speech.key.trim().is_empty() {
        return Err(ConfigError::MissingRequired("speech.key / SPEECH_KEY"));
    }
    if config.speech.region.trim().is_empty() {
        return Err(ConfigError::MissingRequired("speech.region / SPEECH_REGION"));
    }
    if config.agent.project_endpoint.trim().is_empty() {
        return Err(ConfigError::MissingRequired(
            "agent.project_endpoint / AI_PROJECT_ENDPOINT",
        ));
    }
    if config.agent.agent_id.trim().is_empty() {
        return Err(ConfigError::MissingRequired("agent.agent_id / AGENT_ID"));
    }
    if config.agent.api_key.trim().is_empty() {
        return Err(ConfigError::MissingRequired("agent.api_key / AGENT_API_KEY"));
    }
    Ok(())
}
