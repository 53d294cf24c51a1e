use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level server configuration. Every field has a compiled-in default
/// (see the `Default` impls below) so the server runs unconfigured; a TOML
/// file only overrides what it specifies.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub limits: LimitsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            network: NetworkConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub motd: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            name: "server".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            motd: "Welcome to the IRC Server!".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_connections: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_address: "::".to_owned(),
            port: 6667,
            max_connections: 4096,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_channels_per_user: usize,
    pub max_message_length: usize,

    // Security & anti-flood.
    pub unregistered_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub reconnect_cooldown_secs: u64,
    pub disconnect_retention_secs: u64,
    pub sweeper_interval_secs: u64,

    pub max_channel_name_length: Option<usize>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_channels_per_user: 64,
            max_message_length: 512,
            unregistered_timeout_secs: 60,
            read_timeout_secs: 300,
            reconnect_cooldown_secs: 8,
            disconnect_retention_secs: 600,
            sweeper_interval_secs: 30,
            max_channel_name_length: None,
        }
    }
}

impl Config {
    /// Loads and parses the TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Helper to get channel name length with a hard fallback to RFC 2812 standard (200).
    pub fn get_max_channel_name_length(&self) -> usize {
        self.limits.max_channel_name_length.unwrap_or(200)
    }
}
