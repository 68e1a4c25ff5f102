use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    /// Ordered list of served domains; order is match precedence.
    #[serde(default)]
    pub domains: Vec<DomainEntry>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// TTL in seconds stamped on every answer record.
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    /// Receive buffer size; datagrams longer than this are truncated by the OS.
    #[serde(default = "default_max_packet_len")]
    pub max_packet_len: usize,
    /// Stay silent instead of answering NXDOMAIN for unmatched names.
    #[serde(default = "default_false")]
    pub ignore_unknown: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// One `[[domains]]` entry: an IPv4 address plus exactly one of `name`
/// (exact match) or `pattern` (regex match).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    pub address: String,
}

fn default_port() -> u16 {
    53
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_ttl() -> u32 {
    10
}
fn default_max_packet_len() -> usize {
    256
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_false() -> bool {
    false
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_packet_len: default_max_packet_len(),
            ignore_unknown: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("captive-dns.toml").exists() {
            Self::from_file("captive-dns.toml")?
        } else if std::path::Path::new("/etc/captive-dns/config.toml").exists() {
            Self::from_file("/etc/captive-dns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }
        if self.dns.max_packet_len < 12 {
            return Err(ConfigError::Validation(
                "max_packet_len must be at least the 12-byte DNS header".to_string(),
            ));
        }
        for entry in &self.domains {
            match (&entry.name, &entry.pattern) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "Domain entry for address {} must set exactly one of `name` or `pattern`",
                        entry.address
                    )))
                }
            }
            if entry.address.parse::<std::net::Ipv4Addr>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "Invalid IPv4 address: {}",
                    entry.address
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Configuration validation error: {0}")]
    Validation(String),
}
