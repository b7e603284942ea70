use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SfeError};

/// How a server session schedules its per-symbol execution units.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CodingMode {
    /// One loop owns the accumulator and codes symbols in declared order.
    Sequential,
    /// One task per symbol; the connection and accumulator are handed
    /// from task `k` to task `k + 1` through a relay chain.
    Pipelined,
}

impl std::str::FromStr for CodingMode {
    type Err = SfeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sequential" => Ok(CodingMode::Sequential),
            "pipelined" => Ok(CodingMode::Pipelined),
            other => Err(SfeError::Config(format!("unknown coding mode `{}`", other))),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
    pub coding_mode: CodingMode,
    /// Reject records whose index does not match their position.
    pub enforce_sequence: bool,
    pub io_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7878,
            backlog: 256,
            coding_mode: CodingMode::Pipelined,
            enforce_sequence: true,
            io_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| SfeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = read_config_file(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(SfeError::Config("server host must not be empty".into()));
        }
        if self.backlog == 0 {
            return Err(SfeError::Config("listen backlog must be positive".into()));
        }
        validate_timeout(self.io_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the text read from standard input.
    pub max_input_bytes: usize,
    pub io_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_input_bytes: 1023,
            io_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| SfeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = read_config_file(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(SfeError::Config("server host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(SfeError::Config("server port must be non-zero".into()));
        }
        if self.max_input_bytes == 0 {
            return Err(SfeError::Config("max_input_bytes must be positive".into()));
        }
        validate_timeout(self.io_timeout_ms)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_ms.map(Duration::from_millis)
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| SfeError::Config(format!("cannot read {}: {}", path.display(), e)))
}

fn validate_timeout(timeout_ms: Option<u64>) -> Result<()> {
    match timeout_ms {
        Some(0) => Err(SfeError::Config("io_timeout_ms must be positive when set".into())),
        _ => Ok(()),
    }
}
