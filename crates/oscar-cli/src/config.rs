//! Configuration file support
//!
//! ```toml
//! [receive]
//! bind = "0.0.0.0:9000"
//! workers = 4
//! queue_capacity = 100
//! strict_routing = false
//! patterns = ["/test", "/test/a"]
//! ```

use anyhow::{Context, Result};
use oscar_server::ListenerConfig;
use serde::Deserialize;
use std::path::Path;

/// Patterns registered by `receive` when none are configured
pub const DEFAULT_PATTERNS: &[&str] = &["/test", "/test/a", "/test/b", "/test/c"];

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub receive: ReceiveConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiveConfig {
    pub bind: String,
    pub workers: usize,
    pub queue_capacity: usize,
    pub max_datagram_size: usize,
    pub strict_routing: bool,
    pub patterns: Vec<String>,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        let listener = ListenerConfig::default();
        Self {
            bind: "127.0.0.1:0".to_string(),
            workers: 1,
            queue_capacity: listener.queue_capacity,
            max_datagram_size: listener.max_datagram_size,
            strict_routing: listener.strict_routing,
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl ReceiveConfig {
    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig::default()
            .workers(self.workers)
            .queue_capacity(self.queue_capacity)
            .max_datagram_size(self.max_datagram_size)
            .strict_routing(self.strict_routing)
    }
}

impl Config {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::parse(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
