//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the application.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::security::Security;

/// Root configuration for an application.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Process run settings.
    pub run: RunConfig,

    /// Public base URL of the application, used for absolute links.
    pub base_url: String,

    /// IANA time zone name (e.g. "Europe/Helsinki"). UTC when absent.
    pub location: Option<String>,

    /// Directory served under `/static/`.
    pub static_dir: PathBuf,

    /// Directory the template store reads from.
    pub template_dir: PathBuf,

    /// Security header override. The process-wide default applies when absent.
    pub security: Option<Security>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            run: RunConfig::default(),
            base_url: "http://localhost:8080".to_string(),
            location: None,
            static_dir: PathBuf::from("static"),
            template_dir: PathBuf::from("templates"),
            security: None,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// The security policy in effect: the override if present, else the default.
    pub fn security(&self) -> Security {
        self.security.clone().unwrap_or_default()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// How the server process runs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Development mode: human-readable logs.
    pub dev: bool,

    /// Grace period for in-flight requests after a shutdown signal, in seconds.
    pub shutdown_timeout_secs: u64,
}

pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

impl RunConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dev: false,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of the pretty format. Ignored in dev mode.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
