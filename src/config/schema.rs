//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and every
//! section has defaults so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Values a request starts from before its URL and overrides are applied.
    pub defaults: RequestDefaults,

    /// Where the application is mounted.
    pub deployment: DeploymentConfig,

    /// Log filter settings.
    pub logging: LoggingConfig,
}

/// Request defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestDefaults {
    /// HTTP method (e.g., "GET").
    pub method: String,

    /// "http" or "https". The default port follows from it.
    pub scheme: String,

    /// Host name used when neither the URL nor the overrides carry one.
    pub host: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            scheme: "http".to_string(),
            host: "localhost".to_string(),
        }
    }
}

/// Deployment layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Front controller or mount prefix (e.g., "/app/index.php").
    pub base_path: Option<String>,

    /// Largest request body buffered by the server adapter, in bytes.
    pub max_payload_bytes: usize,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            max_payload_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "reqpath=info".to_string(),
        }
    }
}
