//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default maximum accepted upload size (20 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 20 * 1024 * 1024;

/// Default accepted file extension.
pub const DEFAULT_ACCEPTED_EXTENSION: &str = "xls";

/// Default subject line for upload-result notifications.
pub const DEFAULT_NOTIFY_SUBJECT: &str = "File upload result";

/// Default initiator identity when the upload carries none.
pub const DEFAULT_SYSTEM_IDENTITY: &str = "system@localhost";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
    pub notify: NotifyConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Ingestion limits applied by the validation chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Uploads larger than this are rejected with a 400-coded diagnostic.
    pub max_file_size_bytes: u64,
    /// Filename extension accepted by the validation chain (no leading dot).
    pub accepted_extension: String,
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Default report recipients. The per-ingestion recipient set is the
    /// initiator identity followed by this list.
    pub recipients: Vec<String>,
    /// Subject line used for every upload-result notification.
    pub subject: String,
    /// When set, reports are delivered by POSTing to this URL; otherwise
    /// deliveries go to the log transport.
    pub webhook_url: Option<String>,
    /// Initiator identity assumed when the upload carries none.
    pub system_identity: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("XLGATE_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("XLGATE_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("XLGATE_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            ingest: IngestConfig {
                max_file_size_bytes: std::env::var("XLGATE_MAX_FILE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_FILE_SIZE_BYTES),
                accepted_extension: std::env::var("XLGATE_ACCEPTED_EXTENSION")
                    .unwrap_or_else(|_| DEFAULT_ACCEPTED_EXTENSION.to_string()),
            },
            notify: NotifyConfig {
                recipients: std::env::var("XLGATE_REPORT_RECIPIENTS")
                    .map(|s| {
                        s.split(',')
                            .map(|r| r.trim().to_string())
                            .filter(|r| !r.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
                subject: std::env::var("XLGATE_NOTIFY_SUBJECT")
                    .unwrap_or_else(|_| DEFAULT_NOTIFY_SUBJECT.to_string()),
                webhook_url: std::env::var("XLGATE_NOTIFY_WEBHOOK_URL").ok(),
                system_identity: std::env::var("XLGATE_SYSTEM_IDENTITY")
                    .unwrap_or_else(|_| DEFAULT_SYSTEM_IDENTITY.to_string()),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    ///
    /// Configuration faults are the only failure class permitted to be fatal,
    /// and only here at startup; nothing in the ingestion path itself may
    /// escape as an unhandled fault.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.ingest.max_file_size_bytes == 0 {
            anyhow::bail!("Maximum file size must be greater than 0");
        }

        if self.ingest.accepted_extension.is_empty() {
            anyhow::bail!("Accepted extension cannot be empty");
        }

        if self.ingest.accepted_extension.starts_with('.') {
            anyhow::bail!("Accepted extension must not include a leading dot");
        }

        if self.notify.recipients.is_empty() {
            anyhow::bail!(
                "At least one report recipient is required (XLGATE_REPORT_RECIPIENTS)"
            );
        }

        if self.notify.system_identity.trim().is_empty() {
            anyhow::bail!("System identity cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            ingest: IngestConfig {
                max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
                accepted_extension: DEFAULT_ACCEPTED_EXTENSION.to_string(),
            },
            notify: NotifyConfig {
                // Intentionally empty: validate() rejects a recipient-less
                // deployment, so operators must configure this explicitly.
                recipients: Vec::new(),
                subject: DEFAULT_NOTIFY_SUBJECT.to_string(),
                webhook_url: None,
                system_identity: DEFAULT_SYSTEM_IDENTITY.to_string(),
            },
        }
    }
}
