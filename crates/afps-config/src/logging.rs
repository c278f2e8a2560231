use serde::{Deserialize, Serialize};

/// `tracing_subscriber::EnvFilter` directive string, overridable by the
/// `AFPS_LOG` environment variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "afps=info,warn".to_owned(),
        }
    }
}
