use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Maximum time a pulse endpoint waits for the buffer lock before answering 503.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Request body limit; large enough for ~10⁵ samples with room for the rest of the payload.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Address used when neither the CLI nor the settings file names one.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8000";

/// Contents of the optional `--config` JSON file. Command-line flags win over these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    #[serde(default)]
    pub address: Option<String>,
    /// Interval for synthetic pulse chatter; absent or zero disables it.
    #[serde(default)]
    pub chatter_interval_ms: Option<u64>,
    #[serde(default)]
    pub default_bins: Option<usize>,
}

impl ServerSettings {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn chatter_interval(&self) -> Option<Duration> {
        self.chatter_interval_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}
