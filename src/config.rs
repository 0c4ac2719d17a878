use std::time::Duration;

/// Runtime configuration for the launcher core. Defaults suit a locally
/// spawned backend sidecar; every knob can be overridden through the
/// environment so a shell embedding this crate does not need a config file.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    /// HTTP(S) location of the tabular patch catalog.
    pub catalog_url: String,
    /// Env var consulted on every dispatch for a user-managed backend URL.
    /// The variable may appear after startup; attachment is re-checked per call.
    pub backend_env_key: String,
    /// Base URL of the auto-spawned local backend sidecar.
    pub sidecar_url: String,
    pub poll_interval: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            catalog_url: "http://127.0.0.1:8077/catalog.csv".to_string(),
            backend_env_key: "PATCHDECK_BACKEND_URL".to_string(),
            sidecar_url: "http://127.0.0.1:8077".to_string(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("PATCHDECK_CATALOG_URL") {
            config.catalog_url = url;
        }
        if let Ok(port) = std::env::var("PATCHDECK_SIDECAR_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.sidecar_url = format!("http://127.0.0.1:{port}");
            }
        }
        if let Ok(interval) = std::env::var("PATCHDECK_POLL_INTERVAL_MS") {
            if let Ok(ms) = interval.parse::<u64>() {
                config.poll_interval = Duration::from_millis(ms.max(100));
            }
        }
        config
    }
}
