use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::errors::{LauncherError, Result};

/// Command names understood by the native download backend.
pub mod commands {
    pub const START_DOWNLOAD: &str = "start_download";
    pub const PAUSE_DOWNLOAD: &str = "pause_download";
    pub const RESUME_DOWNLOAD: &str = "resume_download";
    pub const CANCEL_DOWNLOAD: &str = "cancel_download";
    pub const GET_DOWNLOAD_PROGRESS: &str = "get_download_progress";
    pub const SELECT_DOWNLOAD_FOLDER: &str = "select_download_folder";
}

/// One concrete way of reaching the native backend. Attachment is re-checked
/// on every dispatch: a backend that comes up after the launcher started is
/// picked up without restarting anything.
#[async_trait]
pub trait CommandBridge: Send + Sync {
    fn name(&self) -> &'static str;
    async fn is_attached(&self) -> bool;
    async fn invoke(&self, command: &str, args: Value) -> Result<Value>;
}

/// Dispatches named commands to the first attached bridge in its chain.
///
/// Failures never cross this boundary as errors: an unattached chain or a
/// failing bridge call both degrade to `None`, and callers must check for it.
/// Every attempt emits a trace event carrying a correlation id so environment
/// detection problems can be reconstructed from the log.
#[derive(Clone, Default)]
pub struct CommandGateway {
    bridges: Vec<Arc<dyn CommandBridge>>,
}

impl CommandGateway {
    pub fn new(bridges: Vec<Arc<dyn CommandBridge>>) -> Self {
        Self { bridges }
    }

    /// Standard chain: user-managed backend from the environment first, then
    /// the local sidecar.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(vec![
            Arc::new(HttpBridge::from_env(config.backend_env_key.clone())),
            Arc::new(HttpBridge::sidecar(config.sidecar_url.clone())),
        ])
    }

    pub async fn dispatch(&self, command: &str, args: Value) -> Option<Value> {
        let trace_id = Uuid::new_v4();

        let mut attached = None;
        for bridge in &self.bridges {
            if bridge.is_attached().await {
                attached = Some(bridge);
                break;
            }
        }

        let Some(bridge) = attached else {
            tracing::warn!(%trace_id, command, "no command bridge attached, returning unavailable");
            return None;
        };

        tracing::debug!(
            %trace_id,
            bridge = bridge.name(),
            command,
            args = %args,
            "dispatching backend command"
        );

        match bridge.invoke(command, args).await {
            Ok(value) => {
                tracing::debug!(%trace_id, command, "dispatch completed");
                Some(value)
            }
            Err(err) => {
                tracing::warn!(
                    %trace_id,
                    bridge = bridge.name(),
                    command,
                    error = %err,
                    "dispatch failed, degrading to unavailable"
                );
                None
            }
        }
    }
}

enum BridgeTarget {
    /// Base URL read from this env var on every attachment check.
    Env(String),
    /// Fixed base URL, attachment decided by a health probe.
    Fixed(String),
}

const HEALTH_CACHE_TTL: Duration = Duration::from_secs(5);

/// Reaches a backend over its HTTP invoke surface:
/// `POST {base}/invoke/{command}` with JSON args, JSON reply.
pub struct HttpBridge {
    name: &'static str,
    client: reqwest::Client,
    target: BridgeTarget,
    health: Mutex<Option<(Instant, bool)>>,
}

impl HttpBridge {
    fn build_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .connect_timeout(Duration::from_secs(6))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    /// Primary bridge: attached whenever the env var holds a base URL.
    pub fn from_env(env_key: String) -> Self {
        Self {
            name: "env",
            client: Self::build_client(),
            target: BridgeTarget::Env(env_key),
            health: Mutex::new(None),
        }
    }

    /// Secondary bridge: the auto-spawned local sidecar, health-probed.
    pub fn sidecar(base_url: String) -> Self {
        Self {
            name: "sidecar",
            client: Self::build_client(),
            target: BridgeTarget::Fixed(base_url),
            health: Mutex::new(None),
        }
    }

    fn base_url(&self) -> Option<String> {
        match &self.target {
            BridgeTarget::Env(key) => std::env::var(key).ok().filter(|v| !v.trim().is_empty()),
            BridgeTarget::Fixed(url) => Some(url.clone()),
        }
    }

    async fn probe_health(&self, base: &str) -> bool {
        if let Ok(guard) = self.health.lock() {
            if let Some((checked_at, healthy)) = *guard {
                if checked_at.elapsed() < HEALTH_CACHE_TTL {
                    return healthy;
                }
            }
        }

        let url = format!("{}/health", base.trim_end_matches('/'));
        let healthy = match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        };

        if let Ok(mut guard) = self.health.lock() {
            *guard = Some((Instant::now(), healthy));
        }
        healthy
    }
}

#[async_trait]
impl CommandBridge for HttpBridge {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn is_attached(&self) -> bool {
        match &self.target {
            BridgeTarget::Env(_) => self.base_url().is_some(),
            BridgeTarget::Fixed(url) => self.probe_health(url).await,
        }
    }

    async fn invoke(&self, command: &str, args: Value) -> Result<Value> {
        let base = self
            .base_url()
            .ok_or_else(|| LauncherError::Config(format!("{} bridge detached", self.name)))?;
        let url = format!("{}/invoke/{}", base.trim_end_matches('/'), command);

        let response = self.client.post(&url).json(&args).send().await?;
        if !response.status().is_success() {
            return Err(LauncherError::Http(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.json::<Value>().await?)
    }
}

pub type CommandHandler = dyn Fn(&str, &Value) -> Result<Value> + Send + Sync;

/// Internals fallback: an in-process handler standing in for the native
/// backend. Used by headless embeddings and tests.
pub struct CallbackBridge {
    handler: Arc<CommandHandler>,
}

impl CallbackBridge {
    pub fn new(handler: Arc<CommandHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl CommandBridge for CallbackBridge {
    fn name(&self) -> &'static str {
        "embedded"
    }

    async fn is_attached(&self) -> bool {
        true
    }

    async fn invoke(&self, command: &str, args: Value) -> Result<Value> {
        (self.handler)(command, &args)
    }
}
