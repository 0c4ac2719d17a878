use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{stream, StreamExt};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::bridge::{commands, CommandGateway};
use crate::errors::{LauncherError, Result};
use crate::models::{DownloadStatus, DownloadTask, PatchEntry};

/// Cap on one bulk-start call. The registry itself has no concurrency cap.
const MAX_BULK_STARTS: usize = 3;
const MAX_CONCURRENT_POLLS: usize = 8;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the set of in-flight and finished download tasks.
///
/// The registry is the single source of truth for rendering. Commands are
/// applied optimistically to local state the moment the backend acknowledges
/// them; the backend stays authoritative for progress and status, and each
/// successful poll replaces the local record wholesale (last poll wins). A
/// poll racing a command may briefly revert its optimistic update until the
/// backend catches up; callers must treat that flicker as expected.
#[derive(Clone)]
pub struct DownloadManager {
    gateway: CommandGateway,
    registry: Arc<Mutex<HashMap<String, DownloadTask>>>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    download_path: Arc<Mutex<Option<String>>>,
    poll_interval: Duration,
}

impl DownloadManager {
    pub fn new(gateway: CommandGateway) -> Self {
        Self {
            gateway,
            registry: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            download_path: Arc::new(Mutex::new(None)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Ask the backend to start downloading the given artifact. A non-null
    /// string reply is the task id; anything else means the backend is not
    /// reachable or refused, and nothing is registered.
    pub async fn start(&self, manifest: &str, language: &str, content: &str) -> Result<String> {
        let args = json!({
            "manifest": manifest,
            "language": language,
            "content": content,
        });
        let reply = self.gateway.dispatch(commands::START_DOWNLOAD, args).await;

        let task_id = match reply {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id,
            other => {
                tracing::warn!(
                    "start_download for {} did not yield a task id (got {:?})",
                    manifest,
                    other
                );
                return Err(LauncherError::DownloadUnavailable);
            }
        };

        let mut task = DownloadTask::pending(task_id.clone(), manifest.to_string());
        task.output_path = self.download_path();

        self.registry
            .lock()
            .map_err(|_| LauncherError::Config("download registry locked".to_string()))?
            .insert(task_id.clone(), task);

        tracing::info!("download task {} registered for {}", task_id, manifest);
        Ok(task_id)
    }

    /// Start downloads for every catalog entry carrying the requested
    /// language (and content, when the filter is non-empty), capped at three
    /// simultaneous starts. Individual failures are logged and skipped.
    pub async fn start_batch(
        &self,
        entries: &[PatchEntry],
        language: &str,
        content: &str,
    ) -> Vec<String> {
        let content_filter = content.trim().to_lowercase();
        let selected: Vec<&PatchEntry> = entries
            .iter()
            .filter(|entry| entry.languages.iter().any(|code| code == language))
            .filter(|entry| {
                content_filter.is_empty()
                    || entry.content.to_lowercase().contains(&content_filter)
            })
            .take(MAX_BULK_STARTS)
            .collect();

        let mut started = Vec::new();
        for entry in selected {
            match self.start(&entry.manifest, language, content).await {
                Ok(task_id) => started.push(task_id),
                Err(err) => {
                    tracing::warn!("bulk start of {} skipped: {}", entry.version, err);
                }
            }
        }
        started
    }

    /// Fire-and-forget from the caller's perspective: the optimistic status
    /// flip happens before this returns, and a dispatch failure only leaves a
    /// log line behind.
    pub async fn pause(&self, task_id: &str) {
        let ack = self
            .gateway
            .dispatch(commands::PAUSE_DOWNLOAD, json!({ "taskId": task_id }))
            .await;
        if ack.is_none() {
            tracing::warn!("pause_download dispatch failed for {}", task_id);
            return;
        }
        self.set_status(task_id, DownloadStatus::Paused, None);
    }

    pub async fn resume(&self, task_id: &str) {
        let ack = self
            .gateway
            .dispatch(commands::RESUME_DOWNLOAD, json!({ "taskId": task_id }))
            .await;
        if ack.is_none() {
            tracing::warn!("resume_download dispatch failed for {}", task_id);
            return;
        }
        self.set_status(task_id, DownloadStatus::Downloading, None);
    }

    pub async fn cancel(&self, task_id: &str) {
        let ack = self
            .gateway
            .dispatch(commands::CANCEL_DOWNLOAD, json!({ "taskId": task_id }))
            .await;
        if ack.is_none() {
            tracing::warn!("cancel_download dispatch failed for {}", task_id);
            return;
        }
        self.set_status(
            task_id,
            DownloadStatus::Error,
            Some("Download cancelled".to_string()),
        );
    }

    /// Fetch the backend's view of one task and adopt it wholesale. Malformed
    /// or missing replies are ignored; the stale local record stands until a
    /// later poll succeeds.
    pub async fn poll(&self, task_id: &str) {
        let reply = self
            .gateway
            .dispatch(commands::GET_DOWNLOAD_PROGRESS, json!({ "taskId": task_id }))
            .await;
        let Some(value) = reply else {
            return;
        };

        let record: DownloadTask = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!("ignoring malformed progress for {}: {}", task_id, err);
                return;
            }
        };

        if let Ok(mut registry) = self.registry.lock() {
            // Don't resurrect a task that was cleaned up while the poll was
            // in flight.
            if registry.contains_key(task_id) {
                registry.insert(task_id.to_string(), record);
            }
        }
    }

    /// Drop every task in a terminal state. Local only, idempotent.
    pub fn cleanup_terminal(&self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.retain(|_, task| !task.status.is_terminal());
        }
    }

    /// Snapshot for rendering, oldest start first.
    pub fn downloads(&self) -> Vec<DownloadTask> {
        let mut tasks: Vec<DownloadTask> = match self.registry.lock() {
            Ok(registry) => registry.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        tasks.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        tasks
    }

    pub fn task(&self, task_id: &str) -> Option<DownloadTask> {
        self.registry
            .lock()
            .ok()
            .and_then(|registry| registry.get(task_id).cloned())
    }

    /// Ask the backend shell for a destination folder. A string reply is
    /// remembered and stamped onto subsequently started tasks.
    pub async fn select_download_folder(&self) -> Option<String> {
        let reply = self
            .gateway
            .dispatch(commands::SELECT_DOWNLOAD_FOLDER, json!({}))
            .await?;
        let path = reply.as_str()?.to_string();
        if let Ok(mut guard) = self.download_path.lock() {
            *guard = Some(path.clone());
        }
        Some(path)
    }

    pub fn download_path(&self) -> Option<String> {
        self.download_path.lock().ok().and_then(|guard| guard.clone())
    }

    /// Run the polling loop until aborted. Each tick snapshots the pollable
    /// tasks and issues one bounded batch without blocking the ticker.
    pub fn spawn_poller(&self) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(manager.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                manager.poll_active();
            }
        })
    }

    /// Poll every pending/downloading task that is not already being polled.
    /// Ids are marked in flight synchronously, so a poll that outlives the
    /// next tick is skipped rather than doubled. Returns a handle to the
    /// spawned batch, `None` when there was nothing to poll.
    pub fn poll_active(&self) -> Option<JoinHandle<()>> {
        let snapshot: Vec<String> = match self.registry.lock() {
            Ok(registry) => registry
                .iter()
                .filter(|(_, task)| task.status.is_pollable())
                .map(|(id, _)| id.clone())
                .collect(),
            Err(_) => return None,
        };
        if snapshot.is_empty() {
            return None;
        }

        let batch: Vec<String> = match self.in_flight.lock() {
            Ok(mut in_flight) => snapshot
                .into_iter()
                .filter(|id| in_flight.insert(id.clone()))
                .collect(),
            Err(_) => return None,
        };
        if batch.is_empty() {
            return None;
        }

        let manager = self.clone();
        Some(tokio::spawn(async move {
            stream::iter(batch)
                .for_each_concurrent(MAX_CONCURRENT_POLLS, |task_id| {
                    let manager = manager.clone();
                    async move {
                        manager.poll(&task_id).await;
                        if let Ok(mut in_flight) = manager.in_flight.lock() {
                            in_flight.remove(&task_id);
                        }
                    }
                })
                .await;
        }))
    }

    fn set_status(&self, task_id: &str, status: DownloadStatus, error: Option<String>) {
        if let Ok(mut registry) = self.registry.lock() {
            if let Some(task) = registry.get_mut(task_id) {
                task.status = status;
                if error.is_some() {
                    task.error = error;
                }
            }
        }
    }
}
