use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discoverable patch artifact, built fresh on every catalog load.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PatchEntry {
    /// Unique within one catalog load: `{region}-{content hash}`.
    pub id: String,
    /// Label shown to the user: an official version, `Version {hash}` for
    /// special channels, or `Patch {date}` when calendar resolution failed.
    pub version: String,
    /// Present only for standard-channel entries whose last-modified date
    /// falls inside the release-calendar window.
    pub official_version: Option<String>,
    /// Raw last-modified value as reported by the source.
    pub date: String,
    /// Parsed form of `date`; `None` when the source value is unparseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub size: String,
    pub content: String,
    /// Opaque locator handed to the backend verbatim.
    pub manifest: String,
    pub languages: Vec<String>,
    pub region: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Paused,
    Completed,
    Error,
}

impl DownloadStatus {
    /// Terminal states accept no further transitions except removal.
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Error)
    }

    /// Only pending and downloading tasks are worth polling.
    pub fn is_pollable(self) -> bool {
        matches!(self, DownloadStatus::Pending | DownloadStatus::Downloading)
    }
}

/// One user-initiated download. The in-memory registry owns these; the backend
/// is authoritative for progress/speed/eta/status once the task exists, and a
/// successful poll replaces the whole record.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTask {
    pub id: String,
    pub manifest: String,
    /// Display label; empty until the backend fills it in.
    #[serde(default)]
    pub version: String,
    pub status: DownloadStatus,
    pub progress: f64,
    #[serde(default)]
    pub speed: String,
    #[serde(default)]
    pub eta: String,
    #[serde(default)]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl DownloadTask {
    /// Fresh local record registered right after the backend acknowledged a
    /// start command. Metrics stay zeroed until the first poll.
    pub fn pending(id: String, manifest: String) -> Self {
        Self {
            id,
            manifest,
            version: String::new(),
            status: DownloadStatus::Pending,
            progress: 0.0,
            speed: "0 MB/s".to_string(),
            eta: "--".to_string(),
            error: None,
            started_at: Utc::now(),
            completed_at: None,
            output_path: None,
        }
    }
}

/// Conjunctive display filters; an unset field matches everything.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PatchFilters {
    pub search: Option<String>,
    pub version: Option<String>,
    pub region: Option<String>,
    pub content: Option<String>,
    pub language: Option<String>,
    pub size: Option<String>,
}
