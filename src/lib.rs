//! Core library for a game-client patch launcher frontend.
//!
//! The crate owns three things: ingesting the tabular patch catalog into
//! [`PatchEntry`] values, narrowing them for display, and driving download
//! tasks through the native backend behind [`bridge::CommandGateway`]. The
//! rendering shell on top consumes [`DownloadManager`] snapshots and stays
//! out of this crate.

pub mod bridge;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;

pub use bridge::{CallbackBridge, CommandBridge, CommandGateway, HttpBridge};
pub use config::CoreConfig;
pub use errors::{LauncherError, Result};
pub use models::{DownloadStatus, DownloadTask, PatchEntry, PatchFilters};
pub use services::filter_engine;
pub use services::{CatalogService, DownloadManager};
