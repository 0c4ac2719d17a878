pub mod catalog_service;
pub mod download_manager;
pub mod filter_engine;
pub mod release_calendar;

pub use catalog_service::CatalogService;
pub use download_manager::DownloadManager;
