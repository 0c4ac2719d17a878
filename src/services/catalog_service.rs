use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::errors::{LauncherError, Result};
use crate::models::PatchEntry;
use crate::services::release_calendar;

/// Rows whose product tag differs are silently dropped.
const PRODUCT_TAG: &str = "lol";
/// Region markers identifying non-standard distribution tracks. Matched
/// case-sensitively, as the source emits them.
const SPECIAL_CHANNEL_MARKERS: [&str; 3] = ["PBE", "LIVESTAGING", "LOLTMNT"];
const MANIFEST_SUFFIX: &str = ".manifest";
const DEFAULT_LANGUAGE: &str = "en_us";
const DEFAULT_CONTENT: &str = "assets";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Loads the tabular patch catalog and turns it into `PatchEntry` values.
/// Entries are rebuilt wholesale on every fetch; nothing is cached here.
#[derive(Clone)]
pub struct CatalogService {
    client: reqwest::Client,
    source_url: String,
}

impl CatalogService {
    pub fn new(source_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .connect_timeout(Duration::from_secs(6))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, source_url }
    }

    pub async fn fetch(&self) -> Result<Vec<PatchEntry>> {
        tracing::info!("fetching patch catalog from {}", self.source_url);
        let response = self.client.get(&self.source_url).send().await?;
        if !response.status().is_success() {
            return Err(LauncherError::Http(format!(
                "catalog fetch returned {}",
                response.status()
            )));
        }
        let body = response.text().await?;
        let entries = parse_catalog(&body);
        tracing::info!("catalog loaded with {} entries", entries.len());
        Ok(entries)
    }
}

/// Parse the raw tabular source: newline records, comma-separated fields with
/// optional double-quote wrapping, header row ignored. Output keeps source
/// record order.
pub fn parse_catalog(raw: &str) -> Vec<PatchEntry> {
    let mut entries = Vec::new();
    for line in raw.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(strip_quotes).collect();
        if fields.len() < 6 || fields[0] != PRODUCT_TAG {
            continue;
        }
        let region = fields[1];
        let locator = fields[2];
        let raw_date = fields[3];
        let size_bytes = fields[5].parse::<u64>().unwrap_or(0);
        entries.push(build_entry(region, locator, raw_date, size_bytes));
    }
    entries
}

pub fn is_special_channel(region: &str) -> bool {
    SPECIAL_CHANNEL_MARKERS
        .iter()
        .any(|marker| region.contains(marker))
}

fn build_entry(region: &str, locator: &str, raw_date: &str, size_bytes: u64) -> PatchEntry {
    let special = is_special_channel(region);
    let hash = content_hash(locator);
    let timestamp = parse_timestamp(raw_date);

    let official_version = if special {
        None
    } else {
        timestamp
            .and_then(release_calendar::resolve)
            .map(str::to_string)
    };

    let version = if special {
        format!("Version {hash}")
    } else {
        official_version
            .clone()
            .unwrap_or_else(|| format!("Patch {raw_date}"))
    };

    PatchEntry {
        id: format!("{region}-{hash}"),
        version,
        official_version,
        date: raw_date.to_string(),
        timestamp,
        size_bytes,
        size: format_size_label(size_bytes),
        content: DEFAULT_CONTENT.to_string(),
        manifest: locator.to_string(),
        languages: vec![DEFAULT_LANGUAGE.to_string()],
        region: region.to_string(),
    }
}

/// Last path segment of the locator with the manifest suffix stripped;
/// `"Unknown"` when there is nothing left to identify the artifact.
pub fn content_hash(locator: &str) -> String {
    let segment = locator.rsplit('/').next().unwrap_or("");
    let hash = segment.strip_suffix(MANIFEST_SUFFIX).unwrap_or(segment);
    if hash.is_empty() {
        "Unknown".to_string()
    } else {
        hash.to_string()
    }
}

/// The source reports last-modified stamps in whatever shape its exporter
/// chose; accept the common ones and give up quietly otherwise.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&ts));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|ts| Utc.from_utc_datetime(&ts));
    }
    None
}

/// Human-readable size, binary units, one decimal place. Zero means the
/// source did not report a size; the label carries that through so the
/// display filters can keep such entries.
pub fn format_size_label(bytes: u64) -> String {
    if bytes == 0 {
        return "Unknown".to_string();
    }
    if bytes >= GIB {
        format!("{:.1} GB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn strip_quotes(field: &str) -> &str {
    let field = field.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}
