use std::collections::HashMap;

use crate::models::{PatchEntry, PatchFilters};
use crate::services::catalog_service::is_special_channel;

/// Narrow a catalog for display: conjunctive predicate filters, optional
/// live-only and complete-only modes, then one entry per
/// `(display version, region)` pair, newest first.
///
/// Deterministic for identical inputs and `preferred_region`.
pub fn apply(
    entries: &[PatchEntry],
    filters: &PatchFilters,
    include_special: bool,
    complete_only: bool,
    preferred_region: &str,
) -> Vec<PatchEntry> {
    let survivors: Vec<&PatchEntry> = entries
        .iter()
        .filter(|entry| matches_filters(entry, filters))
        .filter(|entry| include_special || is_live_release(entry))
        .filter(|entry| !complete_only || is_complete_size(&entry.size))
        .collect();

    // Group by (version, region) preserving first-encounter order, so the
    // stable pick on ties is well defined.
    let mut groups: Vec<Vec<&PatchEntry>> = Vec::new();
    let mut group_index: HashMap<(String, String), usize> = HashMap::new();
    for entry in survivors {
        let key = (entry.version.clone(), entry.region.clone());
        match group_index.get(&key) {
            Some(&index) => groups[index].push(entry),
            None => {
                group_index.insert(key, groups.len());
                groups.push(vec![entry]);
            }
        }
    }

    let mut deduped: Vec<PatchEntry> = groups
        .iter()
        .map(|group| select_from_group(group, preferred_region).clone())
        .collect();

    // Newest first; entries without a parseable timestamp sink to the end.
    deduped.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    deduped
}

fn populated(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn matches_filters(entry: &PatchEntry, filters: &PatchFilters) -> bool {
    if let Some(version) = populated(&filters.version) {
        if !entry.version.contains(version) {
            return false;
        }
    }
    if let Some(size) = populated(&filters.size) {
        if !entry.size.contains(size) {
            return false;
        }
    }
    if let Some(content) = populated(&filters.content) {
        if !entry
            .content
            .to_lowercase()
            .contains(&content.to_lowercase())
        {
            return false;
        }
    }
    if let Some(language) = populated(&filters.language) {
        if !entry.languages.iter().any(|code| code.contains(language)) {
            return false;
        }
    }
    if let Some(region) = populated(&filters.region) {
        if !entry.region.contains(region) {
            return false;
        }
    }
    if let Some(search) = populated(&filters.search) {
        let term = search.to_lowercase();
        let hit = entry.version.to_lowercase().contains(&term)
            || entry.content.to_lowercase().contains(&term)
            || entry.manifest.to_lowercase().contains(&term);
        if !hit {
            return false;
        }
    }
    true
}

/// Live-only mode keeps only standard entries that resolved against the
/// release calendar; special channels are out regardless of their dates.
fn is_live_release(entry: &PatchEntry) -> bool {
    !is_special_channel(&entry.region) && entry.official_version.is_some()
}

/// Complete-only mode drops small artifacts by their size label: KB-scale is
/// always out, MB-scale needs at least 10, GB-scale is always in, and labels
/// without a recognizable unit (Unknown, raw bytes) are kept.
fn is_complete_size(label: &str) -> bool {
    let lower = label.to_lowercase();
    if lower.contains("gb") {
        true
    } else if lower.contains("mb") {
        lower
            .replace("mb", "")
            .trim()
            .parse::<f64>()
            .map(|value| value >= 10.0)
            .unwrap_or(false)
    } else {
        !lower.contains("kb")
    }
}

fn select_from_group<'a>(group: &[&'a PatchEntry], preferred_region: &str) -> &'a PatchEntry {
    if let Some(preferred) = group.iter().find(|entry| entry.region == preferred_region) {
        return preferred;
    }
    let mut best = group[0];
    for candidate in &group[1..] {
        if candidate.timestamp > best.timestamp {
            best = candidate;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog_service::{format_size_label, parse_timestamp};

    fn entry(version: &str, region: &str, date: &str, size_bytes: u64) -> PatchEntry {
        let timestamp = parse_timestamp(date);
        PatchEntry {
            id: format!("{region}-{version}-{date}"),
            version: version.to_string(),
            official_version: version
                .chars()
                .next()
                .filter(char::is_ascii_digit)
                .map(|_| version.to_string()),
            date: date.to_string(),
            timestamp,
            size_bytes,
            size: format_size_label(size_bytes),
            content: "assets".to_string(),
            manifest: format!("http://cdn/channels/public/{region}-{version}.manifest"),
            languages: vec!["en_us".to_string()],
            region: region.to_string(),
        }
    }

    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;

    #[test]
    fn predicates_are_conjunctive() {
        let entries = vec![
            entry("25.14", "EUW1", "2025-07-16 10:00:00", 2 * GB),
            entry("25.14", "NA1", "2025-07-16 10:00:00", 2 * GB),
            entry("25.12", "EUW1", "2025-06-11 10:00:00", 2 * GB),
        ];
        let filters = PatchFilters {
            version: Some("25.14".to_string()),
            region: Some("EUW".to_string()),
            ..Default::default()
        };
        let result = apply(&entries, &filters, true, false, "EUW1");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].region, "EUW1");
        assert_eq!(result[0].version, "25.14");
    }

    #[test]
    fn search_covers_version_content_and_locator() {
        let entries = vec![
            entry("25.14", "EUW1", "2025-07-16 10:00:00", 2 * GB),
            entry("25.12", "NA1", "2025-06-11 10:00:00", 2 * GB),
        ];
        let filters = PatchFilters {
            search: Some("na1-25.12".to_string()),
            ..Default::default()
        };
        let result = apply(&entries, &filters, true, false, "EUW1");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].region, "NA1");
    }

    #[test]
    fn live_only_drops_special_and_uncalendared_entries() {
        let mut unmatched = entry("Patch 2025-07-20", "EUW1", "2025-07-20 10:00:00", 2 * GB);
        unmatched.official_version = None;
        let entries = vec![
            entry("25.14", "EUW1", "2025-07-16 10:00:00", 2 * GB),
            entry("Version F00D", "PBE1", "2025-07-16 10:00:00", 2 * GB),
            unmatched,
        ];
        let result = apply(&entries, &PatchFilters::default(), false, false, "EUW1");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].version, "25.14");
    }

    #[test]
    fn complete_only_size_thresholds() {
        let entries = vec![
            entry("25.14", "EUW1", "2025-07-16 10:00:00", (9.9 * MB as f64) as u64),
            entry("25.12", "EUW1", "2025-06-11 10:00:00", 10 * MB),
            entry("25.10", "EUW1", "2025-05-14 10:00:00", 2048),
            entry("25.8", "EUW1", "2025-04-16 10:00:00", (1.2 * GB as f64) as u64),
            entry("25.6", "EUW1", "2025-03-19 10:00:00", 0),
        ];
        let result = apply(&entries, &PatchFilters::default(), true, true, "EUW1");
        let versions: Vec<&str> = result.iter().map(|e| e.version.as_str()).collect();
        assert!(versions.contains(&"25.12"), "10.0 MB entry must survive");
        assert!(versions.contains(&"25.8"), "GB entry must survive");
        assert!(versions.contains(&"25.6"), "Unknown size must survive");
        assert!(!versions.contains(&"25.14"), "9.9 MB entry must be dropped");
        assert!(!versions.contains(&"25.10"), "KB entry must be dropped");
    }

    #[test]
    fn dedup_keeps_one_entry_per_version_region_pair() {
        let entries = vec![
            entry("25.14", "EUW1", "2025-07-16 10:00:00", 2 * GB),
            entry("25.14", "EUW1", "2025-07-17 10:00:00", 3 * GB),
        ];
        let result = apply(&entries, &PatchFilters::default(), true, false, "NA1");
        assert_eq!(result.len(), 1);
        // Neither matches the preferred region, so recency decides.
        assert_eq!(result[0].date, "2025-07-17 10:00:00");
    }

    #[test]
    fn preferred_region_beats_recency_inside_a_group() {
        let entries = vec![
            entry("25.14", "EUW1", "2025-07-16 10:00:00", 2 * GB),
            entry("25.14", "EUW1", "2025-07-17 10:00:00", 3 * GB),
        ];
        let result = apply(&entries, &PatchFilters::default(), true, false, "EUW1");
        assert_eq!(result.len(), 1);
        // First-encountered preferred-region entry wins even though the
        // second one is newer.
        assert_eq!(result[0].date, "2025-07-16 10:00:00");
    }

    #[test]
    fn output_is_sorted_newest_first_with_unparsed_dates_last() {
        let entries = vec![
            entry("25.12", "EUW1", "2025-06-11 10:00:00", 2 * GB),
            entry("Patch garbled", "NA1", "garbled", 2 * GB),
            entry("25.14", "EUW1", "2025-07-16 10:00:00", 2 * GB),
        ];
        let result = apply(&entries, &PatchFilters::default(), true, false, "EUW1");
        let versions: Vec<&str> = result.iter().map(|e| e.version.as_str()).collect();
        assert_eq!(versions, vec!["25.14", "25.12", "Patch garbled"]);
    }

    #[test]
    fn empty_filter_strings_match_everything() {
        let entries = vec![entry("25.14", "EUW1", "2025-07-16 10:00:00", 2 * GB)];
        let filters = PatchFilters {
            search: Some(String::new()),
            version: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(apply(&entries, &filters, true, false, "EUW1").len(), 1);
    }
}
