use chrono::{DateTime, NaiveDate, Utc};

struct ReleaseDate {
    year: i32,
    month: u32,
    day: u32,
    version: &'static str,
}

/// Known official release dates (second Tuesday of each two-week cycle).
///
/// Scanned front to back; on overlapping windows the first declared entry
/// wins, so the declaration order below is significant. Do not re-sort.
const RELEASE_CALENDAR: &[ReleaseDate] = &[
    // 2025
    ReleaseDate { year: 2025, month: 1, day: 9, version: "25.1" },
    ReleaseDate { year: 2025, month: 1, day: 23, version: "25.2" },
    ReleaseDate { year: 2025, month: 2, day: 5, version: "25.3" },
    ReleaseDate { year: 2025, month: 2, day: 20, version: "25.4" },
    ReleaseDate { year: 2025, month: 3, day: 5, version: "25.5" },
    ReleaseDate { year: 2025, month: 3, day: 19, version: "25.6" },
    ReleaseDate { year: 2025, month: 4, day: 2, version: "25.7" },
    ReleaseDate { year: 2025, month: 4, day: 16, version: "25.8" },
    ReleaseDate { year: 2025, month: 4, day: 30, version: "25.9" },
    ReleaseDate { year: 2025, month: 5, day: 14, version: "25.10" },
    ReleaseDate { year: 2025, month: 5, day: 28, version: "25.11" },
    ReleaseDate { year: 2025, month: 6, day: 11, version: "25.12" },
    ReleaseDate { year: 2025, month: 6, day: 25, version: "25.13" },
    ReleaseDate { year: 2025, month: 7, day: 16, version: "25.14" },
    ReleaseDate { year: 2025, month: 7, day: 30, version: "25.15" },
    ReleaseDate { year: 2025, month: 8, day: 13, version: "25.16" },
    ReleaseDate { year: 2025, month: 8, day: 27, version: "25.17" },
    ReleaseDate { year: 2025, month: 9, day: 10, version: "25.18" },
    ReleaseDate { year: 2025, month: 9, day: 24, version: "25.19" },
    ReleaseDate { year: 2025, month: 10, day: 8, version: "25.20" },
    ReleaseDate { year: 2025, month: 10, day: 22, version: "25.21" },
    ReleaseDate { year: 2025, month: 11, day: 5, version: "25.22" },
    ReleaseDate { year: 2025, month: 11, day: 19, version: "25.23" },
    ReleaseDate { year: 2025, month: 12, day: 10, version: "25.24" },
    // 2024
    ReleaseDate { year: 2024, month: 1, day: 10, version: "24.1" },
    ReleaseDate { year: 2024, month: 1, day: 24, version: "24.2" },
    ReleaseDate { year: 2024, month: 2, day: 7, version: "24.3" },
    ReleaseDate { year: 2024, month: 2, day: 21, version: "24.4" },
    ReleaseDate { year: 2024, month: 3, day: 6, version: "24.5" },
    ReleaseDate { year: 2024, month: 3, day: 20, version: "24.6" },
    ReleaseDate { year: 2024, month: 4, day: 3, version: "24.7" },
    ReleaseDate { year: 2024, month: 4, day: 17, version: "24.8" },
    ReleaseDate { year: 2024, month: 5, day: 1, version: "24.9" },
    ReleaseDate { year: 2024, month: 5, day: 15, version: "24.10" },
    ReleaseDate { year: 2024, month: 5, day: 29, version: "24.11" },
    ReleaseDate { year: 2024, month: 6, day: 12, version: "24.12" },
    ReleaseDate { year: 2024, month: 6, day: 26, version: "24.13" },
    ReleaseDate { year: 2024, month: 7, day: 17, version: "24.14" },
    ReleaseDate { year: 2024, month: 7, day: 31, version: "24.15" },
    ReleaseDate { year: 2024, month: 8, day: 14, version: "24.16" },
    ReleaseDate { year: 2024, month: 8, day: 28, version: "24.17" },
    ReleaseDate { year: 2024, month: 9, day: 11, version: "24.18" },
    ReleaseDate { year: 2024, month: 9, day: 25, version: "24.19" },
    ReleaseDate { year: 2024, month: 10, day: 9, version: "24.20" },
    ReleaseDate { year: 2024, month: 10, day: 23, version: "24.21" },
    ReleaseDate { year: 2024, month: 11, day: 6, version: "24.22" },
    ReleaseDate { year: 2024, month: 11, day: 20, version: "24.23" },
    ReleaseDate { year: 2024, month: 12, day: 11, version: "24.24" },
    // 2023
    ReleaseDate { year: 2023, month: 1, day: 11, version: "23.1" },
    ReleaseDate { year: 2023, month: 1, day: 25, version: "23.2" },
    ReleaseDate { year: 2023, month: 2, day: 8, version: "23.3" },
    ReleaseDate { year: 2023, month: 2, day: 22, version: "23.4" },
    ReleaseDate { year: 2023, month: 3, day: 8, version: "23.5" },
    ReleaseDate { year: 2023, month: 3, day: 22, version: "23.6" },
    ReleaseDate { year: 2023, month: 4, day: 5, version: "23.7" },
    ReleaseDate { year: 2023, month: 4, day: 19, version: "23.8" },
    ReleaseDate { year: 2023, month: 5, day: 3, version: "23.9" },
    ReleaseDate { year: 2023, month: 5, day: 17, version: "23.10" },
    ReleaseDate { year: 2023, month: 5, day: 31, version: "23.11" },
    ReleaseDate { year: 2023, month: 6, day: 14, version: "23.12" },
    ReleaseDate { year: 2023, month: 6, day: 28, version: "23.13" },
    ReleaseDate { year: 2023, month: 7, day: 19, version: "23.14" },
    ReleaseDate { year: 2023, month: 8, day: 2, version: "23.15" },
    ReleaseDate { year: 2023, month: 8, day: 16, version: "23.16" },
    ReleaseDate { year: 2023, month: 8, day: 30, version: "23.17" },
    ReleaseDate { year: 2023, month: 9, day: 13, version: "23.18" },
    ReleaseDate { year: 2023, month: 9, day: 27, version: "23.19" },
    ReleaseDate { year: 2023, month: 10, day: 11, version: "23.20" },
    ReleaseDate { year: 2023, month: 10, day: 25, version: "23.21" },
    ReleaseDate { year: 2023, month: 11, day: 8, version: "23.22" },
    ReleaseDate { year: 2023, month: 11, day: 22, version: "23.23" },
    ReleaseDate { year: 2023, month: 12, day: 13, version: "23.24" },
    // 2022
    ReleaseDate { year: 2022, month: 1, day: 5, version: "22.1" },
    ReleaseDate { year: 2022, month: 1, day: 20, version: "22.2" },
    ReleaseDate { year: 2022, month: 2, day: 2, version: "22.3" },
    ReleaseDate { year: 2022, month: 2, day: 16, version: "22.4" },
    ReleaseDate { year: 2022, month: 3, day: 2, version: "22.5" },
    ReleaseDate { year: 2022, month: 3, day: 16, version: "22.6" },
    ReleaseDate { year: 2022, month: 3, day: 30, version: "22.7" },
    ReleaseDate { year: 2022, month: 4, day: 13, version: "22.8" },
    ReleaseDate { year: 2022, month: 4, day: 27, version: "22.9" },
    ReleaseDate { year: 2022, month: 5, day: 11, version: "22.10" },
    ReleaseDate { year: 2022, month: 5, day: 25, version: "22.11" },
    ReleaseDate { year: 2022, month: 6, day: 8, version: "22.12" },
    ReleaseDate { year: 2022, month: 6, day: 23, version: "22.13" },
    ReleaseDate { year: 2022, month: 7, day: 13, version: "22.14" },
    ReleaseDate { year: 2022, month: 7, day: 27, version: "22.15" },
    ReleaseDate { year: 2022, month: 8, day: 10, version: "22.16" },
    ReleaseDate { year: 2022, month: 8, day: 24, version: "22.17" },
    ReleaseDate { year: 2022, month: 9, day: 8, version: "22.18" },
    ReleaseDate { year: 2022, month: 9, day: 21, version: "22.19" },
    ReleaseDate { year: 2022, month: 10, day: 5, version: "22.20" },
    ReleaseDate { year: 2022, month: 10, day: 19, version: "22.21" },
    ReleaseDate { year: 2022, month: 11, day: 2, version: "22.22" },
    ReleaseDate { year: 2022, month: 11, day: 16, version: "22.23" },
    ReleaseDate { year: 2022, month: 12, day: 7, version: "22.24" },
];

const MATCH_WINDOW_DAYS: i64 = 3;

/// Resolve a record timestamp to an official release label. A record matches
/// the first calendar entry within three calendar days of it, inclusive.
pub fn resolve(timestamp: DateTime<Utc>) -> Option<&'static str> {
    let date = timestamp.date_naive();
    for entry in RELEASE_CALENDAR {
        let Some(official) = NaiveDate::from_ymd_opt(entry.year, entry.month, entry.day) else {
            continue;
        };
        if (date - official).num_days().abs() <= MATCH_WINDOW_DAYS {
            return Some(entry.version);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn exact_release_date_resolves() {
        assert_eq!(resolve(utc(2025, 7, 16)), Some("25.14"));
        assert_eq!(resolve(utc(2024, 12, 11)), Some("24.24"));
        assert_eq!(resolve(utc(2022, 1, 5)), Some("22.1"));
    }

    #[test]
    fn three_days_out_is_inclusive() {
        assert_eq!(resolve(utc(2025, 7, 13)), Some("25.14"));
        assert_eq!(resolve(utc(2025, 7, 19)), Some("25.14"));
    }

    #[test]
    fn four_days_out_does_not_resolve() {
        // 2025-07-20 is four days after 25.14 and eleven days from any
        // neighboring entry.
        assert_eq!(resolve(utc(2025, 7, 20)), None);
    }

    #[test]
    fn dates_outside_the_calendar_do_not_resolve() {
        assert_eq!(resolve(utc(2021, 6, 1)), None);
        assert_eq!(resolve(utc(2026, 3, 1)), None);
    }
}
