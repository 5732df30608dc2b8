use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use crate::domain::extract_domain;
use crate::stats::{AggregatedResult, DateRange, DayStat, DomainStat, HistoryRecord};

pub const DAYS_OF_WEEK: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Number of domains kept in [`AggregatedResult::domain_stats`].
pub const TOP_DOMAIN_LIMIT: usize = 10;

/// Engagement credited for each visit. History entries carry no dwell time.
pub const MINUTES_PER_VISIT: u64 = 1;

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    visit_count: u64,
    time_spent_minutes: u64,
}

impl Tally {
    fn record_visit(&mut self) {
        self.visit_count += 1;
        self.time_spent_minutes += MINUTES_PER_VISIT;
    }
}

struct DomainBucket {
    domain: String,
    tally: Tally,
    records: Vec<HistoryRecord>,
}

/// Aggregates `records` using the local time zone for weekday bucketing.
pub fn process_history_data(records: Vec<HistoryRecord>) -> AggregatedResult {
    process_history_data_with(records, &Local, Utc::now())
}

/// Aggregates `records`, bucketing weekdays in `tz`. `now` fills the date range
/// when no record carries a usable timestamp.
pub fn process_history_data_with<Tz: TimeZone>(
    records: Vec<HistoryRecord>,
    tz: &Tz,
    now: DateTime<Utc>,
) -> AggregatedResult {
    let start_time = Instant::now();

    let mut buckets: Vec<DomainBucket> = Vec::new();
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    let mut days = [Tally::default(); 7];
    let mut min_time: Option<i64> = None;
    let mut max_time: Option<i64> = None;
    let mut skipped = 0usize;

    for record in &records {
        let Some(visit_time) = record.visit_time() else {
            skipped += 1;
            continue;
        };
        if record.url.is_empty() {
            skipped += 1;
            continue;
        }
        let Some(local) = tz.timestamp_millis_opt(visit_time).single() else {
            skipped += 1;
            continue;
        };

        let domain = extract_domain(&record.url);
        let index = *bucket_index.entry(domain.clone()).or_insert_with(|| {
            buckets.push(DomainBucket {
                domain,
                tally: Tally::default(),
                records: Vec::new(),
            });
            buckets.len() - 1
        });
        let bucket = &mut buckets[index];
        bucket.tally.record_visit();
        bucket.records.push(record.clone());

        days[local.weekday().num_days_from_sunday() as usize].record_visit();

        min_time = Some(min_time.map_or(visit_time, |t| t.min(visit_time)));
        max_time = Some(max_time.map_or(visit_time, |t| t.max(visit_time)));
    }

    let distinct_domains = buckets.len();

    // Vec::sort_by is stable, so equal counts keep first-seen order.
    buckets.sort_by(|a, b| b.tally.visit_count.cmp(&a.tally.visit_count));
    buckets.truncate(TOP_DOMAIN_LIMIT);

    let domain_stats = buckets
        .into_iter()
        .map(|bucket| DomainStat {
            domain: bucket.domain,
            visit_count: bucket.tally.visit_count,
            time_spent_minutes: bucket.tally.time_spent_minutes,
            urls: bucket.records,
        })
        .collect();

    let day_of_week_stats = DAYS_OF_WEEK
        .into_iter()
        .zip(days)
        .map(|(day, tally)| DayStat {
            day,
            visit_count: tally.visit_count,
            time_spent_minutes: tally.time_spent_minutes,
        })
        .collect();

    let to_utc = |millis: Option<i64>| {
        millis
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(now)
    };
    let date_range = DateRange {
        start: to_utc(min_time),
        end: to_utc(max_time),
    };

    info!(
        action = "complete",
        component = "aggregation",
        record_count = records.len(),
        skipped_count = skipped,
        distinct_domains,
        duration_ms = start_time.elapsed().as_millis(),
        "History aggregation completed"
    );

    AggregatedResult {
        domain_stats,
        day_of_week_stats,
        total_visits: records.len() as u64,
        date_range,
        all_history: records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp_millis()
    }

    fn visit(url: &str, millis: i64) -> HistoryRecord {
        HistoryRecord::new(url).visited_at(millis)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_groups_by_domain() {
        // 2023-10-27 is a Friday
        let records = vec![
            visit("https://www.google.com/search", at(2023, 10, 27, 10)).with_title("Google Search"),
            visit("https://www.google.com/maps", at(2023, 10, 27, 11)).with_title("Google Maps"),
            visit("https://github.com/dashboard", at(2023, 10, 27, 12)).with_title("GitHub"),
        ];

        let result = process_history_data_with(records, &Utc, now());

        assert_eq!(result.total_visits, 3);
        assert_eq!(result.domain_stats.len(), 2);
        let google = result.find_domain("www.google.com").unwrap();
        assert_eq!(google.visit_count, 2);
        assert_eq!(google.time_spent_minutes, 2);
        assert_eq!(google.urls.len(), 2);
        assert_eq!(google.urls[0].title.as_deref(), Some("Google Search"));
        assert_eq!(result.find_domain("github.com").unwrap().visit_count, 1);
        assert_eq!(result.day_of_week_stats[5].day, "Friday");
        assert_eq!(result.day_of_week_stats[5].visit_count, 3);
    }

    #[test]
    fn test_empty_history() {
        let result = process_history_data_with(Vec::new(), &Utc, now());

        assert_eq!(result.total_visits, 0);
        assert!(result.domain_stats.is_empty());
        assert!(result.all_history.is_empty());
        assert_eq!(result.day_of_week_stats.len(), 7);
        assert!(result.day_of_week_stats.iter().all(|d| d.visit_count == 0));
        assert_eq!(result.date_range.start, now());
        assert_eq!(result.date_range.end, now());
    }

    #[test]
    fn test_skipped_records_still_count_as_visits() {
        let records = vec![
            HistoryRecord::new("https://a.com/"),
            visit("", at(2023, 10, 30, 9)),
            visit("https://a.com/x", at(2023, 10, 30, 9)),
        ];

        let result = process_history_data_with(records, &Utc, now());

        assert_eq!(result.total_visits, 3);
        assert_eq!(result.all_history.len(), 3);
        let grouped: u64 = result.domain_stats.iter().map(|d| d.visit_count).sum();
        assert_eq!(grouped, 1);
        let by_day: u64 = result.day_of_week_stats.iter().map(|d| d.visit_count).sum();
        assert_eq!(by_day, 1);
    }

    #[test]
    fn test_zero_timestamp_is_not_grouped() {
        let records = vec![
            visit("https://epoch.com/", 0),
            visit("https://a.com/", at(2023, 10, 30, 9)),
        ];

        let result = process_history_data_with(records, &Utc, now());

        assert_eq!(result.total_visits, 2);
        assert_eq!(result.domain_stats.len(), 1);
        assert_eq!(result.domain_stats[0].domain, "a.com");
        assert_eq!(result.date_range.start.timestamp_millis(), at(2023, 10, 30, 9));

        let only_zero = process_history_data_with(vec![visit("https://epoch.com/", 0)], &Utc, now());
        assert!(only_zero.domain_stats.is_empty());
        assert_eq!(only_zero.date_range.start, now());
    }

    #[test]
    fn test_top_ten_sorted_with_stable_ties() {
        let mut records = Vec::new();
        for i in 0..12 {
            records.push(visit(&format!("https://site{i}.com/"), at(2023, 10, 30, 9)));
        }
        for _ in 0..3 {
            records.push(visit("https://site7.com/again", at(2023, 10, 30, 10)));
        }

        let result = process_history_data_with(records, &Utc, now());

        assert_eq!(result.domain_stats.len(), TOP_DOMAIN_LIMIT);
        assert_eq!(result.domain_stats[0].domain, "site7.com");
        assert_eq!(result.domain_stats[0].visit_count, 4);
        let rest: Vec<&str> = result.domain_stats[1..]
            .iter()
            .map(|d| d.domain.as_str())
            .collect();
        assert_eq!(
            rest,
            vec![
                "site0.com", "site1.com", "site2.com", "site3.com", "site4.com", "site5.com",
                "site6.com", "site8.com", "site9.com"
            ]
        );
        assert_eq!(result.all_history.len(), 15);
    }

    #[test]
    fn test_date_range_uses_only_timestamped_records() {
        let early = at(2023, 1, 2, 8);
        let late = at(2023, 3, 4, 20);
        let records = vec![
            visit("https://a.com/", late),
            HistoryRecord::new("https://b.com/"),
            visit("https://c.com/", early),
        ];

        let result = process_history_data_with(records, &Utc, now());

        assert_eq!(result.date_range.start.timestamp_millis(), early);
        assert_eq!(result.date_range.end.timestamp_millis(), late);
        assert_eq!(result.date_range.days_between(), 61);
    }

    #[test]
    fn test_weekday_follows_time_zone() {
        // Monday 02:00 UTC is still Sunday in New York (UTC-4 in October).
        let records = vec![visit("https://a.com/", at(2023, 10, 30, 2))];
        let tz = chrono::FixedOffset::west_opt(4 * 3600).unwrap();

        let utc = process_history_data_with(records.clone(), &Utc, now());
        let ny = process_history_data_with(records, &tz, now());

        assert_eq!(utc.day_of_week_stats[1].visit_count, 1);
        assert_eq!(ny.day_of_week_stats[0].visit_count, 1);
    }

    #[test]
    fn test_unparsable_urls_group_under_unknown() {
        let records = vec![
            visit("not a url", at(2023, 10, 30, 9)),
            visit("also/not", at(2023, 10, 30, 9)),
        ];

        let result = process_history_data_with(records, &Utc, now());

        assert_eq!(result.domain_stats.len(), 1);
        assert_eq!(result.domain_stats[0].domain, "unknown");
        assert_eq!(result.domain_stats[0].visit_count, 2);
    }
}
