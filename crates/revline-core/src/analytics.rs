// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead analytics over a reporting period.
//!
//! Storage hands over one [`LeadRecord`] per lead; every aggregate here is a
//! pure function of those records. Times are UTC.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, Months, Timelike, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{LeadCategory, LeadStatus, parse_timestamp};

/// Sources listed by [`top_sources`].
pub const TOP_SOURCES: usize = 10;

/// Days covered by the hour/weekday activity histogram.
pub const ACTIVITY_DAYS: i64 = 30;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Reporting window, ending now.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPeriod {
    /// Since UTC midnight.
    Day,
    #[default]
    Week,
    Month,
    All,
}

impl AnalyticsPeriod {
    /// First instant of the period ending at `now`. `None` means all time.
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Day => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => now.checked_sub_months(Months::new(1)),
            Self::All => None,
        }
    }
}

/// The slice of a lead analytics needs.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRecord {
    pub category: LeadCategory,
    pub status: LeadStatus,
    /// `metadata.kind`: `contact`, `partnership`, `telegram`.
    pub kind: Option<String>,
    pub created_at: String,
    /// Timestamp of the earliest reply, if any.
    pub first_reply_at: Option<String>,
}

impl LeadRecord {
    fn is_partnership(&self) -> bool {
        self.kind.as_deref() == Some("partnership")
    }

    fn answered(&self) -> bool {
        self.first_reply_at.is_some()
            || matches!(self.status, LeadStatus::Replied | LeadStatus::Completed)
    }

    fn response_minutes(&self) -> Option<f64> {
        let created = parse_timestamp(&self.created_at)?;
        let replied = parse_timestamp(self.first_reply_at.as_deref()?)?;
        let ms = (replied - created).num_milliseconds().max(0);
        Some(ms as f64 / 60_000.0)
    }
}

/// Lead volume for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStats {
    pub period: AnalyticsPeriod,
    pub total_messages: u64,
    pub partnership_requests: u64,
    pub messages_by_status: BTreeMap<String, u64>,
    pub messages_by_category: BTreeMap<String, u64>,
}

impl BasicStats {
    pub fn status_count(&self, status: LeadStatus) -> u64 {
        self.messages_by_status
            .get(&status.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn category_count(&self, category: LeadCategory) -> u64 {
        self.messages_by_category
            .get(&category.to_string())
            .copied()
            .unwrap_or(0)
    }
}

/// How many leads got an answer and how many were closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    pub total: u64,
    pub answered: u64,
    pub completed: u64,
    /// Answered leads, percent of total.
    pub conversion_rate: u32,
    /// Completed leads, percent of total.
    pub completion_rate: u32,
}

/// When leads arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// 24 buckets, index = UTC hour.
    pub hourly: Vec<u64>,
    /// 7 buckets, index 0 = Sunday.
    pub daily: Vec<u64>,
    pub peak_hour: Option<usize>,
    pub peak_day: Option<&'static str>,
}

/// Minutes from a lead's arrival to its first reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStats {
    pub average_response_time: i64,
    pub median_response_time: i64,
    pub fastest_response: i64,
    pub slowest_response: i64,
    pub total_replied: u64,
}

/// Lead count per `metadata.kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

fn percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as u32
}

pub fn basic(period: AnalyticsPeriod, records: &[LeadRecord]) -> BasicStats {
    let mut by_status = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    for record in records {
        *by_status.entry(record.status.to_string()).or_insert(0) += 1;
        *by_category.entry(record.category.to_string()).or_insert(0) += 1;
    }
    BasicStats {
        period,
        total_messages: records.len() as u64,
        partnership_requests: records.iter().filter(|r| r.is_partnership()).count() as u64,
        messages_by_status: by_status,
        messages_by_category: by_category,
    }
}

pub fn conversion(records: &[LeadRecord]) -> ConversionStats {
    let total = records.len() as u64;
    let answered = records.iter().filter(|r| r.answered()).count() as u64;
    let completed = records
        .iter()
        .filter(|r| r.status == LeadStatus::Completed)
        .count() as u64;
    ConversionStats {
        total,
        answered,
        completed,
        conversion_rate: percent(answered, total),
        completion_rate: percent(completed, total),
    }
}

/// Hour-of-day and day-of-week histogram. Peaks are `None` without data;
/// ties go to the earliest bucket.
pub fn activity(records: &[LeadRecord]) -> ActivityStats {
    let mut hourly = vec![0u64; 24];
    let mut daily = vec![0u64; 7];
    for at in records.iter().filter_map(|r| parse_timestamp(&r.created_at)) {
        hourly[at.hour() as usize] += 1;
        daily[at.weekday().num_days_from_sunday() as usize] += 1;
    }
    ActivityStats {
        peak_hour: peak(&hourly),
        peak_day: peak(&daily).map(|day| WEEKDAYS[day]),
        hourly,
        daily,
    }
}

fn peak(buckets: &[u64]) -> Option<usize> {
    let max = buckets.iter().copied().max().filter(|&m| m > 0)?;
    buckets.iter().position(|&n| n == max)
}

/// Response times in whole minutes. The median is the upper one for even counts.
pub fn response_times(records: &[LeadRecord]) -> ResponseStats {
    let mut minutes: Vec<f64> = records.iter().filter_map(LeadRecord::response_minutes).collect();
    if minutes.is_empty() {
        return ResponseStats::default();
    }
    minutes.sort_by(f64::total_cmp);

    let round = |m: f64| m.round() as i64;
    let average = minutes.iter().sum::<f64>() / minutes.len() as f64;
    ResponseStats {
        average_response_time: round(average),
        median_response_time: round(minutes[minutes.len() / 2]),
        fastest_response: round(minutes[0]),
        slowest_response: round(minutes[minutes.len() - 1]),
        total_replied: minutes.len() as u64,
    }
}

/// Most common lead sources, largest first, ties by name.
pub fn top_sources(records: &[LeadRecord]) -> Vec<SourceCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for kind in records.iter().filter_map(|r| r.kind.as_deref()) {
        *counts.entry(kind).or_insert(0) += 1;
    }
    let mut sources: Vec<SourceCount> = counts
        .into_iter()
        .map(|(source, count)| SourceCount {
            source: source.to_string(),
            count,
        })
        .collect();
    sources.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    sources.truncate(TOP_SOURCES);
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(
        category: LeadCategory,
        status: LeadStatus,
        kind: &str,
        created_at: &str,
        first_reply_at: Option<&str>,
    ) -> LeadRecord {
        LeadRecord {
            category,
            status,
            kind: Some(kind.to_string()),
            created_at: created_at.to_string(),
            first_reply_at: first_reply_at.map(str::to_string),
        }
    }

    fn sample() -> Vec<LeadRecord> {
        vec![
            // Monday 2026-05-04
            record(
                LeadCategory::Auto,
                LeadStatus::Replied,
                "contact",
                "2026-05-04T09:00:00.000Z",
                Some("2026-05-04T09:30:00.000Z"),
            ),
            record(
                LeadCategory::Moto,
                LeadStatus::Completed,
                "contact",
                "2026-05-04T09:45:00.000Z",
                Some("2026-05-04T11:45:00.000Z"),
            ),
            record(
                LeadCategory::General,
                LeadStatus::New,
                "partnership",
                "2026-05-05T14:10:00.000Z",
                None,
            ),
            record(
                LeadCategory::General,
                LeadStatus::Completed,
                "telegram",
                "2026-05-06T09:05:00.000Z",
                None,
            ),
        ]
    }

    #[test]
    fn periods_start_where_expected() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 15, 20, 0).unwrap();
        assert_eq!(
            AnalyticsPeriod::Day.since(now),
            Some(Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(
            AnalyticsPeriod::Week.since(now),
            Some(Utc.with_ymd_and_hms(2026, 3, 24, 15, 20, 0).unwrap())
        );
        // Clamped to the end of February.
        assert_eq!(
            AnalyticsPeriod::Month.since(now),
            Some(Utc.with_ymd_and_hms(2026, 2, 28, 15, 20, 0).unwrap())
        );
        assert_eq!(AnalyticsPeriod::All.since(now), None);
    }

    #[test]
    fn period_names_parse_loosely() {
        assert_eq!("MONTH".parse::<AnalyticsPeriod>().unwrap(), AnalyticsPeriod::Month);
        assert_eq!(AnalyticsPeriod::default(), AnalyticsPeriod::Week);
        assert!("year".parse::<AnalyticsPeriod>().is_err());
    }

    #[test]
    fn basic_counts_by_status_and_category() {
        let stats = basic(AnalyticsPeriod::Week, &sample());
        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.partnership_requests, 1);
        assert_eq!(stats.status_count(LeadStatus::Completed), 2);
        assert_eq!(stats.status_count(LeadStatus::Archived), 0);
        assert_eq!(stats.category_count(LeadCategory::General), 2);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["period"], "week");
        assert_eq!(json["messagesByCategory"]["AUTO"], 1);
        assert_eq!(json["messagesByStatus"]["NEW"], 1);
    }

    #[test]
    fn conversion_counts_replies_and_closed_leads() {
        let stats = conversion(&sample());
        assert_eq!(
            stats,
            ConversionStats {
                total: 4,
                answered: 3,
                completed: 2,
                conversion_rate: 75,
                completion_rate: 50,
            }
        );
        assert_eq!(conversion(&[]), ConversionStats::default());
    }

    #[test]
    fn activity_finds_peak_hour_and_day() {
        let stats = activity(&sample());
        assert_eq!(stats.hourly.len(), 24);
        assert_eq!(stats.hourly[9], 3);
        assert_eq!(stats.hourly[14], 1);
        assert_eq!(stats.daily.iter().sum::<u64>(), 4);
        assert_eq!(stats.peak_hour, Some(9));
        assert_eq!(stats.peak_day, Some("Mon"));

        let empty = activity(&[]);
        assert_eq!(empty.peak_hour, None);
        assert_eq!(empty.peak_day, None);
    }

    #[test]
    fn response_times_use_first_reply() {
        let stats = response_times(&sample());
        assert_eq!(stats.total_replied, 2);
        assert_eq!(stats.fastest_response, 30);
        assert_eq!(stats.slowest_response, 120);
        assert_eq!(stats.average_response_time, 75);
        assert_eq!(stats.median_response_time, 120);

        assert_eq!(response_times(&[]), ResponseStats::default());
    }

    #[test]
    fn sources_sorted_and_capped() {
        let mut records = sample();
        for i in 0..12 {
            records.push(record(
                LeadCategory::Auto,
                LeadStatus::New,
                &format!("campaign-{i:02}"),
                "2026-05-06T10:00:00.000Z",
                None,
            ));
        }
        let sources = top_sources(&records);
        assert_eq!(sources.len(), TOP_SOURCES);
        assert_eq!(
            sources[0],
            SourceCount {
                source: "contact".into(),
                count: 2
            }
        );
        assert_eq!(sources[1].source, "campaign-00");
    }
}
