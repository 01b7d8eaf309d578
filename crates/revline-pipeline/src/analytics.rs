// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytics reports for the operator API and the bot.

use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use revline_core::analytics::{
    self, ACTIVITY_DAYS, ActivityStats, AnalyticsPeriod, BasicStats, ConversionStats,
    ResponseStats, SourceCount,
};
use revline_core::{RevlineError, StorageAdapter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

/// Query parameters of the analytics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Which section of the report to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportKind {
    Basic,
    Conversion,
    Activity,
    Response,
    Sources,
    #[default]
    Full,
}

fn parse_or_default<T>(raw: Option<&str>, what: &str) -> Result<T, RevlineError>
where
    T: Default + std::str::FromStr,
{
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(T::default()),
        Some(raw) => raw
            .parse()
            .map_err(|_| RevlineError::Validation(format!("Invalid {what}"))),
    }
}

impl AnalyticsQuery {
    /// Missing values select the week and the full report.
    pub fn parse(&self) -> Result<(ReportKind, AnalyticsPeriod), RevlineError> {
        Ok((
            parse_or_default(self.kind.as_deref(), "type")?,
            parse_or_default(self.period.as_deref(), "period")?,
        ))
    }
}

/// Period-bound sections used by the bot summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub stats: BasicStats,
    pub conversion: ConversionStats,
    pub response: ResponseStats,
}

/// Every section at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReport {
    pub stats: BasicStats,
    pub conversion: ConversionStats,
    pub activity: ActivityStats,
    pub response: ResponseStats,
    pub top_sources: Vec<SourceCount>,
    pub generated_at: String,
}

/// Response body of the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnalyticsReport {
    Basic(BasicStats),
    Conversion(ConversionStats),
    Activity(ActivityStats),
    Response(ResponseStats),
    Sources { sources: Vec<SourceCount> },
    Full(Box<FullReport>),
}

/// Builds reports from storage.
///
/// The activity histogram always covers the last [`ACTIVITY_DAYS`] days;
/// every other section covers the requested period.
#[derive(Clone)]
pub struct Analytics {
    storage: Arc<dyn StorageAdapter>,
}

impl Analytics {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    pub async fn report(
        &self,
        kind: ReportKind,
        period: AnalyticsPeriod,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport, RevlineError> {
        debug!(%kind, %period, "building analytics report");
        if kind == ReportKind::Activity {
            return Ok(AnalyticsReport::Activity(self.activity(now).await?));
        }

        let records = self.storage.lead_records(period.since(now)).await?;
        Ok(match kind {
            ReportKind::Basic => AnalyticsReport::Basic(analytics::basic(period, &records)),
            ReportKind::Conversion => AnalyticsReport::Conversion(analytics::conversion(&records)),
            ReportKind::Response => AnalyticsReport::Response(analytics::response_times(&records)),
            ReportKind::Sources => AnalyticsReport::Sources {
                sources: analytics::top_sources(&records),
            },
            ReportKind::Activity | ReportKind::Full => AnalyticsReport::Full(Box::new(FullReport {
                stats: analytics::basic(period, &records),
                conversion: analytics::conversion(&records),
                activity: self.activity(now).await?,
                response: analytics::response_times(&records),
                top_sources: analytics::top_sources(&records),
                generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            })),
        })
    }

    pub async fn summary(
        &self,
        period: AnalyticsPeriod,
        now: DateTime<Utc>,
    ) -> Result<Summary, RevlineError> {
        let records = self.storage.lead_records(period.since(now)).await?;
        Ok(Summary {
            stats: analytics::basic(period, &records),
            conversion: analytics::conversion(&records),
            response: analytics::response_times(&records),
        })
    }

    async fn activity(&self, now: DateTime<Utc>) -> Result<ActivityStats, RevlineError> {
        let records = self
            .storage
            .lead_records(Some(now - Duration::days(ACTIVITY_DAYS)))
            .await?;
        Ok(analytics::activity(&records))
    }
}
