// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead pipeline for Revline.
//!
//! Ties storage and the notification channels together: form intake with
//! fire-and-log fan-out, the operator reply loop, operator management, analytics
//! reports, the reminder/digest jobs and the Telegram bot dispatcher. HTTP concerns live
//! in `revline-gateway`; this crate only sees validated values.

pub mod analytics;
pub mod bot;
pub mod fanout;
pub mod intake;
pub mod jobs;
pub mod operators;
pub mod sanitize;
pub mod service;

pub use analytics::{Analytics, AnalyticsQuery, AnalyticsReport, FullReport, ReportKind, Summary};
pub use bot::BotHandler;
pub use fanout::{DeliveryReport, Fanout, FanoutHandle};
pub use intake::{ContactForm, PartnerType, PartnershipForm};
pub use jobs::{CronReport, CronTask, JobOutcome, JobRunner};
pub use operators::{AdminOutcome, AdminRequest, OperatorDirectory};
pub use service::{LeadPage, LeadService, ReplyOutcome, Submission};
