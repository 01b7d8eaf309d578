// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email notification channel for Revline.
//!
//! New leads are rendered to a small HTML summary and sent to the sales
//! inbox for their category, either through the Resend HTTP API or a plain
//! SMTP relay. Replies from the inbox go straight to the submitter.

pub mod message;
pub mod notifier;
pub mod transport;

pub use message::OutgoingEmail;
pub use notifier::{EmailNotifier, Recipients};
pub use transport::{MailTransport, ResendTransport, SmtpTransport};
