// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Revline integration tests.
//!
//! - [`MockMessenger`] captures chat messages and callback answers
//! - [`RecordingChannel`] and [`FailingChannel`] stand in for notifiers
//! - [`TestHarness`] assembles the pipeline over a temp SQLite database

pub mod harness;
pub mod mock_channel;
pub mod mock_messenger;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_channel::{FailingChannel, FailureMode, RecordingChannel};
pub use mock_messenger::{AnsweredCallback, MockMessenger, SentMessage};
