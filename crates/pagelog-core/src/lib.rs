// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the pagelog error telemetry collector.
//!
//! This crate holds the I/O-free half of the collector and is shared by the
//! `pagelog` SDK and anything that consumes its records:
//! - [`ErrorRecord`]: the canonical payload for one captured incident
//! - raw signal shapes from the host's error surfaces and their normalization
//! - browser identification from a user-agent string
//! - identity and environment validation

pub mod browser;
pub mod environment;
pub mod error;
pub mod identity;
pub mod record;
pub mod signal;

pub use browser::{identify, BrowserFamily, BrowserTag};
pub use environment::LogEnv;
pub use error::{ConfigError, Result};
pub use identity::Identity;
pub use record::{ErrorRecord, ErrorRecordBuilder, RecordType, RESERVED_KEYS};
pub use signal::{ErrorObject, RejectionEvent, RuntimeErrorEvent, Signal};
