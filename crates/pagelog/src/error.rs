// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the pagelog SDK.

use std::time::Duration;

use pagelog_core::ConfigError;
use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, PagelogError>;

/// Errors that can occur in the SDK.
///
/// Only [`PagelogError::Config`] ever reaches the host: delivery failures are
/// logged and dropped inside the dispatcher.
#[derive(Debug, Error)]
pub enum PagelogError {
	/// The session configuration was rejected.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Collector returned a non-success status.
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Response body, if any.
		message: String,
	},

	/// Delivery did not finish within the configured timeout.
	#[error("delivery timed out after {0:?}")]
	Timeout(Duration),

	/// Failed to serialize a record.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
