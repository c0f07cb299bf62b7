// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for session configuration.

use thiserror::Error;

/// Errors raised while validating a session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("invalid username: must be a non-empty string")]
	InvalidUsername,

	#[error("invalid password: must be a non-empty string")]
	InvalidPassword,

	#[error("invalid log environment {0:?}: expected \"production\" or \"development\"")]
	InvalidEnvironment(String),

	#[error("invalid configuration object: {0}")]
	Malformed(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<serde_json::Error> for ConfigError {
	fn from(e: serde_json::Error) -> Self {
		Self::Malformed(e.to_string())
	}
}
