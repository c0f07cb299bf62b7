// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log environment that gates whether capture is active.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Environment a session runs in.
///
/// Capture observers are only installed in [`LogEnv::Production`]; in
/// development the host keeps its native error reporting untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEnv {
	Development,
	Production,
}

impl LogEnv {
	pub fn is_production(self) -> bool {
		matches!(self, Self::Production)
	}
}

impl fmt::Display for LogEnv {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Development => write!(f, "development"),
			Self::Production => write!(f, "production"),
		}
	}
}

impl FromStr for LogEnv {
	type Err = ConfigError;

	/// Only the exact lowercase names are accepted.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"development" => Ok(Self::Development),
			"production" => Ok(Self::Production),
			_ => Err(ConfigError::InvalidEnvironment(s.to_string())),
		}
	}
}
