// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account identity copied into every record.

use std::fmt;

use zeroize::Zeroizing;

use crate::error::{ConfigError, Result};

const REDACTED: &str = "[REDACTED]";

/// Account identifier and secret sent with each record.
///
/// These are opaque payload fields; nothing in the collector authorizes
/// against them. The secret is wiped from memory on drop and never shows
/// up in `Debug` output.
#[derive(Clone)]
pub struct Identity {
	username: String,
	password: Zeroizing<String>,
}

impl Identity {
	/// Validates and builds an identity. Both parts must be non-empty.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
		let username = username.into();
		if username.is_empty() {
			return Err(ConfigError::InvalidUsername);
		}
		let password = Zeroizing::new(password.into());
		if password.is_empty() {
			return Err(ConfigError::InvalidPassword);
		}
		Ok(Self { username, password })
	}

	pub fn username(&self) -> &str {
		&self.username
	}

	/// Exposes the secret for serialization into a record.
	pub fn expose_password(&self) -> &str {
		&self.password
	}
}

impl fmt::Debug for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Identity")
			.field("username", &self.username)
			.field("password", &REDACTED)
			.finish()
	}
}
