// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session configuration: the host-facing options object and the builder.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pagelog_core::{ConfigError, ErrorRecord, Identity, LogEnv};
use reqwest::Url;
use serde::Deserialize;
use tracing::{info, warn};

use crate::dispatch::{DeliveryMode, Dispatcher, LocalSink, DEFAULT_REQUEST_TIMEOUT};
use crate::error::Result;
use crate::http::{HttpTransport, Transport};
use crate::session::Session;

/// Configuration object supplied by the host, usually parsed from JSON:
///
/// ```json
/// {
///   "username": "acct_123",
///   "password": "token",
///   "logEnv": "production",
///   "logExt": { "appVersion": "1.4.2" },
///   "isReport": true,
///   "reportAddress": "https://collector.example.com/log"
/// }
/// ```
///
/// The local callback cannot come from JSON; set it with
/// [`LoggerOptions::with_log_callback`].
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerOptions {
	pub username: Option<String>,
	pub password: Option<String>,
	pub log_env: Option<String>,
	pub log_ext: Option<serde_json::Map<String, serde_json::Value>>,
	pub is_report: Option<bool>,
	pub report_address: Option<String>,
	#[serde(skip)]
	pub log_callback: Option<LocalSink>,
}

impl LoggerOptions {
	/// Parses the options object from JSON.
	pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn with_log_callback<F>(mut self, callback: F) -> Self
	where
		F: Fn(ErrorRecord) + Send + Sync + 'static,
	{
		self.log_callback = Some(Arc::new(callback));
		self
	}

	/// Converts the options into a builder without validating anything yet.
	pub fn into_builder(self) -> SessionBuilder {
		let mut builder = SessionBuilder::new();
		builder.username = self.username;
		builder.password = self.password;
		builder.environment = self.log_env;
		builder.extensions = self.log_ext.unwrap_or_default();
		builder.report = self.is_report.unwrap_or(false);
		builder.report_address = self.report_address;
		builder.log_callback = self.log_callback;
		builder
	}
}

impl fmt::Debug for LoggerOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoggerOptions")
			.field("username", &self.username)
			.field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
			.field("log_env", &self.log_env)
			.field("log_ext", &self.log_ext)
			.field("is_report", &self.is_report)
			.field("report_address", &self.report_address)
			.field("log_callback", &self.log_callback.is_some())
			.finish()
	}
}

/// Builder for constructing a [`Session`].
pub struct SessionBuilder {
	username: Option<String>,
	password: Option<String>,
	environment: Option<String>,
	extensions: serde_json::Map<String, serde_json::Value>,
	report: bool,
	report_address: Option<String>,
	log_callback: Option<LocalSink>,
	user_agent: Option<String>,
	request_timeout: Duration,
	transport: Option<Arc<dyn Transport>>,
}

impl SessionBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			username: None,
			password: None,
			environment: None,
			extensions: serde_json::Map::new(),
			report: false,
			report_address: None,
			log_callback: None,
			user_agent: None,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			transport: None,
		}
	}

	/// Sets the account identifier sent with every record.
	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());
		self
	}

	/// Sets the account secret sent with every record.
	pub fn password(mut self, password: impl Into<String>) -> Self {
		self.password = Some(password.into());
		self
	}

	/// Sets the environment name: `production` or `development`.
	pub fn environment(mut self, env: impl Into<String>) -> Self {
		self.environment = Some(env.into());
		self
	}

	/// Adds a field merged into every record.
	pub fn extension(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.extensions.insert(key.into(), value.into());
		self
	}

	/// Turns remote delivery on or off. When on, the local callback is unused.
	pub fn report(mut self, enabled: bool) -> Self {
		self.report = enabled;
		self
	}

	/// Enables remote delivery to `address`.
	pub fn report_to(mut self, address: impl Into<String>) -> Self {
		self.report = true;
		self.report_address = Some(address.into());
		self
	}

	/// Delivers records to `callback` while remote delivery is off.
	pub fn log_callback<F>(mut self, callback: F) -> Self
	where
		F: Fn(ErrorRecord) + Send + Sync + 'static,
	{
		self.log_callback = Some(Arc::new(callback));
		self
	}

	/// Sets the user-agent string profiled into `browserInfo`.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());
		self
	}

	/// Sets the bound on a single remote delivery. Defaults to 3 seconds.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Replaces the HTTP transport used for remote delivery.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Validates the configuration and builds the session.
	///
	/// Fails on a missing or empty username or password, or an unknown
	/// environment, checked in that order. An unusable delivery setup is not
	/// an error: the session is built and records are dropped.
	pub fn build(self) -> Result<Session> {
		let identity = Identity::new(
			self.username.unwrap_or_default(),
			self.password.unwrap_or_default(),
		)?;
		let environment: LogEnv = self.environment.unwrap_or_default().parse()?;

		let (mode, transport) = if self.report {
			let endpoint = parse_endpoint(self.report_address.as_deref());
			// Development sessions never send, so they never need a client.
			let transport = match (self.transport, &endpoint) {
				(Some(transport), _) => Some(transport),
				(None, Some(_)) if environment.is_production() => {
					Some(Arc::new(HttpTransport::new(self.request_timeout)?) as Arc<dyn Transport>)
				}
				(None, _) => None,
			};
			(DeliveryMode::Remote { endpoint }, transport)
		} else {
			(
				DeliveryMode::Local {
					sink: self.log_callback,
				},
				None,
			)
		};

		if environment.is_production() && !mode.is_deliverable() {
			warn!(mode = ?mode, "Delivery is not configured; captured errors will be dropped");
		}

		info!(
			environment = %environment,
			mode = ?mode,
			extensions = self.extensions.len(),
			"Error telemetry session initialized"
		);

		let dispatcher = Dispatcher::new(mode, transport, self.request_timeout);
		Ok(Session::new(
			identity,
			environment,
			self.extensions,
			self.user_agent,
			dispatcher,
		))
	}
}

impl Default for SessionBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn parse_endpoint(address: Option<&str>) -> Option<Url> {
	let Some(address) = address else {
		warn!("Reporting is enabled but no report address was given");
		return None;
	};
	match Url::parse(address) {
		Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
		Ok(url) => {
			warn!(scheme = url.scheme(), "Report address must be http or https");
			None
		}
		Err(e) => {
			warn!(error = %e, "Invalid report address");
			None
		}
	}
}
