// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The configured collector instance shared by every observer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use pagelog_core::{identify, BrowserTag, ErrorRecord, Identity, LogEnv, RecordType, Signal};
use tracing::debug;

use crate::config::{LoggerOptions, SessionBuilder};
use crate::dispatch::{Delivery, DeliveryMode, Dispatcher};
use crate::error::Result;

struct SessionInner {
	identity: Identity,
	environment: LogEnv,
	user_agent: Option<String>,
	extensions: RwLock<serde_json::Map<String, serde_json::Value>>,
	dispatcher: Dispatcher,
	native_installed: AtomicBool,
	framework_installed: AtomicBool,
}

/// A configured collector.
///
/// Built once, then cloned (cheaply) into every observer. Everything except
/// the extension fields is fixed at construction; extension fields are read
/// fresh for each record so the host can update them later.
///
/// # Example
///
/// ```ignore
/// let session = Session::builder()
///     .username("acct_123")
///     .password("token")
///     .environment("production")
///     .extension("appVersion", "1.4.2")
///     .report_to("https://collector.example.com/log")
///     .build()?;
///
/// CaptureRegistrar::new(session.clone()).install(&scope);
/// session.set_extension("userId", 42);
/// ```
#[derive(Clone)]
pub struct Session {
	inner: Arc<SessionInner>,
}

impl Session {
	/// Creates a new builder for constructing a Session.
	pub fn builder() -> SessionBuilder {
		SessionBuilder::new()
	}

	/// Builds a session from the host's options object.
	pub fn from_options(options: LoggerOptions) -> Result<Self> {
		options.into_builder().build()
	}

	pub(crate) fn new(
		identity: Identity,
		environment: LogEnv,
		extensions: serde_json::Map<String, serde_json::Value>,
		user_agent: Option<String>,
		dispatcher: Dispatcher,
	) -> Self {
		Self {
			inner: Arc::new(SessionInner {
				identity,
				environment,
				user_agent,
				extensions: RwLock::new(extensions),
				dispatcher,
				native_installed: AtomicBool::new(false),
				framework_installed: AtomicBool::new(false),
			}),
		}
	}

	pub fn identity(&self) -> &Identity {
		&self.inner.identity
	}

	pub fn environment(&self) -> LogEnv {
		self.inner.environment
	}

	pub fn is_production(&self) -> bool {
		self.inner.environment.is_production()
	}

	pub fn user_agent(&self) -> Option<&str> {
		self.inner.user_agent.as_deref()
	}

	pub fn delivery_mode(&self) -> &DeliveryMode {
		self.inner.dispatcher.mode()
	}

	pub fn dispatcher(&self) -> &Dispatcher {
		&self.inner.dispatcher
	}

	/// Profiles the session's user agent.
	pub fn browser(&self) -> Option<BrowserTag> {
		self.user_agent().and_then(identify)
	}

	/// Sets an extension field included in every subsequent record.
	pub fn set_extension(&self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
		self
			.inner
			.extensions
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.insert(key.into(), value.into());
	}

	/// Removes an extension field.
	pub fn remove_extension(&self, key: &str) {
		self
			.inner
			.extensions
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.remove(key);
	}

	/// Returns a snapshot of the current extension fields.
	pub fn extensions(&self) -> serde_json::Map<String, serde_json::Value> {
		self
			.inner
			.extensions
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	/// Builds the record for one incident from the session's current state.
	pub fn build_record(&self, record_type: RecordType, signal: Signal) -> ErrorRecord {
		let builder = ErrorRecord::builder(record_type, &self.inner.identity)
			.signal(signal)
			.browser(self.browser());

		let extensions = self.inner.extensions.read().unwrap_or_else(|e| e.into_inner());
		let (builder, skipped) = builder.extensions(extensions.iter());
		drop(extensions);

		if !skipped.is_empty() {
			debug!(keys = ?skipped, "Ignoring extension fields that clash with reserved keys");
		}
		builder.build()
	}

	/// Hands a finished record to the dispatcher.
	pub fn dispatch(&self, record: ErrorRecord) -> Delivery {
		self.inner.dispatcher.dispatch(record)
	}

	/// Builds and dispatches a record in one step.
	pub fn capture(&self, record_type: RecordType, signal: Signal) -> Delivery {
		debug!(record_type = %record_type, name = %signal.name, "Captured error");
		self.dispatch(self.build_record(record_type, signal))
	}

	/// Marks native capture as installed. Returns false if it already was.
	pub(crate) fn claim_native_install(&self) -> bool {
		!self.inner.native_installed.swap(true, Ordering::SeqCst)
	}

	/// Marks framework capture as installed. Returns false if it already was.
	pub(crate) fn claim_framework_install(&self) -> bool {
		!self.inner.framework_installed.swap(true, Ordering::SeqCst)
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("identity", &self.inner.identity)
			.field("environment", &self.inner.environment)
			.field("user_agent", &self.inner.user_agent)
			.field("dispatcher", &self.inner.dispatcher)
			.finish()
	}
}
