// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error surfaces the collector observes, and in-process implementations.
//!
//! The collector never reaches for a global hook slot. Hosts hand it a
//! [`GlobalScope`] (uncaught errors and unhandled rejections) and optionally
//! an [`ExternalErrorSource`] (a UI framework's own error propagation), and
//! the registrar attaches listeners to them. Listeners are additive, so
//! several collectors, or a collector and the host's own handlers, can
//! observe the same scope.

use std::sync::{Arc, Mutex};

use pagelog_core::{ErrorObject, RejectionEvent, RuntimeErrorEvent};
use tracing::{error, warn};

use crate::plugin::{ComponentLogger, Framework};

/// Target for the default reports emitted when nothing handles an error.
pub const CONSOLE_TARGET: &str = "pagelog::console";

/// Whether a listener took over reporting of a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
	/// Suppress the scope's default error report.
	Yes,
	No,
}

pub type ErrorListener = Arc<dyn Fn(&RuntimeErrorEvent) -> Handled + Send + Sync>;
pub type RejectionListener = Arc<dyn Fn(&RejectionEvent) + Send + Sync>;
/// Receives an error caught by a framework and where it was caught.
pub type ExternalErrorHandler = Arc<dyn Fn(&ErrorObject, &str) + Send + Sync>;

/// The page-global error surfaces.
pub trait GlobalScope {
	/// User-agent string of the execution environment, if it has one.
	fn user_agent(&self) -> Option<String>;

	/// Registers a listener for uncaught synchronous errors.
	fn add_error_listener(&self, listener: ErrorListener);

	/// Registers a listener for rejections nobody handled.
	fn add_rejection_listener(&self, listener: RejectionListener);
}

/// Any host component that can report `(error, context)` pairs it caught
/// before they reached the global scope.
pub trait ExternalErrorSource {
	fn set_error_handler(&self, handler: ExternalErrorHandler);
}

/// In-process [`GlobalScope`].
///
/// Hosts that are not browsers, and tests, raise errors through it
/// directly. An error no listener handles is reported at `error!` level on
/// [`CONSOLE_TARGET`], the way a browser prints uncaught errors.
#[derive(Default)]
pub struct LocalScope {
	user_agent: Option<String>,
	error_listeners: Mutex<Vec<ErrorListener>>,
	rejection_listeners: Mutex<Vec<RejectionListener>>,
}

impl LocalScope {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
		Self {
			user_agent: Some(user_agent.into()),
			..Default::default()
		}
	}

	/// Fires an uncaught runtime error at every listener.
	pub fn raise(&self, event: RuntimeErrorEvent) -> Handled {
		// Snapshot so listeners may register further listeners.
		let listeners = self
			.error_listeners
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone();

		let mut handled = Handled::No;
		for listener in &listeners {
			if listener(&event) == Handled::Yes {
				handled = Handled::Yes;
			}
		}

		if handled == Handled::No {
			let error = event.error.as_ref();
			error!(
				target: CONSOLE_TARGET,
				name = error.and_then(|e| e.name.as_deref()).unwrap_or("Error"),
				source = event.source.as_deref(),
				lineno = event.lineno,
				colno = event.colno,
				"Uncaught {}",
				event.message
			);
		}
		handled
	}

	/// Rejects with `reason` and no handler attached.
	pub fn reject(&self, reason: impl Into<serde_json::Value>) {
		let event = RejectionEvent::new(reason);
		let listeners = self
			.rejection_listeners
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone();

		if listeners.is_empty() {
			warn!(target: CONSOLE_TARGET, reason = %event.reason, "Unhandled promise rejection");
		}
		for listener in &listeners {
			listener(&event);
		}
	}

	pub fn error_listener_count(&self) -> usize {
		self.error_listeners.lock().unwrap_or_else(|e| e.into_inner()).len()
	}

	pub fn rejection_listener_count(&self) -> usize {
		self
			.rejection_listeners
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.len()
	}
}

impl GlobalScope for LocalScope {
	fn user_agent(&self) -> Option<String> {
		self.user_agent.clone()
	}

	fn add_error_listener(&self, listener: ErrorListener) {
		self
			.error_listeners
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(listener);
	}

	fn add_rejection_listener(&self, listener: RejectionListener) {
		self
			.rejection_listeners
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(listener);
	}
}

/// In-process [`Framework`] with a single error-handler slot, like the
/// global error hook of a component framework.
#[derive(Default)]
pub struct LocalFramework {
	handler: Mutex<Option<ExternalErrorHandler>>,
	logger: Mutex<Option<ComponentLogger>>,
}

impl LocalFramework {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reports an error thrown while rendering or watching a component.
	/// Returns whether an error handler received it.
	pub fn throw(&self, error: ErrorObject, context: &str) -> bool {
		let handler = self.handler.lock().unwrap_or_else(|e| e.into_inner()).clone();
		match handler {
			Some(handler) => {
				handler(&error, context);
				true
			}
			None => {
				error!(
					target: CONSOLE_TARGET,
					name = error.name.as_deref().unwrap_or("Error"),
					context,
					"Error in {}: {}",
					context,
					error.message.as_deref().unwrap_or_default()
				);
				false
			}
		}
	}

	/// The logger exposed to components, once installed.
	pub fn logger(&self) -> Option<ComponentLogger> {
		self.logger.lock().unwrap_or_else(|e| e.into_inner()).clone()
	}
}

impl ExternalErrorSource for LocalFramework {
	fn set_error_handler(&self, handler: ExternalErrorHandler) {
		*self.handler.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
	}
}

impl Framework for LocalFramework {
	fn expose_logger(&self, logger: ComponentLogger) {
		*self.logger.lock().unwrap_or_else(|e| e.into_inner()) = Some(logger);
	}
}
