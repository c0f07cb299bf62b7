// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-call installation into a host framework.

use std::fmt;

use pagelog_core::LogEnv;
use tracing::{error, info};

use crate::config::LoggerOptions;
use crate::registrar::CaptureRegistrar;
use crate::scope::{ExternalErrorSource, GlobalScope, CONSOLE_TARGET};
use crate::session::Session;

/// A host UI framework: an error source that can also hand a logger to its
/// components.
pub trait Framework: ExternalErrorSource {
	fn expose_logger(&self, logger: ComponentLogger);
}

/// Convenience logger for framework-managed components.
///
/// Silent in production; otherwise writes to the console target at `info`
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentLogger {
	environment: LogEnv,
}

impl ComponentLogger {
	pub fn new(environment: LogEnv) -> Self {
		Self { environment }
	}

	pub fn is_silent(&self) -> bool {
		self.environment.is_production()
	}

	pub fn log(&self, message: impl fmt::Display) {
		if self.is_silent() {
			return;
		}
		info!(target: CONSOLE_TARGET, "{}", message);
	}
}

/// Builds a session from `options` and wires it into the host.
///
/// In production this installs runtime-error, rejection and framework
/// capture. A [`ComponentLogger`] is exposed to the framework either way.
///
/// A bad configuration is logged and yields `None`; the host keeps running
/// without telemetry.
pub fn install<S, F>(scope: &S, framework: &F, options: LoggerOptions) -> Option<Session>
where
	S: GlobalScope,
	F: Framework,
{
	let mut builder = options.into_builder();
	if let Some(user_agent) = scope.user_agent() {
		builder = builder.user_agent(user_agent);
	}

	let session = match builder.build() {
		Ok(session) => session,
		Err(e) => {
			error!(error = %e, "Failed to initialize error telemetry");
			return None;
		}
	};

	let registrar = CaptureRegistrar::new(session.clone());
	let native = registrar.install(scope);
	let framework_capture = registrar.install_framework(framework);
	framework.expose_logger(ComponentLogger::new(session.environment()));

	info!(
		environment = %session.environment(),
		native = ?native,
		framework = ?framework_capture,
		"Error telemetry installed"
	);
	Some(session)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registrar::InstallOutcome;
	use crate::scope::{Handled, LocalFramework, LocalScope};
	use pagelog_core::{ErrorObject, ErrorRecord, RecordType, RuntimeErrorEvent};
	use std::sync::{Arc, Mutex};

	const FIREFOX_UA: &str =
		"Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:95.0) Gecko/20100101 Firefox/95.0";

	fn options(env: &str, records: Arc<Mutex<Vec<ErrorRecord>>>) -> LoggerOptions {
		LoggerOptions {
			username: Some("acct".to_string()),
			password: Some("secret".to_string()),
			log_env: Some(env.to_string()),
			..Default::default()
		}
		.with_log_callback(move |record| records.lock().unwrap().push(record))
	}

	#[test]
	fn production_install_wires_everything() {
		let records = Arc::new(Mutex::new(Vec::new()));
		let scope = LocalScope::with_user_agent(FIREFOX_UA);
		let framework = LocalFramework::new();

		let session = install(&scope, &framework, options("production", Arc::clone(&records))).unwrap();
		assert_eq!(session.user_agent(), Some(FIREFOX_UA));

		assert_eq!(
			scope.raise(RuntimeErrorEvent::from_error(ErrorObject::new("TypeError", "bad"))),
			Handled::Yes
		);
		scope.reject("boom");
		assert!(framework.throw(ErrorObject::new("Error", "render failed"), "render"));

		let records = records.lock().unwrap();
		let types: Vec<_> = records.iter().map(|r| r.record_type).collect();
		assert_eq!(
			types,
			vec![
				RecordType::RuntimeError,
				RecordType::UnhandledRejection,
				RecordType::FrameworkError
			]
		);
		assert!(records
			.iter()
			.all(|r| r.browser_info.as_ref().map(|b| b.as_str()) == Some("firefox/95.0")));

		let logger = framework.logger().unwrap();
		assert!(logger.is_silent());
	}

	#[test]
	fn development_install_only_exposes_logger() {
		let records = Arc::new(Mutex::new(Vec::new()));
		let scope = LocalScope::new();
		let framework = LocalFramework::new();

		let session = install(&scope, &framework, options("development", Arc::clone(&records))).unwrap();

		assert_eq!(scope.error_listener_count(), 0);
		assert_eq!(scope.raise(RuntimeErrorEvent::default()), Handled::No);
		assert!(!framework.throw(ErrorObject::new("Error", "x"), "render"));
		assert!(records.lock().unwrap().is_empty());

		let logger = framework.logger().unwrap();
		assert!(!logger.is_silent());
		logger.log("component mounted");

		assert_eq!(
			CaptureRegistrar::new(session).install(&scope),
			InstallOutcome::Development
		);
	}

	#[test]
	fn bad_configuration_degrades_to_no_telemetry() {
		let scope = LocalScope::new();
		let framework = LocalFramework::new();
		let options = LoggerOptions {
			username: Some(String::new()),
			password: Some("secret".to_string()),
			log_env: Some("production".to_string()),
			..Default::default()
		};

		assert!(install(&scope, &framework, options).is_none());
		assert_eq!(scope.error_listener_count(), 0);
		assert!(framework.logger().is_none());
	}
}
