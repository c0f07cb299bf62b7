// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: install the collector into an in-process host and raise errors.
//!
//! Run with:
//!   cargo run --example capture -p pagelog
//!
//! Pass a collector URL as the first argument to report remotely instead of
//! printing records locally.

use std::time::Duration;

use pagelog::{install, ErrorObject, LocalFramework, LocalScope, LoggerOptions, RuntimeErrorEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let report_address = std::env::args().nth(1);

	let mut options = LoggerOptions::from_json(
		r#"{
			"username": "example_account",
			"password": "example_token",
			"logEnv": "production",
			"logExt": { "appVersion": "0.1.0-example" }
		}"#,
	)?;
	match report_address {
		Some(address) => {
			println!("Reporting to {address}");
			options.is_report = Some(true);
			options.report_address = Some(address);
		}
		None => {
			options = options.with_log_callback(|record| {
				println!("{}", serde_json::to_string_pretty(&record).unwrap_or_default());
			});
		}
	}

	let scope = LocalScope::with_user_agent(
		"Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
		 Chrome/96.0.4664.110 Safari/537.36",
	);
	let framework = LocalFramework::new();

	let Some(session) = install(&scope, &framework, options) else {
		return Err("collector configuration rejected".into());
	};
	session.set_extension("userId", 42);

	scope.raise(
		RuntimeErrorEvent::from_error(
			ErrorObject::new("TypeError", "Cannot read properties of undefined (reading 'id')")
				.with_stack("TypeError: Cannot read properties of undefined\n    at render (app.js:12:9)"),
		)
		.at("https://example.com/app.js", 12, 9),
	);
	scope.reject("network request failed");
	framework.throw(ErrorObject::new("ReferenceError", "user is not defined"), "render function");

	if let Some(logger) = framework.logger() {
		logger.log("silent in production");
	}

	// Give fire-and-forget deliveries time to finish before the runtime exits.
	tokio::time::sleep(Duration::from_millis(500)).await;
	Ok(())
}
