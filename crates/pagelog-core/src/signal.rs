// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Raw error signals as delivered by the host's error surfaces.
//!
//! Hosts fill in whatever they have; every field that can be missing is
//! optional. [`Signal`] is the normalized `(name, message, stack)` triple the
//! record builder consumes.

use serde::{Deserialize, Serialize};

/// Name used when an error object carries none.
pub const DEFAULT_ERROR_NAME: &str = "Error";
/// Name recorded for every unhandled rejection.
pub const REJECTION_NAME: &str = "promise";
/// Message recorded for every unhandled rejection; the reason goes in `stack`.
pub const REJECTION_MESSAGE: &str = "promise.error";

/// A thrown error value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
	pub name: Option<String>,
	pub message: Option<String>,
	pub stack: Option<String>,
}

impl ErrorObject {
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			message: Some(message.into()),
			stack: None,
		}
	}

	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}
}

/// An uncaught synchronous error, including syntax errors surfaced at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeErrorEvent {
	/// Message reported by the surface itself (e.g. "Script error.").
	pub message: String,
	pub source: Option<String>,
	pub lineno: Option<u32>,
	pub colno: Option<u32>,
	/// Absent for cross-origin scripts and some parse errors.
	pub error: Option<ErrorObject>,
}

impl RuntimeErrorEvent {
	/// Event for a thrown error object, using its message as the event message.
	pub fn from_error(error: ErrorObject) -> Self {
		Self {
			message: error.message.clone().unwrap_or_default(),
			error: Some(error),
			..Default::default()
		}
	}

	pub fn at(mut self, source: impl Into<String>, lineno: u32, colno: u32) -> Self {
		self.source = Some(source.into());
		self.lineno = Some(lineno);
		self.colno = Some(colno);
		self
	}

	fn location(&self) -> Option<String> {
		let source = self.source.as_deref()?;
		Some(match (self.lineno, self.colno) {
			(Some(line), Some(col)) => format!("at {source}:{line}:{col}"),
			(Some(line), None) => format!("at {source}:{line}"),
			_ => format!("at {source}"),
		})
	}
}

/// An asynchronous operation that failed with no rejection handler attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionEvent {
	/// The rejection reason exactly as given; not necessarily an error.
	pub reason: serde_json::Value,
}

impl RejectionEvent {
	pub fn new(reason: impl Into<serde_json::Value>) -> Self {
		Self {
			reason: reason.into(),
		}
	}
}

/// Normalized error fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
	pub name: String,
	pub message: String,
	pub stack: String,
}

impl From<&RuntimeErrorEvent> for Signal {
	fn from(event: &RuntimeErrorEvent) -> Self {
		let error = event.error.as_ref();
		Self {
			name: error
				.and_then(|e| e.name.clone())
				.unwrap_or_else(|| DEFAULT_ERROR_NAME.to_string()),
			message: error
				.and_then(|e| e.message.clone())
				.unwrap_or_else(|| event.message.clone()),
			stack: error
				.and_then(|e| e.stack.clone())
				.or_else(|| event.location())
				.unwrap_or_default(),
		}
	}
}

impl From<&RejectionEvent> for Signal {
	fn from(event: &RejectionEvent) -> Self {
		Self {
			name: REJECTION_NAME.to_string(),
			message: REJECTION_MESSAGE.to_string(),
			stack: stringify_reason(&event.reason),
		}
	}
}

impl Signal {
	/// Normalizes an error handed over by a framework error hook. `context` is
	/// the framework's description of where it happened and stands in for a
	/// missing stack.
	pub fn from_framework(error: &ErrorObject, context: &str) -> Self {
		Self {
			name: error
				.name
				.clone()
				.unwrap_or_else(|| DEFAULT_ERROR_NAME.to_string()),
			message: error.message.clone().unwrap_or_default(),
			stack: error
				.stack
				.clone()
				.unwrap_or_else(|| context.to_string()),
		}
	}
}

/// Strings are kept verbatim, error-shaped objects contribute their stack (or
/// message), anything else is rendered as JSON.
fn stringify_reason(reason: &serde_json::Value) -> String {
	use serde_json::Value;

	match reason {
		Value::String(s) => s.clone(),
		Value::Object(map) => ["stack", "message"]
			.iter()
			.find_map(|key| map.get(*key).and_then(Value::as_str))
			.map(str::to_string)
			.unwrap_or_else(|| reason.to_string()),
		other => other.to_string(),
	}
}
