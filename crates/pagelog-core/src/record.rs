// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The canonical log record produced for every captured incident.

use serde::Serialize;
use std::fmt;

use crate::browser::BrowserTag;
use crate::identity::Identity;
use crate::signal::Signal;

/// Keys owned by the record itself. Extension fields never replace them.
pub const RESERVED_KEYS: &[&str] = &[
	"username",
	"password",
	"type",
	"name",
	"message",
	"stack",
	"browserInfo",
];

/// Which error surface produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordType {
	RuntimeError,
	UnhandledRejection,
	FrameworkError,
}

impl fmt::Display for RecordType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::RuntimeError => write!(f, "runtimeError"),
			Self::UnhandledRejection => write!(f, "unhandledRejection"),
			Self::FrameworkError => write!(f, "frameworkError"),
		}
	}
}

/// One captured incident, ready to be dispatched.
///
/// Serializes to a flat JSON object: identity first, then the captured
/// fields, then `browserInfo` (always present, `null` when unknown), then any
/// extension fields.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
	pub username: String,
	pub password: String,
	#[serde(rename = "type")]
	pub record_type: RecordType,
	pub name: String,
	pub message: String,
	pub stack: String,
	pub browser_info: Option<BrowserTag>,
	/// Only the builder writes these, so reserved keys never get in.
	#[serde(flatten)]
	extensions: serde_json::Map<String, serde_json::Value>,
}

impl ErrorRecord {
	pub fn builder(record_type: RecordType, identity: &Identity) -> ErrorRecordBuilder {
		ErrorRecordBuilder::new(record_type, identity)
	}

	pub fn extensions(&self) -> &serde_json::Map<String, serde_json::Value> {
		&self.extensions
	}
}

impl fmt::Debug for ErrorRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ErrorRecord")
			.field("username", &self.username)
			.field("password", &"[REDACTED]")
			.field("type", &self.record_type)
			.field("name", &self.name)
			.field("message", &self.message)
			.field("stack", &self.stack)
			.field("browser_info", &self.browser_info)
			.field("extensions", &self.extensions)
			.finish()
	}
}

/// Merges identity, captured fields, browser tag and extension fields into a
/// record, in that order.
pub struct ErrorRecordBuilder {
	record: ErrorRecord,
}

impl ErrorRecordBuilder {
	fn new(record_type: RecordType, identity: &Identity) -> Self {
		Self {
			record: ErrorRecord {
				username: identity.username().to_string(),
				password: identity.expose_password().to_string(),
				record_type,
				name: String::new(),
				message: String::new(),
				stack: String::new(),
				browser_info: None,
				extensions: serde_json::Map::new(),
			},
		}
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.record.name = name.into();
		self
	}

	pub fn message(mut self, message: impl Into<String>) -> Self {
		self.record.message = message.into();
		self
	}

	pub fn stack(mut self, stack: impl Into<String>) -> Self {
		self.record.stack = stack.into();
		self
	}

	/// Sets name, message and stack from a normalized signal.
	pub fn signal(self, signal: Signal) -> Self {
		self.name(signal.name)
			.message(signal.message)
			.stack(signal.stack)
	}

	pub fn browser(mut self, tag: Option<BrowserTag>) -> Self {
		self.record.browser_info = tag;
		self
	}

	/// Adds extension fields. Keys in [`RESERVED_KEYS`] are skipped and
	/// returned so the caller can report them.
	pub fn extensions<'a, I>(mut self, fields: I) -> (Self, Vec<String>)
	where
		I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
	{
		let mut skipped = Vec::new();
		for (key, value) in fields {
			if RESERVED_KEYS.contains(&key.as_str()) {
				skipped.push(key.clone());
				continue;
			}
			self.record.extensions.insert(key.clone(), value.clone());
		}
		(self, skipped)
	}

	pub fn build(self) -> ErrorRecord {
		self.record
	}
}
