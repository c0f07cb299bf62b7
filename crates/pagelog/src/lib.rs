// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error telemetry collector.
//!
//! Observes uncaught runtime errors, unhandled rejections and errors caught
//! by a UI framework, normalizes each into an [`ErrorRecord`], and either
//! POSTs it to a collection endpoint or hands it to a local callback.
//!
//! # Features
//!
//! - **Injected error surfaces**: capture attaches to a [`GlobalScope`] and an
//!   [`ExternalErrorSource`] supplied by the host, never to a global slot
//! - **Production only**: development sessions install nothing
//! - **Fire-and-forget delivery**: remote sends run on the tokio runtime with
//!   a 3 second bound; failures are logged, never raised
//! - **Extension fields**: arbitrary fields merged into every record, mutable
//!   after construction
//!
//! # Example
//!
//! ```ignore
//! use pagelog::{install, LocalFramework, LocalScope, LoggerOptions};
//!
//! let scope = LocalScope::with_user_agent(user_agent);
//! let framework = LocalFramework::new();
//! let options = LoggerOptions::from_json(r#"{
//!     "username": "acct_123",
//!     "password": "token",
//!     "logEnv": "production",
//!     "isReport": true,
//!     "reportAddress": "https://collector.example.com/log"
//! }"#)?;
//!
//! let session = install(&scope, &framework, options);
//! ```

mod config;
mod dispatch;
mod error;
mod http;
mod plugin;
mod registrar;
mod scope;
mod session;

pub use config::{LoggerOptions, SessionBuilder};
pub use dispatch::{
	Delivery, DeliveryMode, Dispatcher, DropReason, LocalSink, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{PagelogError, Result};
pub use http::{HttpTransport, Transport, JSON_CONTENT_TYPE};
pub use plugin::{install, ComponentLogger, Framework};
pub use registrar::{CaptureRegistrar, InstallOutcome};
pub use scope::{
	ErrorListener, ExternalErrorHandler, ExternalErrorSource, GlobalScope, Handled, LocalFramework,
	LocalScope, RejectionListener, CONSOLE_TARGET,
};
pub use session::Session;

// Re-export core types for convenience
pub use pagelog_core::{
	identify, BrowserFamily, BrowserTag, ConfigError, ErrorObject, ErrorRecord, Identity, LogEnv,
	RecordType, RejectionEvent, RuntimeErrorEvent, Signal,
};
