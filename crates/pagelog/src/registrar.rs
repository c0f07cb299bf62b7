// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Installs capture observers on a host's error surfaces.

use std::sync::Arc;

use pagelog_core::{ErrorObject, RecordType, RejectionEvent, RuntimeErrorEvent, Signal};
use tracing::{debug, info};

use crate::scope::{ExternalErrorSource, GlobalScope, Handled};
use crate::session::Session;

/// Result of an install call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
	Installed,
	/// Development sessions leave native error reporting alone.
	Development,
	/// This session already installed these observers.
	AlreadyInstalled,
}

/// Wires a [`Session`] into error surfaces.
///
/// Each observer owns a clone of the session; nothing else is shared between
/// observers. Native capture and framework capture are each installed at
/// most once per session, and only in production.
#[derive(Debug, Clone)]
pub struct CaptureRegistrar {
	session: Session,
}

impl CaptureRegistrar {
	pub fn new(session: Session) -> Self {
		Self { session }
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Installs runtime-error and unhandled-rejection capture on `scope`.
	///
	/// The runtime-error observer reports every error as handled, which
	/// suppresses the scope's default error output.
	pub fn install(&self, scope: &dyn GlobalScope) -> InstallOutcome {
		if !self.session.is_production() {
			debug!("Development session, native error capture not installed");
			return InstallOutcome::Development;
		}
		if !self.session.claim_native_install() {
			debug!("Native error capture already installed for this session");
			return InstallOutcome::AlreadyInstalled;
		}

		let session = self.session.clone();
		scope.add_error_listener(Arc::new(move |event: &RuntimeErrorEvent| {
			session.capture(RecordType::RuntimeError, Signal::from(event));
			Handled::Yes
		}));

		let session = self.session.clone();
		scope.add_rejection_listener(Arc::new(move |event: &RejectionEvent| {
			session.capture(RecordType::UnhandledRejection, Signal::from(event));
		}));

		info!("Runtime error and unhandled rejection capture installed");
		InstallOutcome::Installed
	}

	/// Installs capture on a framework's own error propagation, for errors
	/// the framework catches during rendering and never rethrows.
	pub fn install_framework(&self, source: &dyn ExternalErrorSource) -> InstallOutcome {
		if !self.session.is_production() {
			debug!("Development session, framework error capture not installed");
			return InstallOutcome::Development;
		}
		if !self.session.claim_framework_install() {
			debug!("Framework error capture already installed for this session");
			return InstallOutcome::AlreadyInstalled;
		}

		let session = self.session.clone();
		source.set_error_handler(Arc::new(move |error: &ErrorObject, context: &str| {
			session.capture(
				RecordType::FrameworkError,
				Signal::from_framework(error, context),
			);
		}));

		info!("Framework error capture installed");
		InstallOutcome::Installed
	}
}
