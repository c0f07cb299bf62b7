// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record delivery: remote HTTP or local callback.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pagelog_core::{ErrorRecord, RecordType};
use reqwest::Url;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::PagelogError;
use crate::http::Transport;

/// Default bound on a single remote delivery.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Host callback that receives records in local delivery mode.
pub type LocalSink = Arc<dyn Fn(ErrorRecord) + Send + Sync>;

/// Where records go. Fixed when the session is built.
#[derive(Clone)]
pub enum DeliveryMode {
	/// POST to the endpoint. `None` when reporting was enabled without a
	/// usable address; records are then dropped.
	Remote { endpoint: Option<Url> },
	/// Hand records to the host callback, if one was given.
	Local { sink: Option<LocalSink> },
}

impl fmt::Debug for DeliveryMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Remote { endpoint } => f
				.debug_struct("Remote")
				.field("endpoint", &endpoint.as_ref().map(Url::as_str))
				.finish(),
			Self::Local { sink } => f
				.debug_struct("Local")
				.field("sink", &sink.is_some())
				.finish(),
		}
	}
}

impl DeliveryMode {
	/// Whether a record handed to this mode can actually go anywhere.
	pub fn is_deliverable(&self) -> bool {
		match self {
			Self::Remote { endpoint } => endpoint.is_some(),
			Self::Local { sink } => sink.is_some(),
		}
	}
}

/// Why a record was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
	NoEndpoint,
	NoSink,
	NoRuntime,
}

/// What happened to a dispatched record.
///
/// Observers ignore this; it exists so tests and shutdown paths can wait for
/// an in-flight delivery.
#[derive(Debug)]
pub enum Delivery {
	/// The local sink was called.
	Local,
	/// A remote delivery task was spawned.
	Remote(JoinHandle<()>),
	Dropped(DropReason),
}

impl Delivery {
	/// Waits for a remote delivery to finish. Other outcomes return immediately.
	pub async fn wait(self) {
		if let Self::Remote(handle) = self {
			let _ = handle.await;
		}
	}
}

/// Sends finished records according to the session's delivery mode.
///
/// Remote delivery is fire-and-forget: the record is moved into a task on
/// the tokio runtime current at dispatch time, or failing that the one that
/// was current when the dispatcher was built, bounded by `timeout`. Every
/// failure is logged and swallowed. There are no retries.
pub struct Dispatcher {
	mode: DeliveryMode,
	transport: Option<Arc<dyn Transport>>,
	timeout: Duration,
	runtime: Option<Handle>,
}

impl Dispatcher {
	pub fn new(mode: DeliveryMode, transport: Option<Arc<dyn Transport>>, timeout: Duration) -> Self {
		Self {
			mode,
			transport,
			timeout,
			runtime: Handle::try_current().ok(),
		}
	}

	pub fn mode(&self) -> &DeliveryMode {
		&self.mode
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Whether a transport is available for remote delivery.
	pub fn has_transport(&self) -> bool {
		self.transport.is_some()
	}

	/// Delivers one record. Never fails and never blocks on the network.
	pub fn dispatch(&self, record: ErrorRecord) -> Delivery {
		match &self.mode {
			DeliveryMode::Local { sink: Some(sink) } => {
				debug!(record_type = %record.record_type, "Handing record to local sink");
				sink(record);
				Delivery::Local
			}
			DeliveryMode::Local { sink: None } => {
				debug!(record_type = %record.record_type, "No local sink configured, dropping record");
				Delivery::Dropped(DropReason::NoSink)
			}
			DeliveryMode::Remote { endpoint: None } => {
				debug!(record_type = %record.record_type, "No report address configured, dropping record");
				Delivery::Dropped(DropReason::NoEndpoint)
			}
			DeliveryMode::Remote {
				endpoint: Some(endpoint),
			} => self.spawn_remote(endpoint.clone(), record),
		}
	}

	fn spawn_remote(&self, endpoint: Url, record: ErrorRecord) -> Delivery {
		let Some(transport) = self.transport.clone() else {
			debug!("No transport configured, dropping record");
			return Delivery::Dropped(DropReason::NoEndpoint);
		};
		let Some(runtime) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
			warn!(
				record_type = %record.record_type,
				"No async runtime available for remote delivery, dropping record"
			);
			return Delivery::Dropped(DropReason::NoRuntime);
		};

		let timeout = self.timeout;
		let mut in_flight = InFlight::new(record.record_type);
		debug!(endpoint = %endpoint, record_type = %record.record_type, "Sending record");

		Delivery::Remote(runtime.spawn(async move {
			match tokio::time::timeout(timeout, transport.send(&endpoint, &record)).await {
				Ok(Ok(())) => {}
				Ok(Err(e)) => {
					warn!(error = %e, endpoint = %endpoint, "Failed to deliver error record");
				}
				Err(_) => {
					let e = PagelogError::Timeout(timeout);
					warn!(error = %e, endpoint = %endpoint, "Failed to deliver error record");
				}
			}
			in_flight.finished = true;
		}))
	}
}

/// Moved into each delivery task. Dropped unfinished when the task never
/// ran to completion, i.e. its runtime shut down first.
struct InFlight {
	record_type: RecordType,
	finished: bool,
}

impl InFlight {
	fn new(record_type: RecordType) -> Self {
		Self {
			record_type,
			finished: false,
		}
	}
}

impl Drop for InFlight {
	fn drop(&mut self) {
		if !self.finished {
			warn!(
				record_type = %self.record_type,
				"Async runtime shut down before remote delivery finished, dropping record"
			);
		}
	}
}

impl fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatcher")
			.field("mode", &self.mode)
			.field("timeout", &self.timeout)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use pagelog_core::{Identity, RecordType};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	use crate::error::Result;

	fn record() -> ErrorRecord {
		let identity = Identity::new("acct", "secret").unwrap();
		ErrorRecord::builder(RecordType::RuntimeError, &identity)
			.name("TypeError")
			.message("boom")
			.build()
	}

	#[derive(Default)]
	struct RecordingTransport {
		sent: Mutex<Vec<(String, ErrorRecord)>>,
	}

	#[async_trait]
	impl Transport for RecordingTransport {
		async fn send(&self, endpoint: &Url, record: &ErrorRecord) -> Result<()> {
			self
				.sent
				.lock()
				.unwrap()
				.push((endpoint.to_string(), record.clone()));
			Ok(())
		}
	}

	struct FailingTransport;

	#[async_trait]
	impl Transport for FailingTransport {
		async fn send(&self, _endpoint: &Url, _record: &ErrorRecord) -> Result<()> {
			Err(PagelogError::ServerError {
				status: 503,
				message: "unavailable".to_string(),
			})
		}
	}

	struct StalledTransport;

	#[async_trait]
	impl Transport for StalledTransport {
		async fn send(&self, _endpoint: &Url, _record: &ErrorRecord) -> Result<()> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(())
		}
	}

	fn endpoint() -> Url {
		Url::parse("https://collector.example.com/log").unwrap()
	}

	#[test]
	fn local_sink_is_called_synchronously() {
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = Arc::clone(&calls);
		let sink: LocalSink = Arc::new(move |record: ErrorRecord| {
			assert_eq!(record.name, "TypeError");
			seen.fetch_add(1, Ordering::SeqCst);
		});
		let dispatcher = Dispatcher::new(
			DeliveryMode::Local { sink: Some(sink) },
			None,
			DEFAULT_REQUEST_TIMEOUT,
		);

		assert!(matches!(dispatcher.dispatch(record()), Delivery::Local));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn missing_sink_is_a_no_op() {
		let dispatcher = Dispatcher::new(DeliveryMode::Local { sink: None }, None, DEFAULT_REQUEST_TIMEOUT);
		assert!(matches!(
			dispatcher.dispatch(record()),
			Delivery::Dropped(DropReason::NoSink)
		));
	}

	#[test]
	fn missing_endpoint_is_a_no_op() {
		let transport: Arc<dyn Transport> = Arc::new(RecordingTransport::default());
		let dispatcher = Dispatcher::new(
			DeliveryMode::Remote { endpoint: None },
			Some(transport),
			DEFAULT_REQUEST_TIMEOUT,
		);
		assert!(matches!(
			dispatcher.dispatch(record()),
			Delivery::Dropped(DropReason::NoEndpoint)
		));
	}

	#[test]
	fn remote_without_runtime_is_dropped() {
		let transport: Arc<dyn Transport> = Arc::new(RecordingTransport::default());
		let dispatcher = Dispatcher::new(
			DeliveryMode::Remote {
				endpoint: Some(endpoint()),
			},
			Some(transport),
			DEFAULT_REQUEST_TIMEOUT,
		);
		assert!(matches!(
			dispatcher.dispatch(record()),
			Delivery::Dropped(DropReason::NoRuntime)
		));
	}

	#[tokio::test]
	async fn remote_sends_exactly_once() {
		let transport = Arc::new(RecordingTransport::default());
		let dispatcher = Dispatcher::new(
			DeliveryMode::Remote {
				endpoint: Some(endpoint()),
			},
			Some(transport.clone() as Arc<dyn Transport>),
			DEFAULT_REQUEST_TIMEOUT,
		);

		dispatcher.dispatch(record()).wait().await;

		let sent = transport.sent.lock().unwrap();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].0, "https://collector.example.com/log");
		assert_eq!(sent[0].1.message, "boom");
	}

	#[tokio::test]
	async fn transport_failure_is_swallowed() {
		let dispatcher = Dispatcher::new(
			DeliveryMode::Remote {
				endpoint: Some(endpoint()),
			},
			Some(Arc::new(FailingTransport) as Arc<dyn Transport>),
			DEFAULT_REQUEST_TIMEOUT,
		);

		let Delivery::Remote(handle) = dispatcher.dispatch(record()) else {
			panic!("expected remote delivery");
		};
		assert!(handle.await.is_ok());
	}

	#[tokio::test(start_paused = true)]
	async fn stalled_delivery_is_abandoned_at_timeout() {
		let dispatcher = Dispatcher::new(
			DeliveryMode::Remote {
				endpoint: Some(endpoint()),
			},
			Some(Arc::new(StalledTransport) as Arc<dyn Transport>),
			DEFAULT_REQUEST_TIMEOUT,
		);

		let Delivery::Remote(handle) = dispatcher.dispatch(record()) else {
			panic!("expected remote delivery");
		};
		let started = tokio::time::Instant::now();
		assert!(handle.await.is_ok());
		assert!(started.elapsed() < Duration::from_secs(60));
	}

	fn current_thread_runtime() -> tokio::runtime::Runtime {
		tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.unwrap()
	}

	#[test]
	fn current_runtime_is_preferred_over_the_building_one() {
		let transport = Arc::new(RecordingTransport::default());
		let setup = current_thread_runtime();
		let dispatcher = setup.block_on(async {
			Dispatcher::new(
				DeliveryMode::Remote {
					endpoint: Some(endpoint()),
				},
				Some(transport.clone() as Arc<dyn Transport>),
				DEFAULT_REQUEST_TIMEOUT,
			)
		});
		drop(setup);

		current_thread_runtime().block_on(async {
			let Delivery::Remote(handle) = dispatcher.dispatch(record()) else {
				panic!("expected remote delivery");
			};
			assert!(handle.await.is_ok());
		});
		assert_eq!(transport.sent.lock().unwrap().len(), 1);
	}

	#[test]
	fn building_runtime_is_used_outside_any_runtime() {
		let transport = Arc::new(RecordingTransport::default());
		let runtime = tokio::runtime::Builder::new_multi_thread()
			.worker_threads(1)
			.enable_all()
			.build()
			.unwrap();
		let dispatcher = runtime.block_on(async {
			Dispatcher::new(
				DeliveryMode::Remote {
					endpoint: Some(endpoint()),
				},
				Some(transport.clone() as Arc<dyn Transport>),
				DEFAULT_REQUEST_TIMEOUT,
			)
		});

		let Delivery::Remote(handle) = dispatcher.dispatch(record()) else {
			panic!("expected remote delivery");
		};
		assert!(runtime.block_on(handle).is_ok());
		assert_eq!(transport.sent.lock().unwrap().len(), 1);
	}

	#[test]
	fn shut_down_building_runtime_drops_without_sending() {
		let transport = Arc::new(RecordingTransport::default());
		let setup = current_thread_runtime();
		let dispatcher = setup.block_on(async {
			Dispatcher::new(
				DeliveryMode::Remote {
					endpoint: Some(endpoint()),
				},
				Some(transport.clone() as Arc<dyn Transport>),
				DEFAULT_REQUEST_TIMEOUT,
			)
		});
		drop(setup);

		let Delivery::Remote(handle) = dispatcher.dispatch(record()) else {
			panic!("expected remote delivery");
		};
		let outcome = current_thread_runtime().block_on(handle);
		assert!(outcome.unwrap_err().is_cancelled());
		assert!(transport.sent.lock().unwrap().is_empty());
	}

	#[test]
	fn deliverable_reflects_configuration() {
		assert!(!DeliveryMode::Remote { endpoint: None }.is_deliverable());
		assert!(DeliveryMode::Remote {
			endpoint: Some(endpoint())
		}
		.is_deliverable());
		assert!(!DeliveryMode::Local { sink: None }.is_deliverable());
	}
}
