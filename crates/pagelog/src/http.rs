// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP transport for remote delivery.

use std::time::Duration;

use async_trait::async_trait;
use pagelog_core::ErrorRecord;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Url};
use tracing::debug;

use crate::error::{PagelogError, Result};

/// Content type of every outbound record.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Delivers one record to a collection endpoint.
///
/// This is the seam between the dispatcher and the network. Implementations
/// send exactly once; the dispatcher owns timeouts and error suppression.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, endpoint: &Url, record: &ErrorRecord) -> Result<()>;
}

/// Returns the User-Agent the SDK sends: `pagelog/{version}`.
pub fn user_agent() -> String {
	format!("pagelog/{}", env!("CARGO_PKG_VERSION"))
}

/// Creates an HTTP client builder with the SDK User-Agent header.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// [`Transport`] that POSTs records as JSON with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
}

impl HttpTransport {
	/// Builds a transport whose client gives up after `timeout`.
	pub fn new(timeout: Duration) -> Result<Self> {
		let client = builder().timeout(timeout).build()?;
		Ok(Self { client })
	}

	/// Wraps an existing client, e.g. one with custom TLS or proxy settings.
	pub fn with_client(client: Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(&self, endpoint: &Url, record: &ErrorRecord) -> Result<()> {
		let body = serde_json::to_vec(record)?;

		let response = self
			.client
			.post(endpoint.clone())
			.header(CONTENT_TYPE, JSON_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.body(body)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(PagelogError::ServerError {
				status: status.as_u16(),
				message,
			});
		}

		// The collector's response body is not used.
		debug!(status = status.as_u16(), "Record delivered");
		Ok(())
	}
}
