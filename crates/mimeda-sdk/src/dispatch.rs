// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP delivery of collector requests.

use std::fmt;

use mimeda_common_http::{retry, CancellationToken, RetryConfig, RetryError, Timeouts};
use mimeda_sdk_core::{Endpoint, EventName, EventParameter, EventType, PerformanceEventType};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, SdkError};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const PACKAGE_NAME_HEADER: &str = "x-package-name";

/// Builds the HTTP client used for every collector request.
///
/// The API key and package name are sent as default headers on each
/// request. The API key header is marked sensitive so it is never logged.
pub fn collector_client(api_key: &str, package_name: &str, timeouts: &Timeouts) -> Result<Client> {
	let client = mimeda_common_http::builder_with_timeouts(timeouts)
		.default_headers(collector_headers(api_key, package_name)?)
		.build()?;
	Ok(client)
}

/// Default headers for collector requests. The API key is sent exactly as
/// supplied.
fn collector_headers(api_key: &str, package_name: &str) -> Result<HeaderMap> {
	let mut api_key_value = HeaderValue::from_str(api_key).map_err(|_| SdkError::InvalidApiKey)?;
	api_key_value.set_sensitive(true);
	let package_value = HeaderValue::from_str(package_name).map_err(|_| SdkError::MissingPackageName)?;

	let mut headers = HeaderMap::new();
	headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key_value);
	headers.insert(HeaderName::from_static(PACKAGE_NAME_HEADER), package_value);
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
	Ok(headers)
}

/// What a collector request carries, for logging and failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
	Event { name: EventName, parameter: EventParameter },
	Performance(PerformanceEventType),
}

impl RequestKind {
	/// Collector endpoint this kind of request is sent to.
	pub const fn endpoint(&self) -> Endpoint {
		match self {
			Self::Event { .. } => Endpoint::for_event_type(EventType::Event, None),
			Self::Performance(kind) => Endpoint::for_event_type(EventType::Performance, Some(*kind)),
		}
	}
}

impl fmt::Display for RequestKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Event { name, parameter } => write!(f, "{name}/{parameter}"),
			Self::Performance(kind) => write!(f, "performance/{kind}"),
		}
	}
}

/// A fully built GET request to a collector.
#[derive(Debug, Clone)]
pub struct CollectorRequest {
	pub url: Url,
	pub kind: RequestKind,
}

/// Sends collector requests with retry and backoff.
#[derive(Clone)]
pub struct Dispatcher {
	http: Client,
	retry_config: RetryConfig,
	cancel: CancellationToken,
	debug_logging: bool,
}

impl Dispatcher {
	pub fn new(http: Client, retry_config: RetryConfig, cancel: CancellationToken, debug_logging: bool) -> Self {
		Self {
			http,
			retry_config,
			cancel,
			debug_logging,
		}
	}

	/// Delivers `request`, retrying transient failures.
	///
	/// 2xx succeeds at once. 4xx fails at once. 5xx and network errors are
	/// retried with exponential backoff until attempts run out. Cancellation
	/// interrupts both the in-flight attempt and the backoff sleep.
	pub async fn execute_with_retry(&self, request: &CollectorRequest) -> Result<()> {
		let target = self.loggable(&request.url);
		debug!(kind = %request.kind, url = %target, "sending collector request");

		match retry(&self.retry_config, &self.cancel, || self.execute_once(request)).await {
			Ok(()) => {
				info!(kind = %request.kind, url = %target, "collector request delivered");
				Ok(())
			}
			Err(RetryError::Cancelled { attempts }) => {
				debug!(kind = %request.kind, attempts, "collector request cancelled");
				Err(SdkError::Cancelled)
			}
			Err(RetryError::Failed { attempts, error }) => {
				warn!(kind = %request.kind, url = %target, attempts, error = %error, "collector request failed");
				Err(error)
			}
		}
	}

	/// Like [`Self::execute_with_retry`], reporting only success.
	pub async fn send(&self, request: &CollectorRequest) -> bool {
		self.execute_with_retry(request).await.is_ok()
	}

	async fn execute_once(&self, request: &CollectorRequest) -> Result<()> {
		let response = self.http.get(request.url.clone()).send().await?;
		let status = response.status();

		if status.is_success() {
			return Ok(());
		}

		let reason = status.canonical_reason().unwrap_or("unknown").to_string();
		let message = match response.text().await {
			Ok(body) if !body.trim().is_empty() => body,
			_ => reason,
		};

		if status.is_client_error() {
			Err(SdkError::ClientError {
				status: status.as_u16(),
				message,
			})
		} else if status.is_server_error() {
			Err(SdkError::ServerError {
				status: status.as_u16(),
				message,
			})
		} else {
			Err(SdkError::UnexpectedStatus {
				status: status.as_u16(),
			})
		}
	}

	/// Full URL when debug logging is on, otherwise only the path. Query
	/// strings carry user identifiers.
	fn loggable(&self, url: &Url) -> String {
		if self.debug_logging {
			url.to_string()
		} else {
			url.path().to_string()
		}
	}
}
