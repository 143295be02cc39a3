// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client construction with a consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const SDK_NAME: &str = "mimeda-sdk-rust";

/// Connect, read and write timeouts applied to every collector request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
	pub connect: Duration,
	pub read: Duration,
	pub write: Duration,
}

impl Default for Timeouts {
	fn default() -> Self {
		Self {
			connect: Duration::from_secs(10),
			read: Duration::from_secs(30),
			write: Duration::from_secs(30),
		}
	}
}

impl Timeouts {
	/// Upper bound for a whole request: connect, then write, then read.
	/// Saturates at `Duration::MAX`.
	pub fn total(&self) -> Duration {
		self.connect.saturating_add(self.write).saturating_add(self.read)
	}
}

/// Creates a new HTTP client builder with the standard SDK User-Agent header.
///
/// # Example
/// ```ignore
/// let client = mimeda_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a builder with the standard User-Agent and the given timeouts.
///
/// reqwest has no dedicated write timeout, so the write budget is folded
/// into the total request timeout.
pub fn builder_with_timeouts(timeouts: &Timeouts) -> ClientBuilder {
	builder()
		.connect_timeout(timeouts.connect)
		.read_timeout(timeouts.read)
		.timeout(timeouts.total())
}

/// Returns the standard SDK User-Agent string.
///
/// Format: `mimeda-sdk-rust/{version}`
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{}", env!("CARGO_PKG_VERSION"))
}
