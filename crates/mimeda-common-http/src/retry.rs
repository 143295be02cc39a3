// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff for transient HTTP failures.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors that know whether retrying the failed operation can help.
pub trait RetryableError {
	/// Returns true if the operation may succeed when attempted again.
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() || self.is_request() || self.is_body() {
			return true;
		}
		self.status().is_some_and(|status| status.is_server_error())
	}
}

/// Backoff policy for [`retry`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
	/// Total number of attempts, including the first one.
	pub max_attempts: u32,
	/// Delay before the first retry.
	pub base_delay: Duration,
	/// Upper bound for any single delay.
	pub max_delay: Duration,
	/// Multiplier applied to the delay after every retry.
	pub backoff_factor: f64,
	/// Randomize each delay between 50% and 150% of its nominal value.
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 4,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(60),
			backoff_factor: 2.0,
			jitter: false,
		}
	}
}

impl RetryConfig {
	/// Policy allowing `max_retries` attempts after the first one, doubling
	/// `base_delay` each time.
	pub fn with_max_retries(max_retries: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts: max_retries.saturating_add(1),
			base_delay,
			..Default::default()
		}
	}

	/// Nominal delay before retry number `retry` (1-based):
	/// `base_delay * backoff_factor^(retry - 1)`, capped at `max_delay`.
	pub fn delay_for_retry(&self, retry: u32) -> Duration {
		let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
		let secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
		if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
			return self.max_delay;
		}
		Duration::from_secs_f64(secs.max(0.0))
	}

	fn jittered(&self, delay: Duration) -> Duration {
		if !self.jitter {
			return delay;
		}
		delay.mul_f64(0.5 + fastrand::f64()).min(self.max_delay)
	}
}

/// Why [`retry`] gave up.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
	/// The cancellation token fired during an attempt or a backoff sleep.
	#[error("cancelled after {attempts} attempt(s)")]
	Cancelled { attempts: u32 },

	/// The last attempt failed with a permanent error, or attempts ran out.
	#[error("failed after {attempts} attempt(s): {error}")]
	Failed { attempts: u32, error: E },
}

impl<E> RetryError<E> {
	/// Number of attempts that were started before giving up.
	pub fn attempts(&self) -> u32 {
		match self {
			RetryError::Cancelled { attempts } | RetryError::Failed { attempts, .. } => *attempts,
		}
	}
}

/// Runs `operation` until it succeeds, fails permanently, runs out of
/// attempts, or `cancel` fires.
///
/// Non-retryable errors end the loop after the attempt that produced them.
/// Both the in-flight attempt and the backoff sleep race the cancellation
/// token, so a cancelled caller never waits for the remaining delay.
pub async fn retry<F, Fut, T, E>(
	config: &RetryConfig,
	cancel: &CancellationToken,
	mut operation: F,
) -> Result<T, RetryError<E>>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError + Display,
{
	let max_attempts = config.max_attempts.max(1);
	let mut attempt = 0;

	loop {
		if cancel.is_cancelled() {
			return Err(RetryError::Cancelled { attempts: attempt });
		}
		attempt += 1;

		let result = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt }),
			result = operation() => result,
		};

		let error = match result {
			Ok(value) => {
				if attempt > 1 {
					debug!(attempt, "operation succeeded after retry");
				}
				return Ok(value);
			}
			Err(error) => error,
		};

		if !error.is_retryable() {
			debug!(attempt, error = %error, "permanent failure, not retrying");
			return Err(RetryError::Failed {
				attempts: attempt,
				error,
			});
		}

		if attempt >= max_attempts {
			warn!(attempts = attempt, error = %error, "retries exhausted");
			return Err(RetryError::Failed {
				attempts: attempt,
				error,
			});
		}

		let delay = config.jittered(config.delay_for_retry(attempt));
		warn!(
			attempt,
			max_attempts,
			delay_ms = delay.as_millis() as u64,
			error = %error,
			"transient failure, backing off"
		);

		tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				debug!(attempt, "backoff interrupted by cancellation");
				return Err(RetryError::Cancelled { attempts: attempt });
			}
			_ = tokio::time::sleep(delay) => {}
		}
	}
}
