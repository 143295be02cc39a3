// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the Mimeda SDK.
//!
//! This crate provides:
//! - A pre-configured HTTP client builder with the SDK User-Agent and
//!   connect/read/write timeouts
//! - Retry logic with exponential backoff for transient failures, which can
//!   be interrupted through a cancellation token

mod client;
mod retry;

pub use client::{builder, builder_with_timeouts, user_agent, Timeouts};
pub use retry::{retry, RetryConfig, RetryError, RetryableError};
pub use tokio_util::sync::CancellationToken;
