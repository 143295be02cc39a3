// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The event submission pipeline.
//!
//! [`EventTracker`] runs on the caller's thread: it validates and sanitizes
//! the caller's fields and enqueues a job. [`EventPipeline`] runs on the
//! dispatch worker: it resolves identity, validates the full context, builds
//! the collector URL and delivers it.

use std::time::Duration;

use async_trait::async_trait;
use mimeda_sdk_core::{
	build_event_query, build_performance_query, build_url, contains_sql_injection, first_present,
	sanitize_event_params, sanitize_performance_params, validate_event_context, validate_event_fields,
	validate_performance_context, validate_performance_fields, EndpointConfig, Environment, EventName,
	EventParameter, EventParams, PerformanceEventParams, PerformanceEventType, QueryParams, RequestContext,
};
use tracing::{debug, error, warn};

use crate::callback::CallbackAdapter;
use crate::device::ResolvedDevice;
use crate::dispatch::{CollectorRequest, Dispatcher, RequestKind};
use crate::error::{Result, SdkError};
use crate::identity::{now_millis, IdentityManager};
use crate::queue::{DispatchQueue, JobHandler, ShutdownOutcome};

/// Work item handed to the dispatch worker. Parameters are already
/// sanitized.
#[derive(Debug, Clone)]
pub enum TrackJob {
	Event {
		name: EventName,
		parameter: EventParameter,
		params: EventParams,
	},
	Performance {
		kind: PerformanceEventType,
		params: PerformanceEventParams,
	},
}

/// Worker-side half of the pipeline.
pub struct EventPipeline {
	pub(crate) identity: IdentityManager,
	pub(crate) device: ResolvedDevice,
	pub(crate) sdk_version: String,
	pub(crate) environment: Environment,
	pub(crate) endpoints: EndpointConfig,
	pub(crate) dispatcher: Dispatcher,
	pub(crate) callbacks: CallbackAdapter,
}

impl EventPipeline {
	fn context(&self, app_override: Option<&str>) -> RequestContext {
		RequestContext {
			sdk_version: self.sdk_version.clone(),
			app: first_present([app_override, Some(self.device.app_name.as_str())])
				.unwrap_or_default()
				.to_string(),
			device_id: self.device.device_id.clone(),
			os: self.device.os.clone(),
			language: self.device.language.clone(),
			session_id: self.identity.session_id(),
			anonymous_id: self.identity.anonymous_id().0,
		}
	}

	async fn process_event(&self, name: EventName, parameter: EventParameter, params: EventParams) {
		let ctx = self.context(params.app.as_deref());

		let validation = validate_event_context(&ctx, name, parameter);
		if !validation.is_valid() {
			warn!(event = %name, parameter = %parameter, errors = ?validation.errors(), "event context invalid, dropping");
			self.callbacks.validation_failed(Some(name), validation.errors());
			return;
		}

		let query = build_event_query(name, parameter, &params, &ctx, now_millis());
		self.deliver(&query, RequestKind::Event { name, parameter }).await;
	}

	async fn process_performance(&self, kind: PerformanceEventType, params: PerformanceEventParams) {
		let ctx = self.context(None);

		let validation = validate_performance_context(&ctx);
		if !validation.is_valid() {
			warn!(kind = %kind, errors = ?validation.errors(), "performance context invalid, dropping");
			self.callbacks.validation_failed(None, validation.errors());
			return;
		}

		let query = build_performance_query(&params, &ctx, now_millis());
		self.deliver(&query, RequestKind::Performance(kind)).await;
	}

	async fn deliver(&self, query: &QueryParams, kind: RequestKind) {
		let result = match build_url(&self.endpoints, self.environment, kind.endpoint(), query) {
			Ok(url) => self.dispatcher.execute_with_retry(&CollectorRequest { url, kind }).await,
			Err(e) => {
				error!(kind = %kind, error = %e, "failed to build collector URL");
				Err(SdkError::InvalidUrl(e))
			}
		};

		match result {
			Ok(()) => {}
			Err(SdkError::Cancelled) => debug!(kind = %kind, "request dropped on shutdown"),
			Err(e) => self.report(kind, &e),
		}
	}

	fn report(&self, kind: RequestKind, error: &SdkError) {
		match kind {
			RequestKind::Event { name, parameter } => self.callbacks.event_failed(name, parameter, error),
			RequestKind::Performance(kind) => self.callbacks.performance_failed(kind, error),
		}
	}
}

#[async_trait]
impl JobHandler for EventPipeline {
	type Job = TrackJob;

	async fn handle(&self, job: TrackJob) {
		match job {
			TrackJob::Event { name, parameter, params } => self.process_event(name, parameter, params).await,
			TrackJob::Performance { kind, params } => self.process_performance(kind, params).await,
		}
	}
}

/// Caller-side half of the pipeline.
pub struct EventTracker {
	queue: DispatchQueue<TrackJob>,
	callbacks: CallbackAdapter,
}

impl EventTracker {
	pub fn new(queue: DispatchQueue<TrackJob>, callbacks: CallbackAdapter) -> Self {
		Self { queue, callbacks }
	}

	/// Validates, sanitizes and enqueues an interaction event.
	///
	/// Invalid events are reported to the callback and dropped, which still
	/// counts as accepted. Fails only if the queue is closed.
	pub fn track_event(&self, name: EventName, parameter: EventParameter, params: EventParams) -> Result<()> {
		let validation = validate_event_fields(&params);
		if !validation.is_valid() {
			warn!(event = %name, parameter = %parameter, errors = ?validation.errors(), "event validation failed, dropping");
			self.callbacks.validation_failed(Some(name), validation.errors());
			return Ok(());
		}

		if contains_sql_injection(params.keyword.as_deref()) {
			debug!(event = %name, "keyword contains SQL-like fragments");
		}

		self.queue.submit(TrackJob::Event {
			name,
			parameter,
			params: sanitize_event_params(&params),
		})
	}

	/// Validates, sanitizes and enqueues an impression or click.
	pub fn track_performance(&self, kind: PerformanceEventType, params: PerformanceEventParams) -> Result<()> {
		let sanitized = sanitize_performance_params(&params);
		// Markup-only required fields pass the first check but are empty once
		// sanitized.
		let validation = match validate_performance_fields(&params) {
			valid if valid.is_valid() => validate_performance_fields(&sanitized),
			invalid => invalid,
		};
		if !validation.is_valid() {
			warn!(kind = %kind, errors = ?validation.errors(), "performance event validation failed, dropping");
			self.callbacks.validation_failed(None, validation.errors());
			return Ok(());
		}

		self.queue.submit(TrackJob::Performance { kind, params: sanitized })
	}

	pub fn shutdown(&self, timeout: Duration) -> ShutdownOutcome {
		self.queue.shutdown(timeout)
	}
}
