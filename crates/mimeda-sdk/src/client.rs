// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SDK entry point.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use mimeda_common_http::CancellationToken;
use mimeda_sdk_core::{Environment, EventName, EventParameter, EventParams, PerformanceEventParams, PerformanceEventType};
use tracing::{debug, error, info, warn};

use crate::callback::{CallbackAdapter, ErrorCallback};
use crate::config::SdkConfig;
use crate::device::AppContext;
use crate::dispatch::{collector_client, Dispatcher};
use crate::error::{Result, SdkError};
use crate::identity::IdentityManager;
use crate::queue::{DispatchQueue, ShutdownOutcome};
use crate::tracker::{EventPipeline, EventTracker};

/// A running SDK instance.
struct SdkState {
	tracker: EventTracker,
	environment: Environment,
	package_name: String,
	shutdown_timeout: Duration,
}

impl SdkState {
	fn start(
		app: AppContext,
		api_key: &str,
		environment: Environment,
		callback: Option<Arc<dyn ErrorCallback>>,
		config: SdkConfig,
	) -> Result<Self> {
		if api_key.trim().is_empty() {
			return Err(SdkError::InvalidApiKey);
		}
		let package_name = app.package_name.trim().to_string();
		if package_name.is_empty() {
			return Err(SdkError::MissingPackageName);
		}
		config.validate()?;

		let http = collector_client(api_key, &package_name, &config.timeouts())?;
		let cancel = CancellationToken::new();
		let callbacks = CallbackAdapter::new(callback);

		let pipeline = EventPipeline {
			identity: IdentityManager::new(app.store.clone()),
			device: app.device.resolve(&package_name),
			sdk_version: config.sdk_version.clone(),
			environment,
			endpoints: config.endpoints.clone(),
			dispatcher: Dispatcher::new(http, config.retry_config(), cancel.clone(), config.debug_logging),
			callbacks: callbacks.clone(),
		};
		let queue = DispatchQueue::start(pipeline, cancel)?;

		Ok(Self {
			tracker: EventTracker::new(queue, callbacks),
			environment,
			package_name,
			shutdown_timeout: config.shutdown_timeout(),
		})
	}
}

/// Tracking SDK client.
///
/// Create one per app with [`MimedaSdk::new`], then call
/// [`MimedaSdk::initialize`]. Tracking calls never block on the network and
/// never panic; failures are logged and reported to the optional
/// [`ErrorCallback`].
///
/// # Example
/// ```ignore
/// let sdk = MimedaSdk::new();
/// let app = AppContext::new("com.example.shop", Arc::new(MemoryStore::new()));
/// sdk.initialize(app, "api-key", Environment::Production, None);
/// sdk.track_event(EventName::Home, EventParameter::View, EventParams::default());
/// sdk.shutdown();
/// ```
#[derive(Default)]
pub struct MimedaSdk {
	state: RwLock<Option<Arc<SdkState>>>,
}

impl MimedaSdk {
	pub fn new() -> Self {
		Self::default()
	}

	/// Initializes the SDK with the default configuration.
	///
	/// See [`Self::initialize_with_config`].
	pub fn initialize(
		&self,
		app: AppContext,
		api_key: &str,
		environment: Environment,
		callback: Option<Arc<dyn ErrorCallback>>,
	) -> bool {
		self.initialize_with_config(app, api_key, environment, callback, SdkConfig::default())
	}

	/// Initializes the SDK.
	///
	/// A second call while initialized is a no-op that keeps the first
	/// configuration and returns true. A blank API key or package name, an
	/// invalid configuration or a client that cannot be built leave the SDK
	/// uninitialized and return false.
	pub fn initialize_with_config(
		&self,
		app: AppContext,
		api_key: &str,
		environment: Environment,
		callback: Option<Arc<dyn ErrorCallback>>,
		config: SdkConfig,
	) -> bool {
		let mut slot = self.state.write().unwrap_or_else(PoisonError::into_inner);
		if let Some(state) = slot.as_ref() {
			warn!(
				environment = %state.environment,
				package_name = %state.package_name,
				"SDK already initialized, ignoring"
			);
			return true;
		}

		match SdkState::start(app, api_key, environment, callback, config) {
			Ok(state) => {
				info!(
					environment = %state.environment,
					package_name = %state.package_name,
					"SDK initialized"
				);
				*slot = Some(Arc::new(state));
				true
			}
			Err(e) => {
				error!(error = %e, "SDK initialization failed");
				false
			}
		}
	}

	pub fn is_initialized(&self) -> bool {
		self.state.read().unwrap_or_else(PoisonError::into_inner).is_some()
	}

	fn current(&self) -> Option<Arc<SdkState>> {
		self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	fn with_state(&self, operation: &'static str, f: impl FnOnce(&SdkState) -> Result<()>) -> bool {
		let Some(state) = self.current() else {
			warn!(operation, error = %SdkError::NotInitialized, "call initialize first");
			return false;
		};
		match f(&state) {
			Ok(()) => true,
			Err(e) => {
				warn!(operation, error = %e, "tracking call rejected");
				false
			}
		}
	}

	/// Tracks an interaction event.
	///
	/// Returns true once the event is accepted, including when it is dropped
	/// for failing validation. Returns false when not initialized.
	pub fn track_event(&self, name: EventName, parameter: EventParameter, params: EventParams) -> bool {
		self.with_state("track_event", |state| state.tracker.track_event(name, parameter, params))
	}

	/// Tracks an ad impression.
	pub fn track_performance_impression(&self, params: PerformanceEventParams) -> bool {
		self.with_state("track_performance_impression", |state| {
			state.tracker.track_performance(PerformanceEventType::Impression, params)
		})
	}

	/// Tracks an ad click.
	pub fn track_performance_click(&self, params: PerformanceEventParams) -> bool {
		self.with_state("track_performance_click", |state| {
			state.tracker.track_performance(PerformanceEventType::Click, params)
		})
	}

	/// Stops the SDK, waiting for queued events to be delivered.
	///
	/// Blocks the calling thread for up to twice the configured shutdown
	/// timeout. The SDK can be initialized again afterwards.
	pub fn shutdown(&self) {
		let state = self.state.write().unwrap_or_else(PoisonError::into_inner).take();
		let Some(state) = state else {
			debug!("SDK not initialized, nothing to shut down");
			return;
		};

		match state.tracker.shutdown(state.shutdown_timeout) {
			ShutdownOutcome::Drained | ShutdownOutcome::AlreadyStopped => info!("SDK shut down"),
			ShutdownOutcome::Cancelled => warn!("SDK shut down, pending events were cancelled"),
			ShutdownOutcome::Detached => error!("SDK shut down, dispatch worker still running"),
		}
	}
}
