// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host-facing failure notifications.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use mimeda_sdk_core::{EventName, EventParameter, PerformanceEventType};
use tracing::error;

use crate::error::SdkError;

/// Receives tracking failures. Every method defaults to a no-op.
///
/// Methods are called from the SDK's dispatch worker, or from the tracking
/// call itself for validation failures. Panics are caught and logged.
pub trait ErrorCallback: Send + Sync {
	/// An interaction event could not be delivered.
	fn on_event_tracking_failed(&self, _name: EventName, _parameter: EventParameter, _error: &SdkError) {}

	/// An impression or click could not be delivered.
	fn on_performance_event_tracking_failed(&self, _kind: PerformanceEventType, _error: &SdkError) {}

	/// An event was dropped because it failed validation. `name` is `None`
	/// for performance events.
	fn on_validation_failed(&self, _name: Option<EventName>, _errors: &[String]) {}
}

/// Routes failures to an optional host callback, containing any panic.
#[derive(Clone, Default)]
pub struct CallbackAdapter {
	callback: Option<Arc<dyn ErrorCallback>>,
}

impl CallbackAdapter {
	pub fn new(callback: Option<Arc<dyn ErrorCallback>>) -> Self {
		Self { callback }
	}

	fn invoke(&self, which: &'static str, f: impl FnOnce(&dyn ErrorCallback)) {
		let Some(callback) = self.callback.as_deref() else {
			return;
		};
		if catch_unwind(AssertUnwindSafe(|| f(callback))).is_err() {
			error!(callback = which, "error callback panicked");
		}
	}

	pub fn event_failed(&self, name: EventName, parameter: EventParameter, error: &SdkError) {
		self.invoke("on_event_tracking_failed", |cb| {
			cb.on_event_tracking_failed(name, parameter, error)
		});
	}

	pub fn performance_failed(&self, kind: PerformanceEventType, error: &SdkError) {
		self.invoke("on_performance_event_tracking_failed", |cb| {
			cb.on_performance_event_tracking_failed(kind, error)
		});
	}

	pub fn validation_failed(&self, name: Option<EventName>, errors: &[String]) {
		self.invoke("on_validation_failed", |cb| cb.on_validation_failed(name, errors));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	#[derive(Default)]
	struct Recorder {
		calls: Mutex<Vec<String>>,
	}

	impl ErrorCallback for Recorder {
		fn on_event_tracking_failed(&self, name: EventName, parameter: EventParameter, error: &SdkError) {
			self.calls
				.lock()
				.unwrap()
				.push(format!("event {name}/{parameter}: {error}"));
		}

		fn on_validation_failed(&self, name: Option<EventName>, errors: &[String]) {
			self.calls
				.lock()
				.unwrap()
				.push(format!("validation {name:?}: {}", errors.join(", ")));
		}
	}

	struct Panicking;

	impl ErrorCallback for Panicking {
		fn on_performance_event_tracking_failed(&self, _kind: PerformanceEventType, _error: &SdkError) {
			panic!("host callback bug");
		}
	}

	#[test]
	fn test_forwards_to_callback() {
		let recorder = Arc::new(Recorder::default());
		let adapter = CallbackAdapter::new(Some(recorder.clone()));

		adapter.event_failed(EventName::Cart, EventParameter::AddToCart, &SdkError::Cancelled);
		adapter.validation_failed(None, &["payload is required".to_string()]);

		let calls = recorder.calls.lock().unwrap();
		assert_eq!(
			*calls,
			[
				"event cart/addtocart: request cancelled",
				"validation None: payload is required",
			]
		);
	}

	#[test]
	fn test_without_callback_is_noop() {
		let adapter = CallbackAdapter::default();
		adapter.performance_failed(PerformanceEventType::Click, &SdkError::Cancelled);
	}

	#[test]
	fn test_default_methods_are_noops() {
		let recorder = Recorder::default();
		recorder.on_performance_event_tracking_failed(PerformanceEventType::Impression, &SdkError::Cancelled);
		assert!(recorder.calls.lock().unwrap().is_empty());
	}

	#[test]
	fn test_callback_panic_is_contained() {
		let adapter = CallbackAdapter::new(Some(Arc::new(Panicking)));
		adapter.performance_failed(PerformanceEventType::Click, &SdkError::Cancelled);
	}
}
