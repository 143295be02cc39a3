// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host-supplied device and app information.

use std::sync::Arc;

use mimeda_sdk_core::first_present;
use uuid::Uuid;

use crate::store::IdentityStore;

/// Language reported when the host does not provide one.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Device attributes as provided by the host platform. Missing values are
/// filled in by [`DeviceInfo::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
	/// Human-facing app name. Defaults to the package name.
	pub app_name: Option<String>,
	/// Stable per-device identifier.
	pub device_id: Option<String>,
	pub os: Option<String>,
	/// `language-COUNTRY`, e.g. `tr-TR`.
	pub language: Option<String>,
}

impl DeviceInfo {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
		self.app_name = Some(app_name.into());
		self
	}

	pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
		self.device_id = Some(device_id.into());
		self
	}

	pub fn with_os(mut self, os: impl Into<String>) -> Self {
		self.os = Some(os.into());
		self
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = Some(language.into());
		self
	}

	/// Fills every missing or blank attribute.
	///
	/// A missing device id is replaced by a random UUID, so callers should
	/// resolve once and reuse the result.
	pub fn resolve(&self, package_name: &str) -> ResolvedDevice {
		let device_id = first_present([self.device_id.as_deref()])
			.map(str::to_string)
			.unwrap_or_else(|| Uuid::new_v4().to_string());

		ResolvedDevice {
			app_name: first_present([self.app_name.as_deref(), Some(package_name)])
				.unwrap_or_default()
				.to_string(),
			device_id,
			os: first_present([self.os.as_deref(), Some(std::env::consts::OS)])
				.unwrap_or_default()
				.to_string(),
			language: first_present([self.language.as_deref(), Some(DEFAULT_LANGUAGE)])
				.unwrap_or_default()
				.to_string(),
		}
	}
}

/// Device attributes with every value filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDevice {
	pub app_name: String,
	pub device_id: String,
	pub os: String,
	pub language: String,
}

/// Everything the SDK needs from the host app.
#[derive(Clone)]
pub struct AppContext {
	/// Package or bundle identifier, sent as `X-Package-Name`.
	pub package_name: String,
	pub device: DeviceInfo,
	/// Storage for session and anonymous ids.
	pub store: Arc<dyn IdentityStore>,
}

impl AppContext {
	pub fn new(package_name: impl Into<String>, store: Arc<dyn IdentityStore>) -> Self {
		Self {
			package_name: package_name.into(),
			device: DeviceInfo::default(),
			store,
		}
	}

	pub fn with_device(mut self, device: DeviceInfo) -> Self {
		self.device = device;
		self
	}
}

impl std::fmt::Debug for AppContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppContext")
			.field("package_name", &self.package_name)
			.field("device", &self.device)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_keeps_supplied_values() {
		let device = DeviceInfo::new()
			.with_app_name("Shop")
			.with_device_id("device-1")
			.with_os("android")
			.with_language("tr-TR");

		let resolved = device.resolve("com.example.shop");

		assert_eq!(resolved.app_name, "Shop");
		assert_eq!(resolved.device_id, "device-1");
		assert_eq!(resolved.os, "android");
		assert_eq!(resolved.language, "tr-TR");
	}

	#[test]
	fn test_resolve_fills_defaults() {
		let resolved = DeviceInfo::new().with_device_id("  ").resolve("com.example.shop");

		assert_eq!(resolved.app_name, "com.example.shop");
		assert_eq!(resolved.os, std::env::consts::OS);
		assert_eq!(resolved.language, DEFAULT_LANGUAGE);
		assert!(Uuid::parse_str(&resolved.device_id).is_ok());
	}

	#[test]
	fn test_generated_device_ids_differ() {
		let device = DeviceInfo::new();
		assert_ne!(device.resolve("p").device_id, device.resolve("p").device_id);
	}
}
