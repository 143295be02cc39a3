// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SDK configuration.
//!
//! Defaults come from the build environment (`MIMEDA_*` variables read with
//! `option_env!`) and fall back to the values below. Hosts can layer TOML
//! overrides on top; keys they leave out keep their defaults.

use std::str::FromStr;
use std::time::Duration;

use mimeda_common_http::{RetryConfig, Timeouts};
use mimeda_sdk_core::{CollectorHosts, EndpointConfig, Environment};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 60_000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// Largest accepted connect, read or write timeout.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

fn build_env_or<T: FromStr>(value: Option<&str>, default: T) -> T {
	value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Partial configuration, as read from a TOML document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SdkConfigLayer {
	pub sdk_version: Option<String>,
	pub connect_timeout_secs: Option<u64>,
	pub read_timeout_secs: Option<u64>,
	pub write_timeout_secs: Option<u64>,
	pub max_retries: Option<u32>,
	pub retry_base_delay_ms: Option<u64>,
	pub max_retry_delay_ms: Option<u64>,
	pub debug_logging: Option<bool>,
	pub shutdown_timeout_ms: Option<u64>,
	pub endpoints: Option<EndpointConfig>,
}

impl SdkConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.sdk_version.is_some() {
			self.sdk_version = other.sdk_version;
		}
		if other.connect_timeout_secs.is_some() {
			self.connect_timeout_secs = other.connect_timeout_secs;
		}
		if other.read_timeout_secs.is_some() {
			self.read_timeout_secs = other.read_timeout_secs;
		}
		if other.write_timeout_secs.is_some() {
			self.write_timeout_secs = other.write_timeout_secs;
		}
		if other.max_retries.is_some() {
			self.max_retries = other.max_retries;
		}
		if other.retry_base_delay_ms.is_some() {
			self.retry_base_delay_ms = other.retry_base_delay_ms;
		}
		if other.max_retry_delay_ms.is_some() {
			self.max_retry_delay_ms = other.max_retry_delay_ms;
		}
		if other.debug_logging.is_some() {
			self.debug_logging = other.debug_logging;
		}
		if other.shutdown_timeout_ms.is_some() {
			self.shutdown_timeout_ms = other.shutdown_timeout_ms;
		}
		if other.endpoints.is_some() {
			self.endpoints = other.endpoints;
		}
	}

	pub fn finalize(self) -> SdkConfig {
		let defaults = SdkConfig::default();
		SdkConfig {
			sdk_version: self.sdk_version.unwrap_or(defaults.sdk_version),
			connect_timeout_secs: self.connect_timeout_secs.unwrap_or(defaults.connect_timeout_secs),
			read_timeout_secs: self.read_timeout_secs.unwrap_or(defaults.read_timeout_secs),
			write_timeout_secs: self.write_timeout_secs.unwrap_or(defaults.write_timeout_secs),
			max_retries: self.max_retries.unwrap_or(defaults.max_retries),
			retry_base_delay_ms: self.retry_base_delay_ms.unwrap_or(defaults.retry_base_delay_ms),
			max_retry_delay_ms: self.max_retry_delay_ms.unwrap_or(defaults.max_retry_delay_ms),
			debug_logging: self.debug_logging.unwrap_or(defaults.debug_logging),
			shutdown_timeout_ms: self.shutdown_timeout_ms.unwrap_or(defaults.shutdown_timeout_ms),
			endpoints: self.endpoints.unwrap_or(defaults.endpoints),
		}
	}
}

/// Resolved SDK configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SdkConfig {
	/// Reported to collectors as `v`.
	pub sdk_version: String,
	pub connect_timeout_secs: u64,
	pub read_timeout_secs: u64,
	pub write_timeout_secs: u64,
	/// Retries after the first attempt.
	pub max_retries: u32,
	pub retry_base_delay_ms: u64,
	pub max_retry_delay_ms: u64,
	/// Log full request URLs, which carry user identifiers.
	pub debug_logging: bool,
	/// Budget for each of the two shutdown waits.
	pub shutdown_timeout_ms: u64,
	pub endpoints: EndpointConfig,
}

impl Default for SdkConfig {
	fn default() -> Self {
		Self {
			sdk_version: option_env!("MIMEDA_SDK_VERSION")
				.unwrap_or(env!("CARGO_PKG_VERSION"))
				.to_string(),
			connect_timeout_secs: build_env_or(option_env!("MIMEDA_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
			read_timeout_secs: build_env_or(option_env!("MIMEDA_READ_TIMEOUT_SECS"), DEFAULT_READ_TIMEOUT_SECS),
			write_timeout_secs: build_env_or(option_env!("MIMEDA_WRITE_TIMEOUT_SECS"), DEFAULT_WRITE_TIMEOUT_SECS),
			max_retries: build_env_or(option_env!("MIMEDA_MAX_RETRIES"), DEFAULT_MAX_RETRIES),
			retry_base_delay_ms: build_env_or(option_env!("MIMEDA_RETRY_BASE_DELAY_MS"), DEFAULT_RETRY_BASE_DELAY_MS),
			max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
			debug_logging: build_env_or(option_env!("MIMEDA_DEBUG_LOGGING"), false),
			shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
			endpoints: EndpointConfig::default(),
		}
	}
}

impl SdkConfig {
	/// Parses TOML overrides on top of the defaults and validates the result.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let layer: SdkConfigLayer = toml::from_str(input)?;
		let config = layer.finalize();
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		for (field, value) in [
			("connect_timeout_secs", self.connect_timeout_secs),
			("read_timeout_secs", self.read_timeout_secs),
			("write_timeout_secs", self.write_timeout_secs),
		] {
			if value == 0 {
				return Err(ConfigError::InvalidValue {
					field,
					message: "must be greater than zero".to_string(),
				});
			}
			if value > MAX_TIMEOUT_SECS {
				return Err(ConfigError::InvalidValue {
					field,
					message: format!("must be at most {MAX_TIMEOUT_SECS}"),
				});
			}
		}
		if self.sdk_version.trim().is_empty() {
			return Err(ConfigError::InvalidValue {
				field: "sdk_version",
				message: "must not be empty".to_string(),
			});
		}
		for environment in [Environment::Production, Environment::Staging] {
			let hosts = self.endpoints.hosts(environment);
			if hosts.event_base_url.trim().is_empty() || hosts.performance_base_url.trim().is_empty() {
				return Err(ConfigError::InvalidValue {
					field: "endpoints",
					message: format!("{environment} base URLs must not be empty"),
				});
			}
		}
		Ok(())
	}

	pub fn timeouts(&self) -> Timeouts {
		Timeouts {
			connect: Duration::from_secs(self.connect_timeout_secs),
			read: Duration::from_secs(self.read_timeout_secs),
			write: Duration::from_secs(self.write_timeout_secs),
		}
	}

	pub fn retry_config(&self) -> RetryConfig {
		RetryConfig {
			max_delay: Duration::from_millis(self.max_retry_delay_ms),
			..RetryConfig::with_max_retries(self.max_retries, Duration::from_millis(self.retry_base_delay_ms))
		}
	}

	pub fn shutdown_timeout(&self) -> Duration {
		Duration::from_millis(self.shutdown_timeout_ms)
	}

	pub fn with_hosts(mut self, environment: Environment, hosts: CollectorHosts) -> Self {
		self.endpoints = match environment {
			Environment::Production => self.endpoints.with_production(hosts),
			Environment::Staging => self.endpoints.with_staging(hosts),
		};
		self
	}

	pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
		self.max_retries = max_retries;
		self.retry_base_delay_ms = u64::try_from(base_delay.as_millis()).unwrap_or(u64::MAX);
		self
	}

	pub fn with_debug_logging(mut self, enabled: bool) -> Self {
		self.debug_logging = enabled;
		self
	}

	pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
		self.shutdown_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = SdkConfig::default();
		assert_eq!(config.connect_timeout_secs, 10);
		assert_eq!(config.read_timeout_secs, 30);
		assert_eq!(config.write_timeout_secs, 30);
		assert_eq!(config.max_retries, 3);
		assert_eq!(config.retry_base_delay_ms, 1000);
		assert_eq!(config.shutdown_timeout_ms, 5000);
		assert!(!config.debug_logging);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_retry_config_from_defaults() {
		let retry = SdkConfig::default().retry_config();
		assert_eq!(retry.max_attempts, 4);
		assert_eq!(retry.base_delay, Duration::from_secs(1));
		assert_eq!(retry.max_delay, Duration::from_secs(60));
		assert!(!retry.jitter);
	}

	#[test]
	fn test_empty_toml_keeps_defaults() {
		let config = SdkConfig::from_toml_str("").unwrap();
		assert_eq!(config, SdkConfig::default());
	}

	#[test]
	fn test_toml_overrides() {
		let toml_str = r#"
			max_retries = 5
			retry_base_delay_ms = 250
			debug_logging = true

			[endpoints.staging]
			event_base_url = "http://localhost:8080"
			performance_base_url = "http://localhost:8081"
		"#;

		let config = SdkConfig::from_toml_str(toml_str).unwrap();

		assert_eq!(config.max_retries, 5);
		assert_eq!(config.retry_base_delay_ms, 250);
		assert!(config.debug_logging);
		assert_eq!(config.connect_timeout_secs, 10);
		assert_eq!(config.endpoints.staging.event_base_url, "http://localhost:8080");
		assert_eq!(config.endpoints.production, CollectorHosts::production());
	}

	#[test]
	fn test_zero_timeout_is_rejected() {
		let err = SdkConfig::from_toml_str("read_timeout_secs = 0").unwrap_err();
		assert!(matches!(
			err,
			ConfigError::InvalidValue {
				field: "read_timeout_secs",
				..
			}
		));
	}

	#[test]
	fn test_huge_timeout_is_rejected() {
		let toml_str = "connect_timeout_secs = 9223372036854775807\nread_timeout_secs = 9223372036854775807";
		let err = SdkConfig::from_toml_str(toml_str).unwrap_err();
		assert!(matches!(
			err,
			ConfigError::InvalidValue {
				field: "connect_timeout_secs",
				..
			}
		));

		let config = SdkConfig {
			write_timeout_secs: MAX_TIMEOUT_SECS,
			..SdkConfig::default()
		};
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_empty_base_url_is_rejected() {
		let config = SdkConfig::default().with_hosts(Environment::Production, CollectorHosts::new("", "http://p"));
		assert!(matches!(
			config.validate(),
			Err(ConfigError::InvalidValue { field: "endpoints", .. })
		));
	}

	#[test]
	fn test_malformed_toml() {
		assert!(matches!(
			SdkConfig::from_toml_str("max_retries = \"many\""),
			Err(ConfigError::TomlParse(_))
		));
	}

	#[test]
	fn test_layer_merge_overwrites() {
		let mut base = SdkConfigLayer {
			max_retries: Some(1),
			debug_logging: Some(false),
			..Default::default()
		};
		base.merge(SdkConfigLayer {
			debug_logging: Some(true),
			..Default::default()
		});
		let config = base.finalize();
		assert_eq!(config.max_retries, 1);
		assert!(config.debug_logging);
	}

	#[test]
	fn test_builder_helpers() {
		let config = SdkConfig::default()
			.with_retries(2, Duration::from_millis(5))
			.with_shutdown_timeout(Duration::from_millis(200));
		let retry = config.retry_config();
		assert_eq!(retry.max_attempts, 3);
		assert_eq!(retry.base_delay, Duration::from_millis(5));
		assert_eq!(config.shutdown_timeout(), Duration::from_millis(200));
	}

	#[test]
	fn test_builder_helpers_saturate_huge_durations() {
		let config = SdkConfig::default()
			.with_retries(1, Duration::MAX)
			.with_shutdown_timeout(Duration::MAX);
		assert_eq!(config.retry_base_delay_ms, u64::MAX);
		assert_eq!(config.shutdown_timeout_ms, u64::MAX);
	}
}
