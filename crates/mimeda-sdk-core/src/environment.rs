// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collector environments and endpoints.
//!
//! Both host pairs are compiled into every build, so choosing an environment
//! is a runtime switch. Defaults can be overridden at build time with the
//! `MIMEDA_{PRODUCTION,STAGING}_{EVENT,PERFORMANCE}_BASE_URL` variables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::{EventType, PerformanceEventType};

pub const PRODUCTION_EVENT_BASE_URL: &str = match option_env!("MIMEDA_PRODUCTION_EVENT_BASE_URL") {
	Some(url) => url,
	None => "https://event.mlink.com.tr",
};

pub const PRODUCTION_PERFORMANCE_BASE_URL: &str = match option_env!("MIMEDA_PRODUCTION_PERFORMANCE_BASE_URL") {
	Some(url) => url,
	None => "https://performance.mlink.com.tr",
};

pub const STAGING_EVENT_BASE_URL: &str = match option_env!("MIMEDA_STAGING_EVENT_BASE_URL") {
	Some(url) => url,
	None => "https://bidding-eventcollector-stage.azurewebsites.net",
};

pub const STAGING_PERFORMANCE_BASE_URL: &str = match option_env!("MIMEDA_STAGING_PERFORMANCE_BASE_URL") {
	Some(url) => url,
	None => "https://bidding-prfmnccollector-stage.azurewebsites.net",
};

/// Collector deployment the SDK talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	#[default]
	Production,
	Staging,
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Production => write!(f, "production"),
			Self::Staging => write!(f, "staging"),
		}
	}
}

/// Base URLs of the two collector families in one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorHosts {
	pub event_base_url: String,
	pub performance_base_url: String,
}

impl CollectorHosts {
	pub fn new(event_base_url: impl Into<String>, performance_base_url: impl Into<String>) -> Self {
		Self {
			event_base_url: event_base_url.into().trim_end_matches('/').to_string(),
			performance_base_url: performance_base_url.into().trim_end_matches('/').to_string(),
		}
	}

	pub fn production() -> Self {
		Self::new(PRODUCTION_EVENT_BASE_URL, PRODUCTION_PERFORMANCE_BASE_URL)
	}

	pub fn staging() -> Self {
		Self::new(STAGING_EVENT_BASE_URL, STAGING_PERFORMANCE_BASE_URL)
	}

	/// Base URL serving `endpoint`, without a trailing slash.
	pub fn base_url(&self, endpoint: Endpoint) -> &str {
		let base = match endpoint.event_type() {
			EventType::Event => &self.event_base_url,
			EventType::Performance => &self.performance_base_url,
		};
		base.trim_end_matches('/')
	}
}

/// Host pairs for every environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
	pub production: CollectorHosts,
	pub staging: CollectorHosts,
}

impl Default for EndpointConfig {
	fn default() -> Self {
		Self {
			production: CollectorHosts::production(),
			staging: CollectorHosts::staging(),
		}
	}
}

impl EndpointConfig {
	pub fn hosts(&self, environment: Environment) -> &CollectorHosts {
		match environment {
			Environment::Production => &self.production,
			Environment::Staging => &self.staging,
		}
	}

	pub fn with_production(mut self, hosts: CollectorHosts) -> Self {
		self.production = hosts;
		self
	}

	pub fn with_staging(mut self, hosts: CollectorHosts) -> Self {
		self.staging = hosts;
		self
	}
}

/// Collector path a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
	Events,
	Impressions,
	Clicks,
}

impl Endpoint {
	pub const fn path(&self) -> &'static str {
		match self {
			Self::Events => "/events",
			Self::Impressions => "/impressions",
			Self::Clicks => "/clicks",
		}
	}

	pub const fn event_type(&self) -> EventType {
		match self {
			Self::Events => EventType::Event,
			Self::Impressions | Self::Clicks => EventType::Performance,
		}
	}

	pub const fn for_performance(kind: PerformanceEventType) -> Self {
		match kind {
			PerformanceEventType::Impression => Self::Impressions,
			PerformanceEventType::Click => Self::Clicks,
		}
	}

	/// Picks the endpoint for an event type. Performance events without a
	/// kind are treated as impressions.
	pub const fn for_event_type(event_type: EventType, kind: Option<PerformanceEventType>) -> Self {
		match (event_type, kind) {
			(EventType::Event, _) => Self::Events,
			(EventType::Performance, Some(kind)) => Self::for_performance(kind),
			(EventType::Performance, None) => Self::Impressions,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_environment_is_production() {
		assert_eq!(Environment::default(), Environment::Production);
		assert_eq!(Environment::Staging.to_string(), "staging");
	}

	#[test]
	fn test_environment_deserializes_lowercase() {
		let env: Environment = serde_json::from_str("\"staging\"").unwrap();
		assert_eq!(env, Environment::Staging);
	}

	#[test]
	fn test_hosts_switch_on_environment() {
		let config = EndpointConfig::default();
		assert_eq!(
			config.hosts(Environment::Production).event_base_url,
			PRODUCTION_EVENT_BASE_URL
		);
		assert_eq!(
			config.hosts(Environment::Staging).performance_base_url,
			STAGING_PERFORMANCE_BASE_URL
		);
	}

	#[test]
	fn test_trailing_slashes_are_removed() {
		let hosts = CollectorHosts::new("http://localhost:8080/", "http://localhost:9090//");
		assert_eq!(hosts.base_url(Endpoint::Events), "http://localhost:8080");
		assert_eq!(hosts.base_url(Endpoint::Clicks), "http://localhost:9090");
	}

	#[test]
	fn test_endpoint_paths() {
		assert_eq!(Endpoint::Events.path(), "/events");
		assert_eq!(Endpoint::for_performance(PerformanceEventType::Impression).path(), "/impressions");
		assert_eq!(Endpoint::for_performance(PerformanceEventType::Click).path(), "/clicks");
	}

	#[test]
	fn test_endpoint_for_event_type() {
		assert_eq!(Endpoint::for_event_type(EventType::Event, None), Endpoint::Events);
		assert_eq!(
			Endpoint::for_event_type(EventType::Performance, Some(PerformanceEventType::Click)),
			Endpoint::Clicks
		);
		assert_eq!(Endpoint::for_event_type(EventType::Performance, None), Endpoint::Impressions);
	}

	#[test]
	fn test_partial_endpoint_config_keeps_defaults() {
		let config: EndpointConfig = serde_json::from_str(
			r#"{"staging": {"event_base_url": "http://a", "performance_base_url": "http://b"}}"#,
		)
		.unwrap();
		assert_eq!(config.production, CollectorHosts::production());
		assert_eq!(config.staging.event_base_url, "http://a");
	}
}
