// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event enums and their collector wire values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a wire value does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEventError {
	kind: &'static str,
	value: String,
}

/// Page or flow in the host app where the interaction happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventName {
	Home,
	Listing,
	Search,
	Pdp,
	Cart,
	Purchase,
}

impl EventName {
	pub const ALL: [EventName; 6] = [
		Self::Home,
		Self::Listing,
		Self::Search,
		Self::Pdp,
		Self::Cart,
		Self::Purchase,
	];

	/// Value sent as the `en` query parameter.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Home => "home",
			Self::Listing => "listing",
			Self::Search => "search",
			Self::Pdp => "pdp",
			Self::Cart => "cart",
			Self::Purchase => "purchase",
		}
	}
}

impl fmt::Display for EventName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EventName {
	type Err = ParseEventError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|name| name.as_str() == s)
			.ok_or_else(|| ParseEventError {
				kind: "event name",
				value: s.to_string(),
			})
	}
}

/// What the user did on the page named by [`EventName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventParameter {
	View,
	AddToCart,
	AddToFavorites,
	Success,
}

impl EventParameter {
	pub const ALL: [EventParameter; 4] = [Self::View, Self::AddToCart, Self::AddToFavorites, Self::Success];

	/// Value sent as the `ep` query parameter.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::View => "view",
			Self::AddToCart => "addtocart",
			Self::AddToFavorites => "addtofavorites",
			Self::Success => "success",
		}
	}
}

impl fmt::Display for EventParameter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EventParameter {
	type Err = ParseEventError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|parameter| parameter.as_str() == s)
			.ok_or_else(|| ParseEventError {
				kind: "event parameter",
				value: s.to_string(),
			})
	}
}

/// Collector family a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
	/// Interaction events, sent to the event collector.
	Event,
	/// Ad impressions and clicks, sent to the performance collector.
	Performance,
}

impl fmt::Display for EventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Event => write!(f, "event"),
			Self::Performance => write!(f, "performance"),
		}
	}
}

/// Kind of ad-performance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceEventType {
	Impression,
	Click,
}

impl PerformanceEventType {
	pub const ALL: [PerformanceEventType; 2] = [Self::Impression, Self::Click];

	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Impression => "impression",
			Self::Click => "click",
		}
	}
}

impl fmt::Display for PerformanceEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PerformanceEventType {
	type Err = ParseEventError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| ParseEventError {
				kind: "performance event type",
				value: s.to_string(),
			})
	}
}
