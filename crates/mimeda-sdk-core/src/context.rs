// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request context shared by every query the SDK builds.

use serde::{Deserialize, Serialize};

/// Device, app and identity values resolved on the dispatch worker right
/// before a query is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
	pub sdk_version: String,
	/// App name, after applying any per-event override.
	pub app: String,
	pub device_id: String,
	pub os: String,
	/// `language-COUNTRY`, e.g. `tr-TR`.
	pub language: String,
	pub session_id: String,
	pub anonymous_id: String,
}

/// Returns the first candidate that is present and not blank.
///
/// Candidates are tried in order, so the most specific source goes first:
///
/// ```
/// use mimeda_sdk_core::first_present;
///
/// let app = first_present([None, Some("  "), Some("shop"), Some("fallback")]);
/// assert_eq!(app, Some("shop"));
/// ```
pub fn first_present<'a, I>(candidates: I) -> Option<&'a str>
where
	I: IntoIterator<Item = Option<&'a str>>,
{
	candidates
		.into_iter()
		.flatten()
		.find(|candidate| !candidate.trim().is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_first_present_prefers_earlier_candidates() {
		assert_eq!(first_present([Some("override"), Some("device")]), Some("override"));
	}

	#[test]
	fn test_first_present_skips_missing_and_blank() {
		assert_eq!(first_present([None, Some(""), Some(" \t"), Some("device")]), Some("device"));
	}

	#[test]
	fn test_first_present_returns_none_when_nothing_usable() {
		assert_eq!(first_present([None, Some("  ")]), None);
		assert_eq!(first_present(std::iter::empty::<Option<&str>>()), None);
	}
}
