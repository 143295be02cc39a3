// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session, anonymous and trace identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How long a session stays valid after it was created, in milliseconds.
pub const SESSION_TTL_MS: i64 = 30 * 60 * 1000;

/// Generates a random identifier (UUID v4, hyphenated).
pub fn new_id() -> String {
	Uuid::new_v4().to_string()
}

/// A time-boxed grouping of user activity.
///
/// The TTL is measured from creation. Reusing a session does not extend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	pub session_id: String,
	pub created_at_ms: i64,
}

impl Session {
	/// Starts a new session with a fresh identifier.
	pub fn start(now_ms: i64) -> Self {
		Self {
			session_id: new_id(),
			created_at_ms: now_ms,
		}
	}

	pub fn is_expired_at(&self, now_ms: i64) -> bool {
		now_ms.saturating_sub(self.created_at_ms) > SESSION_TTL_MS
	}
}

/// Long-lived pseudonymous device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnonymousId(pub String);

impl AnonymousId {
	pub fn generate() -> Self {
		Self(new_id())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for AnonymousId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Per-request correlation identifier, sent as `tid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(pub Uuid);

impl TraceId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for TraceId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for TraceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const MINUTE_MS: i64 = 60 * 1000;

	#[test]
	fn test_new_ids_are_uuids_and_unique() {
		let a = new_id();
		let b = new_id();
		assert_ne!(a, b);
		assert!(Uuid::parse_str(&a).is_ok());
	}

	#[test]
	fn test_session_valid_before_ttl() {
		let session = Session::start(1_000_000);
		assert!(!session.is_expired_at(1_000_000 + 29 * MINUTE_MS));
		assert!(!session.is_expired_at(1_000_000 + SESSION_TTL_MS));
	}

	#[test]
	fn test_session_expires_after_ttl() {
		let session = Session::start(1_000_000);
		assert!(session.is_expired_at(1_000_000 + 31 * MINUTE_MS));
		assert!(session.is_expired_at(1_000_000 + SESSION_TTL_MS + 1));
	}

	#[test]
	fn test_trace_ids_differ() {
		assert_ne!(TraceId::new(), TraceId::new());
	}

	#[test]
	fn test_anonymous_id_serializes_as_plain_string() {
		let id = AnonymousId("abc".to_string());
		assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
		assert_eq!(id.to_string(), "abc");
	}

	proptest! {
		#[test]
		fn test_expiry_matches_elapsed_time(created in 0i64..1_000_000_000_000, elapsed in 0i64..(2 * SESSION_TTL_MS)) {
			let session = Session { session_id: "s".to_string(), created_at_ms: created };
			prop_assert_eq!(session.is_expired_at(created + elapsed), elapsed > SESSION_TTL_MS);
		}
	}
}
