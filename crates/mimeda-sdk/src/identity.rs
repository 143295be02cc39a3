// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session and anonymous identity.
//!
//! Both identifiers are resolved from the identity store. Store failures
//! never reach the caller: a fresh, unpersisted identifier is returned
//! instead, so an outage yields a new id on every call.

use std::sync::Arc;

use chrono::Utc;
use mimeda_sdk_core::{new_id, AnonymousId, Session};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::{keys, IdentityStore};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
	Utc::now().timestamp_millis()
}

/// Resolves and rotates SDK identifiers.
#[derive(Clone)]
pub struct IdentityManager {
	store: Arc<dyn IdentityStore>,
}

impl IdentityManager {
	pub fn new(store: Arc<dyn IdentityStore>) -> Self {
		Self { store }
	}

	/// Session id valid now.
	pub fn session_id(&self) -> String {
		self.session_id_at(now_millis())
	}

	/// Session id valid at `now_ms`.
	///
	/// Returns the stored session unless it is missing or older than the
	/// session TTL, in which case a new one is started and persisted. Reuse
	/// does not refresh the stored timestamp.
	pub fn session_id_at(&self, now_ms: i64) -> String {
		match self.resolve_session(now_ms) {
			Ok(session_id) => session_id,
			Err(e) => {
				warn!(error = %e, "failed to resolve session, using transient id");
				new_id()
			}
		}
	}

	fn resolve_session(&self, now_ms: i64) -> Result<String, StoreError> {
		if let Some(session) = self.current_session()? {
			if !session.is_expired_at(now_ms) {
				return Ok(session.session_id);
			}
			debug!(session_id = %session.session_id, "session expired");
		}

		let session = Session::start(now_ms);
		self.store.put_string(keys::SESSION_ID, &session.session_id)?;
		self.store.put_i64(keys::SESSION_TIMESTAMP, session.created_at_ms)?;
		debug!(session_id = %session.session_id, "started new session");
		Ok(session.session_id)
	}

	/// Stored session, if both its id and timestamp are present.
	pub fn current_session(&self) -> Result<Option<Session>, StoreError> {
		let session_id = self.store.get_string(keys::SESSION_ID)?;
		let created_at_ms = self.store.get_i64(keys::SESSION_TIMESTAMP)?;
		Ok(match (session_id, created_at_ms) {
			(Some(session_id), Some(created_at_ms)) if !session_id.trim().is_empty() => Some(Session {
				session_id,
				created_at_ms,
			}),
			_ => None,
		})
	}

	/// Anonymous id, created and persisted on first use.
	pub fn anonymous_id(&self) -> AnonymousId {
		match self.resolve_anonymous_id() {
			Ok(anonymous_id) => anonymous_id,
			Err(e) => {
				warn!(error = %e, "failed to resolve anonymous id, using transient id");
				AnonymousId::generate()
			}
		}
	}

	fn resolve_anonymous_id(&self) -> Result<AnonymousId, StoreError> {
		if let Some(existing) = self
			.store
			.get_string(keys::ANONYMOUS_ID)?
			.filter(|id| !id.trim().is_empty())
		{
			return Ok(AnonymousId(existing));
		}

		let anonymous_id = AnonymousId::generate();
		self.store.put_string(keys::ANONYMOUS_ID, anonymous_id.as_str())?;
		debug!(anonymous_id = %anonymous_id, "created anonymous id");
		Ok(anonymous_id)
	}

	/// Forgets the session and anonymous id.
	pub fn reset(&self) -> crate::error::Result<()> {
		self.store.clear()?;
		debug!("identity reset");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::SdkError;
	use crate::store::MemoryStore;
	use mimeda_sdk_core::SESSION_TTL_MS;

	const MINUTE_MS: i64 = 60 * 1000;
	const T: i64 = 1_700_000_000_000;

	struct FailingStore;

	impl IdentityStore for FailingStore {
		fn get_string(&self, _key: &str) -> Result<Option<String>, StoreError> {
			Err(StoreError::Poisoned)
		}

		fn put_string(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
			Err(StoreError::Poisoned)
		}

		fn get_i64(&self, _key: &str) -> Result<Option<i64>, StoreError> {
			Err(StoreError::Poisoned)
		}

		fn put_i64(&self, _key: &str, _value: i64) -> Result<(), StoreError> {
			Err(StoreError::Poisoned)
		}

		fn clear(&self) -> Result<(), StoreError> {
			Err(StoreError::Poisoned)
		}
	}

	/// Reads succeed and are empty, writes fail.
	struct ReadOnlyStore;

	impl IdentityStore for ReadOnlyStore {
		fn get_string(&self, _key: &str) -> Result<Option<String>, StoreError> {
			Ok(None)
		}

		fn put_string(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
			Err(StoreError::Io(std::io::Error::other("read-only")))
		}

		fn get_i64(&self, _key: &str) -> Result<Option<i64>, StoreError> {
			Ok(None)
		}

		fn put_i64(&self, _key: &str, _value: i64) -> Result<(), StoreError> {
			Err(StoreError::Io(std::io::Error::other("read-only")))
		}

		fn clear(&self) -> Result<(), StoreError> {
			Ok(())
		}
	}

	fn manager() -> (IdentityManager, Arc<MemoryStore>) {
		let store = Arc::new(MemoryStore::new());
		(IdentityManager::new(store.clone()), store)
	}

	#[test]
	fn test_new_session_is_persisted() {
		let (identity, store) = manager();

		let session_id = identity.session_id_at(T);

		assert_eq!(store.get_string(keys::SESSION_ID).unwrap(), Some(session_id));
		assert_eq!(store.get_i64(keys::SESSION_TIMESTAMP).unwrap(), Some(T));
	}

	#[test]
	fn test_session_reused_within_ttl() {
		let (identity, store) = manager();
		store.put_string(keys::SESSION_ID, "existing").unwrap();
		store.put_i64(keys::SESSION_TIMESTAMP, T).unwrap();

		assert_eq!(identity.session_id_at(T + 29 * MINUTE_MS), "existing");
		// Reuse does not slide the window
		assert_eq!(store.get_i64(keys::SESSION_TIMESTAMP).unwrap(), Some(T));
	}

	#[test]
	fn test_session_rotates_after_ttl() {
		let (identity, store) = manager();
		store.put_string(keys::SESSION_ID, "existing").unwrap();
		store.put_i64(keys::SESSION_TIMESTAMP, T).unwrap();

		let now = T + 31 * MINUTE_MS;
		let rotated = identity.session_id_at(now);

		assert_ne!(rotated, "existing");
		assert_eq!(store.get_i64(keys::SESSION_TIMESTAMP).unwrap(), Some(now));
		assert_eq!(store.get_string(keys::SESSION_ID).unwrap(), Some(rotated));
	}

	#[test]
	fn test_ttl_measured_from_creation() {
		let (identity, _store) = manager();
		let first = identity.session_id_at(T);
		assert_eq!(identity.session_id_at(T + 20 * MINUTE_MS), first);
		assert_eq!(identity.session_id_at(T + SESSION_TTL_MS), first);
		assert_ne!(identity.session_id_at(T + SESSION_TTL_MS + 1), first);
	}

	#[test]
	fn test_session_without_timestamp_is_replaced() {
		let (identity, store) = manager();
		store.put_string(keys::SESSION_ID, "orphan").unwrap();

		assert!(identity.current_session().unwrap().is_none());
		assert_ne!(identity.session_id_at(T), "orphan");
	}

	#[test]
	fn test_anonymous_id_is_stable() {
		let (identity, store) = manager();
		let first = identity.anonymous_id();
		assert_eq!(identity.anonymous_id(), first);
		assert_eq!(store.get_string(keys::ANONYMOUS_ID).unwrap(), Some(first.0));
	}

	#[test]
	fn test_anonymous_id_survives_session_rotation() {
		let (identity, _store) = manager();
		let anonymous_id = identity.anonymous_id();
		identity.session_id_at(T);
		identity.session_id_at(T + 2 * SESSION_TTL_MS);
		assert_eq!(identity.anonymous_id(), anonymous_id);
	}

	#[test]
	fn test_reset_forgets_identity() {
		let (identity, _store) = manager();
		let anonymous_id = identity.anonymous_id();
		identity.reset().unwrap();
		assert_ne!(identity.anonymous_id(), anonymous_id);
	}

	#[test]
	fn test_reset_surfaces_store_error() {
		let identity = IdentityManager::new(Arc::new(FailingStore));
		assert!(matches!(
			identity.reset(),
			Err(SdkError::Store(StoreError::Poisoned))
		));
	}

	#[test]
	fn test_store_failure_yields_fresh_ids() {
		let identity = IdentityManager::new(Arc::new(FailingStore));

		let a = identity.anonymous_id();
		let b = identity.anonymous_id();
		assert_ne!(a, b);
		assert!(uuid::Uuid::parse_str(a.as_str()).is_ok());

		assert_ne!(identity.session_id_at(T), identity.session_id_at(T));
	}

	#[test]
	fn test_write_failure_is_not_persisted() {
		let identity = IdentityManager::new(Arc::new(ReadOnlyStore));
		assert_ne!(identity.anonymous_id(), identity.anonymous_id());
		assert_ne!(identity.session_id_at(T), identity.session_id_at(T));
	}
}
