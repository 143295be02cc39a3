// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistent key-value storage for SDK identity state.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Keys the SDK persists.
pub mod keys {
	pub const SESSION_ID: &str = "session_id";
	pub const SESSION_TIMESTAMP: &str = "session_timestamp";
	pub const ANONYMOUS_ID: &str = "anonymous_id";
}

/// String and integer key-value storage owned by the SDK.
///
/// Implementations must be safe to call from any thread, including
/// concurrently on first use.
pub trait IdentityStore: Send + Sync {
	fn get_string(&self, key: &str) -> Result<Option<String>, StoreError>;

	fn put_string(&self, key: &str, value: &str) -> Result<(), StoreError>;

	fn get_i64(&self, key: &str) -> Result<Option<i64>, StoreError>;

	fn put_i64(&self, key: &str, value: i64) -> Result<(), StoreError>;

	/// Removes every entry.
	fn clear(&self) -> Result<(), StoreError>;
}

/// A stored value. Serialized untagged, so the on-disk map reads as plain
/// JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredValue {
	Int(i64),
	Str(String),
}

impl StoredValue {
	pub(crate) fn as_string(&self, key: &str) -> Result<String, StoreError> {
		match self {
			StoredValue::Str(value) => Ok(value.clone()),
			StoredValue::Int(_) => Err(StoreError::TypeMismatch { key: key.to_string() }),
		}
	}

	pub(crate) fn as_i64(&self, key: &str) -> Result<i64, StoreError> {
		match self {
			StoredValue::Int(value) => Ok(*value),
			StoredValue::Str(_) => Err(StoreError::TypeMismatch { key: key.to_string() }),
		}
	}
}

/// In-process store. State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
		let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
		Ok(entries.get(key).cloned())
	}

	fn put(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
		let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
		entries.insert(key.to_string(), value);
		Ok(())
	}
}

impl IdentityStore for MemoryStore {
	fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
		self.get(key)?.map(|value| value.as_string(key)).transpose()
	}

	fn put_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.put(key, StoredValue::Str(value.to_string()))
	}

	fn get_i64(&self, key: &str) -> Result<Option<i64>, StoreError> {
		self.get(key)?.map(|value| value.as_i64(key)).transpose()
	}

	fn put_i64(&self, key: &str, value: i64) -> Result<(), StoreError> {
		self.put(key, StoredValue::Int(value))
	}

	fn clear(&self) -> Result<(), StoreError> {
		self.entries.lock().map_err(|_| StoreError::Poisoned)?.clear();
		Ok(())
	}
}
