// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Encrypted on-disk identity store.
//!
//! The whole key-value map is serialized to JSON, sealed with AES-256-GCM
//! under a host-supplied key and written base64-encoded as
//! `nonce || ciphertext`. A fresh random nonce is used for every write.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use aes_gcm::{
	aead::{Aead, KeyInit, OsRng},
	Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::StoreError;
use crate::store::{IdentityStore, StoredValue};

/// Size of the store key in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// File name used by [`EncryptedFileStore::in_dir`].
pub const DEFAULT_FILE_NAME: &str = "mimeda_sdk.store";

type Entries = HashMap<String, StoredValue>;

/// Generate a random store key.
pub fn generate_key() -> Zeroizing<[u8; KEY_SIZE]> {
	let mut key = Zeroizing::new([0u8; KEY_SIZE]);
	OsRng.fill_bytes(key.as_mut());
	key
}

fn generate_nonce() -> [u8; NONCE_SIZE] {
	let mut nonce = [0u8; NONCE_SIZE];
	OsRng.fill_bytes(&mut nonce);
	nonce
}

/// AES-256-GCM encrypted file store.
///
/// The file is read lazily on first access. Concurrent first calls converge
/// on a single in-memory map, and every write is persisted before it becomes
/// visible to readers.
pub struct EncryptedFileStore {
	path: PathBuf,
	key: Zeroizing<[u8; KEY_SIZE]>,
	init_lock: Mutex<()>,
	state: OnceLock<Mutex<Entries>>,
}

impl fmt::Debug for EncryptedFileStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EncryptedFileStore")
			.field("path", &self.path)
			.field("loaded", &self.state.get().is_some())
			.finish_non_exhaustive()
	}
}

impl EncryptedFileStore {
	/// Store backed by the file at `path`. Nothing is read until first use.
	pub fn new(path: impl Into<PathBuf>, key: Zeroizing<[u8; KEY_SIZE]>) -> Self {
		Self {
			path: path.into(),
			key,
			init_lock: Mutex::new(()),
			state: OnceLock::new(),
		}
	}

	/// Store backed by [`DEFAULT_FILE_NAME`] inside `dir`.
	pub fn in_dir(dir: impl AsRef<Path>, key: Zeroizing<[u8; KEY_SIZE]>) -> Self {
		Self::new(dir.as_ref().join(DEFAULT_FILE_NAME), key)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn entries(&self) -> Result<MutexGuard<'_, Entries>, StoreError> {
		if let Some(state) = self.state.get() {
			return state.lock().map_err(|_| StoreError::Poisoned);
		}

		{
			let _init = self.init_lock.lock().map_err(|_| StoreError::Poisoned)?;
			if self.state.get().is_none() {
				let entries = self.load()?;
				let _ = self.state.set(Mutex::new(entries));
			}
		}

		self.state
			.get()
			.ok_or(StoreError::Poisoned)?
			.lock()
			.map_err(|_| StoreError::Poisoned)
	}

	fn load(&self) -> Result<Entries, StoreError> {
		let encoded = match fs::read_to_string(&self.path) {
			Ok(encoded) => encoded,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				debug!(path = %self.path.display(), "identity store not found, starting empty");
				return Ok(Entries::new());
			}
			Err(e) => return Err(e.into()),
		};

		match self.decrypt(encoded.trim()) {
			Ok(entries) => Ok(entries),
			Err(e) => {
				// Unreadable contents are replaced on the next write.
				warn!(path = %self.path.display(), error = %e, "identity store unreadable, starting empty");
				Ok(Entries::new())
			}
		}
	}

	fn decrypt(&self, encoded: &str) -> Result<Entries, StoreError> {
		let sealed = BASE64.decode(encoded)?;
		if sealed.len() < NONCE_SIZE {
			return Err(StoreError::Decryption("sealed data shorter than nonce".to_string()));
		}
		let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);

		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.as_slice()));
		let plaintext = Zeroizing::new(
			cipher
				.decrypt(Nonce::from_slice(nonce), ciphertext)
				.map_err(|e| StoreError::Decryption(format!("store decryption failed: {e}")))?,
		);

		Ok(serde_json::from_slice(&plaintext)?)
	}

	fn encrypt(&self, entries: &Entries) -> Result<String, StoreError> {
		let plaintext = Zeroizing::new(serde_json::to_vec(entries)?);

		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.as_slice()));
		let nonce = generate_nonce();
		let ciphertext = cipher
			.encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
			.map_err(|e| StoreError::Encryption(format!("store encryption failed: {e}")))?;

		let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
		sealed.extend_from_slice(&nonce);
		sealed.extend_from_slice(&ciphertext);
		Ok(BASE64.encode(sealed))
	}

	fn persist(&self, entries: &Entries) -> Result<(), StoreError> {
		let encoded = self.encrypt(entries)?;
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}
		let tmp = self.path.with_extension("tmp");
		fs::write(&tmp, encoded)?;
		fs::rename(&tmp, &self.path)?;
		Ok(())
	}

	fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
		Ok(self.entries()?.get(key).cloned())
	}

	fn put(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
		let mut entries = self.entries()?;
		let mut updated = entries.clone();
		updated.insert(key.to_string(), value);
		self.persist(&updated)?;
		*entries = updated;
		Ok(())
	}
}

impl IdentityStore for EncryptedFileStore {
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
		let mut entries = self.entries()?;
		match fs::remove_file(&self.path) {
			Ok(()) => {}
			Err(e) if e.kind() == ErrorKind::NotFound => {}
			Err(e) => return Err(e.into()),
		}
		entries.clear();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::keys;
	use std::sync::Arc;
	use tempfile::TempDir;

	fn key_from(byte: u8) -> Zeroizing<[u8; KEY_SIZE]> {
		Zeroizing::new([byte; KEY_SIZE])
	}

	#[test]
	fn test_missing_file_reads_empty() {
		let dir = TempDir::new().unwrap();
		let store = EncryptedFileStore::in_dir(dir.path(), generate_key());
		assert_eq!(store.get_string(keys::SESSION_ID).unwrap(), None);
		assert!(!store.path().exists());
	}

	#[test]
	fn test_values_survive_reopen() {
		let dir = TempDir::new().unwrap();
		let store = EncryptedFileStore::in_dir(dir.path(), key_from(7));
		store.put_string(keys::ANONYMOUS_ID, "anon-1").unwrap();
		store.put_i64(keys::SESSION_TIMESTAMP, 1_700_000_000_000).unwrap();

		let reopened = EncryptedFileStore::in_dir(dir.path(), key_from(7));
		assert_eq!(reopened.get_string(keys::ANONYMOUS_ID).unwrap().as_deref(), Some("anon-1"));
		assert_eq!(reopened.get_i64(keys::SESSION_TIMESTAMP).unwrap(), Some(1_700_000_000_000));
	}

	#[test]
	fn test_file_does_not_contain_plaintext() {
		let dir = TempDir::new().unwrap();
		let store = EncryptedFileStore::in_dir(dir.path(), generate_key());
		store.put_string(keys::ANONYMOUS_ID, "very-identifiable-value").unwrap();

		let raw = fs::read_to_string(store.path()).unwrap();
		assert!(!raw.contains("very-identifiable-value"));
		assert!(!raw.contains(keys::ANONYMOUS_ID));
		let sealed = BASE64.decode(raw.trim()).unwrap();
		assert!(sealed.len() > NONCE_SIZE);
	}

	#[test]
	fn test_each_write_uses_fresh_nonce() {
		let dir = TempDir::new().unwrap();
		let store = EncryptedFileStore::in_dir(dir.path(), generate_key());
		store.put_string(keys::SESSION_ID, "same").unwrap();
		let first = fs::read_to_string(store.path()).unwrap();
		store.put_string(keys::SESSION_ID, "same").unwrap();
		let second = fs::read_to_string(store.path()).unwrap();
		assert_ne!(first, second);
	}

	#[test]
	fn test_wrong_key_starts_empty() {
		let dir = TempDir::new().unwrap();
		let store = EncryptedFileStore::in_dir(dir.path(), key_from(1));
		store.put_string(keys::SESSION_ID, "s1").unwrap();

		let other = EncryptedFileStore::in_dir(dir.path(), key_from(2));
		assert_eq!(other.get_string(keys::SESSION_ID).unwrap(), None);
	}

	#[test]
	fn test_corrupt_file_is_replaced_on_write() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join(DEFAULT_FILE_NAME);
		fs::write(&path, "definitely not base64!").unwrap();

		let store = EncryptedFileStore::new(&path, key_from(3));
		assert_eq!(store.get_string(keys::SESSION_ID).unwrap(), None);
		store.put_string(keys::SESSION_ID, "s2").unwrap();

		let reopened = EncryptedFileStore::new(&path, key_from(3));
		assert_eq!(reopened.get_string(keys::SESSION_ID).unwrap().as_deref(), Some("s2"));
	}

	#[test]
	fn test_clear_removes_file() {
		let dir = TempDir::new().unwrap();
		let store = EncryptedFileStore::in_dir(dir.path(), generate_key());
		store.put_string(keys::ANONYMOUS_ID, "a").unwrap();
		assert!(store.path().exists());

		store.clear().unwrap();

		assert!(!store.path().exists());
		assert_eq!(store.get_string(keys::ANONYMOUS_ID).unwrap(), None);
	}

	#[test]
	fn test_creates_missing_parent_directories() {
		let dir = TempDir::new().unwrap();
		let store = EncryptedFileStore::in_dir(dir.path().join("nested/sdk"), generate_key());
		store.put_i64(keys::SESSION_TIMESTAMP, 1).unwrap();
		assert!(store.path().exists());
	}

	#[test]
	fn test_concurrent_first_access_converges() {
		let dir = TempDir::new().unwrap();
		let store = Arc::new(EncryptedFileStore::in_dir(dir.path(), key_from(9)));

		let handles: Vec<_> = (0..8)
			.map(|i| {
				let store = store.clone();
				std::thread::spawn(move || store.put_i64(&format!("k{i}"), i).unwrap())
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		let reopened = EncryptedFileStore::in_dir(dir.path(), key_from(9));
		for i in 0..8 {
			assert_eq!(reopened.get_i64(&format!("k{i}")).unwrap(), Some(i));
		}
	}

	#[test]
	fn test_debug_hides_key() {
		let store = EncryptedFileStore::new("/tmp/x.store", key_from(0xAB));
		let debug = format!("{store:?}");
		assert!(debug.contains("x.store"));
		assert!(!debug.contains("171"));
	}
}
