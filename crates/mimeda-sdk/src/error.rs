// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the tracking SDK.

use mimeda_common_http::RetryableError;
use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that can occur in the tracking SDK.
///
/// None of these reach the host app as a panic or a failed call: they are
/// logged and, where relevant, handed to the registered error callback.
#[derive(Debug, Error)]
pub enum SdkError {
	/// API key is missing or blank.
	#[error("API key is required")]
	InvalidApiKey,

	/// Host package name is missing or blank.
	#[error("package name is required")]
	MissingPackageName,

	/// Tracking was requested before `initialize` succeeded.
	#[error("SDK is not initialized")]
	NotInitialized,

	/// The SDK has been shut down.
	#[error("SDK has been shut down")]
	ClientShutdown,

	/// HTTP request failed before a response was received.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Collector rejected the request (4xx). Never retried.
	#[error("client error (status {status}): {message}")]
	ClientError {
		/// HTTP status code.
		status: u16,
		/// Response body or reason phrase.
		message: String,
	},

	/// Collector failed to handle the request (5xx).
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Response body or reason phrase.
		message: String,
	},

	/// Collector answered with a status outside 2xx, 4xx and 5xx.
	#[error("unexpected response status {status}")]
	UnexpectedStatus { status: u16 },

	/// Request was abandoned because the SDK is shutting down.
	#[error("request cancelled")]
	Cancelled,

	/// Collector URL could not be built.
	#[error("invalid collector URL: {0}")]
	InvalidUrl(#[from] url::ParseError),

	#[error("identity store error: {0}")]
	Store(#[from] StoreError),

	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	/// Dispatch worker could not be started or stopped cleanly.
	#[error("dispatch worker error: {0}")]
	Worker(String),
}

impl RetryableError for SdkError {
	fn is_retryable(&self) -> bool {
		match self {
			SdkError::RequestFailed(e) => e.is_retryable(),
			SdkError::ServerError { .. } => true,
			_ => false,
		}
	}
}

/// Errors raised by identity store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("encoding error: {0}")]
	Encoding(#[from] base64::DecodeError),

	#[error("encryption failed: {0}")]
	Encryption(String),

	#[error("decryption failed: {0}")]
	Decryption(String),

	/// Stored value has a different type than requested.
	#[error("value for key {key} has an unexpected type")]
	TypeMismatch { key: String },

	#[error("store lock poisoned")]
	Poisoned,
}

/// Errors raised while loading or validating [`crate::SdkConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to parse TOML: {0}")]
	TomlParse(#[from] toml::de::Error),

	#[error("invalid value for {field}: {message}")]
	InvalidValue { field: &'static str, message: String },
}
