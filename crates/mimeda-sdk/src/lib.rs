// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Mimeda tracking SDK.
//!
//! Sends interaction events and ad-performance events (impressions and
//! clicks) to the Mimeda collectors. Tracking calls return immediately;
//! delivery, retries and failure reporting happen on a background worker.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mimeda_sdk::{AppContext, Environment, EventName, EventParameter, EventParams, MemoryStore, MimedaSdk};
//!
//! let sdk = MimedaSdk::new();
//! let app = AppContext::new("com.example.shop", Arc::new(MemoryStore::new()));
//! sdk.initialize(app, "api-key", Environment::Production, None);
//!
//! sdk.track_event(
//! 	EventName::Pdp,
//! 	EventParameter::View,
//! 	EventParams::new().with_product_list("SKU-1:1:99.90"),
//! );
//!
//! sdk.shutdown();
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod encrypted_store;
pub mod error;
pub mod identity;
pub mod queue;
pub mod store;
pub mod tracker;

pub use callback::{CallbackAdapter, ErrorCallback};
pub use client::MimedaSdk;
pub use config::{SdkConfig, SdkConfigLayer};
pub use device::{AppContext, DeviceInfo, ResolvedDevice};
pub use dispatch::{collector_client, CollectorRequest, Dispatcher, RequestKind};
pub use encrypted_store::{generate_key, EncryptedFileStore};
pub use error::{ConfigError, Result, SdkError, StoreError};
pub use identity::IdentityManager;
pub use queue::{DispatchQueue, JobHandler, ShutdownOutcome};
pub use store::{IdentityStore, MemoryStore};
pub use tracker::{EventPipeline, EventTracker, TrackJob};

pub use mimeda_sdk_core::{
	CollectorHosts, EndpointConfig, Environment, EventName, EventParameter, EventParams, PerformanceEventParams,
	PerformanceEventType,
};

/// Version of this SDK crate.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
