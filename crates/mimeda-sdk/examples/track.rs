// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Track a few events against the staging collectors.
//!
//! Run with:
//!   MIMEDA_API_KEY=... cargo run --example track -p mimeda-sdk

use std::sync::Arc;

use mimeda_sdk::{
	AppContext, DeviceInfo, EncryptedFileStore, Environment, ErrorCallback, EventName, EventParameter, EventParams,
	MimedaSdk, PerformanceEventParams, PerformanceEventType, SdkConfig, SdkError,
};
use tracing_subscriber::EnvFilter;

struct PrintingCallback;

impl ErrorCallback for PrintingCallback {
	fn on_event_tracking_failed(&self, name: EventName, parameter: EventParameter, error: &SdkError) {
		eprintln!("event {name}/{parameter} failed: {error}");
	}

	fn on_performance_event_tracking_failed(&self, kind: PerformanceEventType, error: &SdkError) {
		eprintln!("{kind} failed: {error}");
	}

	fn on_validation_failed(&self, name: Option<EventName>, errors: &[String]) {
		eprintln!("validation failed for {name:?}: {}", errors.join(", "));
	}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mimeda_sdk=debug")))
		.init();

	let api_key = std::env::var("MIMEDA_API_KEY").expect("MIMEDA_API_KEY environment variable required");

	// A fresh key each run, so ids reset. Real apps load the key from a keystore.
	let store_dir = std::env::temp_dir();
	let store = EncryptedFileStore::in_dir(&store_dir, mimeda_sdk::generate_key());
	println!("Identity store: {}", store.path().display());

	let app = AppContext::new("com.example.shop", Arc::new(store)).with_device(
		DeviceInfo::new()
			.with_app_name("Example Shop")
			.with_language("tr-TR"),
	);

	let config = SdkConfig::default().with_debug_logging(true);
	let sdk = MimedaSdk::new();
	if !sdk.initialize_with_config(app, &api_key, Environment::Staging, Some(Arc::new(PrintingCallback)), config) {
		return Err("SDK initialization failed".into());
	}

	sdk.track_event(EventName::Home, EventParameter::View, EventParams::new());
	sdk.track_event(
		EventName::Search,
		EventParameter::View,
		EventParams::new()
			.with_keyword("running shoes")
			.with_total_row_count(128),
	);
	sdk.track_event(
		EventName::Cart,
		EventParameter::AddToCart,
		EventParams::new()
			.with_user_id("user_example_123")
			.with_product_list("SKU-1:1:499.90"),
	);
	sdk.track_performance_impression(PerformanceEventParams::new("li-1", "cr-1", "home-top", "SKU-1", "example"));
	sdk.track_performance_click(PerformanceEventParams::new("li-1", "cr-1", "home-top", "SKU-1", "example"));

	println!("Waiting for delivery...");
	sdk.shutdown();
	println!("Done");

	Ok(())
}
