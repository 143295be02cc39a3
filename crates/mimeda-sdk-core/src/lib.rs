// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Mimeda tracking SDK.
//!
//! This crate holds the pure, I/O-free half of the event submission pipeline.
//! It is used by the `mimeda-sdk` client and can be reused by anything that
//! needs to produce collector-compatible requests.
//!
//! # Overview
//!
//! - Event enums and their collector wire values
//! - Parameter records for interaction and ad-performance events
//! - Input sanitization and field validation
//! - Session, anonymous and trace identifiers
//! - Environment-aware collector endpoints and query-string construction

pub mod context;
pub mod environment;
pub mod event;
pub mod ids;
pub mod limits;
pub mod params;
pub mod query;
pub mod sanitize;
pub mod validate;

pub use context::{first_present, RequestContext};
pub use environment::{CollectorHosts, Endpoint, EndpointConfig, Environment};
pub use event::{EventName, EventParameter, EventType, ParseEventError, PerformanceEventType};
pub use ids::{new_id, AnonymousId, Session, TraceId, SESSION_TTL_MS};
pub use params::{EventParams, PerformanceEventParams};
pub use query::{build_event_query, build_performance_query, build_url, QueryParams};
pub use sanitize::{contains_sql_injection, sanitize, sanitize_event_params, sanitize_performance_params};
pub use validate::{
	validate_event_context, validate_event_fields, validate_event_params, validate_performance_context,
	validate_performance_event_params, validate_performance_fields, ValidationResult,
};
