// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collector query-string construction.
//!
//! Every request is a GET whose parameters live in the query string. Keys are
//! emitted in a fixed order and optional keys are omitted entirely when the
//! source value is missing or blank.

use url::Url;

use crate::context::RequestContext;
use crate::environment::{Endpoint, EndpointConfig, Environment};
use crate::event::{EventName, EventParameter};
use crate::ids::TraceId;
use crate::params::{EventParams, PerformanceEventParams};

/// Wire keys understood by the collectors.
pub mod keys {
	pub const SDK_VERSION: &str = "v";
	pub const APP: &str = "app";
	pub const TIMESTAMP: &str = "t";
	pub const DEVICE_ID: &str = "d";
	pub const OS: &str = "os";
	pub const LANGUAGE: &str = "lng";
	pub const EVENT_NAME: &str = "en";
	pub const EVENT_PARAMETER: &str = "ep";
	pub const ANONYMOUS_ID: &str = "aid";
	pub const USER_ID: &str = "uid";
	pub const LINE_ITEM_IDS: &str = "li";
	pub const PRODUCT_LIST: &str = "pl";
	pub const SESSION_ID: &str = "s";
	pub const CATEGORY_ID: &str = "ct";
	pub const KEYWORD: &str = "kw";
	pub const LOYALTY_CARD: &str = "lc";
	pub const TRANSACTION_ID: &str = "trans";
	pub const TOTAL_ROW_COUNT: &str = "trc";
	pub const TRACE_ID: &str = "tid";
	pub const LINE_ITEM_ID: &str = "li";
	pub const CREATIVE_ID: &str = "c";
	pub const AD_UNIT: &str = "au";
	pub const PRODUCT_SKU: &str = "psku";
	pub const PAYLOAD: &str = "pyl";
}

/// Ordered query parameters for one collector request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, key: &'static str, value: impl Into<String>) {
		self.0.push((key, value.into()));
	}

	/// Adds the pair only when `value` is present and not blank.
	pub fn push_optional(&mut self, key: &'static str, value: Option<&str>) {
		if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
			self.push(key, value);
		}
	}

	/// Value of the first pair with `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.iter().any(|(k, _)| *k == key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.0.iter().map(|(k, _)| *k)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
		self.0.iter().map(|(k, v)| (*k, v.as_str()))
	}
}

/// Builds the query for an interaction event.
///
/// `ctx.app` is expected to already reflect any `params.app` override.
pub fn build_event_query(
	name: EventName,
	parameter: EventParameter,
	params: &EventParams,
	ctx: &RequestContext,
	now_ms: i64,
) -> QueryParams {
	let mut query = QueryParams::new();
	query.push(keys::SDK_VERSION, ctx.sdk_version.as_str());
	query.push(keys::APP, ctx.app.as_str());
	query.push(keys::TIMESTAMP, now_ms.to_string());
	query.push(keys::DEVICE_ID, ctx.device_id.as_str());
	query.push(keys::OS, ctx.os.as_str());
	query.push(keys::LANGUAGE, ctx.language.as_str());
	query.push(keys::EVENT_NAME, name.as_str());
	query.push(keys::EVENT_PARAMETER, parameter.as_str());

	query.push_optional(keys::ANONYMOUS_ID, Some(ctx.anonymous_id.as_str()));
	query.push_optional(keys::USER_ID, params.user_id.as_deref());
	query.push_optional(keys::LINE_ITEM_IDS, params.line_item_ids.as_deref());
	query.push_optional(keys::PRODUCT_LIST, params.product_list.as_deref());
	query.push_optional(keys::SESSION_ID, Some(ctx.session_id.as_str()));
	query.push_optional(keys::CATEGORY_ID, params.category_id.as_deref());
	query.push_optional(keys::KEYWORD, params.keyword.as_deref());
	query.push_optional(keys::LOYALTY_CARD, params.loyalty_card.as_deref());
	query.push_optional(keys::TRANSACTION_ID, params.transaction_id.as_deref());
	if let Some(total_row_count) = params.total_row_count {
		query.push(keys::TOTAL_ROW_COUNT, total_row_count.to_string());
	}

	query.push(keys::TRACE_ID, TraceId::new().to_string());
	query
}

/// Builds the query for an ad impression or click.
pub fn build_performance_query(params: &PerformanceEventParams, ctx: &RequestContext, now_ms: i64) -> QueryParams {
	let mut query = QueryParams::new();
	query.push(keys::LINE_ITEM_ID, params.line_item_id.as_str());
	query.push(keys::CREATIVE_ID, params.creative_id.as_str());
	query.push(keys::AD_UNIT, params.ad_unit.as_str());
	query.push(keys::PRODUCT_SKU, params.product_sku.as_str());
	query.push(keys::PAYLOAD, params.payload.as_str());
	query.push_optional(keys::KEYWORD, params.keyword.as_deref());

	query.push(keys::TIMESTAMP, now_ms.to_string());
	query.push(keys::OS, ctx.os.as_str());
	query.push(keys::APP, ctx.app.as_str());
	query.push(keys::DEVICE_ID, ctx.device_id.as_str());
	query.push(keys::LANGUAGE, ctx.language.as_str());

	query.push_optional(keys::ANONYMOUS_ID, Some(ctx.anonymous_id.as_str()));
	query.push_optional(keys::USER_ID, params.user_id.as_deref());
	query.push_optional(keys::SESSION_ID, Some(ctx.session_id.as_str()));

	query.push(keys::TRACE_ID, TraceId::new().to_string());
	query
}

/// Full request URL: environment base, endpoint path, form-encoded query.
pub fn build_url(
	endpoints: &EndpointConfig,
	environment: Environment,
	endpoint: Endpoint,
	query: &QueryParams,
) -> Result<Url, url::ParseError> {
	let base = endpoints.hosts(environment).base_url(endpoint);
	let mut url = Url::parse(&format!("{base}{}", endpoint.path()))?;
	url.query_pairs_mut().extend_pairs(query.iter());
	Ok(url)
}
