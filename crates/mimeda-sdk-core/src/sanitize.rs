// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cleaning and bounding of user-supplied strings.
//!
//! Sanitizing never fails: markup is dropped, NUL characters are removed and
//! over-long values are truncated with a debug log line.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::limits::{
	MAX_KEYWORD_LENGTH, MAX_PAYLOAD_LENGTH, MAX_PRODUCT_LIST_LENGTH, MAX_STRING_LENGTH, MAX_USER_ID_LENGTH,
};
use crate::params::{EventParams, PerformanceEventParams};

static SCRIPT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());

static HTML_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static SQL_INJECTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)('|--|;|/\*|\*/|@@|@|char|nchar|varchar|nvarchar|alter|begin|cast|create|cursor|declare|delete|drop|end|exec|execute|fetch|insert|kill|open|select|sys|sysobjects|syscolumns|table|update)",
	)
	.unwrap()
});

/// Cleans `value` and bounds it to `max_length` characters.
///
/// Steps, in order: drop `<script>` blocks, strip remaining tags, remove NUL
/// characters, truncate, trim. `None` stays `None` and blank input is
/// returned untouched.
pub fn sanitize(value: Option<&str>, max_length: usize) -> Option<String> {
	let value = value?;
	if value.trim().is_empty() {
		return Some(value.to_string());
	}

	let without_scripts = SCRIPT_REGEX.replace_all(value, "");
	let without_tags = HTML_TAG_REGEX.replace_all(&without_scripts, "");
	let mut cleaned: String = without_tags.chars().filter(|c| *c != '\0').collect();

	if let Some((byte_index, _)) = cleaned.char_indices().nth(max_length) {
		cleaned.truncate(byte_index);
		debug!(max_length, "input truncated");
	}

	Some(cleaned.trim().to_string())
}

pub fn sanitize_string(value: Option<&str>) -> Option<String> {
	sanitize(value, MAX_STRING_LENGTH)
}

pub fn sanitize_user_id(value: Option<&str>) -> Option<String> {
	sanitize(value, MAX_USER_ID_LENGTH)
}

pub fn sanitize_keyword(value: Option<&str>) -> Option<String> {
	sanitize(value, MAX_KEYWORD_LENGTH)
}

pub fn sanitize_product_list(value: Option<&str>) -> Option<String> {
	sanitize(value, MAX_PRODUCT_LIST_LENGTH)
}

pub fn sanitize_payload(value: Option<&str>) -> Option<String> {
	sanitize(value, MAX_PAYLOAD_LENGTH)
}

/// Returns a sanitized copy of interaction event parameters.
pub fn sanitize_event_params(params: &EventParams) -> EventParams {
	EventParams {
		user_id: sanitize_user_id(params.user_id.as_deref()),
		line_item_ids: sanitize_string(params.line_item_ids.as_deref()),
		product_list: sanitize_product_list(params.product_list.as_deref()),
		category_id: sanitize_string(params.category_id.as_deref()),
		keyword: sanitize_keyword(params.keyword.as_deref()),
		loyalty_card: sanitize_string(params.loyalty_card.as_deref()),
		transaction_id: sanitize_string(params.transaction_id.as_deref()),
		total_row_count: params.total_row_count,
		app: sanitize_string(params.app.as_deref()),
	}
}

/// Returns a sanitized copy of ad-performance parameters.
pub fn sanitize_performance_params(params: &PerformanceEventParams) -> PerformanceEventParams {
	let required = |value: &str, max_length: usize| sanitize(Some(value), max_length).unwrap_or_default();

	PerformanceEventParams {
		line_item_id: required(&params.line_item_id, MAX_STRING_LENGTH),
		creative_id: required(&params.creative_id, MAX_STRING_LENGTH),
		ad_unit: required(&params.ad_unit, MAX_STRING_LENGTH),
		product_sku: required(&params.product_sku, MAX_STRING_LENGTH),
		payload: required(&params.payload, MAX_PAYLOAD_LENGTH),
		keyword: sanitize_keyword(params.keyword.as_deref()),
		user_id: sanitize_user_id(params.user_id.as_deref()),
	}
}

/// Heuristic check for SQL metacharacters and keywords.
///
/// Matches are loose (`open`, `end` and `@` all count), so this is only fit
/// for diagnostics and never for rejecting input.
pub fn contains_sql_injection(value: Option<&str>) -> bool {
	match value {
		Some(value) if !value.trim().is_empty() => SQL_INJECTION_REGEX.is_match(value),
		_ => false,
	}
}
