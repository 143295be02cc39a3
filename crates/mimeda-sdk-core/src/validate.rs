// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Field validation for tracked events.
//!
//! Validators never fail fast: every problem found is reported, in field
//! order, as a human-readable message. Lengths are counted in characters and
//! blank optional values are not length-checked.

use crate::context::RequestContext;
use crate::event::{EventName, EventParameter};
use crate::limits::{
	MAX_KEYWORD_LENGTH, MAX_PAYLOAD_LENGTH, MAX_PRODUCT_LIST_LENGTH, MAX_STRING_LENGTH, MAX_USER_ID_LENGTH,
};
use crate::params::{EventParams, PerformanceEventParams};

/// Outcome of validating one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
	Valid,
	Invalid(Vec<String>),
}

impl ValidationResult {
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid)
	}

	pub fn errors(&self) -> &[String] {
		match self {
			Self::Valid => &[],
			Self::Invalid(errors) => errors,
		}
	}

	pub fn into_errors(self) -> Vec<String> {
		match self {
			Self::Valid => Vec::new(),
			Self::Invalid(errors) => errors,
		}
	}

	/// Combines two results, keeping the errors of `self` first.
	pub fn merge(self, other: ValidationResult) -> ValidationResult {
		let mut errors = self.into_errors();
		errors.extend(other.into_errors());
		errors.into()
	}
}

impl From<Vec<String>> for ValidationResult {
	fn from(errors: Vec<String>) -> Self {
		if errors.is_empty() {
			Self::Valid
		} else {
			Self::Invalid(errors)
		}
	}
}

#[derive(Default)]
struct Errors(Vec<String>);

impl Errors {
	fn require(&mut self, field: &str, value: &str) {
		if value.trim().is_empty() {
			self.0.push(format!("{field} is required"));
		}
	}

	fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) {
		let Some(value) = value else { return };
		if !value.trim().is_empty() && value.chars().count() > max {
			self.0.push(format!("{field} exceeds maximum length of {max}"));
		}
	}

	fn finish(self) -> ValidationResult {
		self.0.into()
	}
}

/// Checks the caller-supplied optional fields of an interaction event.
pub fn validate_event_fields(params: &EventParams) -> ValidationResult {
	let mut errors = Errors::default();
	errors.max_length("user_id", params.user_id.as_deref(), MAX_USER_ID_LENGTH);
	errors.max_length("product_list", params.product_list.as_deref(), MAX_PRODUCT_LIST_LENGTH);
	errors.max_length("keyword", params.keyword.as_deref(), MAX_KEYWORD_LENGTH);
	for (field, value) in [
		("line_item_ids", &params.line_item_ids),
		("category_id", &params.category_id),
		("loyalty_card", &params.loyalty_card),
		("transaction_id", &params.transaction_id),
		("app", &params.app),
	] {
		errors.max_length(field, value.as_deref(), MAX_STRING_LENGTH);
	}
	errors.finish()
}

fn require_context(errors: &mut Errors, ctx: &RequestContext) {
	errors.require("app", &ctx.app);
	errors.require("device_id", &ctx.device_id);
	errors.require("os", &ctx.os);
	errors.require("language", &ctx.language);
	errors.require("session_id", &ctx.session_id);
	errors.require("anonymous_id", &ctx.anonymous_id);
}

/// Checks the required context values of an interaction event.
pub fn validate_event_context(ctx: &RequestContext, name: EventName, parameter: EventParameter) -> ValidationResult {
	let mut errors = Errors::default();
	require_context(&mut errors, ctx);
	errors.require("event_name", name.as_str());
	errors.require("event_parameter", parameter.as_str());
	errors.finish()
}

/// Full validation of an interaction event: optional fields, then context.
pub fn validate_event_params(
	ctx: &RequestContext,
	name: EventName,
	parameter: EventParameter,
	params: &EventParams,
) -> ValidationResult {
	validate_event_fields(params).merge(validate_event_context(ctx, name, parameter))
}

/// Checks the fields of an ad-performance event.
pub fn validate_performance_fields(params: &PerformanceEventParams) -> ValidationResult {
	let mut errors = Errors::default();
	errors.require("line_item_id", &params.line_item_id);
	errors.require("creative_id", &params.creative_id);
	errors.require("ad_unit", &params.ad_unit);
	errors.require("product_sku", &params.product_sku);
	errors.require("payload", &params.payload);
	errors.max_length("payload", Some(&params.payload), MAX_PAYLOAD_LENGTH);
	errors.max_length("keyword", params.keyword.as_deref(), MAX_KEYWORD_LENGTH);
	errors.max_length("user_id", params.user_id.as_deref(), MAX_USER_ID_LENGTH);
	errors.finish()
}

/// Checks the required context values of an ad-performance event.
pub fn validate_performance_context(ctx: &RequestContext) -> ValidationResult {
	let mut errors = Errors::default();
	require_context(&mut errors, ctx);
	errors.finish()
}

/// Full validation of an ad-performance event: fields, then context.
pub fn validate_performance_event_params(ctx: &RequestContext, params: &PerformanceEventParams) -> ValidationResult {
	validate_performance_fields(params).merge(validate_performance_context(ctx))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn context() -> RequestContext {
		RequestContext {
			sdk_version: "1.0.0".to_string(),
			app: "com.example.shop".to_string(),
			device_id: "device-1".to_string(),
			os: "android".to_string(),
			language: "tr-TR".to_string(),
			session_id: "session-1".to_string(),
			anonymous_id: "anon-1".to_string(),
		}
	}

	fn performance_params() -> PerformanceEventParams {
		PerformanceEventParams::new("li-1", "cr-1", "banner", "sku-1", "{}")
	}

	#[test]
	fn test_empty_event_params_are_valid() {
		assert!(validate_event_fields(&EventParams::default()).is_valid());
		assert!(validate_event_params(&context(), EventName::Home, EventParameter::View, &EventParams::default())
			.is_valid());
	}

	#[test]
	fn test_reports_over_long_optional_fields() {
		let params = EventParams::new()
			.with_user_id("u".repeat(MAX_USER_ID_LENGTH + 1))
			.with_keyword("k".repeat(MAX_KEYWORD_LENGTH + 1))
			.with_category_id("c".repeat(MAX_STRING_LENGTH + 1));

		let result = validate_event_fields(&params);

		assert_eq!(
			result.errors(),
			[
				"user_id exceeds maximum length of 256",
				"keyword exceeds maximum length of 256",
				"category_id exceeds maximum length of 1024",
			]
		);
	}

	#[test]
	fn test_limit_is_inclusive() {
		let params = EventParams::new().with_product_list("p".repeat(MAX_PRODUCT_LIST_LENGTH));
		assert!(validate_event_fields(&params).is_valid());
	}

	#[test]
	fn test_blank_optional_fields_skip_length_check() {
		let params = EventParams::new().with_user_id(" ".repeat(MAX_USER_ID_LENGTH * 2));
		assert!(validate_event_fields(&params).is_valid());
	}

	#[test]
	fn test_missing_context_values_are_required() {
		let ctx = RequestContext {
			device_id: String::new(),
			session_id: "  ".to_string(),
			..context()
		};

		let result = validate_event_context(&ctx, EventName::Cart, EventParameter::AddToCart);

		assert_eq!(result.errors(), ["device_id is required", "session_id is required"]);
	}

	#[test]
	fn test_event_params_merge_field_and_context_errors() {
		let ctx = RequestContext {
			anonymous_id: String::new(),
			..context()
		};
		let params = EventParams::new().with_keyword("k".repeat(300));

		let errors = validate_event_params(&ctx, EventName::Search, EventParameter::View, &params).into_errors();

		assert_eq!(
			errors,
			["keyword exceeds maximum length of 256", "anonymous_id is required"]
		);
	}

	#[test]
	fn test_performance_required_fields() {
		let params = PerformanceEventParams::new("", " ", "banner", "", "{}");

		let result = validate_performance_fields(&params);

		assert_eq!(
			result.errors(),
			[
				"line_item_id is required",
				"creative_id is required",
				"product_sku is required",
			]
		);
	}

	#[test]
	fn test_performance_payload_limit() {
		let mut params = performance_params();
		params.payload = "x".repeat(MAX_PAYLOAD_LENGTH + 1);

		let result = validate_performance_fields(&params);

		assert_eq!(result.errors(), ["payload exceeds maximum length of 65536"]);
	}

	#[test]
	fn test_performance_event_params_checks_context() {
		let ctx = RequestContext {
			language: String::new(),
			..context()
		};

		let result = validate_performance_event_params(&ctx, &performance_params());

		assert_eq!(result, ValidationResult::Invalid(vec!["language is required".to_string()]));
		assert!(validate_performance_event_params(&context(), &performance_params()).is_valid());
	}

	#[test]
	fn test_merge_of_valid_results_is_valid() {
		assert_eq!(ValidationResult::Valid.merge(ValidationResult::Valid), ValidationResult::Valid);
		assert_eq!(ValidationResult::from(Vec::new()), ValidationResult::Valid);
	}

	proptest! {
		#[test]
		fn test_user_id_valid_iff_within_limit(len in 1usize..600) {
			let params = EventParams::new().with_user_id("a".repeat(len));
			prop_assert_eq!(validate_event_fields(&params).is_valid(), len <= MAX_USER_ID_LENGTH);
		}
	}
}
