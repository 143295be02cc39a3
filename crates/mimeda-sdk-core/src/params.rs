// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller-supplied parameters for tracked events.

use serde::{Deserialize, Serialize};

/// Optional attributes attached to an interaction event.
///
/// Every field is optional. A `None` or blank value leaves the matching query
/// key out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParams {
	pub user_id: Option<String>,
	/// Comma-separated line item identifiers.
	pub line_item_ids: Option<String>,
	/// Serialized product list, usually `sku:qty:price` entries.
	pub product_list: Option<String>,
	pub category_id: Option<String>,
	pub keyword: Option<String>,
	pub loyalty_card: Option<String>,
	pub transaction_id: Option<String>,
	pub total_row_count: Option<i64>,
	/// Overrides the app name reported by the device.
	pub app: Option<String>,
}

impl EventParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	pub fn with_line_item_ids(mut self, line_item_ids: impl Into<String>) -> Self {
		self.line_item_ids = Some(line_item_ids.into());
		self
	}

	pub fn with_product_list(mut self, product_list: impl Into<String>) -> Self {
		self.product_list = Some(product_list.into());
		self
	}

	pub fn with_category_id(mut self, category_id: impl Into<String>) -> Self {
		self.category_id = Some(category_id.into());
		self
	}

	pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
		self.keyword = Some(keyword.into());
		self
	}

	pub fn with_loyalty_card(mut self, loyalty_card: impl Into<String>) -> Self {
		self.loyalty_card = Some(loyalty_card.into());
		self
	}

	pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
		self.transaction_id = Some(transaction_id.into());
		self
	}

	pub fn with_total_row_count(mut self, total_row_count: i64) -> Self {
		self.total_row_count = Some(total_row_count);
		self
	}

	pub fn with_app(mut self, app: impl Into<String>) -> Self {
		self.app = Some(app.into());
		self
	}
}

/// One ad impression or click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceEventParams {
	pub line_item_id: String,
	pub creative_id: String,
	pub ad_unit: String,
	pub product_sku: String,
	/// Opaque ad-server payload, echoed back verbatim.
	pub payload: String,
	pub keyword: Option<String>,
	pub user_id: Option<String>,
}

impl PerformanceEventParams {
	pub fn new(
		line_item_id: impl Into<String>,
		creative_id: impl Into<String>,
		ad_unit: impl Into<String>,
		product_sku: impl Into<String>,
		payload: impl Into<String>,
	) -> Self {
		Self {
			line_item_id: line_item_id.into(),
			creative_id: creative_id.into(),
			ad_unit: ad_unit.into(),
			product_sku: product_sku.into(),
			payload: payload.into(),
			keyword: None,
			user_id: None,
		}
	}

	pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
		self.keyword = Some(keyword.into());
		self
	}

	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}
}
