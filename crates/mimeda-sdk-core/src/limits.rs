// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Maximum field lengths, in characters.

pub const MAX_USER_ID_LENGTH: usize = 256;
pub const MAX_STRING_LENGTH: usize = 1024;
pub const MAX_PRODUCT_LIST_LENGTH: usize = 10 * 1024;
pub const MAX_KEYWORD_LENGTH: usize = 256;
pub const MAX_PAYLOAD_LENGTH: usize = 64 * 1024;
