// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator authentication for admin routes.
//!
//! Operators present `Authorization: Bearer <token>`. The token is hashed and
//! compared against the configured operator hashes; the matching operator's
//! actor id is handed to the handler.

use axum::{
	extract::FromRequestParts,
	http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::api::AppState;
use crate::error::ServerError;

/// Extractor that requires an authenticated operator.
///
/// Holds the operator's actor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequireOperator(pub i64);

impl FromRequestParts<AppState> for RequireOperator {
	type Rejection = ServerError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let token = bearer_token(&parts.headers)
			.ok_or_else(|| ServerError::Unauthorized("missing bearer token".to_string()))?;

		state
			.auth
			.authenticate(token)
			.map(RequireOperator)
			.ok_or_else(|| ServerError::Unauthorized("unknown operator token".to_string()))
	}
}

/// Extract the token from a `Bearer` authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
}
