// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use deadforest_server_config::ConfigError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::telemetry::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Configuration could not be loaded.
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),

	/// Tracing could not be installed.
	#[error("Telemetry error: {0}")]
	Telemetry(#[from] TelemetryError),

	/// Binding or serving failed.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Missing or unknown operator token.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	/// Invalid request parameters.
	#[error("Invalid request: {0}")]
	BadRequest(String),
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			ServerError::Unauthorized(msg) => {
				tracing::warn!(error = %msg, "unauthorized");
				(
					StatusCode::UNAUTHORIZED,
					ErrorResponse::new("unauthorized", "Authentication required"),
				)
			}
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::Config(_) | ServerError::Telemetry(_) | ServerError::Io(_) => {
				tracing::error!(error = %self, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
		};

		(status, Json(body)).into_response()
	}
}
