// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	middleware::from_fn_with_state,
	routing::get,
	Json, Router,
};
use deadforest_server_config::{AuthConfig, ServerConfig};
use deadforest_server_logs::LogBuffer;
use utoipa::OpenApi;

use crate::alerts::ErrorSpikeDetector;
use crate::api_docs::ApiDoc;
use crate::middleware::request_context;
use crate::routes;
use crate::telemetry::build_log_buffer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub log_buffer: LogBuffer,
	pub auth: Arc<AuthConfig>,
	pub spike_detector: Arc<ErrorSpikeDetector>,
}

/// Build the application state from configuration.
///
/// `log_buffer` should be the buffer the tracing subscriber feeds; when
/// `None`, a fresh one sized from `config.logging` is created.
pub fn create_app_state(config: &ServerConfig, log_buffer: Option<LogBuffer>) -> AppState {
	let log_buffer = log_buffer.unwrap_or_else(|| build_log_buffer(&config.logging));

	if config.auth.operators.is_empty() {
		tracing::warn!("no operator tokens configured; admin routes will reject every request");
	}

	AppState {
		log_buffer,
		auth: Arc::new(config.auth.clone()),
		spike_detector: Arc::new(ErrorSpikeDetector::from_config(&config.alerts)),
	}
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/", get(routes::health::root))
		.route("/health", get(routes::health::health_check))
		.route(
			"/api/admin/logs",
			get(routes::admin_logs::list_logs).delete(routes::admin_logs::clear_logs),
		)
		.route("/api/admin/logs/stream", get(routes::admin_logs::stream_logs))
		.route("/api/openapi.json", get(openapi_json))
		.layer(from_fn_with_state(state.clone(), request_context))
		.with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(ApiDoc::openapi())
}
