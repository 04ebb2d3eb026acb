// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin log endpoints.
//!
//! - GET /api/admin/logs - Recent entries, newest first, filtered
//! - DELETE /api/admin/logs - Clear the buffer
//! - GET /api/admin/logs/stream - SSE stream of new entries
//!
//! # Security
//!
//! All endpoints require an operator bearer token.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
	extract::{rejection::QueryRejection, Query, State},
	response::sse::{Event, KeepAlive, Sse},
	Json,
};
use deadforest_server_logs::{audit, LogQuery};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::auth::RequireOperator;
use crate::error::ServerError;

/// Interval between SSE keep-alive comments.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Query parameters for listing logs.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListLogsParams {
	/// Maximum number of entries to return (default: 200, clamped to 1..=1000)
	#[param(default = 200)]
	pub limit: Option<i64>,
	/// Exact audit event name, or a term searched in the message
	pub event: Option<String>,
	/// Actor id of audit records
	pub actor_id: Option<i64>,
	/// Substring of the audit target
	pub target: Option<String>,
	/// Space-separated `key=value` pairs, all of which must match
	pub extras: Option<String>,
}

impl ListLogsParams {
	fn to_query(&self) -> LogQuery {
		let mut query = filter_query(
			self.event.as_deref(),
			self.actor_id,
			self.target.as_deref(),
			self.extras.as_deref(),
		);
		if let Some(limit) = self.limit {
			query = query.with_limit(limit);
		}
		query
	}
}

/// Query parameters for log streaming.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StreamLogsParams {
	/// Accepted for parity with the list endpoint; ignored
	pub limit: Option<i64>,
	/// Exact audit event name, or a term searched in the message
	pub event: Option<String>,
	/// Actor id of audit records
	pub actor_id: Option<i64>,
	/// Substring of the audit target
	pub target: Option<String>,
	/// Space-separated `key=value` pairs, all of which must match
	pub extras: Option<String>,
}

impl StreamLogsParams {
	fn to_query(&self) -> LogQuery {
		filter_query(
			self.event.as_deref(),
			self.actor_id,
			self.target.as_deref(),
			self.extras.as_deref(),
		)
	}
}

fn filter_query(
	event: Option<&str>,
	actor_id: Option<i64>,
	target: Option<&str>,
	extras: Option<&str>,
) -> LogQuery {
	let mut query = LogQuery::new();
	if let Some(event) = event {
		query = query.with_event(event);
	}
	if let Some(actor_id) = actor_id {
		query = query.with_actor_id(actor_id);
	}
	if let Some(target) = target {
		query = query.with_target(target);
	}
	if let Some(extras) = extras {
		query = query.with_extras(extras);
	}
	query
}

/// Response for clearing logs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearLogsResponse {
	pub status: String,
	/// Number of entries removed
	pub removed: usize,
}

/// GET /api/admin/logs - List recent log entries.
#[utoipa::path(
    get,
    path = "/api/admin/logs",
    params(ListLogsParams),
    responses(
        (status = 200, description = "Matching log entries, newest first", body = Vec<deadforest_server_logs::LogEntry>),
        (status = 400, description = "Invalid query parameters", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[tracing::instrument(skip_all, fields(actor_id = operator))]
pub async fn list_logs(
	State(state): State<AppState>,
	RequireOperator(operator): RequireOperator,
	params: Result<Query<ListLogsParams>, QueryRejection>,
) -> Result<Json<Vec<deadforest_server_logs::LogEntry>>, ServerError> {
	let Query(params) = params.map_err(|e| ServerError::BadRequest(e.body_text()))?;
	let query = params.to_query();
	let entries = state.log_buffer.query(&query);
	tracing::debug!(
		returned = entries.len(),
		limit = query.limit(),
		"listed log entries"
	);
	Ok(Json(entries))
}

/// DELETE /api/admin/logs - Clear the log buffer.
#[utoipa::path(
    delete,
    path = "/api/admin/logs",
    responses(
        (status = 200, description = "Buffer cleared", body = ClearLogsResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[tracing::instrument(skip_all, fields(actor_id = operator))]
pub async fn clear_logs(
	State(state): State<AppState>,
	RequireOperator(operator): RequireOperator,
) -> Json<ClearLogsResponse> {
	let removed = state.log_buffer.clear();
	audit!("admin.logs.clear", actor_id = operator, removed = removed);

	Json(ClearLogsResponse {
		status: "ok".to_string(),
		removed,
	})
}

/// GET /api/admin/logs/stream - Stream new log entries via SSE.
#[utoipa::path(
    get,
    path = "/api/admin/logs/stream",
    params(StreamLogsParams),
    responses(
        (status = 200, description = "SSE log stream", content_type = "text/event-stream"),
        (status = 400, description = "Invalid query parameters", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[tracing::instrument(skip_all, fields(actor_id = operator))]
pub async fn stream_logs(
	State(state): State<AppState>,
	RequireOperator(operator): RequireOperator,
	params: Result<Query<StreamLogsParams>, QueryRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
	let Query(params) = params.map_err(|e| ServerError::BadRequest(e.body_text()))?;
	let query = params.to_query();

	let rx = state.log_buffer.subscribe();
	let stream = BroadcastStream::new(rx).filter_map(move |result| {
		// Lagged receivers skip what they missed.
		let entry = result.ok()?;
		if !matches!(query.matches(&entry), Ok(true)) {
			return None;
		}
		let json = serde_json::to_string(&entry).ok()?;
		Some(Ok::<_, Infallible>(Event::default().data(json)))
	});

	Ok(Sse::new(stream).keep_alive(
		KeepAlive::new()
			.interval(KEEP_ALIVE_INTERVAL)
			.text("keep-alive"),
	))
}
