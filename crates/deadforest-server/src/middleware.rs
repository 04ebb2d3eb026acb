// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request context: request id, access log line and error-spike tracking.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
	extract::{ConnectInfo, Request, State},
	http::{
		header::USER_AGENT,
		HeaderMap, HeaderValue,
	},
	middleware::Next,
	response::Response,
};
use tracing::Instrument;

use crate::alerts::ALERT_TARGET;
use crate::api::AppState;

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Target of the access log line.
pub const REQUEST_TARGET: &str = "request";

/// Wrap each request in a `request` span carrying its id.
///
/// Every event emitted while handling the request, including audit records,
/// is attributed to that id in the log buffer.
pub async fn request_context(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Response {
	let request_id = request_id_from(request.headers()).unwrap_or_else(generate_request_id);
	let method = request.method().clone();
	let path = request.uri().path().to_string();
	let ip = client_ip(&request);
	let user_agent = request
		.headers()
		.get(USER_AGENT)
		.and_then(|v| v.to_str().ok())
		.unwrap_or("-")
		.to_string();

	let span = tracing::info_span!("request", request_id = %request_id);
	let started = Instant::now();
	let mut response = next.run(request).instrument(span.clone()).await;
	let elapsed_ms = started.elapsed().as_millis();
	let status = response.status();

	span.in_scope(|| {
		tracing::info!(
			target: REQUEST_TARGET,
			"{method} {path} -> {} ({elapsed_ms} ms) ip={ip} ua={user_agent}",
			status.as_u16()
		);

		if status.is_server_error() {
			if let Some(spike) = state.spike_detector.record_error() {
				tracing::warn!(
					target: ALERT_TARGET,
					"error_spike count={} window={}s threshold={}",
					spike.count,
					spike.window_secs,
					spike.threshold
				);
			}
		}
	});

	if let Ok(value) = HeaderValue::from_str(&request_id) {
		response.headers_mut().insert(REQUEST_ID_HEADER, value);
	}
	response
}

fn request_id_from(headers: &HeaderMap) -> Option<String> {
	headers
		.get(REQUEST_ID_HEADER)
		.and_then(|v| v.to_str().ok())
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.map(str::to_string)
}

/// `req-<unix-millis>`.
pub fn generate_request_id() -> String {
	format!("req-{}", chrono::Utc::now().timestamp_millis())
}

/// Client address from `x-forwarded-for`, then the connection, else `-`.
fn client_ip(request: &Request) -> String {
	if let Some(forwarded) = request
		.headers()
		.get("x-forwarded-for")
		.and_then(|v| v.to_str().ok())
		.filter(|v| !v.is_empty())
	{
		return forwarded.to_string();
	}

	request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map(|ConnectInfo(addr)| addr.ip().to_string())
		.unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http;

	#[test]
	fn test_generated_request_id_shape() {
		let id = generate_request_id();
		let millis = id.strip_prefix("req-").unwrap();
		assert!(millis.parse::<i64>().unwrap() > 0);
	}

	#[test]
	fn test_request_id_header_used() {
		let mut headers = HeaderMap::new();
		headers.insert("x-request-id", HeaderValue::from_static("abc-1"));
		assert_eq!(request_id_from(&headers), Some("abc-1".to_string()));
	}

	#[test]
	fn test_blank_request_id_ignored() {
		let mut headers = HeaderMap::new();
		headers.insert("x-request-id", HeaderValue::from_static(""));
		assert_eq!(request_id_from(&headers), None);
	}

	#[test]
	fn test_client_ip_prefers_forwarded_for() {
		let mut request = http::Request::builder()
			.header("x-forwarded-for", "203.0.113.7")
			.body(Body::empty())
			.unwrap();
		request
			.extensions_mut()
			.insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));
		assert_eq!(client_ip(&request), "203.0.113.7");
	}

	#[test]
	fn test_client_ip_falls_back_to_connection() {
		let mut request = http::Request::builder().body(Body::empty()).unwrap();
		request
			.extensions_mut()
			.insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));
		assert_eq!(client_ip(&request), "10.0.0.1");
	}

	#[test]
	fn test_client_ip_unknown() {
		let request = http::Request::builder().body(Body::empty()).unwrap();
		assert_eq!(client_ip(&request), "-");
	}
}
