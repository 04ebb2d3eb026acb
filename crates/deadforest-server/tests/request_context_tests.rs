// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request middleware behavior against a router with a failing route.

use axum::{
	body::Body,
	http::{Request, StatusCode},
	middleware::from_fn_with_state,
	routing::get,
	Router,
};
use deadforest_server::{create_app_state, middleware::request_context, AppState};
use deadforest_server_config::{finalize, AlertsConfigLayer, ServerConfigLayer};
use deadforest_server_logs::{BufferLayer, LogBuffer, LogLevel, NO_REQUEST_ID};
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

fn app_with_threshold(threshold: u32) -> (Router, LogBuffer) {
	let config = finalize(ServerConfigLayer {
		alerts: Some(AlertsConfigLayer {
			error_spike_threshold: Some(threshold),
			error_window_secs: Some(60),
		}),
		..Default::default()
	})
	.unwrap();
	let buffer = LogBuffer::new(100);
	let state: AppState = create_app_state(&config, Some(buffer.clone()));

	let app = Router::new()
		.route("/ok", get(|| async { "fine" }))
		.route(
			"/boom",
			get(|| async {
				tracing::error!(target: "checkout", "payment provider unreachable");
				StatusCode::INTERNAL_SERVER_ERROR
			}),
		)
		.layer(from_fn_with_state(state.clone(), request_context))
		.with_state(state);
	(app, buffer)
}

async fn call(app: &Router, uri: &str) -> StatusCode {
	app.clone()
		.oneshot(
			Request::builder()
				.uri(uri)
				.header("user-agent", "probe/1.0")
				.header("x-forwarded-for", "10.1.2.3")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap()
		.status()
}

#[tokio::test]
async fn test_access_line_format() {
	let (app, buffer) = app_with_threshold(10);
	let _guard = tracing::subscriber::set_default(
		tracing_subscriber::registry().with(BufferLayer::new(buffer.clone())),
	);

	assert_eq!(call(&app, "/ok").await, StatusCode::OK);

	let entries = buffer.snapshot_recent(1);
	let line = &entries[0];
	assert_eq!(line.logger_name, "request");
	assert_eq!(line.level, LogLevel::Info);
	assert!(line.message.starts_with("GET /ok -> 200 ("), "{}", line.message);
	assert!(line.message.ends_with(" ms) ip=10.1.2.3 ua=probe/1.0"), "{}", line.message);
	assert!(line.request_id.starts_with("req-"));
}

#[tokio::test]
async fn test_handler_events_carry_request_id() {
	let (app, buffer) = app_with_threshold(10);
	let _guard = tracing::subscriber::set_default(
		tracing_subscriber::registry().with(BufferLayer::new(buffer.clone())),
	);

	call(&app, "/boom").await;
	tracing::info!(target: "startup", "outside any request");

	let entries = buffer.snapshot_recent(3);
	assert_eq!(entries[0].request_id, NO_REQUEST_ID);
	assert_eq!(entries[1].logger_name, "request");
	assert_eq!(entries[2].logger_name, "checkout");
	assert_eq!(entries[1].request_id, entries[2].request_id);
	assert_ne!(entries[2].request_id, NO_REQUEST_ID);
}

#[tokio::test]
async fn test_error_spike_alert_fires_once() {
	let (app, buffer) = app_with_threshold(2);
	let _guard = tracing::subscriber::set_default(
		tracing_subscriber::registry().with(BufferLayer::new(buffer.clone())),
	);

	for _ in 0..4 {
		assert_eq!(call(&app, "/boom").await, StatusCode::INTERNAL_SERVER_ERROR);
	}
	call(&app, "/ok").await;

	let alerts: Vec<_> = buffer
		.snapshot_recent(100)
		.into_iter()
		.filter(|e| e.logger_name == "alert")
		.collect();
	assert_eq!(alerts.len(), 1);
	assert_eq!(alerts[0].level, LogLevel::Warn);
	assert_eq!(alerts[0].message, "error_spike count=2 window=60s threshold=2");
}
