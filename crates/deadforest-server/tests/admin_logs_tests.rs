// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end tests for the admin log routes.

use axum::{
	body::Body,
	http::{header, Method, Request, StatusCode},
	response::Response,
	Router,
};
use deadforest_server::{create_app_state, create_router};
use deadforest_server_config::{
	finalize, AlertsConfigLayer, AuthConfigLayer, OperatorLayer, ServerConfig, ServerConfigLayer,
};
use deadforest_server_logs::{ActorId, BufferLayer, LogBuffer, LogLevel};
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

const TOKEN: &str = "operator-secret";
const OPERATOR_ID: i64 = 42;

fn test_config() -> ServerConfig {
	finalize(ServerConfigLayer {
		auth: Some(AuthConfigLayer {
			operators: Some(vec![OperatorLayer {
				actor_id: OPERATOR_ID,
				token: TOKEN.to_string(),
			}]),
		}),
		alerts: Some(AlertsConfigLayer {
			error_spike_threshold: Some(2),
			..Default::default()
		}),
		..Default::default()
	})
	.unwrap()
}

fn setup() -> (Router, LogBuffer) {
	let buffer = LogBuffer::new(100);
	let state = create_app_state(&test_config(), Some(buffer.clone()));
	(create_router(state), buffer)
}

fn get(uri: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
		.body(Body::empty())
		.unwrap()
}

async fn body_json(response: Response) -> Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

fn seed(buffer: &LogBuffer) {
	buffer.record(
		LogLevel::Info,
		"audit",
		"req-1",
		"event=auth.login actor_id=1 target=user:1 ip=10.0.0.1",
	);
	buffer.record(
		LogLevel::Info,
		"audit",
		"req-2",
		"event=promo.create actor_id=2 target=promo:SAVE10 percent=10",
	);
	buffer.record(LogLevel::Warn, "payments", "req-3", "card declined for order 17");
	buffer.record(
		LogLevel::Info,
		"audit",
		"req-4",
		"event=auth.login actor_id=3 target=user:3 ip=10.0.0.3",
	);
}

#[tokio::test]
async fn test_health_routes() {
	let (app, _) = setup();
	for uri in ["/", "/health"] {
		let response = app
			.clone()
			.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let json = body_json(response).await;
		assert_eq!(json["status"], "ok");
		assert_eq!(json["service"], "deadforest");
	}
}

#[tokio::test]
async fn test_missing_token_rejected() {
	let (app, _) = setup();
	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/admin/logs")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	let json = body_json(response).await;
	assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_unknown_token_rejected() {
	let (app, _) = setup();
	for (method, uri) in [
		(Method::GET, "/api/admin/logs"),
		(Method::DELETE, "/api/admin/logs"),
		(Method::GET, "/api/admin/logs/stream"),
	] {
		let response = app
			.clone()
			.oneshot(
				Request::builder()
					.method(method)
					.uri(uri)
					.header(header::AUTHORIZATION, "Bearer not-the-token")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
	}
}

#[tokio::test]
async fn test_list_returns_newest_first() {
	let (app, buffer) = setup();
	seed(&buffer);

	let response = app.oneshot(get("/api/admin/logs")).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	let entries = json.as_array().unwrap();
	assert_eq!(entries.len(), 4);
	assert_eq!(entries[0]["request_id"], "req-4");
	assert_eq!(entries[3]["request_id"], "req-1");
	assert_eq!(entries[2]["logger"], "audit");
	assert!(entries[1].get("event").is_none());
}

#[tokio::test]
async fn test_list_filters_by_event_and_actor() {
	let (app, buffer) = setup();
	seed(&buffer);

	let response = app
		.oneshot(get("/api/admin/logs?event=auth.login&actor_id=3"))
		.await
		.unwrap();
	let json = body_json(response).await;
	let entries = json.as_array().unwrap();
	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0]["actor_id"], 3);
	assert_eq!(entries[0]["target"], "user:3");
}

#[tokio::test]
async fn test_list_filters_by_target_and_extras() {
	let (app, buffer) = setup();
	seed(&buffer);

	let response = app
		.clone()
		.oneshot(get("/api/admin/logs?target=promo"))
		.await
		.unwrap();
	let json = body_json(response).await;
	assert_eq!(json.as_array().unwrap().len(), 1);

	let response = app
		.oneshot(get("/api/admin/logs?extras=ip%3D10.0.0.1"))
		.await
		.unwrap();
	let json = body_json(response).await;
	let entries = json.as_array().unwrap();
	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0]["extras"]["ip"], "10.0.0.1");
}

#[tokio::test]
async fn test_list_limit_applied() {
	let (app, buffer) = setup();
	seed(&buffer);

	let response = app.oneshot(get("/api/admin/logs?limit=2")).await.unwrap();
	let json = body_json(response).await;
	let entries = json.as_array().unwrap();
	assert_eq!(entries.len(), 2);
	assert_eq!(entries[0]["request_id"], "req-4");
}

#[tokio::test]
async fn test_non_numeric_actor_param_is_bad_request() {
	let (app, _) = setup();
	let response = app
		.oneshot(get("/api/admin/logs?actor_id=abc"))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let json = body_json(response).await;
	assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_clear_reports_removed_and_audits_itself() {
	let (app, buffer) = setup();
	seed(&buffer);

	let subscriber = tracing_subscriber::registry().with(BufferLayer::new(buffer.clone()));
	let _guard = tracing::subscriber::set_default(subscriber);

	let response = app
		.oneshot(
			Request::builder()
				.method(Method::DELETE)
				.uri("/api/admin/logs")
				.header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
				.header("x-request-id", "req-clear")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["status"], "ok");
	assert_eq!(json["removed"], 4);

	let entries = buffer.snapshot_recent(10);
	let first = entries.last().unwrap();
	assert_eq!(first.event.as_deref(), Some("admin.logs.clear"));
	assert_eq!(first.actor_id, Some(ActorId::Id(OPERATOR_ID)));
	assert_eq!(first.extras.as_ref().unwrap()["removed"], "4");
	assert_eq!(first.request_id, "req-clear");

	let access = &entries[0];
	assert_eq!(access.logger_name, "request");
	assert!(access.message.starts_with("DELETE /api/admin/logs -> 200 ("));
	assert_eq!(access.request_id, "req-clear");
}

#[tokio::test]
async fn test_request_id_echoed() {
	let (app, _) = setup();
	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.uri("/health")
				.header("x-request-id", "abc-123")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.headers()["x-request-id"], "abc-123");

	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();
	let generated = response.headers()["x-request-id"].to_str().unwrap();
	assert!(generated.starts_with("req-"));
}

#[tokio::test]
async fn test_stream_opens_event_stream() {
	let (app, _) = setup();
	let response = app
		.oneshot(get("/api/admin/logs/stream?event=auth.login"))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
	assert!(content_type.starts_with("text/event-stream"));
}

#[tokio::test]
async fn test_openapi_document_served() {
	let (app, _) = setup();
	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/openapi.json")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert!(json["paths"]["/api/admin/logs"].is_object());
	assert!(json["paths"]["/api/admin/logs/stream"].is_object());
}
