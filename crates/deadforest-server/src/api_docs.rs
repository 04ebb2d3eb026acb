// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::{
	openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
	Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DeadForest Operator Log API",
        version = "1.0.0",
        description = "Recent server log entries and the audit trail, for operators.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Liveness checks"),
        (name = "admin", description = "Operator log inspection and streaming")
    ),
    paths(
        crate::routes::health::root,
        crate::routes::health::health_check,
        crate::routes::admin_logs::list_logs,
        crate::routes::admin_logs::clear_logs,
        crate::routes::admin_logs::stream_logs,
    ),
    components(
        schemas(
            crate::routes::health::HealthResponse,
            crate::routes::admin_logs::ClearLogsResponse,
            crate::error::ErrorResponse,
            deadforest_server_logs::LogEntry,
            deadforest_server_logs::LogLevel,
            deadforest_server_logs::ActorId,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the operator bearer scheme.
struct BearerAuth;

impl Modify for BearerAuth {
	fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
		if let Some(components) = openapi.components.as_mut() {
			components.add_security_scheme(
				"bearer",
				SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
			);
		}
	}
}
