// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! DeadForest operator log server.
//!
//! Serves the in-memory log buffer and audit trail to authenticated
//! operators over HTTP, with filtering and live streaming.

pub mod alerts;
pub mod api;
pub mod api_docs;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use alerts::{ErrorSpike, ErrorSpikeDetector};
pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use auth::RequireOperator;
pub use deadforest_server_config::ServerConfig;
pub use error::{ErrorResponse, ServerError};
pub use telemetry::{init_tracing, TelemetryError};
