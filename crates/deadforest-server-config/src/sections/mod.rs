// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for deadforest-server.

pub mod alerts;
pub mod auth;
pub mod http;
pub mod logging;

pub use alerts::{AlertsConfig, AlertsConfigLayer};
pub use auth::{hash_token, parse_operator_tokens, AuthConfig, AuthConfigLayer, OperatorLayer, OperatorToken};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
