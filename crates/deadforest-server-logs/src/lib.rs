// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory log capture and operator queries for the DeadForest server.
//!
//! This crate provides:
//! - [`LogEntry`] - A captured record with level, logger, request id, message and audit fields
//! - [`LogBuffer`] - A thread-safe ring buffer that stores recent log entries
//! - [`BufferLayer`] - A tracing Layer that feeds every event into the buffer
//! - [`LogQuery`] - Operator filters evaluated newest-first over the buffer
//! - [`audit!`] - Emission of `event=<name> key=value` audit records
//! - [`MaskingMakeWriter`] and [`RotatingFile`] - PII-masked stdout and file output
//!
//! # Usage
//!
//! ```ignore
//! use deadforest_server_logs::{BufferLayer, LogBuffer, MaskingMakeWriter};
//! use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
//!
//! let log_buffer = LogBuffer::new(500);
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer().with_writer(MaskingMakeWriter::new(std::io::stdout)))
//!     .with(BufferLayer::new(log_buffer.clone()))
//!     .init();
//!
//! deadforest_server_logs::audit!("admin.logs.clear", actor_id = 1, removed = 12);
//! ```

pub mod audit;
mod buffer;
mod entry;
mod layer;
mod parse;
mod query;
mod rotating;
mod writer;

pub use audit::{AuditValue, AUDIT_TARGET, PASSWORD_MASK};
pub use buffer::{LogBuffer, DEFAULT_CAPACITY, QUERY_WINDOW};
pub use entry::{ActorId, LogEntry, LogLevel, NO_REQUEST_ID};
pub use layer::{BufferLayer, REQUEST_ID_FIELD};
pub use parse::{mask_password_pairs, tokenize, AuditFields, AuditParseError, AuditToken};
pub use query::{contains_term, render_extras, FilterError, LogQuery, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
pub use rotating::{RotatingFile, RotatingFileWriter, DEFAULT_BACKUPS, DEFAULT_MAX_BYTES};
pub use writer::{MaskingMakeWriter, MaskingWriter};
