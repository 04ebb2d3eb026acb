// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup.
//!
//! Output goes to stdout and, when configured, to a size-rotated file; both
//! are PII-masked. Every event also lands in the in-memory log buffer that
//! backs the admin log routes.

use std::path::PathBuf;

use deadforest_redact::MessageFormatter;
use deadforest_server_config::LoggingConfig;
use deadforest_server_logs::{BufferLayer, LogBuffer, MaskingMakeWriter, RotatingFile};
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{
	fmt::{self, MakeWriter},
	layer::SubscriberExt,
	registry::LookupSpan,
	util::{SubscriberInitExt, TryInitError},
	EnvFilter, Layer,
};

#[derive(Debug, Error)]
pub enum TelemetryError {
	#[error("failed to open log file {path}: {source}")]
	LogFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to install tracing subscriber: {0}")]
	Init(#[from] TryInitError),
}

/// Build the log buffer described by `config`.
pub fn build_log_buffer(config: &LoggingConfig) -> LogBuffer {
	LogBuffer::with_formatter(
		config.buffer_size,
		MessageFormatter::new(config.max_message_len),
	)
}

/// Install the global subscriber and return the buffer it feeds.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<LogBuffer, TelemetryError> {
	let log_buffer = build_log_buffer(config);

	let file_layer = match &config.file {
		Some(path) => {
			let file = RotatingFile::open(path, config.file_max_bytes, config.file_backups)
				.map_err(|source| TelemetryError::LogFile {
					path: path.clone(),
					source,
				})?;
			Some(output_layer(config.json, false, MaskingMakeWriter::new(file)))
		}
		None => None,
	};

	tracing_subscriber::registry()
		.with(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| config.level.clone().into()),
		)
		.with(output_layer(
			config.json,
			true,
			MaskingMakeWriter::new(std::io::stdout),
		))
		.with(file_layer)
		.with(BufferLayer::new(log_buffer.clone()))
		.try_init()?;

	tracing::debug!(
		json = config.json,
		file = ?config.file,
		buffer_size = config.buffer_size,
		"tracing initialized"
	);

	Ok(log_buffer)
}

fn output_layer<S, W>(json: bool, ansi: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
	let layer = fmt::layer().with_ansi(ansi).with_writer(writer);
	if json {
		layer.json().boxed()
	} else {
		layer.boxed()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use deadforest_server_config::LoggingConfig;

	#[test]
	fn test_buffer_follows_config() {
		let config = LoggingConfig {
			buffer_size: 3,
			max_message_len: 8,
			..Default::default()
		};
		let buffer = build_log_buffer(&config);
		assert_eq!(buffer.capacity(), 3);

		buffer.record(
			deadforest_server_logs::LogLevel::Info,
			"app",
			"-",
			"a message longer than eight characters",
		);
		let entry = &buffer.snapshot_recent(1)[0];
		assert_eq!(entry.message, "a messag…");
	}

	#[test]
	fn test_unopenable_log_file_errors() {
		let dir = tempfile::tempdir().unwrap();
		let blocker = dir.path().join("blocker");
		std::fs::write(&blocker, "not a directory").unwrap();

		let config = LoggingConfig {
			file: Some(blocker.join("server.log")),
			..Default::default()
		};
		let err = init_tracing(&config).unwrap_err();
		assert!(matches!(err, TelemetryError::LogFile { .. }));
	}
}
