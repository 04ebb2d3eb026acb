// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LEVEL: &str = "info";
pub const DEFAULT_FILE_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_FILE_BACKUPS: usize = 5;
pub const DEFAULT_BUFFER_SIZE: usize = 500;
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	pub level: Option<String>,
	pub json: Option<bool>,
	pub file: Option<PathBuf>,
	pub file_max_bytes: Option<u64>,
	pub file_backups: Option<usize>,
	pub buffer_size: Option<usize>,
	pub max_message_len: Option<usize>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.json.is_some() {
			self.json = other.json;
		}
		if other.file.is_some() {
			self.file = other.file;
		}
		if other.file_max_bytes.is_some() {
			self.file_max_bytes = other.file_max_bytes;
		}
		if other.file_backups.is_some() {
			self.file_backups = other.file_backups;
		}
		if other.buffer_size.is_some() {
			self.buffer_size = other.buffer_size;
		}
		if other.max_message_len.is_some() {
			self.max_message_len = other.max_message_len;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
			json: self.json.unwrap_or(false),
			file: self.file,
			file_max_bytes: self.file_max_bytes.unwrap_or(DEFAULT_FILE_MAX_BYTES),
			file_backups: self.file_backups.unwrap_or(DEFAULT_FILE_BACKUPS),
			buffer_size: self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE),
			max_message_len: self.max_message_len.unwrap_or(DEFAULT_MAX_MESSAGE_LEN),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
	/// `EnvFilter` directive used when `RUST_LOG` is unset.
	pub level: String,
	/// Emit JSON lines instead of text.
	pub json: bool,
	/// Optional size-rotated log file.
	pub file: Option<PathBuf>,
	pub file_max_bytes: u64,
	pub file_backups: usize,
	/// Capacity of the in-memory ring buffer.
	pub buffer_size: usize,
	/// Character cap applied to buffered messages.
	pub max_message_len: usize,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfigLayer::default().finalize()
	}
}
