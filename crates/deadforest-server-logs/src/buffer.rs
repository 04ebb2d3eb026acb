// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Thread-safe ring buffer for log entries.

use std::collections::VecDeque;
use std::sync::Arc;

use deadforest_redact::MessageFormatter;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::audit::AUDIT_TARGET;
use crate::entry::{LogEntry, LogLevel};
use crate::parse::{mask_password_pairs, AuditFields};
use crate::query::LogQuery;

/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 500;
/// Number of newest entries a query filters over, independent of its limit.
pub const QUERY_WINDOW: usize = 1000;

const BROADCAST_CAPACITY: usize = 1024;

/// A thread-safe ring buffer that stores recent log entries.
///
/// When the buffer is full, oldest entries are evicted to make room for new ones.
/// Supports both snapshot queries and real-time streaming via broadcast channel.
/// Clones share the same underlying buffer.
#[derive(Clone)]
pub struct LogBuffer {
	inner: Arc<LogBufferInner>,
}

struct LogBufferInner {
	state: RwLock<BufferState>,
	capacity: usize,
	formatter: MessageFormatter,
	/// Broadcast channel for real-time streaming.
	sender: broadcast::Sender<LogEntry>,
}

struct BufferState {
	entries: VecDeque<LogEntry>,
	/// Next entry ID (monotonically increasing).
	next_id: u64,
}

impl LogBuffer {
	/// Create a new log buffer with the specified capacity (at least 1).
	pub fn new(capacity: usize) -> Self {
		Self::with_formatter(capacity, MessageFormatter::default())
	}

	/// Create a buffer whose messages are formatted by `formatter`.
	pub fn with_formatter(capacity: usize, formatter: MessageFormatter) -> Self {
		let capacity = capacity.max(1);
		let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
		Self {
			inner: Arc::new(LogBufferInner {
				state: RwLock::new(BufferState {
					entries: VecDeque::with_capacity(capacity),
					next_id: 1,
				}),
				capacity,
				formatter,
				sender,
			}),
		}
	}

	/// Create a new log buffer with default capacity.
	pub fn with_default_capacity() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}

	/// Ingest a raw log record.
	///
	/// The message is folded to one line, PII-masked and capped. Records on
	/// the audit channel first have password pairs masked, then get structured
	/// fields parsed from the masked message. Returns the assigned entry id.
	pub fn record(&self, level: LogLevel, logger: &str, request_id: &str, raw_message: &str) -> u64 {
		if logger != AUDIT_TARGET {
			let message = self.inner.formatter.format(raw_message);
			return self.push(level, logger, request_id, message, None);
		}

		let raw_message = mask_password_pairs(raw_message);
		let message = self.inner.formatter.format(&raw_message);
		let audit = AuditFields::parse(&raw_message).masked();
		self.push(level, logger, request_id, message, Some(audit))
	}

	/// Append an already formatted entry.
	///
	/// If the buffer is full, the oldest entry is evicted.
	/// The entry is also broadcast to all subscribers.
	pub fn push(
		&self,
		level: LogLevel,
		logger: &str,
		request_id: &str,
		message: String,
		audit: Option<AuditFields>,
	) -> u64 {
		let entry = {
			let mut state = self.inner.state.write();
			let id = state.next_id;
			state.next_id += 1;

			let entry = LogEntry::new(id, level, logger, request_id, message, audit);
			if state.entries.len() >= self.inner.capacity {
				state.entries.pop_front();
			}
			state.entries.push_back(entry.clone());
			entry
		};

		let id = entry.id;
		// No receivers is fine; lagging receivers drop entries on their side.
		let _ = self.inner.sender.send(entry);
		id
	}

	/// Up to `n` most recent entries, newest first.
	pub fn snapshot_recent(&self, n: usize) -> Vec<LogEntry> {
		self.inner
			.state
			.read()
			.entries
			.iter()
			.rev()
			.take(n)
			.cloned()
			.collect()
	}

	/// Entries matching `query`, newest first.
	///
	/// Filters the newest [`QUERY_WINDOW`] entries outside the lock.
	pub fn query(&self, query: &LogQuery) -> Vec<LogEntry> {
		query.apply(self.snapshot_recent(QUERY_WINDOW))
	}

	/// Get the total number of entries currently in the buffer.
	pub fn len(&self) -> usize {
		self.inner.state.read().entries.len()
	}

	/// Check if the buffer is empty.
	pub fn is_empty(&self) -> bool {
		self.inner.state.read().entries.is_empty()
	}

	/// Get the buffer capacity.
	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}

	/// Get the current entry ID counter (next ID to be assigned).
	pub fn current_id(&self) -> u64 {
		self.inner.state.read().next_id
	}

	/// Subscribe to real-time log entries.
	///
	/// Returns a broadcast receiver that will receive new log entries as they are pushed.
	pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
		self.inner.sender.subscribe()
	}

	/// Clear all entries from the buffer, returning how many were removed.
	///
	/// Ids keep increasing across a clear.
	pub fn clear(&self) -> usize {
		let mut state = self.inner.state.write();
		let removed = state.entries.len();
		state.entries.clear();
		removed
	}
}

impl Default for LogBuffer {
	fn default() -> Self {
		Self::with_default_capacity()
	}
}

impl std::fmt::Debug for LogBuffer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LogBuffer")
			.field("len", &self.len())
			.field("capacity", &self.inner.capacity)
			.finish()
	}
}
