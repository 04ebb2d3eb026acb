// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator filters over buffered log entries.

use indexmap::IndexMap;
use thiserror::Error;

use crate::entry::{ActorId, LogEntry};

/// Result count used when the caller does not ask for one.
pub const DEFAULT_QUERY_LIMIT: usize = 200;
/// Upper bound on returned entries.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Errors raised while evaluating a filter against one entry.
///
/// An entry whose evaluation errors is excluded from the result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
	#[error("actor_id is not numeric: {0}")]
	NonNumericActorId(String),

	#[error("extras token has an empty key: {0}")]
	EmptyExtrasKey(String),
}

/// Filters for [`LogBuffer::query`](crate::LogBuffer::query).
///
/// All set filters must match (logical AND). Empty strings count as unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
	limit: usize,
	pub event: Option<String>,
	pub actor_id: Option<i64>,
	pub target: Option<String>,
	pub extras: Option<String>,
}

impl Default for LogQuery {
	fn default() -> Self {
		Self {
			limit: DEFAULT_QUERY_LIMIT,
			event: None,
			actor_id: None,
			target: None,
			extras: None,
		}
	}
}

impl LogQuery {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the result limit, clamped to `[1, MAX_QUERY_LIMIT]`.
	pub fn with_limit(mut self, limit: i64) -> Self {
		self.limit = limit.clamp(1, MAX_QUERY_LIMIT as i64) as usize;
		self
	}

	pub fn with_event(mut self, event: impl Into<String>) -> Self {
		self.event = non_empty(event.into());
		self
	}

	pub fn with_actor_id(mut self, actor_id: i64) -> Self {
		self.actor_id = Some(actor_id);
		self
	}

	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = non_empty(target.into());
		self
	}

	pub fn with_extras(mut self, extras: impl Into<String>) -> Self {
		self.extras = non_empty(extras.into());
		self
	}

	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Evaluate every set filter against `entry`.
	pub fn matches(&self, entry: &LogEntry) -> Result<bool, FilterError> {
		if let Some(event) = self.event.as_deref().filter(|e| !e.is_empty()) {
			let hit = match &entry.event {
				Some(structured) => structured == event,
				None => contains_term(&entry.message, event),
			};
			if !hit {
				return Ok(false);
			}
		}

		if let Some(actor_id) = self.actor_id {
			let hit = match &entry.actor_id {
				Some(ActorId::Id(id)) => *id == actor_id,
				Some(ActorId::Raw(raw)) => return Err(FilterError::NonNumericActorId(raw.clone())),
				None => entry.message.contains(&format!("actor_id={actor_id}")),
			};
			if !hit {
				return Ok(false);
			}
		}

		if let Some(target) = self.target.as_deref().filter(|t| !t.is_empty()) {
			let needle = target.to_lowercase();
			let structured = entry
				.target
				.as_deref()
				.is_some_and(|t| t.to_lowercase().contains(&needle));
			if !structured && !entry.message.to_lowercase().contains(&needle) {
				return Ok(false);
			}
		}

		if let Some(extras) = self.extras.as_deref().filter(|e| !e.is_empty()) {
			if !matches_extras(entry, extras)? {
				return Ok(false);
			}
		}

		Ok(true)
	}

	/// Filter newest-first `entries` and cut the result to the limit.
	pub fn apply(&self, entries: Vec<LogEntry>) -> Vec<LogEntry> {
		entries
			.into_iter()
			.filter(|entry| self.matches(entry).unwrap_or(false))
			.take(self.limit)
			.collect()
	}
}

fn non_empty(value: String) -> Option<String> {
	(!value.is_empty()).then_some(value)
}

fn matches_extras(entry: &LogEntry, query: &str) -> Result<bool, FilterError> {
	let empty = IndexMap::new();
	let extras = entry.extras.as_ref().unwrap_or(&empty);
	let needle = query.to_lowercase();

	if render_extras(extras).to_lowercase().contains(&needle) {
		return Ok(true);
	}
	if entry.message.to_lowercase().contains(&needle) {
		return Ok(true);
	}

	for token in query.split_whitespace() {
		let hit = match token.split_once('=') {
			Some(("", _)) => return Err(FilterError::EmptyExtrasKey(token.to_string())),
			Some((key, value)) => extras
				.get(key)
				.is_some_and(|v| v.to_lowercase().contains(&value.to_lowercase())),
			None => {
				let token = token.to_lowercase();
				extras.values().any(|v| v.to_lowercase().contains(&token))
			}
		};
		if !hit {
			return Ok(false);
		}
	}
	Ok(true)
}

/// Render extras as `{'key': 'value', ...}` in emission order, or `{}` when empty.
pub fn render_extras(extras: &IndexMap<String, String>) -> String {
	let body = extras
		.iter()
		.map(|(k, v)| format!("'{k}': '{v}'"))
		.collect::<Vec<_>>()
		.join(", ");
	format!("{{{body}}}")
}

/// Case-insensitive search for `needle` as a whole term of `haystack`.
///
/// An occurrence is rejected when a word character (alphanumeric or `_`)
/// directly borders a word character at the matching edge of `needle`.
pub fn contains_term(haystack: &str, needle: &str) -> bool {
	let haystack = haystack.to_lowercase();
	let needle = needle.to_lowercase();
	let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().last()) else {
		return true;
	};

	haystack.match_indices(needle.as_str()).any(|(start, matched)| {
		let before = haystack[..start].chars().next_back();
		let after = haystack[start + matched.len()..].chars().next();
		let open = !is_word_char(first) || !before.is_some_and(is_word_char);
		let close = !is_word_char(last) || !after.is_some_and(is_word_char);
		open && close
	})
}

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}
