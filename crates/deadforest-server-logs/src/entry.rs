// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log entry types.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::parse::AuditFields;

/// Request id recorded for events emitted outside any request span.
pub const NO_REQUEST_ID: &str = "-";

/// Log level matching tracing levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	Error,
}

impl LogLevel {
	/// Convert from tracing Level.
	pub fn from_tracing(level: &tracing::Level) -> Self {
		match *level {
			tracing::Level::TRACE => LogLevel::Trace,
			tracing::Level::DEBUG => LogLevel::Debug,
			tracing::Level::INFO => LogLevel::Info,
			tracing::Level::WARN => LogLevel::Warn,
			tracing::Level::ERROR => LogLevel::Error,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Trace => "TRACE",
			LogLevel::Debug => "DEBUG",
			LogLevel::Info => "INFO",
			LogLevel::Warn => "WARN",
			LogLevel::Error => "ERROR",
		}
	}
}

impl std::fmt::Display for LogLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Acting principal of an audit record.
///
/// Audit payloads are text, so a value that is not an integer is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ActorId {
	Id(i64),
	Raw(String),
}

impl ActorId {
	pub fn parse(raw: &str) -> Self {
		raw.parse::<i64>()
			.map(ActorId::Id)
			.unwrap_or_else(|_| ActorId::Raw(raw.to_string()))
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			ActorId::Id(id) => Some(*id),
			ActorId::Raw(_) => None,
		}
	}
}

/// A captured log record.
///
/// `event`, `actor_id`, `target` and `extras` are only ever set on records
/// from the audit channel; `extras` is always present on those.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
	/// Sequence number, strictly increasing in insertion order.
	pub id: u64,
	/// When the record was captured.
	pub timestamp: DateTime<Utc>,
	pub level: LogLevel,
	/// Originating subsystem (the tracing target).
	#[serde(rename = "logger")]
	pub logger_name: String,
	/// Correlation id of the originating request, or `-`.
	pub request_id: String,
	/// Single-line, PII-masked, length-capped message.
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub event: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub actor_id: Option<ActorId>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub target: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub extras: Option<IndexMap<String, String>>,
}

impl LogEntry {
	pub fn new(
		id: u64,
		level: LogLevel,
		logger_name: impl Into<String>,
		request_id: impl Into<String>,
		message: impl Into<String>,
		audit: Option<AuditFields>,
	) -> Self {
		let mut entry = Self {
			id,
			timestamp: Utc::now(),
			level,
			logger_name: logger_name.into(),
			request_id: request_id.into(),
			message: message.into(),
			event: None,
			actor_id: None,
			target: None,
			extras: None,
		};
		if let Some(fields) = audit {
			entry.event = fields.event;
			entry.actor_id = fields.actor_id;
			entry.target = fields.target;
			entry.extras = Some(fields.extras);
		}
		entry
	}

	/// True for records captured from the audit channel.
	pub fn is_audit(&self) -> bool {
		self.extras.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_level_ordering() {
		assert!(LogLevel::Trace < LogLevel::Debug);
		assert!(LogLevel::Debug < LogLevel::Info);
		assert!(LogLevel::Info < LogLevel::Warn);
		assert!(LogLevel::Warn < LogLevel::Error);
	}

	#[test]
	fn test_log_level_display() {
		assert_eq!(LogLevel::Info.to_string(), "INFO");
		assert_eq!(LogLevel::Warn.to_string(), "WARN");
	}

	#[test]
	fn test_actor_id_parse() {
		assert_eq!(ActorId::parse("42"), ActorId::Id(42));
		assert_eq!(ActorId::parse("admin"), ActorId::Raw("admin".to_string()));
		assert_eq!(ActorId::parse("42").as_i64(), Some(42));
	}

	#[test]
	fn test_plain_entry_serialization_omits_audit_fields() {
		let entry = LogEntry::new(1, LogLevel::Info, "request", "req-1", "GET / -> 200", None);

		let json = serde_json::to_value(&entry).unwrap();
		assert_eq!(json["level"], "INFO");
		assert_eq!(json["logger"], "request");
		assert_eq!(json["request_id"], "req-1");
		assert!(json.get("event").is_none());
		assert!(json.get("extras").is_none());
		assert!(!entry.is_audit());
	}

	#[test]
	fn test_audit_entry_serialization() {
		let fields = AuditFields::parse("event=promo.create actor_id=3 code=SAVE10");
		let entry = LogEntry::new(2, LogLevel::Info, "audit", "-", "event=promo.create", Some(fields));

		let json = serde_json::to_value(&entry).unwrap();
		assert_eq!(json["event"], "promo.create");
		assert_eq!(json["actor_id"], 3);
		assert_eq!(json["extras"]["code"], "SAVE10");
		assert!(json.get("target").is_none());
		assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
	}
}
