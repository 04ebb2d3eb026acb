// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit record emission.
//!
//! Audit records are ordinary `INFO` events on the [`AUDIT_TARGET`] target
//! whose message is `event=<name>` followed by `key=value` tokens. The buffer
//! layer parses them back into structured fields.
//!
//! ```ignore
//! use deadforest_server_logs::audit;
//!
//! audit!("promo.create", actor_id = 1, code = "SAVE10", percent = 10);
//! ```

use std::fmt;

use deadforest_redact::display_or_placeholder;

use crate::parse::is_password_key;

/// Logger name reserved for audit records.
pub const AUDIT_TARGET: &str = "audit";
/// Value rendered in place of password-like fields.
pub const PASSWORD_MASK: &str = "***";

/// A single audit field value.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditValue {
	Str(String),
	Int(i64),
	Float(f64),
	Bool(bool),
	Null,
}

impl AuditValue {
	/// Capture any displayable value. A failing `Display` becomes `<unrepr>`.
	pub fn display(value: &dyn fmt::Display) -> Self {
		AuditValue::Str(display_or_placeholder(value))
	}

	/// Render the value as a single-line string.
	pub fn render(&self) -> String {
		let rendered = match self {
			AuditValue::Str(s) => s.clone(),
			AuditValue::Int(i) => i.to_string(),
			AuditValue::Float(f) => f.to_string(),
			AuditValue::Bool(b) => b.to_string(),
			AuditValue::Null => "null".to_string(),
		};
		if rendered.contains(['\n', '\r']) {
			rendered.replace(['\n', '\r'], " ")
		} else {
			rendered
		}
	}
}

impl From<&str> for AuditValue {
	fn from(value: &str) -> Self {
		AuditValue::Str(value.to_string())
	}
}

impl From<String> for AuditValue {
	fn from(value: String) -> Self {
		AuditValue::Str(value)
	}
}

impl From<&String> for AuditValue {
	fn from(value: &String) -> Self {
		AuditValue::Str(value.clone())
	}
}

impl From<i32> for AuditValue {
	fn from(value: i32) -> Self {
		AuditValue::Int(value.into())
	}
}

impl From<i64> for AuditValue {
	fn from(value: i64) -> Self {
		AuditValue::Int(value)
	}
}

impl From<u32> for AuditValue {
	fn from(value: u32) -> Self {
		AuditValue::Int(value.into())
	}
}

impl From<u64> for AuditValue {
	fn from(value: u64) -> Self {
		i64::try_from(value)
			.map(AuditValue::Int)
			.unwrap_or_else(|_| AuditValue::Str(value.to_string()))
	}
}

impl From<usize> for AuditValue {
	fn from(value: usize) -> Self {
		i64::try_from(value)
			.map(AuditValue::Int)
			.unwrap_or_else(|_| AuditValue::Str(value.to_string()))
	}
}

impl From<f32> for AuditValue {
	fn from(value: f32) -> Self {
		AuditValue::Float(value.into())
	}
}

impl From<f64> for AuditValue {
	fn from(value: f64) -> Self {
		AuditValue::Float(value)
	}
}

impl From<bool> for AuditValue {
	fn from(value: bool) -> Self {
		AuditValue::Bool(value)
	}
}

impl<T: Into<AuditValue>> From<Option<T>> for AuditValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(AuditValue::Null)
	}
}

/// Render an audit message: `event=<event>` then each field in call order.
pub fn render_audit(event: &str, fields: &[(&str, AuditValue)]) -> String {
	let mut out = format!("event={event}");
	for (key, value) in fields {
		out.push(' ');
		out.push_str(key);
		out.push('=');
		if is_password_key(key) {
			out.push_str(PASSWORD_MASK);
		} else {
			out.push_str(&value.render());
		}
	}
	out
}

/// Emit one audit record on the audit channel.
pub fn emit(event: &str, fields: &[(&str, AuditValue)]) {
	let message = render_audit(event, fields);
	tracing::info!(target: AUDIT_TARGET, "{message}");
}

/// Emit an audit record.
///
/// Field names become keys, values convert through [`AuditValue::from`].
#[macro_export]
macro_rules! audit {
	($event:expr $(, $key:ident = $value:expr)* $(,)?) => {
		$crate::audit::emit(
			$event,
			&[$((::core::stringify!($key), $crate::audit::AuditValue::from($value))),*],
		)
	};
}
