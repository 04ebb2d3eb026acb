// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing layer that captures logs into the buffer.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::buffer::LogBuffer;
use crate::entry::{LogLevel, NO_REQUEST_ID};

/// Span field carrying the request correlation id.
pub const REQUEST_ID_FIELD: &str = "request_id";

/// A tracing Layer that captures log events into a [`LogBuffer`].
///
/// This layer can be composed with other layers (like `fmt::layer()`) to
/// capture logs for the operator API while still writing to stdout.
/// Events inherit the `request_id` of their closest enclosing span that
/// recorded one.
#[derive(Clone)]
pub struct BufferLayer {
	buffer: LogBuffer,
}

impl BufferLayer {
	/// Create a new buffer layer with the given buffer.
	pub fn new(buffer: LogBuffer) -> Self {
		Self { buffer }
	}

	/// Get a reference to the underlying buffer.
	pub fn buffer(&self) -> &LogBuffer {
		&self.buffer
	}
}

/// Span extension holding a captured request id.
#[derive(Debug, Clone)]
struct RequestId(String);

impl<S> Layer<S> for BufferLayer
where
	S: Subscriber + for<'a> LookupSpan<'a>,
{
	fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
		let mut visitor = RequestIdVisitor::default();
		attrs.record(&mut visitor);
		if let (Some(request_id), Some(span)) = (visitor.0, ctx.span(id)) {
			span.extensions_mut().replace(RequestId(request_id));
		}
	}

	fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
		let mut visitor = RequestIdVisitor::default();
		values.record(&mut visitor);
		if let (Some(request_id), Some(span)) = (visitor.0, ctx.span(id)) {
			span.extensions_mut().replace(RequestId(request_id));
		}
	}

	fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
		let metadata = event.metadata();
		let level = LogLevel::from_tracing(metadata.level());

		let mut visitor = FieldVisitor::default();
		event.record(&mut visitor);

		let request_id = ctx
			.event_scope(event)
			.and_then(|scope| {
				scope.into_iter().find_map(|span| {
					let extensions = span.extensions();
					extensions.get::<RequestId>().map(|r| r.0.clone())
				})
			})
			.unwrap_or_else(|| NO_REQUEST_ID.to_string());

		self.buffer
			.record(level, metadata.target(), &request_id, &visitor.finish());
	}
}

#[derive(Default)]
struct RequestIdVisitor(Option<String>);

impl Visit for RequestIdVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == REQUEST_ID_FIELD {
			self.0 = Some(format!("{value:?}"));
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == REQUEST_ID_FIELD {
			self.0 = Some(value.to_string());
		}
	}
}

/// Visitor that assembles `message key=value ...` from an event.
#[derive(Default)]
struct FieldVisitor {
	message: Option<String>,
	fields: String,
}

impl FieldVisitor {
	fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
		let _ = write!(self.fields, " {name}={value}");
	}

	fn finish(self) -> String {
		let mut out = self.message.unwrap_or_default();
		if out.is_empty() {
			out.push_str(self.fields.trim_start());
		} else {
			out.push_str(&self.fields);
		}
		out
	}
}

impl Visit for FieldVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == "message" {
			self.message = Some(format!("{value:?}"));
		} else {
			self.push_field(field.name(), format_args!("{value:?}"));
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = Some(value.to_string());
		} else {
			self.push_field(field.name(), format_args!("{value}"));
		}
	}

	fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
		self.push_field(field.name(), format_args!("{value}"));
	}
}
