// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! PII masking and single-line formatting for log messages.
//!
//! Every message that reaches the in-memory log buffer goes through
//! [`MessageFormatter::format`]: newlines are folded into spaces, email- and
//! phone-shaped substrings are replaced with fixed placeholders, and the
//! result is capped at a maximum length.

mod rule;

use once_cell::sync::Lazy;
use regex::NoExpand;
use std::borrow::Cow;
use std::fmt;

pub use rule::{CompiledRule, RuleSpec};

/// Replacement for email-shaped substrings.
pub const EMAIL_PLACEHOLDER: &str = "***@***";
/// Replacement for phone-shaped digit runs.
pub const PHONE_PLACEHOLDER: &str = "***";
/// Stand-in for a value whose `Display` implementation failed.
pub const UNREPR_PLACEHOLDER: &str = "<unrepr>";
/// Appended to messages cut at the length cap.
pub const TRUNCATION_MARKER: char = '…';
/// Default message cap, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 2000;

/// Masking rules, applied in this order to the same string.
pub const MASK_RULES: &[RuleSpec] = &[
	RuleSpec {
		id: "email",
		pattern: r"([A-Za-z0-9._%+-]+)@([A-Za-z0-9.-]+\.[A-Za-z]{2,})",
		replacement: EMAIL_PLACEHOLDER,
	},
	RuleSpec {
		id: "phone",
		pattern: r"(?:\+|\b)\d(?:[\s().-]*\d){7,}\b",
		replacement: PHONE_PLACEHOLDER,
	},
];

// A rule that fails to compile is dropped; the remaining rules still apply.
static RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
	MASK_RULES
		.iter()
		.filter_map(|spec| CompiledRule::from_spec(spec).ok())
		.collect()
});

/// Replace every email- and phone-shaped substring with its placeholder.
///
/// Returns `Cow::Borrowed` when nothing matched.
pub fn mask_pii(input: &str) -> Cow<'_, str> {
	let mut out = Cow::Borrowed(input);
	for rule in RULES.iter() {
		if !rule.is_match(&out) {
			continue;
		}
		let replaced = rule
			.regex
			.replace_all(&out, NoExpand(rule.replacement))
			.into_owned();
		out = Cow::Owned(replaced);
	}
	out
}

/// Returns true if any masking rule matches `input`.
pub fn contains_pii(input: &str) -> bool {
	RULES.iter().any(|rule| rule.is_match(input))
}

/// Cut `input` to `max_len` characters, appending [`TRUNCATION_MARKER`] when cut.
pub fn truncate(input: &str, max_len: usize) -> Cow<'_, str> {
	match input.char_indices().nth(max_len) {
		Some((byte_idx, _)) => {
			let mut out = String::with_capacity(byte_idx + TRUNCATION_MARKER.len_utf8());
			out.push_str(&input[..byte_idx]);
			out.push(TRUNCATION_MARKER);
			Cow::Owned(out)
		}
		None => Cow::Borrowed(input),
	}
}

/// Fold line breaks so a message always occupies a single line.
pub fn single_line(input: &str) -> Cow<'_, str> {
	if input.contains(['\n', '\r']) {
		Cow::Owned(input.replace(['\n', '\r'], " "))
	} else {
		Cow::Borrowed(input)
	}
}

/// Bounded, PII-masked message formatting.
#[derive(Debug, Clone, Copy)]
pub struct MessageFormatter {
	max_len: usize,
}

impl MessageFormatter {
	pub fn new(max_len: usize) -> Self {
		Self {
			max_len: max_len.max(1),
		}
	}

	pub fn max_len(&self) -> usize {
		self.max_len
	}

	/// Format a message for storage. Never fails.
	pub fn format(&self, message: &str) -> String {
		let line = single_line(message);
		let masked = mask_pii(&line);
		truncate(&masked, self.max_len).into_owned()
	}

	/// Format any displayable value, substituting [`UNREPR_PLACEHOLDER`] if
	/// its `Display` implementation reports an error.
	pub fn format_display(&self, value: &dyn fmt::Display) -> String {
		self.format(&display_or_placeholder(value))
	}
}

impl Default for MessageFormatter {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_MESSAGE_LEN)
	}
}

/// Render `value` with `Display`, or [`UNREPR_PLACEHOLDER`] on error.
pub fn display_or_placeholder(value: &dyn fmt::Display) -> String {
	let mut out = String::new();
	match fmt::write(&mut out, format_args!("{value}")) {
		Ok(()) => out,
		Err(_) => UNREPR_PLACEHOLDER.to_string(),
	}
}
