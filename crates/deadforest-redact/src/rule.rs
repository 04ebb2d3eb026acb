// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use regex::Regex;

/// Source form of a masking rule, compiled lazily on first use.
pub struct RuleSpec {
	pub id: &'static str,
	pub pattern: &'static str,
	pub replacement: &'static str,
}

pub struct CompiledRule {
	pub id: &'static str,
	pub regex: Regex,
	pub replacement: &'static str,
}

impl CompiledRule {
	pub fn from_spec(spec: &RuleSpec) -> Result<Self, regex::Error> {
		Ok(CompiledRule {
			id: spec.id,
			regex: Regex::new(spec.pattern)?,
			replacement: spec.replacement,
		})
	}

	pub fn is_match(&self, text: &str) -> bool {
		self.regex.is_match(text)
	}
}
