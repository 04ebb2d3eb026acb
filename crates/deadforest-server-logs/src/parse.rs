// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tokenizer for rendered audit records (`event=<name> key=value ...`).

use std::borrow::Cow;

use deadforest_redact::mask_pii;
use indexmap::IndexMap;
use thiserror::Error;

use crate::audit::PASSWORD_MASK;
use crate::entry::ActorId;

/// A single whitespace-separated token of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditToken<'a> {
	Pair { key: &'a str, value: &'a str },
	Malformed(&'a str),
}

/// Split a rendered audit record into tokens.
///
/// Each token splits on its first `=`. Tokens without `=`, or with an empty
/// key, are reported as [`AuditToken::Malformed`].
pub fn tokenize(raw: &str) -> impl Iterator<Item = AuditToken<'_>> {
	raw.split_whitespace().map(|token| match token.split_once('=') {
		Some((key, value)) if !key.is_empty() => AuditToken::Pair { key, value },
		_ => AuditToken::Malformed(token),
	})
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditParseError {
	#[error("audit record is empty")]
	Empty,
}

/// Structured fields lifted from an audit record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFields {
	pub event: Option<String>,
	pub actor_id: Option<ActorId>,
	pub target: Option<String>,
	/// Remaining pairs in the order they first appeared.
	pub extras: IndexMap<String, String>,
}

impl AuditFields {
	/// Parse a rendered audit record.
	///
	/// Pairs are taken from any position, so a free-text message ahead of the
	/// fields is fine. Malformed tokens are skipped. For repeated keys the last
	/// occurrence wins.
	pub fn try_parse(raw: &str) -> Result<Self, AuditParseError> {
		let mut tokens = tokenize(raw).peekable();
		if tokens.peek().is_none() {
			return Err(AuditParseError::Empty);
		}

		let mut fields = AuditFields::default();
		for token in tokens {
			let AuditToken::Pair { key, value } = token else {
				continue;
			};
			match key {
				"event" => fields.event = non_empty(value),
				"actor_id" => fields.actor_id = non_empty(value).map(|v| ActorId::parse(&v)),
				"target" => fields.target = non_empty(value),
				_ => {
					let value = if is_password_key(key) {
						PASSWORD_MASK.to_string()
					} else {
						value.to_string()
					};
					fields.extras.insert(key.to_string(), value);
				}
			}
		}
		Ok(fields)
	}

	/// Parse a rendered audit record, falling back to empty fields when the
	/// record is malformed.
	pub fn parse(raw: &str) -> Self {
		Self::try_parse(raw).unwrap_or_default()
	}

	/// Apply PII masking to `target` and every extras value.
	pub fn masked(mut self) -> Self {
		if let Some(target) = self.target.as_mut() {
			*target = mask_pii(target).into_owned();
		}
		for value in self.extras.values_mut() {
			*value = mask_pii(value).into_owned();
		}
		self
	}
}

/// Keys whose values are always masked in audit output.
pub fn is_password_key(key: &str) -> bool {
	key.to_ascii_lowercase().contains("password")
}

/// Replace the value of every password `key=value` token with the mask.
///
/// Whitespace between tokens is kept as is.
pub fn mask_password_pairs(raw: &str) -> Cow<'_, str> {
	if !raw.to_ascii_lowercase().contains("password") {
		return Cow::Borrowed(raw);
	}

	let mut out = String::with_capacity(raw.len());
	for piece in raw.split_inclusive(char::is_whitespace) {
		let token = piece.trim_end_matches(char::is_whitespace);
		match token.split_once('=') {
			Some((key, _)) if !key.is_empty() && is_password_key(key) => {
				out.push_str(key);
				out.push('=');
				out.push_str(PASSWORD_MASK);
			}
			_ => out.push_str(token),
		}
		out.push_str(&piece[token.len()..]);
	}
	Cow::Owned(out)
}

fn non_empty(value: &str) -> Option<String> {
	(!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tokenize_splits_on_first_equals() {
		let tokens: Vec<_> = tokenize("event=a query=x=y bare =v").collect();
		assert_eq!(
			tokens,
			vec![
				AuditToken::Pair {
					key: "event",
					value: "a"
				},
				AuditToken::Pair {
					key: "query",
					value: "x=y"
				},
				AuditToken::Malformed("bare"),
				AuditToken::Malformed("=v"),
			]
		);
	}

	#[test]
	fn test_parse_lifts_structured_fields() {
		let fields =
			AuditFields::parse("event=product.update actor_id=7 target=product:12 price=9.99 stock=3");
		assert_eq!(fields.event.as_deref(), Some("product.update"));
		assert_eq!(fields.actor_id, Some(ActorId::Id(7)));
		assert_eq!(fields.target.as_deref(), Some("product:12"));
		assert_eq!(fields.extras.len(), 2);
		assert_eq!(fields.extras["price"], "9.99");
		assert_eq!(fields.extras["stock"], "3");
	}

	#[test]
	fn test_parse_non_integer_actor_kept_raw() {
		let fields = AuditFields::parse("event=x actor_id=system");
		assert_eq!(fields.actor_id, Some(ActorId::Raw("system".to_string())));
	}

	#[test]
	fn test_parse_last_occurrence_wins() {
		let fields = AuditFields::parse("event=a actor_id=1 k=1 actor_id=2 k=2 event=b");
		assert_eq!(fields.event.as_deref(), Some("b"));
		assert_eq!(fields.actor_id, Some(ActorId::Id(2)));
		assert_eq!(fields.extras["k"], "2");
	}

	#[test]
	fn test_parse_skips_malformed_tokens() {
		let fields = AuditFields::parse("event=a stray =x k=v");
		assert_eq!(fields.extras.len(), 1);
		assert_eq!(fields.extras["k"], "v");
	}

	#[test]
	fn test_parse_masks_password_keys() {
		let fields = AuditFields::parse("event=user.create NewPassword=hunter2 email=***@***");
		assert_eq!(fields.extras["NewPassword"], "***");
		assert_eq!(fields.extras["email"], "***@***");
	}

	#[test]
	fn test_masked_values() {
		let fields = AuditFields::parse("event=user.invite target=ann@corp.io phone=+44-20-7946-0958 qty=2")
			.masked();
		assert_eq!(fields.target.as_deref(), Some("***@***"));
		assert_eq!(fields.extras["phone"], "***");
		assert_eq!(fields.extras["qty"], "2");
	}

	#[test]
	fn test_malformed_record() {
		assert_eq!(AuditFields::try_parse(""), Err(AuditParseError::Empty));
		assert_eq!(AuditFields::try_parse("  "), Err(AuditParseError::Empty));
		assert_eq!(AuditFields::parse("user logged in"), AuditFields::default());
	}

	#[test]
	fn test_pairs_lifted_from_any_position() {
		let fields = AuditFields::parse("login ok event=auth.login actor_id=7");
		assert_eq!(fields.event.as_deref(), Some("auth.login"));
		assert_eq!(fields.actor_id, Some(ActorId::Id(7)));
		assert!(fields.extras.is_empty());

		let fields = AuditFields::parse("actor_id=1 target=cart:4 event=cart.clear");
		assert_eq!(fields.event.as_deref(), Some("cart.clear"));
		assert_eq!(fields.target.as_deref(), Some("cart:4"));
	}

	#[test]
	fn test_record_without_event_keeps_other_fields() {
		let fields = AuditFields::parse("user logged in actor_id=1 ip=10.0.0.2");
		assert!(fields.event.is_none());
		assert_eq!(fields.actor_id, Some(ActorId::Id(1)));
		assert_eq!(fields.extras["ip"], "10.0.0.2");
	}

	#[test]
	fn test_extras_keep_first_appearance_order() {
		let fields = AuditFields::parse("event=promo.create percent=10 code=SAVE10 percent=15");
		let keys: Vec<_> = fields.extras.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["percent", "code"]);
		assert_eq!(fields.extras["percent"], "15");
	}

	#[test]
	fn test_mask_password_pairs() {
		assert_eq!(
			mask_password_pairs("event=user.reset actor_id=1 password=secret123"),
			"event=user.reset actor_id=1 password=***"
		);
		assert_eq!(
			mask_password_pairs("reset ok  Old_Password=a=b\tnote=x"),
			"reset ok  Old_Password=***\tnote=x"
		);
		assert_eq!(
			mask_password_pairs("password reset requested"),
			"password reset requested"
		);
		assert!(matches!(mask_password_pairs("event=a k=v"), Cow::Borrowed(_)));
	}
}
