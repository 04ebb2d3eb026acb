// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator authentication configuration.
//!
//! Operators are identified by a static bearer token. Tokens are hashed with
//! SHA-256 when the configuration is finalized; only hashes are kept.

use std::fmt;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::ConfigError;

/// Hex-encoded SHA-256 of a bearer token.
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

/// A configured operator (runtime, token hashed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorToken {
	pub actor_id: i64,
	pub token_hash: String,
}

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
	pub operators: Vec<OperatorToken>,
}

impl AuthConfig {
	/// Resolve a presented bearer token to its operator's actor id.
	pub fn authenticate(&self, token: &str) -> Option<i64> {
		let hash = hash_token(token);
		self.operators
			.iter()
			.find(|op| op.token_hash == hash)
			.map(|op| op.actor_id)
	}
}

/// A configured operator before hashing.
#[derive(Clone, Deserialize)]
pub struct OperatorLayer {
	pub actor_id: i64,
	pub token: String,
}

impl fmt::Debug for OperatorLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OperatorLayer")
			.field("actor_id", &self.actor_id)
			.field("token", &"[REDACTED]")
			.finish()
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub operators: Option<Vec<OperatorLayer>>,
}

impl AuthConfigLayer {
	/// A later operator list replaces an earlier one.
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.operators.is_some() {
			self.operators = other.operators;
		}
	}

	pub fn finalize(self) -> Result<AuthConfig, ConfigError> {
		let operators = self
			.operators
			.unwrap_or_default()
			.into_iter()
			.map(|op| {
				if op.token.trim().is_empty() {
					return Err(ConfigError::EmptyOperatorToken {
						actor_id: op.actor_id,
					});
				}
				Ok(OperatorToken {
					actor_id: op.actor_id,
					token_hash: hash_token(&op.token),
				})
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(AuthConfig { operators })
	}
}

/// Parse the `<actor_id>:<token>,<actor_id>:<token>` environment form.
pub fn parse_operator_tokens(key: &str, raw: &str) -> Result<Vec<OperatorLayer>, ConfigError> {
	raw.split(',')
		.map(str::trim)
		.filter(|entry| !entry.is_empty())
		.map(|entry| {
			let invalid = |message: &str| ConfigError::InvalidEnv {
				var: key.to_string(),
				message: message.to_string(),
			};
			let (actor_id, token) = entry
				.split_once(':')
				.ok_or_else(|| invalid("expected <actor_id>:<token> entries"))?;
			let actor_id = actor_id
				.trim()
				.parse::<i64>()
				.map_err(|_| invalid("actor id must be an integer"))?;
			let token = token.trim();
			if token.is_empty() {
				return Err(invalid("token must not be empty"));
			}
			Ok(OperatorLayer {
				actor_id,
				token: token.to_string(),
			})
		})
		.collect()
}
