// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Errors raised while resolving the server configuration.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A `DEADFOREST_SERVER_*` variable is set but cannot be used.
	#[error("environment variable {var} is invalid: {message}")]
	InvalidEnv { var: String, message: String },

	#[error("config file {path} is not valid TOML: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("cannot read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A numeric setting is below the smallest usable value.
	#[error("{field} must be at least {min}")]
	BelowMinimum { field: &'static str, min: u64 },

	#[error("http.host must not be empty")]
	EmptyHost,

	#[error("operator {actor_id} has an empty token")]
	EmptyOperatorToken { actor_id: i64 },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_env_error_names_variable() {
		let err = ConfigError::InvalidEnv {
			var: "DEADFOREST_SERVER_PORT".to_string(),
			message: "'eighty' is not a valid u16".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"environment variable DEADFOREST_SERVER_PORT is invalid: 'eighty' is not a valid u16"
		);
	}

	#[test]
	fn test_below_minimum_message() {
		let err = ConfigError::BelowMinimum {
			field: "logging.buffer_size",
			min: 1,
		};
		assert_eq!(err.to_string(), "logging.buffer_size must be at least 1");
	}
}
