// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	parse_operator_tokens, AlertsConfigLayer, AuthConfigLayer, HttpConfigLayer, LoggingConfigLayer,
};

/// Default system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/deadforest/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: DEADFOREST_SERVER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_lookup(|name| std::env::var(name).ok())
	}
}

/// Build a layer from `DEADFOREST_SERVER_*` variables resolved by `lookup`.
pub fn layer_from_lookup<F>(lookup: F) -> Result<ServerConfigLayer, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let env = Env(lookup);
	Ok(ServerConfigLayer {
		http: Some(HttpConfigLayer {
			host: env.var("DEADFOREST_SERVER_HOST"),
			port: env.parse("DEADFOREST_SERVER_PORT")?,
		}),
		logging: Some(LoggingConfigLayer {
			level: env.var("DEADFOREST_SERVER_LOG_LEVEL"),
			json: env.bool("DEADFOREST_SERVER_LOG_JSON"),
			file: env.var("DEADFOREST_SERVER_LOG_FILE").map(PathBuf::from),
			file_max_bytes: env.parse("DEADFOREST_SERVER_LOG_FILE_MAX_BYTES")?,
			file_backups: env.parse("DEADFOREST_SERVER_LOG_FILE_BACKUPS")?,
			buffer_size: env.parse("DEADFOREST_SERVER_LOG_BUFFER_SIZE")?,
			max_message_len: env.parse("DEADFOREST_SERVER_LOG_MAX_MESSAGE_LEN")?,
		}),
		auth: Some(AuthConfigLayer {
			operators: env
				.var("DEADFOREST_SERVER_OPERATOR_TOKENS")
				.map(|raw| parse_operator_tokens("DEADFOREST_SERVER_OPERATOR_TOKENS", &raw))
				.transpose()?,
		}),
		alerts: Some(AlertsConfigLayer {
			error_spike_threshold: env.parse("DEADFOREST_SERVER_ERROR_SPIKE_THRESHOLD")?,
			error_window_secs: env.parse("DEADFOREST_SERVER_ERROR_WINDOW_SECS")?,
		}),
	})
}

struct Env<F>(F);

impl<F> Env<F>
where
	F: Fn(&str) -> Option<String>,
{
	fn var(&self, name: &str) -> Option<String> {
		(self.0)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidEnv {
				var: name.to_string(),
				message: format!("'{v}' is not a valid {}", std::any::type_name::<T>()),
			}),
			None => Ok(None),
		}
	}
}
