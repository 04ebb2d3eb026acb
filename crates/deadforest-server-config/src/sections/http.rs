// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Listener settings for the operator API.
//!
//! Environment: `DEADFOREST_SERVER_HOST`, `DEADFOREST_SERVER_PORT`.
//! TOML: the `[http]` table.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Address the operator API listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
	pub host: String,
	/// `0` asks the OS for an ephemeral port.
	pub port: u16,
}

impl HttpConfig {
	/// `host:port` suitable for `TcpListener::bind`.
	pub fn bind_addr(&self) -> String {
		if self.host.contains(':') && !self.host.starts_with('[') {
			format!("[{}]:{}", self.host, self.port)
		} else {
			format!("{}:{}", self.host, self.port)
		}
	}
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
	}

	/// Resolve the listener address. A host that is blank after trimming is
	/// rejected.
	pub fn finalize(self) -> Result<HttpConfig, ConfigError> {
		let host = match self.host {
			Some(host) if host.trim().is_empty() => return Err(ConfigError::EmptyHost),
			Some(host) => host.trim().to_string(),
			None => DEFAULT_HOST.to_string(),
		};
		Ok(HttpConfig {
			host,
			port: self.port.unwrap_or(DEFAULT_PORT),
		})
	}
}
