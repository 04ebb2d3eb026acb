// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the DeadForest server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`DEADFOREST_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use deadforest_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	layer_from_lookup, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource,
	SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub auth: AuthConfig,
	pub alerts: AlertsConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		self.http.bind_addr()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`DEADFOREST_SERVER_*`)
/// 2. Config file (`/etc/deadforest/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Merge `sources` in precedence order and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize()?;
	let alerts = layer.alerts.unwrap_or_default().finalize();

	validate_config(&logging, &alerts)?;

	info!(
		host = %http.host,
		port = http.port,
		log_level = %logging.level,
		log_json = logging.json,
		log_file = ?logging.file,
		buffer_size = logging.buffer_size,
		operators = auth.operators.len(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		logging,
		auth,
		alerts,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(logging: &LoggingConfig, alerts: &AlertsConfig) -> Result<(), ConfigError> {
	if logging.buffer_size == 0 {
		return Err(ConfigError::BelowMinimum {
			field: "logging.buffer_size",
			min: 1,
		});
	}
	if logging.max_message_len == 0 {
		return Err(ConfigError::BelowMinimum {
			field: "logging.max_message_len",
			min: 1,
		});
	}
	if alerts.error_spike_threshold == 0 {
		return Err(ConfigError::BelowMinimum {
			field: "alerts.error_spike_threshold",
			min: 1,
		});
	}
	if alerts.error_window_secs == 0 {
		return Err(ConfigError::BelowMinimum {
			field: "alerts.error_window_secs",
			min: 1,
		});
	}

	Ok(())
}
