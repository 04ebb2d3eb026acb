// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error-spike alert configuration.

use serde::Deserialize;

pub const DEFAULT_ERROR_SPIKE_THRESHOLD: u32 = 10;
pub const DEFAULT_ERROR_WINDOW_SECS: u64 = 60;

/// Alert configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertsConfig {
	/// Number of 5xx responses within the window that raises an alert.
	pub error_spike_threshold: u32,
	pub error_window_secs: u64,
}

impl Default for AlertsConfig {
	fn default() -> Self {
		Self {
			error_spike_threshold: DEFAULT_ERROR_SPIKE_THRESHOLD,
			error_window_secs: DEFAULT_ERROR_WINDOW_SECS,
		}
	}
}

/// Alert configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsConfigLayer {
	#[serde(default)]
	pub error_spike_threshold: Option<u32>,
	#[serde(default)]
	pub error_window_secs: Option<u64>,
}

impl AlertsConfigLayer {
	pub fn merge(&mut self, other: AlertsConfigLayer) {
		if other.error_spike_threshold.is_some() {
			self.error_spike_threshold = other.error_spike_threshold;
		}
		if other.error_window_secs.is_some() {
			self.error_window_secs = other.error_window_secs;
		}
	}

	pub fn finalize(self) -> AlertsConfig {
		AlertsConfig {
			error_spike_threshold: self
				.error_spike_threshold
				.unwrap_or(DEFAULT_ERROR_SPIKE_THRESHOLD),
			error_window_secs: self.error_window_secs.unwrap_or(DEFAULT_ERROR_WINDOW_SECS),
		}
	}
}
