// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sliding-window detection of server error spikes.
//!
//! Every 5xx response is recorded. When the number of errors inside the
//! window reaches the threshold, a single alert is raised; the next alert is
//! held back until a full window has passed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use deadforest_server_config::AlertsConfig;
use parking_lot::Mutex;

/// Target of the alert records.
pub const ALERT_TARGET: &str = "alert";

/// A raised spike alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorSpike {
	pub count: usize,
	pub window_secs: u64,
	pub threshold: u32,
}

#[derive(Debug, Default)]
struct SpikeState {
	errors: VecDeque<Instant>,
	last_alert: Option<Instant>,
}

#[derive(Debug)]
pub struct ErrorSpikeDetector {
	window: Duration,
	threshold: u32,
	state: Mutex<SpikeState>,
}

impl ErrorSpikeDetector {
	pub fn new(window: Duration, threshold: u32) -> Self {
		Self {
			window,
			threshold: threshold.max(1),
			state: Mutex::new(SpikeState::default()),
		}
	}

	pub fn from_config(config: &AlertsConfig) -> Self {
		Self::new(
			Duration::from_secs(config.error_window_secs),
			config.error_spike_threshold,
		)
	}

	/// Record a server error now.
	pub fn record_error(&self) -> Option<ErrorSpike> {
		self.record_error_at(Instant::now())
	}

	/// Record a server error at `now`, returning the alert if one fires.
	pub fn record_error_at(&self, now: Instant) -> Option<ErrorSpike> {
		let mut state = self.state.lock();
		state.errors.push_back(now);

		while let Some(&oldest) = state.errors.front() {
			if now.saturating_duration_since(oldest) > self.window {
				state.errors.pop_front();
			} else {
				break;
			}
		}

		let count = state.errors.len();
		if count < self.threshold as usize {
			return None;
		}

		let quiet = match state.last_alert {
			Some(last) => now.saturating_duration_since(last) > self.window,
			None => true,
		};
		if !quiet {
			return None;
		}

		state.last_alert = Some(now);
		Some(ErrorSpike {
			count,
			window_secs: self.window.as_secs(),
			threshold: self.threshold,
		})
	}

	/// Errors currently inside the window, as of the last record.
	pub fn pending(&self) -> usize {
		self.state.lock().errors.len()
	}
}

impl Default for ErrorSpikeDetector {
	fn default() -> Self {
		Self::from_config(&AlertsConfig::default())
	}
}
