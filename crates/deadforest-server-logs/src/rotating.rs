// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Size-rotated log file.
//!
//! When a write would push the active file to `max_bytes`, the file is
//! renamed to `<path>.1`, older backups shift up by one (`.1` → `.2`, ...),
//! the oldest beyond `backups` is removed, and a fresh file is opened.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// Default size at which the active file is rotated.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
/// Default number of rotated files kept.
pub const DEFAULT_BACKUPS: usize = 5;

/// A log file shared by every writer it hands out.
#[derive(Clone)]
pub struct RotatingFile {
	state: Arc<Mutex<RotatingState>>,
}

struct RotatingState {
	path: PathBuf,
	file: File,
	written: u64,
	max_bytes: u64,
	backups: usize,
}

impl RotatingFile {
	/// Open (or create) `path` for appending.
	///
	/// `max_bytes == 0` disables rotation. With `backups == 0` the file is
	/// truncated instead of rotated.
	pub fn open(path: impl AsRef<Path>, max_bytes: u64, backups: usize) -> io::Result<Self> {
		let path = path.as_ref().to_path_buf();
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}
		let file = open_append(&path)?;
		let written = file.metadata()?.len();
		Ok(Self {
			state: Arc::new(Mutex::new(RotatingState {
				path,
				file,
				written,
				max_bytes,
				backups,
			})),
		})
	}

	pub fn path(&self) -> PathBuf {
		self.state.lock().path.clone()
	}
}

impl RotatingState {
	fn should_rotate(&self, incoming: usize) -> bool {
		self.max_bytes > 0 && self.written > 0 && self.written + incoming as u64 >= self.max_bytes
	}

	fn rotate(&mut self) -> io::Result<()> {
		self.file.flush()?;
		if self.backups == 0 {
			self.file = File::create(&self.path)?;
			self.written = 0;
			return Ok(());
		}

		let oldest = backup_path(&self.path, self.backups);
		if oldest.exists() {
			fs::remove_file(&oldest)?;
		}
		for index in (1..self.backups).rev() {
			let from = backup_path(&self.path, index);
			if from.exists() {
				fs::rename(&from, backup_path(&self.path, index + 1))?;
			}
		}
		fs::rename(&self.path, backup_path(&self.path, 1))?;

		self.file = open_append(&self.path)?;
		self.written = 0;
		Ok(())
	}
}

fn open_append(path: &Path) -> io::Result<File> {
	OpenOptions::new().create(true).append(true).open(path)
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(format!(".{index}"));
	PathBuf::from(name)
}

/// Writer handed out by [`RotatingFile`].
pub struct RotatingFileWriter {
	state: Arc<Mutex<RotatingState>>,
}

impl Write for RotatingFileWriter {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let mut state = self.state.lock();
		if state.should_rotate(buf.len()) {
			state.rotate()?;
		}
		state.file.write_all(buf)?;
		state.written += buf.len() as u64;
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		self.state.lock().file.flush()
	}
}

impl<'a> MakeWriter<'a> for RotatingFile {
	type Writer = RotatingFileWriter;

	fn make_writer(&'a self) -> Self::Writer {
		RotatingFileWriter {
			state: self.state.clone(),
		}
	}
}
