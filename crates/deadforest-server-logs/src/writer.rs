// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::{self, Write};

use deadforest_redact::mask_pii;
use tracing_subscriber::fmt::MakeWriter;

/// A writer that masks PII line by line before writing to the underlying writer.
pub struct MaskingWriter<W: Write> {
	inner: W,
	buffer: Vec<u8>,
}

impl<W: Write> MaskingWriter<W> {
	pub fn new(inner: W) -> Self {
		Self {
			inner,
			buffer: Vec::new(),
		}
	}

	fn write_masked(&mut self, line: &[u8]) -> io::Result<()> {
		let text = String::from_utf8_lossy(line);
		self.inner.write_all(mask_pii(&text).as_bytes())
	}
}

impl<W: Write> Drop for MaskingWriter<W> {
	fn drop(&mut self) {
		let _ = self.flush();
	}
}

impl<W: Write> Write for MaskingWriter<W> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.buffer.extend_from_slice(buf);

		while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
			let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
			self.write_masked(&line)?;
		}

		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		if !self.buffer.is_empty() {
			let rest = std::mem::take(&mut self.buffer);
			self.write_masked(&rest)?;
		}
		self.inner.flush()
	}
}

/// A MakeWriter that wraps another MakeWriter and masks PII.
pub struct MaskingMakeWriter<M> {
	inner: M,
}

impl<M> MaskingMakeWriter<M> {
	pub fn new(inner: M) -> Self {
		Self { inner }
	}
}

impl<'a, M> MakeWriter<'a> for MaskingMakeWriter<M>
where
	M: MakeWriter<'a>,
{
	type Writer = MaskingWriter<M::Writer>;

	fn make_writer(&'a self) -> Self::Writer {
		MaskingWriter::new(self.inner.make_writer())
	}
}
