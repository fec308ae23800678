//! Write-combining buffer over a [`Sink`].
//!
//! The writer batches small writes into the sink's current region and defers
//! the sink's bookkeeping call ([`Sink::advance`]) until a commit is actually
//! needed, so a render that emits dozens of short spans costs a handful of
//! region round-trips instead of one per span.

use crate::error::{WriteError, WriteResult};
use crate::sink::Sink;

/// Default region size hint, tuned for a typical HTML fragment.
pub const DEFAULT_SIZE_HINT: usize = 1600;

/// Maximum ASCII length of a formatted `u64` (20 digits).
const MAX_DECIMAL_LEN: usize = 20;

const ASCII_DIGIT_START: u8 = b'0';

/// Buffered writer over a [`Sink`].
///
/// One writer serves exactly one render: it owns the count of
/// written-but-uncommitted bytes and is not shared across concurrent callers.
/// Nothing reaches the sink's bookkeeping until [`commit`](Self::commit) (or
/// an internal commit forced by a full region), so a caller that hits an
/// error can simply drop the writer and the sink never sees the partial
/// output.
///
/// # Examples
///
/// ```
/// use grappelli_buffer::{BufferWriter, MemorySink};
///
/// let mut sink = MemorySink::new();
/// let mut writer = BufferWriter::new(&mut sink);
/// writer.write(b"id: ").unwrap();
/// writer.write_numeric(7341).unwrap();
/// writer.commit();
/// assert_eq!(sink.committed_bytes(), b"id: 7341");
/// ```
#[derive(Debug)]
pub struct BufferWriter<'a, S: Sink> {
	sink: &'a mut S,
	buffered: usize,
	size_hint: usize,
}

impl<'a, S: Sink> BufferWriter<'a, S> {
	/// Creates a writer with the default region size hint.
	pub fn new(sink: &'a mut S) -> Self {
		Self::with_size_hint(sink, DEFAULT_SIZE_HINT)
	}

	/// Creates a writer that requests regions of roughly `size_hint` bytes.
	pub fn with_size_hint(sink: &'a mut S, size_hint: usize) -> Self {
		Self {
			sink,
			buffered: 0,
			size_hint: size_hint.max(1),
		}
	}

	/// Number of bytes written but not yet committed to the sink.
	pub fn buffered(&self) -> usize {
		self.buffered
	}

	/// Writable bytes remaining in the current region.
	pub fn remaining(&mut self) -> usize {
		self.sink.region(self.size_hint).len() - self.buffered
	}

	/// Flushes the pending byte count to the sink.
	///
	/// A commit with zero pending bytes is a no-op and never calls the sink.
	pub fn commit(&mut self) {
		let buffered = self.buffered;
		if buffered > 0 {
			self.buffered = 0;
			self.sink.advance(buffered);
		}
	}

	/// Guarantees at least `count` contiguous writable bytes.
	///
	/// If the current region is insufficient, pending bytes are committed and
	/// a region of at least `count` bytes is requested from the sink. A fresh
	/// region is never requested while bytes on the prior region remain
	/// uncommitted.
	pub fn ensure(&mut self, count: usize) -> WriteResult<()> {
		let available = self.sink.region(self.size_hint).len() - self.buffered;
		if available < count {
			self.ensure_more(count)?;
		}
		Ok(())
	}

	fn ensure_more(&mut self, count: usize) -> WriteResult<()> {
		self.commit();
		if self.sink.region(count).len() < count {
			return Err(WriteError::SinkExhausted { requested: count });
		}
		Ok(())
	}

	/// Writes `source` into the sink, splitting across regions as needed.
	pub fn write(&mut self, source: &[u8]) -> WriteResult<()> {
		let region = self.sink.region(self.size_hint);
		let window = &mut region[self.buffered..];
		if window.len() >= source.len() {
			window[..source.len()].copy_from_slice(source);
			self.buffered += source.len();
			Ok(())
		} else {
			self.write_split(source)
		}
	}

	/// Slow path for [`write`](Self::write): commits the exhausted region and
	/// continues on a fresh one until all input is consumed.
	fn write_split(&mut self, mut source: &[u8]) -> WriteResult<()> {
		while !source.is_empty() {
			let region = self.sink.region(self.size_hint);
			let window = &mut region[self.buffered..];
			if window.is_empty() {
				self.commit();
				if self.sink.region(self.size_hint).is_empty() {
					return Err(WriteError::SinkExhausted {
						requested: source.len(),
					});
				}
				continue;
			}
			let writable = source.len().min(window.len());
			window[..writable].copy_from_slice(&source[..writable]);
			source = &source[writable..];
			self.buffered += writable;
		}
		Ok(())
	}

	/// Writes `number` as ASCII decimal.
	///
	/// Magnitudes under 1000 with at least 3 bytes of region space are
	/// formatted in place with fixed-point multiply-and-shift division; the
	/// general fallback renders into a small scratch buffer and goes through
	/// [`write`](Self::write).
	pub fn write_numeric(&mut self, number: u64) -> WriteResult<()> {
		let region = self.sink.region(self.size_hint);
		let window = &mut region[self.buffered..];

		let mut advance_by = 0;
		if window.len() >= 3 && number < 1000 {
			let value = number as u32;
			if value < 10 {
				window[0] = ASCII_DIGIT_START + value as u8;
				advance_by = 1;
			} else if value < 100 {
				let tens = (value * 205) >> 11; // div10, valid to 1028
				window[0] = ASCII_DIGIT_START + tens as u8;
				window[1] = ASCII_DIGIT_START + (value - tens * 10) as u8;
				advance_by = 2;
			} else {
				let hundreds = (value * 41) >> 12; // div100, valid to 1098
				let tens = (value * 205) >> 11; // div10, valid to 1028
				window[0] = ASCII_DIGIT_START + hundreds as u8;
				window[1] = ASCII_DIGIT_START + (tens - hundreds * 10) as u8;
				window[2] = ASCII_DIGIT_START + (value - tens * 10) as u8;
				advance_by = 3;
			}
		}

		if advance_by > 0 {
			self.buffered += advance_by;
			Ok(())
		} else {
			self.write_numeric_slow(number)
		}
	}

	/// General-case decimal formatting: digits are produced least-significant
	/// first into a fixed scratch region sized for `u64::MAX`, then written
	/// most-significant first.
	fn write_numeric_slow(&mut self, number: u64) -> WriteResult<()> {
		let mut scratch = [0u8; MAX_DECIMAL_LEN];
		let mut position = MAX_DECIMAL_LEN;
		let mut value = number;
		loop {
			let quotient = value / 10;
			position -= 1;
			scratch[position] = ASCII_DIGIT_START + (value - quotient * 10) as u8;
			value = quotient;
			if value == 0 {
				break;
			}
		}
		self.write(&scratch[position..])
	}
}
