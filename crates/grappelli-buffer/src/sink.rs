//! Growable-region sinks that receive buffered output.
//!
//! A [`Sink`] hands out writable memory regions and is told afterwards how
//! many bytes were actually written into them. It is the only abstraction the
//! writer talks to; the sink may be backed by an in-memory accumulator, a
//! response buffer, or a fixed caller-provided slice.

use bytes::Bytes;

/// Smallest region a growable sink will hand out.
///
/// Keeps tiny size hints from causing a region round-trip per write.
const MIN_REGION: usize = 256;

/// Destination for buffered output.
///
/// The contract mirrors a pipe-style buffer writer:
///
/// - [`region`](Sink::region) returns the *current* writable region, growing
///   it towards `size_hint` bytes if the sink can. It never discards bytes
///   already written into the region. A sink that cannot grow returns
///   whatever capacity remains, possibly an empty slice.
/// - [`advance`](Sink::advance) consumes `written` bytes from the front of
///   the current region; the next [`region`](Sink::region) call exposes a
///   fresh region past them.
///
/// Shortfall detection is the writer's job: it compares the returned region
/// against what it needs and raises
/// [`SinkExhausted`](crate::WriteError::SinkExhausted) itself.
pub trait Sink {
	/// Returns the current writable region, at least `size_hint` bytes long
	/// when the sink can provide that much.
	fn region(&mut self, size_hint: usize) -> &mut [u8];

	/// Declares that `written` bytes of the current region now hold output.
	fn advance(&mut self, written: usize);
}

/// Growable in-memory sink.
///
/// Backed by a `Vec<u8>`; regions are zero-initialized tail capacity. An
/// optional region limit caps how much writable space a single
/// [`region`](Sink::region) call exposes, which forces the writer through its
/// split-and-commit path, useful for exercising pipe-like sinks with small
/// buffers.
///
/// # Examples
///
/// ```
/// use grappelli_buffer::{BufferWriter, MemorySink};
///
/// let mut sink = MemorySink::new();
/// let mut writer = BufferWriter::new(&mut sink);
/// writer.write(b"hello").unwrap();
/// writer.commit();
/// assert_eq!(sink.committed_bytes(), b"hello");
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
	storage: Vec<u8>,
	committed: usize,
	region_limit: Option<usize>,
}

impl MemorySink {
	/// Creates an empty sink with unbounded regions.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty sink whose regions never exceed `limit` bytes.
	pub fn with_region_limit(limit: usize) -> Self {
		Self {
			storage: Vec::new(),
			committed: 0,
			region_limit: Some(limit),
		}
	}

	/// Number of bytes committed so far.
	pub fn committed(&self) -> usize {
		self.committed
	}

	/// The committed output.
	pub fn committed_bytes(&self) -> &[u8] {
		&self.storage[..self.committed]
	}

	/// Consumes the sink, freezing the committed output.
	///
	/// Uncommitted region bytes are discarded, so a render that failed before
	/// committing contributes nothing to the frozen output.
	pub fn freeze(mut self) -> Bytes {
		self.storage.truncate(self.committed);
		Bytes::from(self.storage)
	}
}

impl Sink for MemorySink {
	fn region(&mut self, size_hint: usize) -> &mut [u8] {
		let mut wanted = size_hint.max(MIN_REGION);
		if let Some(limit) = self.region_limit {
			wanted = wanted.min(limit);
		}
		let available = self.storage.len() - self.committed;
		if available < wanted {
			self.storage.resize(self.committed + wanted, 0);
		}
		&mut self.storage[self.committed..]
	}

	fn advance(&mut self, written: usize) {
		debug_assert!(self.committed + written <= self.storage.len());
		self.committed += written;
	}
}

/// Sink over a caller-provided slice.
///
/// Capacity is fixed: once the slice is full the writer's next request fails
/// with [`SinkExhausted`](crate::WriteError::SinkExhausted). This is the sink
/// to use when output must not allocate at all.
///
/// # Examples
///
/// ```
/// use grappelli_buffer::{BufferWriter, FixedSink};
///
/// let mut storage = [0u8; 16];
/// let mut sink = FixedSink::new(&mut storage);
/// let mut writer = BufferWriter::new(&mut sink);
/// writer.write(b"ok").unwrap();
/// writer.commit();
/// assert_eq!(sink.committed_bytes(), b"ok");
/// ```
#[derive(Debug)]
pub struct FixedSink<'a> {
	storage: &'a mut [u8],
	committed: usize,
}

impl<'a> FixedSink<'a> {
	/// Wraps `storage` as a fixed-capacity sink.
	pub fn new(storage: &'a mut [u8]) -> Self {
		Self {
			storage,
			committed: 0,
		}
	}

	/// Number of bytes committed so far.
	pub fn committed(&self) -> usize {
		self.committed
	}

	/// The committed output.
	pub fn committed_bytes(&self) -> &[u8] {
		&self.storage[..self.committed]
	}
}

impl Sink for FixedSink<'_> {
	fn region(&mut self, _size_hint: usize) -> &mut [u8] {
		&mut self.storage[self.committed..]
	}

	fn advance(&mut self, written: usize) {
		debug_assert!(self.committed + written <= self.storage.len());
		self.committed += written;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_memory_sink_grows_to_hint() {
		let mut sink = MemorySink::new();
		assert!(sink.region(1024).len() >= 1024);
	}

	#[test]
	fn test_memory_sink_minimum_region() {
		let mut sink = MemorySink::new();
		assert!(sink.region(1).len() >= MIN_REGION);
	}

	#[test]
	fn test_memory_sink_region_limit_caps_hint() {
		let mut sink = MemorySink::with_region_limit(8);
		assert_eq!(sink.region(4096).len(), 8);
	}

	#[test]
	fn test_advance_exposes_fresh_region() {
		let mut sink = MemorySink::with_region_limit(4);
		sink.region(4)[..4].copy_from_slice(b"abcd");
		sink.advance(4);
		assert_eq!(sink.committed(), 4);
		// The fresh region starts past the committed bytes.
		sink.region(4)[..4].copy_from_slice(b"efgh");
		sink.advance(4);
		assert_eq!(sink.committed_bytes(), b"abcdefgh");
	}

	#[test]
	fn test_freeze_discards_uncommitted() {
		let mut sink = MemorySink::new();
		sink.region(16)[..6].copy_from_slice(b"keepme");
		sink.advance(4);
		assert_eq!(sink.freeze(), Bytes::from_static(b"keep"));
	}

	#[test]
	fn test_fixed_sink_region_shrinks() {
		let mut storage = [0u8; 8];
		let mut sink = FixedSink::new(&mut storage);
		assert_eq!(sink.region(64).len(), 8);
		sink.advance(5);
		assert_eq!(sink.region(64).len(), 3);
	}
}
