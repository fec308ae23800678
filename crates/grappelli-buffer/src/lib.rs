//! # Grappelli Buffer
//!
//! Write-combining output buffer for render pipelines.
//!
//! The crate pairs a pluggable growable-memory [`Sink`] with a
//! [`BufferWriter`] that batches writes, formats unsigned integers without
//! true division on the hot path, and HTML-escapes text through bounded
//! scratch buffers. One writer serves one render; nothing here performs
//! network or disk I/O.
//!
//! ## Example
//!
//! ```
//! use grappelli_buffer::{BufferWriter, MemorySink};
//!
//! let mut sink = MemorySink::new();
//! let mut writer = BufferWriter::new(&mut sink);
//! writer.write(b"<li>").unwrap();
//! writer.write_escaped("Fish & Chips").unwrap();
//! writer.write(b" x").unwrap();
//! writer.write_numeric(2).unwrap();
//! writer.write(b"</li>").unwrap();
//! writer.commit();
//! assert_eq!(sink.freeze(), "<li>Fish &amp; Chips x2</li>");
//! ```

mod error;
mod escape;
mod sink;
mod writer;

pub use error::{WriteError, WriteResult};
pub use sink::{FixedSink, MemorySink, Sink};
pub use writer::{BufferWriter, DEFAULT_SIZE_HINT};
