//! Error types for buffered output.

use thiserror::Error;

/// Result type for writer operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Errors raised while writing into a sink.
///
/// A failed write leaves the writer's uncommitted bytes uncommitted; the sink
/// only ever observes the bytes that were explicitly advanced before the
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WriteError {
	/// The sink could not supply the requested writable capacity.
	#[error("sink exhausted: {requested} contiguous bytes requested")]
	SinkExhausted {
		/// Number of bytes the writer asked for and could not get.
		requested: usize,
	},

	/// Input could not be encoded under the configured safe-character policy.
	#[error("invalid data: input is not valid UTF-8 at byte {offset}")]
	InvalidData {
		/// Byte offset of the first undecodable input byte.
		offset: usize,
	},
}
