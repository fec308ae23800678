//! Template system error types.
//!
//! Compile-time errors (parser, resolver) are memoized in the render cache:
//! repeated use of a broken (template, schema) pair returns the identical
//! error without re-parsing. Runtime errors (executor, writer) are per-call
//! and never retried automatically.

use grappelli_buffer::WriteError;
use thiserror::Error;

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors raised while compiling or executing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TemplateError {
	/// An opening tag delimiter with no matching closing delimiter.
	#[error("unterminated tag: '{{{{' at byte {offset} has no matching '}}}}'")]
	UnterminatedTag {
		/// Byte offset of the opening delimiter.
		offset: usize,
	},

	/// A tag with no name between the delimiters.
	#[error("empty tag at byte {offset}")]
	EmptyTag {
		/// Byte offset of the opening delimiter.
		offset: usize,
	},

	/// A tag whose name is not a valid dotted path.
	#[error("invalid tag name '{name}' at byte {offset}")]
	InvalidTagName {
		/// The offending tag text.
		name: String,
		/// Byte offset of the opening delimiter.
		offset: usize,
	},

	/// A section was opened but never closed.
	#[error("unterminated section: '{0}' is never closed")]
	UnterminatedSection(String),

	/// A section close tag does not name the innermost open section.
	#[error("mismatched section close: expected '{expected}', found '{found}'")]
	MismatchedSectionClose {
		/// Innermost open section name.
		expected: String,
		/// Name the close tag carried.
		found: String,
	},

	/// A section close tag with no open section at all.
	#[error("unexpected section close: '{0}' has no matching open tag")]
	UnexpectedSectionClose(String),

	/// A tag name does not resolve against the scope's schema.
	#[error("unknown field: '{0}'")]
	UnknownField(String),

	/// A section tag resolved to a kind that is neither sequence nor boolean.
	#[error("invalid section type: '{name}' is {kind}, sections require a sequence or boolean")]
	InvalidSectionType {
		/// Section name.
		name: String,
		/// The kind the name resolved to.
		kind: String,
	},

	/// No template registered under the requested name.
	#[error("template not found: {0}")]
	TemplateNotFound(String),

	/// The schema provider knows no schema for the requested shape.
	#[error("schema not found: {0}")]
	SchemaNotFound(String),

	/// An accessor produced no value (or null) for a compiled instruction.
	#[error("missing value for '{0}'")]
	MissingValue(String),

	/// A runtime value contradicts the kind the instruction was compiled for.
	#[error("type mismatch for '{tag}': expected {expected}")]
	TypeMismatch {
		/// Tag whose value misbehaved.
		tag: String,
		/// Human-readable expected type.
		expected: &'static str,
	},

	/// The output writer failed.
	#[error(transparent)]
	Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unterminated_tag_display() {
		let err = TemplateError::UnterminatedTag { offset: 12 };
		assert_eq!(
			err.to_string(),
			"unterminated tag: '{{' at byte 12 has no matching '}}'"
		);
	}

	#[test]
	fn test_mismatched_section_close_display() {
		let err = TemplateError::MismatchedSectionClose {
			expected: "rows".to_string(),
			found: "cols".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"mismatched section close: expected 'rows', found 'cols'"
		);
	}

	#[test]
	fn test_invalid_section_type_display() {
		let err = TemplateError::InvalidSectionType {
			name: "count".to_string(),
			kind: "integer".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"invalid section type: 'count' is integer, sections require a sequence or boolean"
		);
	}

	#[test]
	fn test_write_error_conversion() {
		let err: TemplateError = WriteError::SinkExhausted { requested: 16 }.into();
		assert!(matches!(err, TemplateError::Write(_)));
		assert_eq!(err.to_string(), "sink exhausted: 16 contiguous bytes requested");
	}

	#[test]
	fn test_errors_are_cloneable() {
		// Cache memoization hands out clones of the original failure.
		let err = TemplateError::UnknownField("user".to_string());
		assert_eq!(err.clone(), err);
	}
}
