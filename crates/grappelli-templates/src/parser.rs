//! Template parser.
//!
//! Tokenizes template source into an immutable tree of literal, variable,
//! and section nodes. The grammar is deliberately small: runs of literal
//! bytes, `{{name}}` variable references (dotted or simple), `{{#name}}` /
//! `{{/name}}` section delimiters, and `{{.}}` for the current loop element.
//! There is no way to escape the delimiter pair inside literal text.
//!
//! One formatting convenience is applied while parsing: the single run of
//! whitespace (spaces, newlines, carriage returns) immediately after a
//! section's opening tag is skipped, and so is the run immediately after its
//! close tag, which keeps loop output free of per-iteration indentation.

use std::fmt;

use crate::error::{TemplateError, TemplateResult};

const OPEN_DELIM: &str = "{{";
const CLOSE_DELIM: &str = "}}";

/// Reference a variable tag makes into the current scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPath {
	/// `{{.}}`: the current loop element itself.
	SelfRef,
	/// A dotted or simple field name.
	Named(Vec<String>),
}

impl TagPath {
	fn parse(tag: &str, offset: usize) -> TemplateResult<Self> {
		if tag == "." {
			return Ok(TagPath::SelfRef);
		}
		let segments: Vec<String> = tag.split('.').map(str::to_string).collect();
		if segments.iter().any(String::is_empty) {
			return Err(TemplateError::InvalidTagName {
				name: tag.to_string(),
				offset,
			});
		}
		Ok(TagPath::Named(segments))
	}
}

impl fmt::Display for TagPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TagPath::SelfRef => f.write_str("."),
			TagPath::Named(segments) => f.write_str(&segments.join(".")),
		}
	}
}

/// One node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
	/// A run of literal text, passed through unchanged.
	Literal(String),
	/// A variable reference.
	Variable(TagPath),
	/// A section: loop or conditional depending on the resolved field kind.
	Section {
		/// Name shared by the open and close tags.
		name: String,
		/// Nodes between the tags, whitespace-trimmed at the boundary.
		body: Vec<TemplateNode>,
	},
}

/// An immutable parse result.
///
/// Built once per template source; parse errors abort before any program is
/// compiled from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
	nodes: Vec<TemplateNode>,
}

impl ParsedTemplate {
	/// The root node sequence.
	pub fn nodes(&self) -> &[TemplateNode] {
		&self.nodes
	}
}

/// Parses template source.
///
/// # Examples
///
/// ```
/// use grappelli_templates::parser::{parse, TemplateNode};
///
/// let parsed = parse("Hello {{name}}!").unwrap();
/// assert_eq!(parsed.nodes().len(), 3);
/// assert!(matches!(parsed.nodes()[0], TemplateNode::Literal(_)));
/// ```
pub fn parse(source: &str) -> TemplateResult<ParsedTemplate> {
	let mut cursor = Cursor { source, pos: 0 };
	let nodes = parse_body(&mut cursor, None)?;
	Ok(ParsedTemplate { nodes })
}

struct Cursor<'a> {
	source: &'a str,
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Tied to the source's lifetime, not the cursor borrow, so callers can
	/// hold slices of it across position updates.
	fn rest(&self) -> &'a str {
		&self.source[self.pos..]
	}

	/// Skips one run of section-boundary whitespace.
	fn skip_whitespace_run(&mut self) {
		let rest = self.rest();
		let trimmed = rest.trim_start_matches([' ', '\n', '\r']);
		self.pos += rest.len() - trimmed.len();
	}
}

/// Recursive descent over one nesting level.
///
/// `open` names the section whose body is being parsed; its close tag ends
/// the level. The stack of open sections lives in the call stack itself.
fn parse_body(cursor: &mut Cursor<'_>, open: Option<&str>) -> TemplateResult<Vec<TemplateNode>> {
	let mut nodes = Vec::new();
	loop {
		let rest = cursor.rest();
		let Some(start) = rest.find(OPEN_DELIM) else {
			if let Some(name) = open {
				return Err(TemplateError::UnterminatedSection(name.to_string()));
			}
			if !rest.is_empty() {
				nodes.push(TemplateNode::Literal(rest.to_string()));
				cursor.pos = cursor.source.len();
			}
			return Ok(nodes);
		};

		let tag_offset = cursor.pos + start;
		let after_open = &rest[start + OPEN_DELIM.len()..];
		let Some(end) = after_open.find(CLOSE_DELIM) else {
			return Err(TemplateError::UnterminatedTag { offset: tag_offset });
		};
		let tag = &after_open[..end];

		if start > 0 {
			nodes.push(TemplateNode::Literal(rest[..start].to_string()));
		}
		cursor.pos = tag_offset + OPEN_DELIM.len() + end + CLOSE_DELIM.len();

		if tag.is_empty() {
			return Err(TemplateError::EmptyTag { offset: tag_offset });
		}

		if let Some(name) = tag.strip_prefix('#') {
			if name.is_empty() {
				return Err(TemplateError::EmptyTag { offset: tag_offset });
			}
			cursor.skip_whitespace_run();
			let body = parse_body(cursor, Some(name))?;
			cursor.skip_whitespace_run();
			nodes.push(TemplateNode::Section {
				name: name.to_string(),
				body,
			});
		} else if let Some(name) = tag.strip_prefix('/') {
			return match open {
				Some(opened) if opened == name => Ok(nodes),
				Some(opened) => Err(TemplateError::MismatchedSectionClose {
					expected: opened.to_string(),
					found: name.to_string(),
				}),
				None => Err(TemplateError::UnexpectedSectionClose(name.to_string())),
			};
		} else {
			nodes.push(TemplateNode::Variable(TagPath::parse(tag, tag_offset)?));
		}
	}
}
