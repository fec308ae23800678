//! Render program builder.
//!
//! Walks a [`ParsedTemplate`] against a [`ModelSchema`] scope, resolving
//! every tag at compile time into a typed [`Instruction`]. The result is an
//! immutable [`RenderProgram`] safe to share across concurrent renders, and
//! structurally deterministic: identical (template, schema) inputs always
//! produce identical instruction trees.
//!
//! Resolution is fail-fast: a tag that names no field in scope is an
//! [`UnknownField`](crate::TemplateError::UnknownField) compile error rather
//! than a silently skipped span, so schema typos surface on first compile
//! instead of as missing output.

use std::fmt;

use bytes::Bytes;

use crate::error::{TemplateError, TemplateResult};
use crate::parser::{ParsedTemplate, TagPath, TemplateNode};
use crate::schema::{Accessor, FieldKind, ModelSchema};

/// One step of a render program.
///
/// Value-bearing variants carry the accessor resolved at compile time plus
/// the source tag name for runtime diagnostics.
#[derive(Clone)]
pub enum Instruction {
	/// Emit a literal byte span verbatim.
	Literal(Bytes),
	/// Emit an unsigned integer via the numeric fast path.
	Integer {
		/// Source tag name.
		tag: String,
		/// Resolved accessor.
		accessor: Accessor,
	},
	/// Emit text, HTML-escaped.
	EscapedText {
		/// Source tag name.
		tag: String,
		/// Resolved accessor.
		accessor: Accessor,
	},
	/// Stringify the value, then emit it HTML-escaped.
	Stringified {
		/// Source tag name.
		tag: String,
		/// Resolved accessor.
		accessor: Accessor,
	},
	/// Run the body once per sequence element.
	Loop {
		/// Source tag name.
		tag: String,
		/// Resolved accessor.
		accessor: Accessor,
		/// Inner program, scoped to the element schema.
		body: Vec<Instruction>,
	},
	/// Run the body only when the guard is true.
	Conditional {
		/// Source tag name.
		tag: String,
		/// Resolved accessor.
		accessor: Accessor,
		/// Inner program, scoped to the outer schema.
		body: Vec<Instruction>,
	},
}

impl fmt::Debug for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Instruction::Literal(bytes) => f
				.debug_tuple("Literal")
				.field(&String::from_utf8_lossy(bytes))
				.finish(),
			Instruction::Integer { tag, .. } => {
				f.debug_struct("Integer").field("tag", tag).finish_non_exhaustive()
			}
			Instruction::EscapedText { tag, .. } => {
				f.debug_struct("EscapedText").field("tag", tag).finish_non_exhaustive()
			}
			Instruction::Stringified { tag, .. } => {
				f.debug_struct("Stringified").field("tag", tag).finish_non_exhaustive()
			}
			Instruction::Loop { tag, body, .. } => f
				.debug_struct("Loop")
				.field("tag", tag)
				.field("body", body)
				.finish_non_exhaustive(),
			Instruction::Conditional { tag, body, .. } => f
				.debug_struct("Conditional")
				.field("tag", tag)
				.field("body", body)
				.finish_non_exhaustive(),
		}
	}
}

/// An immutable, cacheable render program for one (template, schema) pair.
#[derive(Debug, Clone)]
pub struct RenderProgram {
	instructions: Vec<Instruction>,
}

impl RenderProgram {
	/// The root instruction sequence.
	pub fn instructions(&self) -> &[Instruction] {
		&self.instructions
	}
}

/// Compiles a parsed template against a schema.
///
/// # Examples
///
/// ```
/// use grappelli_templates::compiler::{compile, Instruction};
/// use grappelli_templates::parser::parse;
/// use grappelli_templates::schema::ModelSchema;
///
/// let parsed = parse("Hello {{name}}!").unwrap();
/// let schema = ModelSchema::builder("greeting").text("name").build();
/// let program = compile(&parsed, &schema).unwrap();
/// assert_eq!(program.instructions().len(), 3);
/// assert!(matches!(program.instructions()[1], Instruction::EscapedText { .. }));
/// ```
pub fn compile(template: &ParsedTemplate, schema: &ModelSchema) -> TemplateResult<RenderProgram> {
	Ok(RenderProgram {
		instructions: build_nodes(template.nodes(), schema)?,
	})
}

fn build_nodes(nodes: &[TemplateNode], scope: &ModelSchema) -> TemplateResult<Vec<Instruction>> {
	let mut instructions = Vec::with_capacity(nodes.len());
	for node in nodes {
		let instruction = match node {
			TemplateNode::Literal(text) => {
				Instruction::Literal(Bytes::copy_from_slice(text.as_bytes()))
			}
			TemplateNode::Variable(path) => build_variable(path, scope)?,
			TemplateNode::Section { name, body } => build_section(name, body, scope)?,
		};
		instructions.push(instruction);
	}
	Ok(instructions)
}

fn build_variable(path: &TagPath, scope: &ModelSchema) -> TemplateResult<Instruction> {
	let (tag, kind, accessor) = resolve(path, scope)?;
	Ok(match kind {
		FieldKind::Integer => Instruction::Integer { tag, accessor },
		FieldKind::Text => Instruction::EscapedText { tag, accessor },
		FieldKind::Boolean | FieldKind::Sequence(_) | FieldKind::Opaque => {
			Instruction::Stringified { tag, accessor }
		}
	})
}

/// Resolves a variable path against the current scope.
///
/// `{{.}}` resolves to the scope's own value kind with an identity accessor.
/// None of the field kinds expose named sub-members, so a dotted path cannot
/// reach past the current scope and fails as unknown.
fn resolve(path: &TagPath, scope: &ModelSchema) -> TemplateResult<(String, FieldKind, Accessor)> {
	match path {
		TagPath::SelfRef => {
			let kind = scope
				.value_kind()
				.cloned()
				.ok_or_else(|| TemplateError::UnknownField(".".to_string()))?;
			let accessor: Accessor = std::sync::Arc::new(|value| Some(value));
			Ok((".".to_string(), kind, accessor))
		}
		TagPath::Named(segments) => {
			let tag = path.to_string();
			let [name] = segments.as_slice() else {
				return Err(TemplateError::UnknownField(tag));
			};
			let field = scope
				.field(name)
				.ok_or_else(|| TemplateError::UnknownField(tag.clone()))?;
			Ok((tag, field.kind().clone(), field.accessor().clone()))
		}
	}
}

fn build_section(
	name: &str,
	body: &[TemplateNode],
	scope: &ModelSchema,
) -> TemplateResult<Instruction> {
	let field = scope
		.field(name)
		.ok_or_else(|| TemplateError::UnknownField(name.to_string()))?;
	match field.kind() {
		FieldKind::Sequence(element) => Ok(Instruction::Loop {
			tag: name.to_string(),
			accessor: field.accessor().clone(),
			body: build_nodes(body, element)?,
		}),
		FieldKind::Boolean => Ok(Instruction::Conditional {
			tag: name.to_string(),
			accessor: field.accessor().clone(),
			body: build_nodes(body, scope)?,
		}),
		other => Err(TemplateError::InvalidSectionType {
			name: name.to_string(),
			kind: other.name().to_string(),
		}),
	}
}
