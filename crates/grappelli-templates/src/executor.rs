//! Render program execution against live data.
//!
//! Walks a compiled [`RenderProgram`] with a `serde_json::Value` instance,
//! streaming output through a [`BufferWriter`]. Accessors were resolved at
//! compile time; the only checks left here are value presence and runtime
//! shape, which surface as [`MissingValue`](crate::TemplateError::MissingValue)
//! and [`TypeMismatch`](crate::TemplateError::TypeMismatch).

use grappelli_buffer::{BufferWriter, Sink};
use serde_json::Value;

use crate::compiler::{Instruction, RenderProgram};
use crate::error::{TemplateError, TemplateResult};
use crate::schema::Accessor;

/// Executes `program` over `data`, writing output through `writer`.
///
/// Buffered output is left uncommitted; the caller decides whether to commit
/// after the run succeeds.
pub fn execute<S: Sink>(
	program: &RenderProgram,
	data: &Value,
	writer: &mut BufferWriter<'_, S>,
) -> TemplateResult<()> {
	run(program.instructions(), data, writer)
}

fn run<S: Sink>(
	instructions: &[Instruction],
	data: &Value,
	writer: &mut BufferWriter<'_, S>,
) -> TemplateResult<()> {
	for instruction in instructions {
		match instruction {
			Instruction::Literal(bytes) => writer.write(bytes)?,
			Instruction::Integer { tag, accessor } => {
				let value = fetch(tag, accessor, data)?;
				let number = value.as_u64().ok_or(TemplateError::TypeMismatch {
					tag: tag.clone(),
					expected: "unsigned integer",
				})?;
				writer.write_numeric(number)?;
			}
			Instruction::EscapedText { tag, accessor } => {
				let value = fetch(tag, accessor, data)?;
				let text = value.as_str().ok_or(TemplateError::TypeMismatch {
					tag: tag.clone(),
					expected: "string",
				})?;
				writer.write_escaped(text)?;
			}
			Instruction::Stringified { tag, accessor } => {
				match fetch(tag, accessor, data)? {
					Value::String(text) => writer.write_escaped(text)?,
					Value::Bool(true) => writer.write(b"true")?,
					Value::Bool(false) => writer.write(b"false")?,
					other => writer.write_escaped(&other.to_string())?,
				}
			}
			Instruction::Loop { tag, accessor, body } => {
				let value = fetch(tag, accessor, data)?;
				let elements = value.as_array().ok_or(TemplateError::TypeMismatch {
					tag: tag.clone(),
					expected: "sequence",
				})?;
				for element in elements {
					run(body, element, writer)?;
				}
			}
			Instruction::Conditional { tag, accessor, body } => {
				let value = fetch(tag, accessor, data)?;
				let guard = value.as_bool().ok_or(TemplateError::TypeMismatch {
					tag: tag.clone(),
					expected: "boolean",
				})?;
				if guard {
					run(body, data, writer)?;
				}
			}
		}
	}
	Ok(())
}

/// Absent fields and explicit nulls both count as missing.
fn fetch<'a>(tag: &str, accessor: &Accessor, data: &'a Value) -> TemplateResult<&'a Value> {
	match (accessor.as_ref())(data) {
		Some(Value::Null) | None => Err(TemplateError::MissingValue(tag.to_string())),
		Some(value) => Ok(value),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::compiler::compile;
	use crate::parser::parse;
	use crate::schema::{FieldKind, ModelSchema};
	use grappelli_buffer::MemorySink;
	use serde_json::json;
	use std::sync::Arc;

	fn render(
		template: &str,
		schema: &ModelSchema,
		data: &Value,
	) -> TemplateResult<String> {
		let program = compile(&parse(template)?, schema)?;
		let mut sink = MemorySink::new();
		let mut writer = BufferWriter::new(&mut sink);
		execute(&program, data, &mut writer)?;
		writer.commit();
		Ok(String::from_utf8(sink.freeze().to_vec()).unwrap())
	}

	fn fortune_schema() -> Arc<ModelSchema> {
		ModelSchema::builder("fortune").integer("id").text("message").build()
	}

	#[test]
	fn test_renders_variables_in_order() {
		let output = render(
			"<tr><td>{{id}}</td><td>{{message}}</td></tr>",
			&fortune_schema(),
			&json!({"id": 11, "message": "fortune"}),
		)
		.unwrap();
		assert_eq!(output, "<tr><td>11</td><td>fortune</td></tr>");
	}

	#[test]
	fn test_text_output_is_escaped() {
		let output = render(
			"{{message}}",
			&fortune_schema(),
			&json!({"message": "<script>alert('x')</script>"}),
		)
		.unwrap();
		assert_eq!(
			output,
			"&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"
		);
	}

	#[test]
	fn test_loop_repeats_body_per_element() {
		let row = ModelSchema::builder("row").text("message").build();
		let schema = ModelSchema::builder("page").sequence("rows", row).build();
		let output = render(
			"<ul>{{#rows}}<li>{{message}}</li>{{/rows}}</ul>",
			&schema,
			&json!({"rows": [{"message": "a"}, {"message": "b"}]}),
		)
		.unwrap();
		assert_eq!(output, "<ul><li>a</li><li>b</li></ul>");
	}

	#[test]
	fn test_empty_sequence_emits_nothing() {
		let row = ModelSchema::builder("row").text("message").build();
		let schema = ModelSchema::builder("page").sequence("rows", row).build();
		let output = render(
			"a{{#rows}}x{{/rows}}b",
			&schema,
			&json!({"rows": []}),
		)
		.unwrap();
		assert_eq!(output, "ab");
	}

	#[test]
	fn test_conditional_gates_body() {
		let schema = ModelSchema::builder("page").boolean("admin").text("name").build();
		let shown = render(
			"{{#admin}}[{{name}}]{{/admin}}done",
			&schema,
			&json!({"admin": true, "name": "root"}),
		)
		.unwrap();
		assert_eq!(shown, "[root]done");
		let hidden = render(
			"{{#admin}}[{{name}}]{{/admin}}done",
			&schema,
			&json!({"admin": false}),
		)
		.unwrap();
		assert_eq!(hidden, "done");
	}

	#[test]
	fn test_self_reference_renders_scalar_elements() {
		let element = ModelSchema::scalar("item", FieldKind::Text);
		let schema = ModelSchema::builder("page").sequence("items", element).build();
		let output = render(
			"{{#items}}{{.}};{{/items}}",
			&schema,
			&json!({"items": ["x", "<y>"]}),
		)
		.unwrap();
		assert_eq!(output, "x;&lt;y&gt;;");
	}

	#[test]
	fn test_missing_and_null_values_fail() {
		for data in [json!({}), json!({"message": null})] {
			let error = render("{{message}}", &fortune_schema(), &data).unwrap_err();
			assert_eq!(error, TemplateError::MissingValue("message".to_string()));
		}
	}

	#[test]
	fn test_type_mismatch_reports_expected_shape() {
		let error = render(
			"{{id}}",
			&fortune_schema(),
			&json!({"id": "not a number"}),
		)
		.unwrap_err();
		assert_eq!(
			error,
			TemplateError::TypeMismatch {
				tag: "id".to_string(),
				expected: "unsigned integer",
			}
		);
	}

	#[test]
	fn test_stringified_booleans_and_numbers() {
		let schema = ModelSchema::builder("page")
			.boolean("flag")
			.opaque("extra")
			.build();
		let output = render(
			"{{flag}}|{{extra}}",
			&schema,
			&json!({"flag": true, "extra": 2.5}),
		)
		.unwrap();
		assert_eq!(output, "true|2.5");
	}
}
