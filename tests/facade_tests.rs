//! Facade integration tests
//!
//! Drive the public `grappelli` surface end to end: engine rendering through
//! the re-exported template crate and direct use of the buffer layer.

use std::sync::Arc;

use grappelli::templates::engine::{TemplateEngine, TemplateSource};
use grappelli::templates::schema::{FieldKind, ModelSchema, SchemaRegistry};
use grappelli::{BufferWriter, MemorySink, TemplateError};
use serde_json::json;

fn fortunes_engine() -> TemplateEngine {
	let row = ModelSchema::builder("fortune")
		.integer("id")
		.text("message")
		.build();
	let page = ModelSchema::builder("fortunes").sequence("rows", row).build();
	let mut schemas = SchemaRegistry::new();
	schemas.register(page);
	let mut engine = TemplateEngine::new(Arc::new(schemas));
	engine.register(TemplateSource::new(
		"fortunes",
		"<table>{{#rows}}<tr><td>{{id}}</td><td>{{message}}</td></tr>{{/rows}}</table>",
	));
	engine
}

#[test]
fn test_render_fortunes_through_facade() {
	let engine = fortunes_engine();
	let html = engine
		.render(
			"fortunes",
			"fortunes",
			&json!({"rows": [{"id": 1, "message": "<b>bold</b>"}]}),
		)
		.unwrap();
	assert_eq!(
		html.as_ref(),
		b"<table><tr><td>1</td><td>&lt;b&gt;bold&lt;/b&gt;</td></tr></table>".as_slice()
	);
}

#[test]
fn test_render_errors_are_typed() {
	let engine = fortunes_engine();
	let error = engine
		.render("fortunes", "fortunes", &json!({"rows": [{"id": 1}]}))
		.unwrap_err();
	assert_eq!(error, TemplateError::MissingValue("message".to_string()));
}

#[test]
fn test_buffer_layer_direct_use() {
	let mut sink = MemorySink::new();
	let mut writer = BufferWriter::new(&mut sink);
	writer.write(b"id=").unwrap();
	writer.write_numeric(745).unwrap();
	writer.write_escaped(" & counting").unwrap();
	writer.commit();
	assert_eq!(sink.freeze().as_ref(), b"id=745 &amp; counting");
}

#[test]
fn test_scalar_loop_through_facade() {
	let item = ModelSchema::scalar("item", FieldKind::Integer);
	let schema = ModelSchema::builder("page").sequence("ids", item).build();
	let mut schemas = SchemaRegistry::new();
	schemas.register(schema);
	let mut engine = TemplateEngine::new(Arc::new(schemas));
	engine.register(TemplateSource::new("ids", "[{{#ids}}{{.}} {{/ids}}]"));
	let output = engine
		.render("ids", "page", &json!({"ids": [1, 2, 3]}))
		.unwrap();
	assert_eq!(output.as_ref(), b"[1 2 3 ]".as_slice());
}
