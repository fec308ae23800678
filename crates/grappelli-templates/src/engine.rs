//! Template engine facade.
//!
//! Owns the registered template sources, a schema provider, and the render
//! program cache, and drives the full pipeline: look up, compile (once per
//! pairing), execute, commit.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use grappelli_buffer::{BufferWriter, MemorySink, Sink};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheKey, RenderCache};
use crate::compiler::{compile, RenderProgram};
use crate::error::{TemplateError, TemplateResult};
use crate::executor::execute;
use crate::parser::parse;
use crate::schema::SchemaProvider;

/// A named template source text.
#[derive(Debug, Clone)]
pub struct TemplateSource {
	name: String,
	text: String,
}

impl TemplateSource {
	/// Creates a named source.
	pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			text: text.into(),
		}
	}

	/// The template's registered name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The raw template text.
	pub fn text(&self) -> &str {
		&self.text
	}
}

/// Compiles and renders registered templates against provided schemas.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use grappelli_templates::engine::{TemplateEngine, TemplateSource};
/// use grappelli_templates::schema::{ModelSchema, SchemaRegistry};
/// use serde_json::json;
///
/// let mut schemas = SchemaRegistry::new();
/// schemas.register(ModelSchema::builder("greeting").text("name").build());
/// let mut engine = TemplateEngine::new(Arc::new(schemas));
/// engine.register(TemplateSource::new("hello", "Hello {{name}}!"));
///
/// let output = engine.render("hello", "greeting", &json!({"name": "world"})).unwrap();
/// assert_eq!(output.as_ref(), b"Hello world!");
/// ```
pub struct TemplateEngine {
	templates: HashMap<String, TemplateSource>,
	provider: Arc<dyn SchemaProvider>,
	cache: RenderCache,
}

impl TemplateEngine {
	/// Creates an engine backed by `provider`.
	pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
		Self {
			templates: HashMap::new(),
			provider,
			cache: RenderCache::new(),
		}
	}

	/// Registers a template source, replacing any existing one by that name.
	pub fn register(&mut self, source: TemplateSource) {
		debug!(template = %source.name(), "registering template source");
		self.templates.insert(source.name().to_string(), source);
	}

	/// Returns the compiled program for a (template, schema) pairing,
	/// compiling it on first use.
	///
	/// Compilation outcomes, errors included, are memoized per pairing.
	/// Lookup failures are not: registering a missing template or schema
	/// makes later calls succeed.
	pub fn program(
		&self,
		template: &str,
		schema: &str,
	) -> TemplateResult<Arc<RenderProgram>> {
		let key = CacheKey::new(template, schema);
		if let Some(outcome) = self.cache.get(&key) {
			return outcome;
		}
		let source = self
			.templates
			.get(template)
			.ok_or_else(|| TemplateError::TemplateNotFound(template.to_string()))?;
		let model = self
			.provider
			.schema(schema)
			.ok_or_else(|| TemplateError::SchemaNotFound(schema.to_string()))?;
		self.cache.get_or_compile(key, || {
			let parsed = parse(source.text())?;
			compile(&parsed, &model).map(Arc::new)
		})
	}

	/// Renders a template against `data` into a freshly allocated buffer.
	pub fn render(&self, template: &str, schema: &str, data: &Value) -> TemplateResult<Bytes> {
		let mut sink = MemorySink::new();
		self.render_to(template, schema, data, &mut sink)?;
		Ok(sink.freeze())
	}

	/// Renders a template against `data` into a caller-supplied sink.
	///
	/// The trailing buffered bytes are committed only when the whole render
	/// succeeds, so a failed run never commits a partial final chunk.
	pub fn render_to<S: Sink>(
		&self,
		template: &str,
		schema: &str,
		data: &Value,
		sink: &mut S,
	) -> TemplateResult<()> {
		let program = self.program(template, schema)?;
		let mut writer = BufferWriter::new(sink);
		execute(&program, data, &mut writer)?;
		writer.commit();
		Ok(())
	}
}

impl std::fmt::Debug for TemplateEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TemplateEngine")
			.field("templates", &self.templates.keys().collect::<Vec<_>>())
			.field("cache", &self.cache)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{ModelSchema, SchemaRegistry};
	use grappelli_buffer::FixedSink;
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};

	struct CountingProvider {
		inner: SchemaRegistry,
		calls: AtomicUsize,
	}

	impl SchemaProvider for CountingProvider {
		fn schema(&self, id: &str) -> Option<Arc<ModelSchema>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.inner.schema(id)
		}
	}

	fn fortune_engine() -> TemplateEngine {
		let mut schemas = SchemaRegistry::new();
		schemas.register(
			ModelSchema::builder("fortune").integer("id").text("message").build(),
		);
		let mut engine = TemplateEngine::new(Arc::new(schemas));
		engine.register(TemplateSource::new(
			"row",
			"<tr><td>{{id}}</td><td>{{message}}</td></tr>",
		));
		engine
	}

	#[test]
	fn test_render_produces_bytes() {
		let engine = fortune_engine();
		let output = engine
			.render("row", "fortune", &json!({"id": 5, "message": "hi"}))
			.unwrap();
		assert_eq!(output.as_ref(), b"<tr><td>5</td><td>hi</td></tr>");
	}

	#[test]
	fn test_unknown_template_and_schema() {
		let engine = fortune_engine();
		assert_eq!(
			engine.program("nope", "fortune").unwrap_err(),
			TemplateError::TemplateNotFound("nope".to_string())
		);
		assert_eq!(
			engine.program("row", "nope").unwrap_err(),
			TemplateError::SchemaNotFound("nope".to_string())
		);
	}

	#[test]
	fn test_program_is_compiled_once_per_pairing() {
		let mut schemas = SchemaRegistry::new();
		schemas.register(
			ModelSchema::builder("fortune").integer("id").text("message").build(),
		);
		let provider = Arc::new(CountingProvider {
			inner: schemas,
			calls: AtomicUsize::new(0),
		});
		let mut engine = TemplateEngine::new(Arc::clone(&provider) as Arc<dyn SchemaProvider>);
		engine.register(TemplateSource::new("row", "{{id}}"));

		let first = engine.program("row", "fortune").unwrap();
		let second = engine.program("row", "fortune").unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		// Memoized outcomes skip provider lookup entirely.
		assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_compile_errors_are_memoized_per_pairing() {
		let mut engine = fortune_engine();
		engine.register(TemplateSource::new("bad", "{{missing}}"));
		for _ in 0..2 {
			assert_eq!(
				engine.program("bad", "fortune").unwrap_err(),
				TemplateError::UnknownField("missing".to_string())
			);
		}
		// The same template compiles fine against a schema that has the field.
		let mut schemas = SchemaRegistry::new();
		schemas.register(ModelSchema::builder("other").text("missing").build());
		let mut engine = TemplateEngine::new(Arc::new(schemas));
		engine.register(TemplateSource::new("bad", "{{missing}}"));
		assert!(engine.program("bad", "other").is_ok());
	}

	#[test]
	fn test_failed_render_commits_nothing() {
		let engine = fortune_engine();
		let mut storage = [0u8; 64];
		let mut sink = FixedSink::new(&mut storage);
		let error = engine
			.render_to("row", "fortune", &json!({"id": 5}), &mut sink)
			.unwrap_err();
		assert_eq!(error, TemplateError::MissingValue("message".to_string()));
		assert_eq!(sink.committed(), 0);
	}

	#[test]
	fn test_render_to_fixed_sink() {
		let engine = fortune_engine();
		let mut storage = [0u8; 64];
		let mut sink = FixedSink::new(&mut storage);
		engine
			.render_to("row", "fortune", &json!({"id": 7, "message": "ok"}), &mut sink)
			.unwrap();
		let committed = sink.committed();
		assert_eq!(&storage[..committed], b"<tr><td>7</td><td>ok</td></tr>");
	}
}
