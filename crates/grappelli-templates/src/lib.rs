//! Schema-checked template compilation and rendering.
//!
//! A small mustache-flavored template language compiled against a data
//! schema instead of interpreted against untyped data. The pipeline has
//! three stages: [`parser::parse`] turns source text into a node tree,
//! [`compiler::compile`] resolves every tag against a [`schema::ModelSchema`]
//! into a typed [`compiler::RenderProgram`], and [`executor::execute`]
//! streams that program over a `serde_json::Value` through a
//! [`grappelli_buffer::BufferWriter`].
//!
//! [`engine::TemplateEngine`] wires the stages together and memoizes one
//! compiled program per (template, schema) pairing, so after the first
//! render a request costs only execution.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use grappelli_templates::engine::{TemplateEngine, TemplateSource};
//! use grappelli_templates::schema::{ModelSchema, SchemaRegistry};
//! use serde_json::json;
//!
//! let row = ModelSchema::builder("fortune").integer("id").text("message").build();
//! let mut schemas = SchemaRegistry::new();
//! schemas.register(row);
//!
//! let mut engine = TemplateEngine::new(Arc::new(schemas));
//! engine.register(TemplateSource::new(
//!     "row",
//!     "<tr><td>{{id}}</td><td>{{message}}</td></tr>",
//! ));
//!
//! let html = engine
//!     .render("row", "fortune", &json!({"id": 1, "message": "<hi>"}))
//!     .unwrap();
//! assert_eq!(html.as_ref(), b"<tr><td>1</td><td>&lt;hi&gt;</td></tr>");
//! ```

pub mod cache;
pub mod compiler;
pub mod engine;
mod error;
pub mod executor;
pub mod parser;
pub mod schema;

pub use cache::{CacheKey, RenderCache};
pub use compiler::{compile, Instruction, RenderProgram};
pub use engine::{TemplateEngine, TemplateSource};
pub use error::{TemplateError, TemplateResult};
pub use executor::execute;
pub use parser::{parse, ParsedTemplate, TagPath, TemplateNode};
pub use schema::{
	Accessor, FieldDescriptor, FieldKind, ModelSchema, ModelSchemaBuilder, SchemaProvider,
	SchemaRegistry,
};

pub use grappelli_buffer::{BufferWriter, FixedSink, MemorySink, Sink, WriteError};

#[cfg(test)]
mod tests;
