//! # Grappelli
//!
//! Schema-checked template rendering over a committed-prefix buffer writer.
//!
//! Templates use a small mustache-flavored syntax and are compiled once per
//! (template, schema) pairing into an immutable render program; rendering a
//! request is then a single pass over precompiled instructions, streamed
//! through a growable or fixed output sink.
//!
//! ## Features
//!
//! - **templates**: Template parsing, schema resolution, program compilation,
//!   caching, and execution
//! - **buffer**: The buffered output layer on its own: sinks, the buffer
//!   writer, numeric formatting, and HTML escaping
//!
//! ## Re-exports
//!
//! This crate re-exports the following internal crates:
//!
//! - `grappelli_templates`: Template engine functionality
//! - `grappelli_buffer`: Output sinks and the buffer writer
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use grappelli::templates::engine::{TemplateEngine, TemplateSource};
//! use grappelli::templates::schema::{ModelSchema, SchemaRegistry};
//! use serde_json::json;
//!
//! let mut schemas = SchemaRegistry::new();
//! schemas.register(ModelSchema::builder("greeting").text("name").build());
//!
//! let mut engine = TemplateEngine::new(Arc::new(schemas));
//! engine.register(TemplateSource::new("hello", "Hello {{name}}!"));
//!
//! let output = engine.render("hello", "greeting", &json!({"name": "world"})).unwrap();
//! assert_eq!(output.as_ref(), b"Hello world!");
//! ```

#![doc(html_root_url = "https://docs.rs/grappelli/0.1.0")]

// Re-export templates module
#[cfg(feature = "templates")]
pub use grappelli_templates as templates;

// Re-export buffer module
#[cfg(feature = "buffer")]
pub use grappelli_buffer as buffer;

// Convenience re-exports for common types
#[cfg(feature = "templates")]
pub use grappelli_templates::{TemplateEngine, TemplateError, TemplateSource};

#[cfg(feature = "buffer")]
pub use grappelli_buffer::{BufferWriter, MemorySink, Sink, WriteError};
