//! Model schemas: the external description of a data shape.
//!
//! A [`ModelSchema`] is an ordered set of named, kinded, accessible members
//! for one data shape. Schemas drive both halves of the pipeline with the
//! same accessor: at compile time the resolver consults field *kinds* to pick
//! instructions, and at render time the executor invokes the field
//! *accessors* against the live data instance. Live instances are
//! [`serde_json::Value`]s; the default accessor is plain object-key lookup,
//! but a provider may substitute any function with the same contract.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Extracts a field's runtime value from a live data instance.
///
/// Borrow-based: accessors never clone the underlying value.
pub type Accessor = Arc<dyn for<'a> Fn(&'a Value) -> Option<&'a Value> + Send + Sync>;

/// Semantic category of a field, driving instruction selection.
#[derive(Clone)]
pub enum FieldKind {
	/// Unsigned integer; rendered through the numeric fast path.
	Integer,
	/// Text; rendered HTML-escaped.
	Text,
	/// Boolean; guards a conditional section, stringifies as a variable.
	Boolean,
	/// Ordered sequence; loops a section, each element scoped to the inner schema.
	Sequence(Arc<ModelSchema>),
	/// Anything else; stringified, then escaped.
	Opaque,
}

impl FieldKind {
	/// Lowercase kind name for diagnostics.
	pub fn name(&self) -> &'static str {
		match self {
			FieldKind::Integer => "integer",
			FieldKind::Text => "text",
			FieldKind::Boolean => "boolean",
			FieldKind::Sequence(_) => "sequence",
			FieldKind::Opaque => "opaque",
		}
	}
}

impl fmt::Debug for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldKind::Integer => f.write_str("Integer"),
			FieldKind::Text => f.write_str("Text"),
			FieldKind::Boolean => f.write_str("Boolean"),
			FieldKind::Sequence(element) => write!(f, "Sequence({:?})", element.id()),
			FieldKind::Opaque => f.write_str("Opaque"),
		}
	}
}

/// One resolvable data member: name, kind, and accessor.
#[derive(Clone)]
pub struct FieldDescriptor {
	name: String,
	kind: FieldKind,
	accessor: Accessor,
}

impl FieldDescriptor {
	/// Creates a descriptor whose accessor looks the field up by key on a
	/// JSON object.
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		let name = name.into();
		let key = name.clone();
		Self {
			name,
			kind,
			accessor: Arc::new(move |value| value.get(&key)),
		}
	}

	/// Creates a descriptor with a caller-supplied accessor.
	pub fn with_accessor(name: impl Into<String>, kind: FieldKind, accessor: Accessor) -> Self {
		Self {
			name: name.into(),
			kind,
			accessor,
		}
	}

	/// Field name as it appears in templates.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The field's kind.
	pub fn kind(&self) -> &FieldKind {
		&self.kind
	}

	/// The field's accessor.
	pub fn accessor(&self) -> &Accessor {
		&self.accessor
	}
}

impl fmt::Debug for FieldDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldDescriptor")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}

/// Ordered mapping of field name to descriptor for one data shape.
///
/// Immutable once built. `value_kind` describes what the scope's own value is
/// when a template references it with `{{.}}`: a sequence of plain strings,
/// for instance, is `Sequence(ModelSchema::scalar("text", FieldKind::Text))`.
///
/// # Examples
///
/// ```
/// use grappelli_templates::schema::{FieldKind, ModelSchema};
///
/// let fortune = ModelSchema::builder("fortune")
///     .integer("id")
///     .text("message")
///     .build();
/// assert_eq!(fortune.field("id").unwrap().kind().name(), "integer");
/// assert!(fortune.field("missing").is_none());
/// ```
pub struct ModelSchema {
	id: String,
	fields: Vec<FieldDescriptor>,
	value_kind: Option<FieldKind>,
}

impl ModelSchema {
	/// Starts building a schema for the shape identified by `id`.
	pub fn builder(id: impl Into<String>) -> ModelSchemaBuilder {
		ModelSchemaBuilder {
			id: id.into(),
			fields: Vec::new(),
			value_kind: None,
		}
	}

	/// A fieldless schema whose own value has the given kind.
	///
	/// This is the element schema for sequences of scalars.
	pub fn scalar(id: impl Into<String>, kind: FieldKind) -> Arc<Self> {
		Arc::new(Self {
			id: id.into(),
			fields: Vec::new(),
			value_kind: Some(kind),
		})
	}

	/// Shape identity; part of the render cache key.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Fields in declaration order.
	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	/// Looks a field up by name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.name == name)
	}

	/// Kind of the scope's own value, if declared.
	pub fn value_kind(&self) -> Option<&FieldKind> {
		self.value_kind.as_ref()
	}
}

impl fmt::Debug for ModelSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelSchema")
			.field("id", &self.id)
			.field("fields", &self.fields)
			.field("value_kind", &self.value_kind)
			.finish()
	}
}

/// Builder for [`ModelSchema`].
pub struct ModelSchemaBuilder {
	id: String,
	fields: Vec<FieldDescriptor>,
	value_kind: Option<FieldKind>,
}

impl ModelSchemaBuilder {
	/// Adds an integer field.
	pub fn integer(self, name: impl Into<String>) -> Self {
		self.field(FieldDescriptor::new(name, FieldKind::Integer))
	}

	/// Adds a text field.
	pub fn text(self, name: impl Into<String>) -> Self {
		self.field(FieldDescriptor::new(name, FieldKind::Text))
	}

	/// Adds a boolean field.
	pub fn boolean(self, name: impl Into<String>) -> Self {
		self.field(FieldDescriptor::new(name, FieldKind::Boolean))
	}

	/// Adds a sequence field whose elements follow `element`.
	pub fn sequence(self, name: impl Into<String>, element: Arc<ModelSchema>) -> Self {
		self.field(FieldDescriptor::new(name, FieldKind::Sequence(element)))
	}

	/// Adds an opaque field.
	pub fn opaque(self, name: impl Into<String>) -> Self {
		self.field(FieldDescriptor::new(name, FieldKind::Opaque))
	}

	/// Adds a prebuilt descriptor.
	pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
		self.fields.push(descriptor);
		self
	}

	/// Declares the kind of the scope's own value (for `{{.}}`).
	pub fn value_kind(mut self, kind: FieldKind) -> Self {
		self.value_kind = Some(kind);
		self
	}

	/// Finishes the schema.
	pub fn build(self) -> Arc<ModelSchema> {
		Arc::new(ModelSchema {
			id: self.id,
			fields: self.fields,
			value_kind: self.value_kind,
		})
	}
}

/// Source of schemas, keyed by data-shape identity.
pub trait SchemaProvider: Send + Sync {
	/// Yields the schema for `id`, if the provider knows the shape.
	fn schema(&self, id: &str) -> Option<Arc<ModelSchema>>;
}

/// Simple map-backed provider.
///
/// # Examples
///
/// ```
/// use grappelli_templates::schema::{ModelSchema, SchemaProvider, SchemaRegistry};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(ModelSchema::builder("greeting").text("name").build());
/// assert!(registry.schema("greeting").is_some());
/// assert!(registry.schema("unknown").is_none());
/// ```
#[derive(Default)]
pub struct SchemaRegistry {
	schemas: HashMap<String, Arc<ModelSchema>>,
}

impl SchemaRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a schema under its own id.
	pub fn register(&mut self, schema: Arc<ModelSchema>) {
		self.schemas.insert(schema.id().to_string(), schema);
	}
}

impl SchemaProvider for SchemaRegistry {
	fn schema(&self, id: &str) -> Option<Arc<ModelSchema>> {
		self.schemas.get(id).cloned()
	}
}
