//! Per-(template, schema) render program cache.
//!
//! Compilation outcomes are memoized, errors included: a pairing that fails
//! to compile keeps returning the same error without reattempting the work.
//! Concurrent first requests for one key block on a shared cell so each key
//! compiles at most once.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::compiler::RenderProgram;
use crate::error::{TemplateError, TemplateResult};

/// Identifies one compiled pairing of template and schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
	/// Template identifier.
	pub template: String,
	/// Schema identifier.
	pub schema: String,
}

impl CacheKey {
	/// Builds a key from the two identifiers.
	pub fn new(template: impl Into<String>, schema: impl Into<String>) -> Self {
		Self {
			template: template.into(),
			schema: schema.into(),
		}
	}
}

type Slot = Arc<OnceCell<Result<Arc<RenderProgram>, TemplateError>>>;

/// Thread-safe memoizing cache of compiled render programs.
#[derive(Debug, Default)]
pub struct RenderCache {
	entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl RenderCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the memoized outcome for `key`, if it has been compiled.
	pub fn get(&self, key: &CacheKey) -> Option<TemplateResult<Arc<RenderProgram>>> {
		let slot = self.entries.lock().get(key).cloned()?;
		let outcome = slot.get()?.clone();
		if let Err(error) = &outcome {
			warn!(template = %key.template, schema = %key.schema, %error, "replaying memoized compile error");
		}
		Some(outcome)
	}

	/// Returns the program for `key`, compiling it with `compile` on first use.
	///
	/// The closure runs at most once per key across all threads; later and
	/// concurrent callers receive clones of the memoized outcome.
	pub fn get_or_compile<F>(&self, key: CacheKey, compile: F) -> TemplateResult<Arc<RenderProgram>>
	where
		F: FnOnce() -> TemplateResult<Arc<RenderProgram>>,
	{
		let slot = {
			let mut entries = self.entries.lock();
			entries.entry(key.clone()).or_default().clone()
		};
		let mut fresh = false;
		let outcome = slot.get_or_init(|| {
			fresh = true;
			debug!(template = %key.template, schema = %key.schema, "compiling render program");
			compile()
		});
		if !fresh {
			match outcome {
				Ok(_) => {
					trace!(template = %key.template, schema = %key.schema, "render program cache hit");
				}
				Err(error) => {
					warn!(template = %key.template, schema = %key.schema, %error, "replaying memoized compile error");
				}
			}
		}
		outcome.clone()
	}

	/// Number of keys with a settled compilation outcome.
	pub fn len(&self) -> usize {
		self.entries.lock().values().filter(|slot| slot.get().is_some()).count()
	}

	/// Returns `true` when no outcome has been memoized yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
