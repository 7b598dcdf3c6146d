//! Bindings: the executable form of an annotation.

use crate::annotation::AnnotationKind;
use crate::container::Container;
use crate::descriptor::{Adapter, TypeDescriptor};
use crate::error::{DiError, DiResult};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Builds a binding's value against the container that owns the binding.
pub(crate) type BuildFn = Arc<dyn Fn(&Container) -> DiResult<Value> + Send + Sync>;

/// A provided type, the types it requires, and how to build it.
///
/// Bindings are created once at bind time and rebuilt on every resolution
/// (singletons memoize inside their build function).
#[derive(Clone)]
pub struct Binding {
	provides: TypeDescriptor,
	requires: Vec<TypeDescriptor>,
	kind: AnnotationKind,
	build: BuildFn,
}

impl Binding {
	pub(crate) fn new<F>(
		provides: TypeDescriptor,
		requires: Vec<TypeDescriptor>,
		kind: AnnotationKind,
		build: F,
	) -> Self
	where
		F: Fn(&Container) -> DiResult<Value> + Send + Sync + 'static,
	{
		Self {
			provides,
			requires,
			kind,
			build: Arc::new(build),
		}
	}

	/// Type this binding produces.
	pub fn provides(&self) -> &TypeDescriptor {
		&self.provides
	}

	/// Types the build function resolves first, in order.
	pub fn requires(&self) -> &[TypeDescriptor] {
		&self.requires
	}

	/// Outermost annotation the binding was created from.
	pub fn kind(&self) -> AnnotationKind {
		self.kind
	}

	/// Runs the build function without any recursion guard.
	pub(crate) fn build(&self, container: &Container) -> DiResult<Value> {
		(self.build)(container)
	}

	pub(crate) fn build_fn(&self) -> BuildFn {
		self.build.clone()
	}

	/// Re-keys the binding under `provides`, passing every built value
	/// through `adapter`.
	pub(crate) fn adapted(self, provides: TypeDescriptor, adapter: Adapter) -> Self {
		let inner = self.build;
		let expected = provides.name();
		Self {
			provides,
			requires: self.requires,
			kind: self.kind,
			build: Arc::new(move |container: &Container| {
				let value = inner(container)?;
				adapter(&value).ok_or(DiError::TypeMismatch {
					expected,
					actual: value.type_name(),
				})
			}),
		}
	}
}

impl fmt::Debug for Binding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Binding")
			.field("provides", &self.provides)
			.field("requires", &self.requires)
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}

/// Concatenates requirement lists, dropping repeats and keeping first-seen order.
pub(crate) fn merge_requires(
	first: &[TypeDescriptor],
	second: &[TypeDescriptor],
) -> Vec<TypeDescriptor> {
	let mut merged: Vec<TypeDescriptor> = Vec::with_capacity(first.len() + second.len());
	for descriptor in first.iter().chain(second) {
		if !merged.contains(descriptor) {
			merged.push(descriptor.clone());
		}
	}
	merged
}
