//! Type-erased values flowing through bindings.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A built value with its concrete type erased.
///
/// Cloning a `Value` shares the underlying allocation, so a memoized singleton
/// hands out the same instance on every resolution.
#[derive(Clone)]
pub struct Value {
	inner: Arc<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl Value {
	/// Wraps a value.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::Value;
	///
	/// let value = Value::new(42i32);
	/// assert_eq!(value.downcast::<i32>(), Some(42));
	/// assert_eq!(value.downcast::<i64>(), None);
	/// ```
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			inner: Arc::new(value),
			type_name: std::any::type_name::<T>(),
		}
	}

	/// `TypeId` of the wrapped value.
	pub fn type_id(&self) -> TypeId {
		Any::type_id(&*self.inner)
	}

	/// Name of the wrapped value's type.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Returns `true` if the wrapped value is a `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.inner.is::<T>()
	}

	/// Borrows the wrapped value as a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.inner.downcast_ref::<T>()
	}

	/// Clones the wrapped value out as a `T`.
	pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
		self.downcast_ref::<T>().cloned()
	}

	/// Returns `true` if both values share the same allocation.
	pub fn ptr_eq(&self, other: &Value) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Value")
			.field("type_name", &self.type_name)
			.finish_non_exhaustive()
	}
}
