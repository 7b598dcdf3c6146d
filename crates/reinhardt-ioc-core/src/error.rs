//! Error types for binding, resolution and injection.

use crate::cycle_detection::CycleError;
use thiserror::Error;

/// Boxed error returned by fallible providers and call targets.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for container operations.
pub type DiResult<T> = Result<T, DiError>;

/// Errors produced by the container.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiError {
	/// An annotation wraps a value of the wrong shape.
	#[error("{annotation} expects {expected}, but the wrapped value provides {actual}")]
	Shape {
		/// Annotation that rejected the value.
		annotation: &'static str,
		/// Shape the annotation accepts.
		expected: &'static str,
		/// Type actually provided.
		actual: &'static str,
	},

	/// The provided type is already bound and the new binding is not mergeable.
	#[error("{0} is already bound")]
	DuplicateBinding(&'static str),

	/// `bind_to` targets an interface the implementation does not satisfy.
	#[error("{implementation} does not implement {interface}")]
	InterfaceMismatch {
		/// Interface key requested by the caller.
		interface: &'static str,
		/// Type provided by the implementation.
		implementation: &'static str,
	},

	/// `bind_to` targets a concrete type with no declared conversion.
	#[error("{from} is not convertible to {to}")]
	Conversion {
		/// Type provided by the implementation.
		from: &'static str,
		/// Concrete key requested by the caller.
		to: &'static str,
	},

	/// Resolution exhausted the container and all of its ancestors.
	#[error("unbound type {0}")]
	Unbound(&'static str),

	/// A type was requested again while already under construction.
	#[error("circular dependency detected: {type_name} ({path})")]
	CircularDependency {
		/// Type that closed the cycle.
		type_name: String,
		/// Resolution path (format: A -> B -> A).
		path: String,
	},

	/// Resolution nested deeper than the configured limit.
	#[error("maximum resolution depth exceeded: {0}")]
	MaxDepthExceeded(usize),

	/// A provider function failed.
	#[error(transparent)]
	Provider(BoxError),

	/// Injecting a positional argument of a call target failed.
	#[error("couldn't inject argument {position} ({type_name}) of {target}")]
	Argument {
		/// 1-based position of the argument.
		position: usize,
		/// Required argument type.
		type_name: &'static str,
		/// Call target.
		target: &'static str,
		/// Underlying failure.
		#[source]
		source: Box<DiError>,
	},

	/// Validation found a requirement that cannot be resolved.
	#[error("no binding for {requirement} required by {required_by}")]
	Unsatisfied {
		/// Type that could not be resolved.
		requirement: &'static str,
		/// Binding or call target that requires it.
		required_by: &'static str,
		/// Underlying resolution failure.
		#[source]
		source: Box<DiError>,
	},

	/// The error returned by a call target itself.
	#[error(transparent)]
	Returned(BoxError),

	/// A module of the same type is installed with a conflicting configuration.
	#[error("module {0} is already installed with a different configuration")]
	DuplicateModule(&'static str),

	/// Replacing a module failed because its bindings were extended after installation.
	#[error("cannot replace module {module}: binding {binding} changed since it was installed")]
	ModuleRewind {
		/// Module being replaced.
		module: &'static str,
		/// Binding that no longer matches the installation journal.
		binding: &'static str,
	},

	/// The memoized first build of a singleton failed.
	#[error("singleton {type_name} failed on first build: {message}")]
	SingletonFailed {
		/// Type provided by the singleton.
		type_name: &'static str,
		/// Rendered first failure.
		message: String,
	},

	/// The container behind a `Binder` was dropped.
	#[error("the container behind this binder was dropped")]
	ContainerDropped,

	/// A built value did not have the type its binding declared.
	#[error("expected a value of type {expected}, got {actual}")]
	TypeMismatch {
		/// Declared type.
		expected: &'static str,
		/// Actual type of the value.
		actual: &'static str,
	},
}

impl DiError {
	/// Wraps any error as a provider failure.
	pub fn provider<E>(error: E) -> Self
	where
		E: Into<BoxError>,
	{
		DiError::Provider(error.into())
	}

	/// Returns `true` when this error, or an error it wraps, reports a cycle.
	pub fn is_cycle(&self) -> bool {
		match self {
			DiError::CircularDependency { .. } | DiError::MaxDepthExceeded(_) => true,
			DiError::Argument { source, .. } | DiError::Unsatisfied { source, .. } => {
				source.is_cycle()
			}
			DiError::Provider(inner) => inner
				.downcast_ref::<DiError>()
				.is_some_and(DiError::is_cycle),
			_ => false,
		}
	}

	/// Returns `true` when this error, or an error it wraps, reports an unbound type.
	pub fn is_unbound(&self) -> bool {
		match self {
			DiError::Unbound(_) => true,
			DiError::Argument { source, .. } | DiError::Unsatisfied { source, .. } => {
				source.is_unbound()
			}
			DiError::Provider(inner) => inner
				.downcast_ref::<DiError>()
				.is_some_and(DiError::is_unbound),
			_ => false,
		}
	}
}

impl From<CycleError> for DiError {
	fn from(error: CycleError) -> Self {
		match error {
			CycleError::CircularDependency { type_name, path } => {
				DiError::CircularDependency { type_name, path }
			}
			CycleError::MaxDepthExceeded(depth) => DiError::MaxDepthExceeded(depth),
		}
	}
}
