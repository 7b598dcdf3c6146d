//! Annotations
//!
//! An [`Annotation`] describes how a bound value is built and merged:
//!
//! - **Literal**: a value bound as-is
//! - **Provider**: a function whose parameters are injected on every build
//! - **Singleton**: memoizes the first build of a provider
//! - **Sequence**: contributes to a `Vec<T>`, merging with earlier contributions
//! - **Mapping**: contributes to a `HashMap<K, V>`, later keys overwriting earlier ones
//!
//! Anything passed to [`Container::bind`](crate::Container::bind) goes through
//! [`Annotate`] first: an `Annotation` passes through, a function becomes a
//! provider and any other injectable value becomes a literal.

use crate::binding::{Binding, merge_requires};
use crate::callable::Callable;
use crate::container::Container;
use crate::descriptor::{Lift, TypeDescriptor};
use crate::error::{BoxError, DiError, DiResult};
use crate::injectable::Injectable;
use crate::value::Value;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

type Invoke = Arc<dyn Fn(Vec<Value>) -> DiResult<Value> + Send + Sync>;

/// Variant of an annotation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
	Literal,
	Provider,
	Singleton,
	Sequence,
	Mapping,
}

impl AnnotationKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			AnnotationKind::Literal => "literal",
			AnnotationKind::Provider => "provider",
			AnnotationKind::Singleton => "singleton",
			AnnotationKind::Sequence => "sequence",
			AnnotationKind::Mapping => "mapping",
		}
	}
}

impl fmt::Display for AnnotationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A declarative wrapper around a bound value.
pub struct Annotation {
	node: Node,
}

enum Node {
	Literal {
		descriptor: TypeDescriptor,
		value: Value,
	},
	Provider {
		provides: TypeDescriptor,
		requires: Vec<TypeDescriptor>,
		name: &'static str,
		invoke: Invoke,
	},
	Singleton(Box<Annotation>),
	Sequence(Box<Annotation>),
	Mapping(Box<Annotation>),
}

impl Annotation {
	/// Binds `value` as-is.
	pub fn literal<T: Injectable>(value: T) -> Self {
		Self {
			node: Node::Literal {
				descriptor: TypeDescriptor::of::<T>(),
				value: Value::new(value),
			},
		}
	}

	/// Builds the bound value by calling `provider` with injected arguments.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::{Annotation, AnnotationKind};
	///
	/// let greeting = Annotation::provider(|name: String| format!("hello {name}"));
	/// assert_eq!(greeting.kind(), AnnotationKind::Provider);
	/// ```
	///
	/// A provider must return a value; a function returning `()` is rejected:
	///
	/// ```compile_fail
	/// use reinhardt_ioc_core::Annotation;
	///
	/// let _ = Annotation::provider(|name: String| println!("{name}"));
	/// ```
	pub fn provider<Args, F>(provider: F) -> Self
	where
		F: Callable<Args>,
		F::Output: Injectable,
	{
		let provides = TypeDescriptor::of::<F::Output>();
		let requires = provider.parameters();
		let name = provider.name();
		let invoke: Invoke = Arc::new(move |arguments| provider.invoke(arguments).map(Value::new));
		Self {
			node: Node::Provider {
				provides,
				requires,
				name,
				invoke,
			},
		}
	}

	/// Like [`provider`](Annotation::provider) for functions returning
	/// `Result<T, E>`. A returned error fails the build.
	pub fn fallible<Args, F, T, E>(provider: F) -> Self
	where
		F: Callable<Args, Output = Result<T, E>>,
		T: Injectable,
		E: Into<BoxError>,
	{
		let provides = TypeDescriptor::of::<T>();
		let requires = provider.parameters();
		let name = provider.name();
		let invoke: Invoke = Arc::new(move |arguments| {
			provider
				.invoke(arguments)?
				.map(Value::new)
				.map_err(DiError::provider)
		});
		Self {
			node: Node::Provider {
				provides,
				requires,
				name,
				invoke,
			},
		}
	}

	/// Memoizes the first build of the wrapped provider.
	///
	/// # Panics
	///
	/// Panics if the wrapped annotation contains no provider: a singleton
	/// literal is a programming error.
	pub fn singleton<M>(value: impl Annotate<M>) -> Self {
		let inner = value.annotate();
		assert!(
			inner.contains(AnnotationKind::Provider),
			"Singleton must wrap a provider, got a {} annotation",
			inner.kind()
		);
		Self {
			node: Node::Singleton(Box::new(inner)),
		}
	}

	/// Contributes a `Vec<T>` (or a single `T`) to the aggregate `Vec<T>`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::{Annotation, Container};
	///
	/// let container = Container::new();
	/// container.bind(Annotation::sequence(vec![1, 2])).unwrap();
	/// container.bind(Annotation::sequence(3)).unwrap();
	///
	/// assert_eq!(container.get::<Vec<i32>>().unwrap(), vec![1, 2, 3]);
	/// ```
	pub fn sequence<M>(value: impl Annotate<M>) -> Self {
		Self {
			node: Node::Sequence(Box::new(value.annotate())),
		}
	}

	/// Contributes a `HashMap<K, V>` (or a single `(K, V)` pair) to the
	/// aggregate `HashMap<K, V>`.
	pub fn mapping<M>(value: impl Annotate<M>) -> Self {
		Self {
			node: Node::Mapping(Box::new(value.annotate())),
		}
	}

	/// Kind of the outermost node.
	pub fn kind(&self) -> AnnotationKind {
		match self.node {
			Node::Literal { .. } => AnnotationKind::Literal,
			Node::Provider { .. } => AnnotationKind::Provider,
			Node::Singleton(_) => AnnotationKind::Singleton,
			Node::Sequence(_) => AnnotationKind::Sequence,
			Node::Mapping(_) => AnnotationKind::Mapping,
		}
	}

	/// Returns `true` if this node or any node it wraps is of `kind`.
	pub fn contains(&self, kind: AnnotationKind) -> bool {
		if self.kind() == kind {
			return true;
		}
		match &self.node {
			Node::Singleton(inner) | Node::Sequence(inner) | Node::Mapping(inner) => {
				inner.contains(kind)
			}
			Node::Literal { .. } | Node::Provider { .. } => false,
		}
	}

	/// Returns `true` if binding this over an existing binding merges with it.
	pub(crate) fn is_mergeable(&self) -> bool {
		self.contains(AnnotationKind::Sequence) || self.contains(AnnotationKind::Mapping)
	}

	/// Converts the annotation into a binding.
	///
	/// `previous` looks up the binding currently registered for a type, which
	/// sequences and mappings chain onto.
	pub(crate) fn into_binding(
		self,
		previous: &dyn Fn(&TypeDescriptor) -> Option<Arc<Binding>>,
	) -> DiResult<Binding> {
		match self.node {
			Node::Literal { descriptor, value } => Ok(Binding::new(
				descriptor,
				Vec::new(),
				AnnotationKind::Literal,
				move |_| Ok(value.clone()),
			)),
			Node::Provider {
				provides,
				requires,
				name,
				invoke,
			} => {
				let parameters = requires.clone();
				Ok(Binding::new(
					provides,
					requires,
					AnnotationKind::Provider,
					move |container| {
						let arguments = container.inject_arguments(&parameters, name)?;
						invoke(arguments)
					},
				))
			}
			Node::Singleton(inner) => Ok(singleton_binding(inner.into_binding(previous)?)),
			Node::Sequence(inner) => sequence_binding(inner.into_binding(previous)?, previous),
			Node::Mapping(inner) => mapping_binding(inner.into_binding(previous)?, previous),
		}
	}
}

impl fmt::Debug for Annotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.node {
			Node::Literal { descriptor, .. } => {
				f.debug_tuple("Literal").field(&descriptor.name()).finish()
			}
			Node::Provider { name, .. } => f.debug_tuple("Provider").field(name).finish(),
			Node::Singleton(inner) => f.debug_tuple("Singleton").field(inner).finish(),
			Node::Sequence(inner) => f.debug_tuple("Sequence").field(inner).finish(),
			Node::Mapping(inner) => f.debug_tuple("Mapping").field(inner).finish(),
		}
	}
}

/// Outcome of the first singleton build. Failures keep only their message.
enum Memo {
	Built(Value),
	Failed(String),
}

fn singleton_binding(inner: Binding) -> Binding {
	let provides = inner.provides().clone();
	let requires = inner.requires().to_vec();
	let type_name = provides.name();
	let build = inner.build_fn();
	let memo: Arc<Mutex<Option<Memo>>> = Arc::new(Mutex::new(None));
	Binding::new(
		provides,
		requires,
		AnnotationKind::Singleton,
		move |container| {
			// Held across the build so concurrent callers wait for the first one.
			let mut slot = memo.lock();
			match &*slot {
				Some(Memo::Built(value)) => return Ok(value.clone()),
				Some(Memo::Failed(message)) => {
					return Err(DiError::SingletonFailed {
						type_name,
						message: message.clone(),
					});
				}
				None => {}
			}
			let outcome = build(container);
			*slot = Some(match &outcome {
				Ok(value) => Memo::Built(value.clone()),
				Err(error) => Memo::Failed(error.to_string()),
			});
			outcome
		},
	)
}

/// Normalizes the contribution of a Sequence or Mapping node to its
/// collection type, lifting a single item when the descriptor allows it.
fn lift_contribution(
	inner: Binding,
	annotation: &'static str,
	expected: &'static str,
	is_collection: bool,
	lift: Option<Lift>,
) -> DiResult<(TypeDescriptor, Binding)> {
	if is_collection {
		return Ok((inner.provides().clone(), inner));
	}
	let Some(lift) = lift else {
		return Err(DiError::Shape {
			annotation,
			expected,
			actual: inner.provides().name(),
		});
	};
	let collection = (lift.collection)();
	let item = inner.build_fn();
	let expected_name = collection.name();
	let lifted = Binding::new(
		collection.clone(),
		inner.requires().to_vec(),
		inner.kind(),
		move |container| {
			let value = item(container)?;
			let actual = value.type_name();
			(lift.wrap)(value).ok_or(DiError::TypeMismatch {
				expected: expected_name,
				actual,
			})
		},
	);
	Ok((collection, lifted))
}

fn sequence_binding(
	inner: Binding,
	previous: &dyn Fn(&TypeDescriptor) -> Option<Arc<Binding>>,
) -> DiResult<Binding> {
	let is_collection = inner.provides().is_sequence();
	let lift = inner.provides().sequence_lift();
	let (provides, contribution) =
		lift_contribution(inner, "Sequence", "a Vec or a single item", is_collection, lift)?;
	let prior = previous(&provides);
	let requires = match &prior {
		Some(prior) => merge_requires(prior.requires(), contribution.requires()),
		None => contribution.requires().to_vec(),
	};
	let descriptor = provides.clone();
	Ok(Binding::new(
		provides,
		requires,
		AnnotationKind::Sequence,
		move |container| {
			let mut items = Vec::new();
			if let Some(prior) = &prior {
				items.extend(split(&descriptor, &prior.build(container)?)?);
			}
			items.extend(split(&descriptor, &contribution.build(container)?)?);
			descriptor
				.assemble_sequence(items)
				.ok_or(DiError::TypeMismatch {
					expected: descriptor.name(),
					actual: "<sequence items>",
				})
		},
	))
}

fn mapping_binding(
	inner: Binding,
	previous: &dyn Fn(&TypeDescriptor) -> Option<Arc<Binding>>,
) -> DiResult<Binding> {
	let is_collection = inner.provides().is_mapping();
	let lift = inner.provides().mapping_lift();
	let (provides, contribution) = lift_contribution(
		inner,
		"Mapping",
		"a HashMap or a single (key, value) pair",
		is_collection,
		lift,
	)?;
	let prior = previous(&provides);
	let requires = match &prior {
		Some(prior) => merge_requires(prior.requires(), contribution.requires()),
		None => contribution.requires().to_vec(),
	};
	let descriptor = provides.clone();
	Ok(Binding::new(
		provides,
		requires,
		AnnotationKind::Mapping,
		move |container| {
			let mut entries = Vec::new();
			if let Some(prior) = &prior {
				entries.extend(entries_of(&descriptor, &prior.build(container)?)?);
			}
			entries.extend(entries_of(&descriptor, &contribution.build(container)?)?);
			descriptor
				.assemble_mapping(entries)
				.ok_or(DiError::TypeMismatch {
					expected: descriptor.name(),
					actual: "<mapping entries>",
				})
		},
	))
}

fn split(descriptor: &TypeDescriptor, value: &Value) -> DiResult<Vec<Value>> {
	descriptor.split(value).ok_or(DiError::TypeMismatch {
		expected: descriptor.name(),
		actual: value.type_name(),
	})
}

fn entries_of(descriptor: &TypeDescriptor, value: &Value) -> DiResult<Vec<(Value, Value)>> {
	descriptor.entries(value).ok_or(DiError::TypeMismatch {
		expected: descriptor.name(),
		actual: value.type_name(),
	})
}

/// Marker for [`Annotate`] on an [`Annotation`].
pub struct AnnotationMarker;

/// Marker for [`Annotate`] on a plain injectable value.
pub struct LiteralMarker;

/// Marker for [`Annotate`] on a function.
pub struct ProviderMarker;

/// Conversion of anything bindable into an [`Annotation`].
///
/// The marker type parameter keeps the blanket implementations apart and is
/// always inferred.
pub trait Annotate<Marker> {
	fn annotate(self) -> Annotation;
}

impl Annotate<AnnotationMarker> for Annotation {
	fn annotate(self) -> Annotation {
		self
	}
}

impl<T: Injectable> Annotate<LiteralMarker> for T {
	fn annotate(self) -> Annotation {
		Annotation::literal(self)
	}
}

impl<Args, F> Annotate<(ProviderMarker, Args)> for F
where
	F: Callable<Args>,
	F::Output: Injectable,
{
	fn annotate(self) -> Annotation {
		Annotation::provider(self)
	}
}
