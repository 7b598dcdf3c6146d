//! Type descriptors
//!
//! A [`TypeDescriptor`] is the run-time identity of an injectable type. Besides
//! `TypeId` equality it answers the structural questions resolution needs:
//!
//! - is the type an interface (`Arc<dyn Trait>`),
//! - does a concrete type satisfy an interface, and how to upcast it,
//! - is the type a sequence (`Vec<T>`) or mapping (`HashMap<K, V>`), and what
//!   are its element, key and value types,
//! - which concrete types can be converted into it.
//!
//! Capabilities are declared, never discovered: a concrete type lists the
//! interfaces it implements when it builds its descriptor (usually through
//! the [`injectable!`](crate::injectable) macro).

use crate::injectable::{Injectable, Interface};
use crate::value::Value;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Erased value-to-value adapter (upcast or conversion).
pub(crate) type Adapter = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Descriptors are immutable once built; cache them per type.
static DESCRIPTORS: Lazy<RwLock<HashMap<TypeId, TypeDescriptor>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Run-time identity and structure of an injectable type.
///
/// Two descriptors are equal iff they describe the same type.
#[derive(Clone)]
pub struct TypeDescriptor {
	inner: Arc<DescriptorInner>,
}

struct DescriptorInner {
	id: TypeId,
	name: &'static str,
	shape: Shape,
	into_sequence: Option<Lift>,
	into_mapping: Option<Lift>,
}

enum Shape {
	Concrete {
		interfaces: Vec<(TypeId, Adapter)>,
		conversions: Vec<(TypeId, Adapter)>,
	},
	Interface,
	Sequence {
		element: TypeDescriptor,
		split: fn(&Value) -> Option<Vec<Value>>,
		assemble: fn(Vec<Value>) -> Option<Value>,
	},
	Mapping {
		key: TypeDescriptor,
		value: TypeDescriptor,
		entries: fn(&Value) -> Option<Vec<(Value, Value)>>,
		assemble: fn(Vec<(Value, Value)>) -> Option<Value>,
	},
}

/// Wraps a single item into the collection it may contribute to.
#[derive(Clone, Copy)]
pub(crate) struct Lift {
	pub(crate) collection: fn() -> TypeDescriptor,
	pub(crate) wrap: fn(Value) -> Option<Value>,
}

/// Coarse classification of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
	/// A plain value type.
	Concrete,
	/// A trait object behind `Arc`.
	Interface,
	/// `Vec<T>`.
	Sequence,
	/// `HashMap<K, V>`.
	Mapping,
}

impl TypeDescriptor {
	/// Returns the (cached) descriptor of `T`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::{TypeDescriptor, TypeKind};
	///
	/// let descriptor = TypeDescriptor::of::<Vec<i32>>();
	/// assert_eq!(descriptor.kind(), TypeKind::Sequence);
	/// assert_eq!(descriptor.element(), Some(&TypeDescriptor::of::<i32>()));
	/// ```
	pub fn of<T: Injectable>() -> Self {
		let id = TypeId::of::<T>();
		if let Some(found) = DESCRIPTORS.read().get(&id) {
			return found.clone();
		}
		// Built outside the lock: element descriptors are looked up recursively.
		let built = T::descriptor();
		DESCRIPTORS.write().entry(id).or_insert(built).clone()
	}

	/// Starts the descriptor of a concrete type.
	pub fn concrete<T: Injectable>() -> ConcreteDescriptor<T> {
		ConcreteDescriptor {
			interfaces: Vec::new(),
			conversions: Vec::new(),
			into_mapping: None,
			_marker: PhantomData,
		}
	}

	/// Descriptor of the interface value `Arc<I>`.
	pub fn interface<I: ?Sized + Interface>() -> Self {
		Self::build(
			TypeId::of::<Arc<I>>(),
			std::any::type_name::<Arc<I>>(),
			Shape::Interface,
			Some(sequence_lift::<Arc<I>>()),
			None,
		)
	}

	/// Descriptor of the sequence `Vec<T>`.
	pub fn sequence<T: Injectable>() -> Self {
		Self::build(
			TypeId::of::<Vec<T>>(),
			std::any::type_name::<Vec<T>>(),
			Shape::Sequence {
				element: TypeDescriptor::of::<T>(),
				split: split_vec::<T>,
				assemble: assemble_vec::<T>,
			},
			None,
			None,
		)
	}

	/// Descriptor of the mapping `HashMap<K, V>`.
	pub fn mapping<K, V>() -> Self
	where
		K: Injectable + Eq + std::hash::Hash,
		V: Injectable,
	{
		Self::build(
			TypeId::of::<HashMap<K, V>>(),
			std::any::type_name::<HashMap<K, V>>(),
			Shape::Mapping {
				key: TypeDescriptor::of::<K>(),
				value: TypeDescriptor::of::<V>(),
				entries: map_entries::<K, V>,
				assemble: assemble_map::<K, V>,
			},
			None,
			None,
		)
	}

	fn build(
		id: TypeId,
		name: &'static str,
		shape: Shape,
		into_sequence: Option<Lift>,
		into_mapping: Option<Lift>,
	) -> Self {
		Self {
			inner: Arc::new(DescriptorInner {
				id,
				name,
				shape,
				into_sequence,
				into_mapping,
			}),
		}
	}

	/// `TypeId` of the described type.
	pub fn id(&self) -> TypeId {
		self.inner.id
	}

	/// Name of the described type.
	pub fn name(&self) -> &'static str {
		self.inner.name
	}

	pub fn kind(&self) -> TypeKind {
		match self.inner.shape {
			Shape::Concrete { .. } => TypeKind::Concrete,
			Shape::Interface => TypeKind::Interface,
			Shape::Sequence { .. } => TypeKind::Sequence,
			Shape::Mapping { .. } => TypeKind::Mapping,
		}
	}

	pub fn is_interface(&self) -> bool {
		self.kind() == TypeKind::Interface
	}

	pub fn is_sequence(&self) -> bool {
		self.kind() == TypeKind::Sequence
	}

	pub fn is_mapping(&self) -> bool {
		self.kind() == TypeKind::Mapping
	}

	/// Element type of a sequence.
	pub fn element(&self) -> Option<&TypeDescriptor> {
		match &self.inner.shape {
			Shape::Sequence { element, .. } => Some(element),
			_ => None,
		}
	}

	/// Key type of a mapping.
	pub fn key(&self) -> Option<&TypeDescriptor> {
		match &self.inner.shape {
			Shape::Mapping { key, .. } => Some(key),
			_ => None,
		}
	}

	/// Value type of a mapping.
	pub fn value(&self) -> Option<&TypeDescriptor> {
		match &self.inner.shape {
			Shape::Mapping { value, .. } => Some(value),
			_ => None,
		}
	}

	/// Returns `true` if a value of this type can stand in for `interface`.
	///
	/// An interface trivially satisfies itself. A concrete type satisfies the
	/// interfaces it declared.
	pub fn satisfies(&self, interface: &TypeDescriptor) -> bool {
		interface.is_interface() && self.upcast_to(interface).is_some()
	}

	/// Adapter turning a value of this type into the interface value.
	pub(crate) fn upcast_to(&self, interface: &TypeDescriptor) -> Option<Adapter> {
		if self == interface {
			return Some(Arc::new(|value: &Value| Some(value.clone())));
		}
		match &self.inner.shape {
			Shape::Concrete { interfaces, .. } => interfaces
				.iter()
				.find(|(id, _)| *id == interface.id())
				.map(|(_, adapter)| adapter.clone()),
			_ => None,
		}
	}

	/// Adapter converting a value of `source` into this type.
	pub(crate) fn conversion_from(&self, source: &TypeDescriptor) -> Option<Adapter> {
		match &self.inner.shape {
			Shape::Concrete { conversions, .. } => conversions
				.iter()
				.find(|(id, _)| *id == source.id())
				.map(|(_, adapter)| adapter.clone()),
			_ => None,
		}
	}

	/// Splits a sequence value into its items.
	pub(crate) fn split(&self, value: &Value) -> Option<Vec<Value>> {
		match &self.inner.shape {
			Shape::Sequence { split, .. } => split(value),
			_ => None,
		}
	}

	/// Assembles items into a sequence value of this type.
	pub(crate) fn assemble_sequence(&self, items: Vec<Value>) -> Option<Value> {
		match &self.inner.shape {
			Shape::Sequence { assemble, .. } => assemble(items),
			_ => None,
		}
	}

	/// Lists the entries of a mapping value.
	pub(crate) fn entries(&self, value: &Value) -> Option<Vec<(Value, Value)>> {
		match &self.inner.shape {
			Shape::Mapping { entries, .. } => entries(value),
			_ => None,
		}
	}

	/// Assembles entries into a mapping value of this type. Later entries win.
	pub(crate) fn assemble_mapping(&self, entries: Vec<(Value, Value)>) -> Option<Value> {
		match &self.inner.shape {
			Shape::Mapping { assemble, .. } => assemble(entries),
			_ => None,
		}
	}

	/// How a single value of this type joins a `Vec` of it.
	pub(crate) fn sequence_lift(&self) -> Option<Lift> {
		self.inner.into_sequence
	}

	/// How a single `(K, V)` pair joins a `HashMap<K, V>`.
	pub(crate) fn mapping_lift(&self) -> Option<Lift> {
		self.inner.into_mapping
	}
}

impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.inner.id == other.inner.id
	}
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner.id.hash(state);
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("name", &self.inner.name)
			.field("kind", &self.kind())
			.finish()
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.inner.name)
	}
}

/// Builder for the descriptor of a concrete type.
///
/// # Examples
///
/// ```
/// use reinhardt_ioc_core::{Injectable, Interface, TypeDescriptor};
/// use std::sync::Arc;
///
/// trait Named: Send + Sync {
///     fn name(&self) -> String;
/// }
/// impl Interface for dyn Named {}
///
/// #[derive(Clone)]
/// struct Tag(String);
///
/// impl Named for Tag {
///     fn name(&self) -> String {
///         self.0.clone()
///     }
/// }
///
/// impl From<String> for Tag {
///     fn from(value: String) -> Self {
///         Tag(value)
///     }
/// }
///
/// impl Injectable for Tag {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::concrete::<Self>()
///             .implementing(|tag: Tag| Arc::new(tag) as Arc<dyn Named>)
///             .convertible_from::<String>()
///             .build()
///     }
/// }
///
/// let tag = TypeDescriptor::of::<Tag>();
/// assert!(tag.satisfies(&TypeDescriptor::of::<Arc<dyn Named>>()));
/// ```
pub struct ConcreteDescriptor<T> {
	interfaces: Vec<(TypeId, Adapter)>,
	conversions: Vec<(TypeId, Adapter)>,
	into_mapping: Option<Lift>,
	_marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> ConcreteDescriptor<T> {
	/// Declares that `T` implements the interface `I`.
	pub fn implementing<I, F>(mut self, upcast: F) -> Self
	where
		I: ?Sized + Interface,
		F: Fn(T) -> Arc<I> + Send + Sync + 'static,
	{
		let adapter: Adapter =
			Arc::new(move |value: &Value| value.downcast::<T>().map(|v| Value::new(upcast(v))));
		self.interfaces.push((TypeId::of::<Arc<I>>(), adapter));
		self
	}

	/// Declares that a `S` converts into `T` through `From`.
	pub fn convertible_from<S>(mut self) -> Self
	where
		S: Injectable,
		T: From<S>,
	{
		let adapter: Adapter =
			Arc::new(|value: &Value| value.downcast::<S>().map(|s| Value::new(T::from(s))));
		self.conversions.push((TypeId::of::<S>(), adapter));
		self
	}

	pub fn build(self) -> TypeDescriptor {
		TypeDescriptor::build(
			TypeId::of::<T>(),
			std::any::type_name::<T>(),
			Shape::Concrete {
				interfaces: self.interfaces,
				conversions: self.conversions,
			},
			Some(sequence_lift::<T>()),
			self.into_mapping,
		)
	}
}

impl<K, V> ConcreteDescriptor<(K, V)>
where
	K: Injectable + Eq + std::hash::Hash,
	V: Injectable,
{
	/// Lets a single pair contribute to a `HashMap<K, V>`.
	pub(crate) fn pair(mut self) -> Self {
		self.into_mapping = Some(Lift {
			collection: TypeDescriptor::of::<HashMap<K, V>>,
			wrap: pair_into_map::<K, V>,
		});
		self
	}
}

impl<T: Injectable> From<ConcreteDescriptor<T>> for TypeDescriptor {
	fn from(builder: ConcreteDescriptor<T>) -> Self {
		builder.build()
	}
}

fn sequence_lift<T: Injectable>() -> Lift {
	Lift {
		collection: TypeDescriptor::of::<Vec<T>>,
		wrap: item_into_vec::<T>,
	}
}

fn item_into_vec<T: Injectable>(value: Value) -> Option<Value> {
	value.downcast::<T>().map(|item| Value::new(vec![item]))
}

fn pair_into_map<K, V>(value: Value) -> Option<Value>
where
	K: Injectable + Eq + std::hash::Hash,
	V: Injectable,
{
	value
		.downcast::<(K, V)>()
		.map(|(key, item)| Value::new(HashMap::from([(key, item)])))
}

fn split_vec<T: Injectable>(value: &Value) -> Option<Vec<Value>> {
	value
		.downcast_ref::<Vec<T>>()
		.map(|items| items.iter().cloned().map(Value::new).collect())
}

fn assemble_vec<T: Injectable>(items: Vec<Value>) -> Option<Value> {
	items
		.iter()
		.map(Value::downcast::<T>)
		.collect::<Option<Vec<T>>>()
		.map(Value::new)
}

fn map_entries<K, V>(value: &Value) -> Option<Vec<(Value, Value)>>
where
	K: Injectable + Eq + std::hash::Hash,
	V: Injectable,
{
	value.downcast_ref::<HashMap<K, V>>().map(|map| {
		map.iter()
			.map(|(key, item)| (Value::new(key.clone()), Value::new(item.clone())))
			.collect()
	})
}

fn assemble_map<K, V>(entries: Vec<(Value, Value)>) -> Option<Value>
where
	K: Injectable + Eq + std::hash::Hash,
	V: Injectable,
{
	let mut map = HashMap::with_capacity(entries.len());
	for (key, item) in entries {
		map.insert(key.downcast::<K>()?, item.downcast::<V>()?);
	}
	Some(Value::new(map))
}
