//! The injection container
//!
//! A [`Container`] owns a table of [`Binding`]s keyed by the type they provide.
//! Resolving a type tries, in order:
//!
//! 1. an exact table entry,
//! 2. for an interface, the first entry (in registration order) whose type
//!    implements it,
//! 3. for `Vec<Arc<dyn I>>`, an aggregate of every sequence entry whose element
//!    type implements `I`,
//! 4. for `HashMap<K, Arc<dyn I>>`, an aggregate of every mapping entry keyed by
//!    `K` whose value type implements `I`,
//! 5. the parent container,
//! 6. an empty collection for interface aggregates (and for any collection
//!    when the requesting container's
//!    [`ContainerConfig::implicit_empty_collections`] is set).
//!
//! Every build runs under a thread-local [`ResolutionGuard`](crate::cycle_detection::ResolutionGuard)
//! so a type requested while it is already under construction fails with
//! [`DiError::CircularDependency`] instead of recursing forever.

use crate::annotation::{Annotate, Annotation, AnnotationKind};
use crate::binding::{Binding, merge_requires};
use crate::callable::Callable;
use crate::config::ContainerConfig;
use crate::cycle_detection::{ResolutionKey, begin_resolution};
use crate::descriptor::{Adapter, TypeDescriptor};
use crate::error::{BoxError, DiError, DiResult};
use crate::injectable::Injectable;
use crate::module::{Binder, ModuleRegistry};
use crate::value::Value;
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// A dependency injection container.
///
/// `Container` is a cheap handle: clones share the same bindings.
///
/// # Examples
///
/// ```
/// use reinhardt_ioc_core::{Annotation, Container};
///
/// let container = Container::new();
/// container.bind(5432u16).unwrap();
/// container
///     .bind(Annotation::singleton(|port: u16| format!("localhost:{port}")))
///     .unwrap();
///
/// let length = container.call(|address: String| address.len()).unwrap();
/// assert_eq!(length, "localhost:5432".len());
/// ```
#[derive(Clone)]
pub struct Container {
	inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
	id: u64,
	parent: Option<Container>,
	config: Arc<ContainerConfig>,
	table: RwLock<BindingTable>,
	modules: Mutex<ModuleRegistry>,
}

/// Bindings keyed by provided type, plus their registration order.
#[derive(Default)]
pub(crate) struct BindingTable {
	bindings: HashMap<TypeId, Arc<Binding>>,
	order: Vec<TypeId>,
	/// Open module journals, innermost last, each owned by the installing thread.
	journals: Vec<(ThreadId, Vec<JournalEntry>)>,
}

/// One table write made while a module was being configured.
#[derive(Clone)]
pub(crate) struct JournalEntry {
	pub(crate) key: TypeId,
	pub(crate) previous: Option<Arc<Binding>>,
	pub(crate) inserted: Arc<Binding>,
}

impl BindingTable {
	pub(crate) fn get(&self, type_id: TypeId) -> Option<&Arc<Binding>> {
		self.bindings.get(&type_id)
	}

	pub(crate) fn contains(&self, type_id: TypeId) -> bool {
		self.bindings.contains_key(&type_id)
	}

	/// Inserts or replaces a binding, recording the write in the innermost
	/// journal opened by the calling thread.
	pub(crate) fn insert(&mut self, binding: Binding) -> Arc<Binding> {
		let key = binding.provides().id();
		let inserted = Arc::new(binding);
		let previous = self.bindings.insert(key, inserted.clone());
		if previous.is_none() {
			self.order.push(key);
		}
		let current = thread::current().id();
		if let Some((_, journal)) = self
			.journals
			.iter_mut()
			.rev()
			.find(|(owner, _)| *owner == current)
		{
			journal.push(JournalEntry {
				key,
				previous,
				inserted: inserted.clone(),
			});
		}
		inserted
	}

	/// Puts `previous` back in place of `inserted`.
	///
	/// Fails if the entry no longer holds `inserted`.
	pub(crate) fn restore(&mut self, entry: JournalEntry) -> Result<(), &'static str> {
		let current = self.bindings.get(&entry.key);
		if !current.is_some_and(|current| Arc::ptr_eq(current, &entry.inserted)) {
			return Err(entry.inserted.provides().name());
		}
		match entry.previous {
			Some(previous) => {
				self.bindings.insert(entry.key, previous);
			}
			None => {
				self.bindings.remove(&entry.key);
				self.order.retain(|key| *key != entry.key);
			}
		}
		Ok(())
	}

	/// Undoes a journal, newest write first.
	///
	/// Nothing changes unless every write can be undone.
	pub(crate) fn rewind(&mut self, journal: &[JournalEntry]) -> Result<(), &'static str> {
		let mut simulated: HashMap<TypeId, Option<Arc<Binding>>> = HashMap::new();
		for entry in journal.iter().rev() {
			let current = match simulated.get(&entry.key) {
				Some(current) => current.clone(),
				None => self.bindings.get(&entry.key).cloned(),
			};
			if !current.is_some_and(|current| Arc::ptr_eq(&current, &entry.inserted)) {
				return Err(entry.inserted.provides().name());
			}
			simulated.insert(entry.key, entry.previous.clone());
		}
		for entry in journal.iter().rev() {
			self.restore(entry.clone())?;
		}
		Ok(())
	}

	/// Re-applies the writes of a rewound journal, oldest first.
	///
	/// Restored types are appended to the registration order.
	pub(crate) fn replay(&mut self, journal: &[JournalEntry]) {
		for entry in journal {
			if self
				.bindings
				.insert(entry.key, entry.inserted.clone())
				.is_none()
			{
				self.order.push(entry.key);
			}
		}
	}

	pub(crate) fn open_journal(&mut self) {
		self.journals.push((thread::current().id(), Vec::new()));
	}

	/// Closes the innermost journal opened by the calling thread.
	pub(crate) fn close_journal(&mut self) -> Vec<JournalEntry> {
		let current = thread::current().id();
		self.journals
			.iter()
			.rposition(|(owner, _)| *owner == current)
			.map(|index| self.journals.remove(index).1)
			.unwrap_or_default()
	}

	/// Bindings in registration order.
	pub(crate) fn ordered(&self) -> impl Iterator<Item = &Arc<Binding>> {
		self.order.iter().filter_map(|key| self.bindings.get(key))
	}

	pub(crate) fn len(&self) -> usize {
		self.bindings.len()
	}
}

/// A binding found by resolution, with the container that owns it.
pub(crate) struct Resolution {
	pub(crate) owner: Container,
	pub(crate) binding: Arc<Binding>,
}

impl Resolution {
	pub(crate) fn key(&self) -> ResolutionKey {
		ResolutionKey::new(self.owner.id(), self.binding.provides().id())
	}
}

/// A non-owning container handle.
#[derive(Clone)]
pub(crate) struct WeakContainer {
	inner: Weak<ContainerInner>,
}

impl WeakContainer {
	pub(crate) fn upgrade(&self) -> Option<Container> {
		self.inner.upgrade().map(|inner| Container { inner })
	}
}

/// Builder for [`Container`]
///
/// # Examples
///
/// ```
/// use reinhardt_ioc_core::Container;
///
/// let container = Container::builder()
///     .implicit_empty_collections(true)
///     .max_resolution_depth(32)
///     .build();
///
/// assert!(container.get::<Vec<String>>().unwrap().is_empty());
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
	config: ContainerConfig,
	parent: Option<Container>,
}

impl ContainerBuilder {
	/// Replaces the whole configuration.
	pub fn config(mut self, config: ContainerConfig) -> Self {
		self.config = config;
		self
	}

	pub fn implicit_empty_collections(mut self, enabled: bool) -> Self {
		self.config.implicit_empty_collections = enabled;
		self
	}

	pub fn max_resolution_depth(mut self, depth: usize) -> Self {
		self.config.max_resolution_depth = depth;
		self
	}

	pub fn log_resolution(mut self, enabled: bool) -> Self {
		self.config.log_resolution = enabled;
		self
	}

	/// Falls back to `parent` for unresolved types.
	pub fn parent(mut self, parent: Container) -> Self {
		self.parent = Some(parent);
		self
	}

	pub fn build(self) -> Container {
		Container::create(Arc::new(self.config), self.parent)
	}
}

impl Container {
	/// Creates an empty container with the default configuration.
	pub fn new() -> Self {
		Self::builder().build()
	}

	pub fn with_config(config: ContainerConfig) -> Self {
		Self::builder().config(config).build()
	}

	pub fn builder() -> ContainerBuilder {
		ContainerBuilder::default()
	}

	fn create(config: Arc<ContainerConfig>, parent: Option<Container>) -> Self {
		let container = Self {
			inner: Arc::new(ContainerInner {
				id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
				parent,
				config,
				table: RwLock::new(BindingTable::default()),
				modules: Mutex::new(ModuleRegistry::default()),
			}),
		};
		let binder = Binder::new(container.downgrade());
		container
			.inner
			.table
			.write()
			.insert(Binding::new(
				TypeDescriptor::of::<Binder>(),
				Vec::new(),
				AnnotationKind::Literal,
				move |_| Ok(Value::new(binder.clone())),
			));
		container
	}

	/// Creates a child container.
	///
	/// The child starts empty, inherits this container's configuration and
	/// falls back to this container for types it cannot resolve. Bindings
	/// made on the child are never visible from the parent.
	pub fn child(&self) -> Container {
		Self::create(self.inner.config.clone(), Some(self.clone()))
	}

	/// Unique id of this container.
	pub fn id(&self) -> u64 {
		self.inner.id
	}

	pub fn config(&self) -> &ContainerConfig {
		&self.inner.config
	}

	pub fn parent(&self) -> Option<&Container> {
		self.inner.parent.as_ref()
	}

	/// The [`Binder`] capability of this container.
	pub fn binder(&self) -> Binder {
		Binder::new(self.downgrade())
	}

	pub(crate) fn downgrade(&self) -> WeakContainer {
		WeakContainer {
			inner: Arc::downgrade(&self.inner),
		}
	}

	pub(crate) fn table(&self) -> &RwLock<BindingTable> {
		&self.inner.table
	}

	pub(crate) fn modules(&self) -> &Mutex<ModuleRegistry> {
		&self.inner.modules
	}

	/// Adds a binding.
	///
	/// `value` may be an [`Annotation`](crate::Annotation), a function (bound as
	/// a provider) or any other injectable value (bound as a literal).
	///
	/// # Errors
	///
	/// - [`DiError::DuplicateBinding`] if the provided type is already bound and
	///   the annotation is neither a sequence nor a mapping.
	/// - [`DiError::Shape`] if a sequence or mapping wraps a value of the wrong
	///   shape.
	///
	/// A function that returns nothing provides no type and cannot be bound:
	///
	/// ```compile_fail
	/// use reinhardt_ioc_core::Container;
	///
	/// Container::new().bind(|| ()).unwrap();
	/// ```
	pub fn bind<M>(&self, value: impl Annotate<M>) -> DiResult<()> {
		let annotation = value.annotate();
		let mergeable = annotation.is_mergeable();
		// Held across build-and-insert so a concurrent sequence cannot lose a link.
		let mut table = self.inner.table.write();
		let binding = {
			let table = &*table;
			annotation
				.into_binding(&|descriptor: &TypeDescriptor| table.get(descriptor.id()).cloned())?
		};
		if !mergeable && table.contains(binding.provides().id()) {
			return Err(DiError::DuplicateBinding(binding.provides().name()));
		}
		tracing::debug!(
			provides = %binding.provides(),
			kind = %binding.kind(),
			container = self.inner.id,
			"binding added"
		);
		table.insert(binding);
		Ok(())
	}

	/// Adds several bindings.
	///
	/// Each annotation is bound independently: on failure the bindings made
	/// before the failing one stay in place.
	pub fn bind_all<I>(&self, annotations: I) -> DiResult<()>
	where
		I: IntoIterator<Item = Annotation>,
	{
		for annotation in annotations {
			self.bind(annotation)?;
		}
		Ok(())
	}

	/// Binds `implementation` under the type `As`.
	///
	/// If `As` is an interface (`Arc<dyn Trait>`), the implementation's type must
	/// implement it. Otherwise the implementation must provide `As` itself or a
	/// type `As` declares a conversion from.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::{Container, injectable};
	///
	/// #[derive(Clone, Debug, PartialEq)]
	/// struct Port(u16);
	///
	/// impl From<u16> for Port {
	///     fn from(value: u16) -> Self {
	///         Port(value)
	///     }
	/// }
	///
	/// injectable!(Port => [], from [u16]);
	///
	/// let container = Container::new();
	/// container.bind_to::<Port, _>(8080u16).unwrap();
	/// assert_eq!(container.get::<Port>().unwrap(), Port(8080));
	/// ```
	///
	/// # Errors
	///
	/// - [`DiError::DuplicateBinding`] if `As` is already bound.
	/// - [`DiError::InterfaceMismatch`] if `As` is an interface the
	///   implementation does not implement.
	/// - [`DiError::Conversion`] if `As` is concrete and not convertible from
	///   the implementation's type.
	pub fn bind_to<As, M>(&self, implementation: impl Annotate<M>) -> DiResult<()>
	where
		As: Injectable,
	{
		let target = TypeDescriptor::of::<As>();
		let annotation = implementation.annotate();
		let mut table = self.inner.table.write();
		if table.contains(target.id()) {
			return Err(DiError::DuplicateBinding(target.name()));
		}
		let binding = {
			let table = &*table;
			annotation
				.into_binding(&|descriptor: &TypeDescriptor| table.get(descriptor.id()).cloned())?
		};
		let binding = if target.is_interface() {
			let upcast =
				binding
					.provides()
					.upcast_to(&target)
					.ok_or(DiError::InterfaceMismatch {
						interface: target.name(),
						implementation: binding.provides().name(),
					})?;
			binding.adapted(target, upcast)
		} else if binding.provides() == &target {
			binding
		} else {
			let convert =
				target
					.conversion_from(binding.provides())
					.ok_or(DiError::Conversion {
						from: binding.provides().name(),
						to: target.name(),
					})?;
			binding.adapted(target, convert)
		};
		tracing::debug!(
			provides = %binding.provides(),
			kind = %binding.kind(),
			container = self.inner.id,
			"binding added"
		);
		table.insert(binding);
		Ok(())
	}

	/// Returns `true` if this container (not its ancestors) has an entry for `T`.
	pub fn is_bound<T: Injectable>(&self) -> bool {
		self.inner.table.read().contains(TypeId::of::<T>())
	}

	/// Bindings of this container in registration order.
	pub fn bindings(&self) -> Vec<Arc<Binding>> {
		self.inner.table.read().ordered().cloned().collect()
	}

	/// Number of bindings in this container (including its [`Binder`]).
	pub fn len(&self) -> usize {
		self.inner.table.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Finds the binding that would build `descriptor`, without building it.
	pub fn resolve_binding(&self, descriptor: &TypeDescriptor) -> DiResult<Arc<Binding>> {
		self.resolve(descriptor).map(|resolution| resolution.binding)
	}

	pub(crate) fn resolve(&self, descriptor: &TypeDescriptor) -> DiResult<Resolution> {
		if self.inner.config.log_resolution {
			tracing::trace!(
				requested = %descriptor,
				container = self.inner.id,
				"resolving"
			);
		}
		if let Some(binding) = self.resolve_local(descriptor) {
			return Ok(Resolution {
				owner: self.clone(),
				binding,
			});
		}
		if let Some(parent) = &self.inner.parent {
			match parent.resolve(descriptor) {
				Err(DiError::Unbound(_)) => {}
				resolved => return resolved,
			}
		}
		// The requesting container's own configuration decides.
		match self.empty_collection(descriptor) {
			Some(binding) => Ok(Resolution {
				owner: self.clone(),
				binding,
			}),
			None => Err(DiError::Unbound(descriptor.name())),
		}
	}

	/// Resolution steps 1 to 4, against this container's own table.
	fn resolve_local(&self, descriptor: &TypeDescriptor) -> Option<Arc<Binding>> {
		let table = self.inner.table.read();
		if let Some(binding) = table.get(descriptor.id()) {
			return Some(binding.clone());
		}
		if descriptor.is_interface() {
			return self.resolve_interface(&table, descriptor);
		}
		if let Some(element) = descriptor.element().filter(|e| e.is_interface()) {
			return aggregate_sequence(&table, descriptor, element);
		}
		if let (Some(key), Some(value)) = (descriptor.key(), descriptor.value()) {
			if value.is_interface() {
				return aggregate_mapping(&table, descriptor, key, value);
			}
		}
		None
	}

	fn resolve_interface(
		&self,
		table: &BindingTable,
		interface: &TypeDescriptor,
	) -> Option<Arc<Binding>> {
		let mut candidates = table
			.ordered()
			.filter_map(|binding| Some((binding, binding.provides().upcast_to(interface)?)));
		let (origin, upcast) = candidates.next()?;
		if let Some((other, _)) = candidates.next() {
			tracing::debug!(
				interface = %interface,
				chosen = %origin.provides(),
				other = %other.provides(),
				"several bindings implement the interface, using the first registered"
			);
		}
		let origin = origin.clone();
		let expected = interface.name();
		Some(Arc::new(Binding::new(
			interface.clone(),
			origin.requires().to_vec(),
			origin.kind(),
			move |container| {
				let value = container.build_guarded(&origin)?;
				adapt(&upcast, &value, expected)
			},
		)))
	}

	/// Step 6: an empty collection, when allowed.
	fn empty_collection(&self, descriptor: &TypeDescriptor) -> Option<Arc<Binding>> {
		let implicit = self.inner.config.implicit_empty_collections;
		let allowed = match (descriptor.element(), descriptor.value()) {
			(Some(element), _) => implicit || element.is_interface(),
			(None, Some(value)) => implicit || value.is_interface(),
			(None, None) => false,
		};
		if !allowed {
			return None;
		}
		let target = descriptor.clone();
		Some(Arc::new(Binding::new(
			descriptor.clone(),
			Vec::new(),
			AnnotationKind::Literal,
			move |_| {
				let empty = if target.is_sequence() {
					target.assemble_sequence(Vec::new())
				} else {
					target.assemble_mapping(Vec::new())
				};
				empty.ok_or(DiError::TypeMismatch {
					expected: target.name(),
					actual: "<empty collection>",
				})
			},
		)))
	}

	/// Retrieves a value of type `T`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::Container;
	///
	/// let container = Container::new();
	/// container.bind(42u32).unwrap();
	///
	/// assert_eq!(container.get::<u32>().unwrap(), 42);
	/// assert!(container.get::<u64>().is_err());
	/// ```
	pub fn get<T: Injectable>(&self) -> DiResult<T> {
		let value = self.get_value(&TypeDescriptor::of::<T>())?;
		value.downcast::<T>().ok_or(DiError::TypeMismatch {
			expected: std::any::type_name::<T>(),
			actual: value.type_name(),
		})
	}

	/// Retrieves the value of the type described by `descriptor`.
	pub fn get_value(&self, descriptor: &TypeDescriptor) -> DiResult<Value> {
		let resolution = self.resolve(descriptor)?;
		let _guard = begin_resolution(
			resolution.key(),
			descriptor.name(),
			self.inner.config.max_resolution_depth,
		)?;
		resolution.binding.build(&resolution.owner)
	}

	/// Builds a binding of this container under a recursion guard.
	pub(crate) fn build_guarded(&self, binding: &Binding) -> DiResult<Value> {
		let _guard = begin_resolution(
			ResolutionKey::new(self.inner.id, binding.provides().id()),
			binding.provides().name(),
			self.inner.config.max_resolution_depth,
		)?;
		binding.build(self)
	}

	/// Resolves and builds every parameter in order, stopping at the first
	/// failure.
	pub(crate) fn inject_arguments(
		&self,
		parameters: &[TypeDescriptor],
		target: &'static str,
	) -> DiResult<Vec<Value>> {
		parameters
			.iter()
			.enumerate()
			.map(|(index, parameter)| {
				self.get_value(parameter)
					.map_err(|source| DiError::Argument {
						position: index + 1,
						type_name: parameter.name(),
						target,
						source: Box::new(source),
					})
			})
			.collect()
	}

	/// Calls `target` with injected arguments and returns its output.
	///
	/// # Errors
	///
	/// [`DiError::Argument`] naming the first argument that could not be
	/// injected. Arguments after it are not resolved.
	pub fn call<Args, F>(&self, target: F) -> DiResult<F::Output>
	where
		F: Callable<Args>,
	{
		let arguments = self.inject_arguments(&target.parameters(), target.name())?;
		target.invoke(arguments)
	}

	/// Like [`call`](Container::call) for a target returning `Result`.
	///
	/// An error returned by the target is passed through unchanged as
	/// [`DiError::Returned`].
	pub fn try_call<Args, F, T, E>(&self, target: F) -> DiResult<T>
	where
		F: Callable<Args, Output = Result<T, E>>,
		E: Into<BoxError>,
	{
		self.call(target)?
			.map_err(|error| DiError::Returned(error.into()))
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Container {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Container")
			.field("id", &self.inner.id)
			.field("bindings", &self.len())
			.field("parent", &self.inner.parent.as_ref().map(Container::id))
			.finish()
	}
}

fn adapt(adapter: &Adapter, value: &Value, expected: &'static str) -> DiResult<Value> {
	adapter(value).ok_or(DiError::TypeMismatch {
		expected,
		actual: value.type_name(),
	})
}

/// Step 3: concatenates every sequence whose elements implement `element`.
fn aggregate_sequence(
	table: &BindingTable,
	descriptor: &TypeDescriptor,
	element: &TypeDescriptor,
) -> Option<Arc<Binding>> {
	let contributors: Vec<(Arc<Binding>, Adapter)> = table
		.ordered()
		.filter(|binding| binding.provides().is_sequence())
		.filter_map(|binding| {
			let upcast = binding.provides().element()?.upcast_to(element)?;
			Some((binding.clone(), upcast))
		})
		.collect();
	if contributors.is_empty() {
		return None;
	}
	let requires = contributors
		.iter()
		.fold(Vec::new(), |acc, (binding, _)| merge_requires(&acc, binding.requires()));
	let target = descriptor.clone();
	let element_name = element.name();
	Some(Arc::new(Binding::new(
		descriptor.clone(),
		requires,
		AnnotationKind::Sequence,
		move |container| {
			let mut items = Vec::new();
			for (binding, upcast) in &contributors {
				let built = container.build_guarded(binding)?;
				let parts = binding.provides().split(&built).ok_or(DiError::TypeMismatch {
					expected: binding.provides().name(),
					actual: built.type_name(),
				})?;
				for item in parts {
					items.push(adapt(upcast, &item, element_name)?);
				}
			}
			target.assemble_sequence(items).ok_or(DiError::TypeMismatch {
				expected: target.name(),
				actual: "<sequence items>",
			})
		},
	)))
}

/// Step 4: overlays every mapping keyed by `key` whose values implement `value`.
fn aggregate_mapping(
	table: &BindingTable,
	descriptor: &TypeDescriptor,
	key: &TypeDescriptor,
	value: &TypeDescriptor,
) -> Option<Arc<Binding>> {
	let contributors: Vec<(Arc<Binding>, Adapter)> = table
		.ordered()
		.filter(|binding| binding.provides().key() == Some(key))
		.filter_map(|binding| {
			let upcast = binding.provides().value()?.upcast_to(value)?;
			Some((binding.clone(), upcast))
		})
		.collect();
	if contributors.is_empty() {
		return None;
	}
	let requires = contributors
		.iter()
		.fold(Vec::new(), |acc, (binding, _)| merge_requires(&acc, binding.requires()));
	let target = descriptor.clone();
	let value_name = value.name();
	Some(Arc::new(Binding::new(
		descriptor.clone(),
		requires,
		AnnotationKind::Mapping,
		move |container| {
			let mut entries = Vec::new();
			for (binding, upcast) in &contributors {
				let built = container.build_guarded(binding)?;
				let parts = binding.provides().entries(&built).ok_or(DiError::TypeMismatch {
					expected: binding.provides().name(),
					actual: built.type_name(),
				})?;
				for (entry_key, entry_value) in parts {
					entries.push((entry_key, adapt(upcast, &entry_value, value_name)?));
				}
			}
			target.assemble_mapping(entries).ok_or(DiError::TypeMismatch {
				expected: target.name(),
				actual: "<mapping entries>",
			})
		},
	)))
}
