//! Modules and the binder capability
//!
//! A [`Module`] groups related bindings. Installing it calls
//! [`Module::configure`] with the container's [`Binder`]; every binding made
//! there is journaled so that a later installation of the same module type can
//! replace it.
//!
//! Installing a second module of a type that is already installed asks the
//! existing instance to [`reconcile`](Module::reconcile) with the incoming one.

use crate::annotation::{Annotate, Annotation};
use crate::callable::Callable;
use crate::container::{Container, JournalEntry, WeakContainer};
use crate::descriptor::TypeDescriptor;
use crate::error::{DiError, DiResult};
use crate::injectable::Injectable;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A group of bindings installed together.
///
/// # Examples
///
/// ```
/// use reinhardt_ioc_core::{Binder, Container, DiResult, Module};
///
/// struct Greeting;
///
/// impl Module for Greeting {
///     fn configure(&self, binder: &Binder) -> DiResult<()> {
///         binder.bind("hello".to_string())?;
///         binder.provide(|greeting: String| greeting.len())?;
///         Ok(())
///     }
/// }
///
/// let container = Container::new();
/// container.install(Greeting).unwrap();
/// assert_eq!(container.get::<usize>().unwrap(), 5);
/// ```
pub trait Module: Send + Sync + 'static {
	/// Adds this module's bindings.
	fn configure(&self, binder: &Binder) -> DiResult<()>;

	/// Decides what happens when a module of the same type is installed again.
	///
	/// `self` is the installed instance. The default keeps it and ignores
	/// `incoming`.
	fn reconcile(&self, incoming: &Self) -> Reconciliation
	where
		Self: Sized,
	{
		let _ = incoming;
		Reconciliation::KeepExisting
	}
}

/// Outcome of installing a module type that is already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
	/// Keep the installed module; the incoming one is dropped.
	KeepExisting,
	/// Undo the installed module's bindings and install the incoming one.
	Replace,
	/// Fail with [`DiError::DuplicateModule`].
	Conflict,
}

impl Reconciliation {
	/// Reconciles two module values field by field.
	///
	/// Equal modules and a default (zero) incoming module keep the existing
	/// installation; a default existing module is replaced; anything else
	/// conflicts.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::Reconciliation;
	///
	/// #[derive(Default, PartialEq)]
	/// struct Settings {
	///     url: String,
	/// }
	///
	/// let empty = Settings::default();
	/// let local = Settings { url: "localhost".into() };
	/// let remote = Settings { url: "example.com".into() };
	///
	/// assert_eq!(Reconciliation::by_value(&local, &empty), Reconciliation::KeepExisting);
	/// assert_eq!(Reconciliation::by_value(&empty, &local), Reconciliation::Replace);
	/// assert_eq!(Reconciliation::by_value(&local, &remote), Reconciliation::Conflict);
	/// ```
	pub fn by_value<M: PartialEq + Default>(existing: &M, incoming: &M) -> Self {
		let zero = M::default();
		if existing == incoming || *incoming == zero {
			Reconciliation::KeepExisting
		} else if *existing == zero {
			Reconciliation::Replace
		} else {
			Reconciliation::Conflict
		}
	}
}

struct InstalledModule {
	module: Arc<dyn Any + Send + Sync>,
	journal: Vec<JournalEntry>,
}

/// Installed modules of one container, by module type.
#[derive(Default)]
pub(crate) struct ModuleRegistry {
	installed: HashMap<TypeId, InstalledModule>,
}

impl ModuleRegistry {
	pub(crate) fn contains(&self, type_id: TypeId) -> bool {
		self.installed.contains_key(&type_id)
	}
}

impl Container {
	/// Installs a module.
	///
	/// # Errors
	///
	/// - Any error returned by [`Module::configure`]. Bindings made before the
	///   failure stay in place, unless the module was replacing an installed
	///   one: then the partial bindings are undone and the installed module is
	///   put back.
	/// - [`DiError::DuplicateModule`] if a module of the same type is installed
	///   and [`Module::reconcile`] reports a conflict.
	/// - [`DiError::ModuleRewind`] if the installed module must be replaced but
	///   one of its bindings was overwritten since.
	pub fn install<M: Module>(&self, module: M) -> DiResult<()> {
		let type_id = TypeId::of::<M>();
		let name = std::any::type_name::<M>();
		let existing = self
			.modules()
			.lock()
			.installed
			.get(&type_id)
			.map(|installed| installed.module.clone());
		let mut replaced = None;
		if let Some(existing) = existing {
			let existing = existing
				.downcast_ref::<M>()
				.ok_or(DiError::TypeMismatch {
					expected: name,
					actual: "<installed module>",
				})?;
			match existing.reconcile(&module) {
				Reconciliation::KeepExisting => {
					tracing::debug!(module = name, "module already installed, keeping it");
					return Ok(());
				}
				Reconciliation::Conflict => return Err(DiError::DuplicateModule(name)),
				Reconciliation::Replace => replaced = self.uninstall(type_id, name)?,
			}
		}
		let (result, journal) = self.configure_journaled(&module);
		if let Err(error) = result {
			if let Some(previous) = replaced {
				self.reinstate(type_id, name, previous, &journal);
			}
			return Err(error);
		}
		tracing::debug!(
			module = name,
			bindings = journal.len(),
			container = self.id(),
			"module installed"
		);
		self.modules().lock().installed.insert(
			type_id,
			InstalledModule {
				module: Arc::new(module),
				journal,
			},
		);
		Ok(())
	}

	/// Returns `true` if a module of type `M` is installed in this container.
	pub fn is_installed<M: Module>(&self) -> bool {
		self.modules().lock().contains(TypeId::of::<M>())
	}

	/// Runs `configure`, collecting the table writes this thread makes meanwhile.
	fn configure_journaled<M: Module>(&self, module: &M) -> (DiResult<()>, Vec<JournalEntry>) {
		self.table().write().open_journal();
		let result = module.configure(&self.binder());
		let journal = self.table().write().close_journal();
		(result, journal)
	}

	/// Removes an installed module and undoes its bindings.
	fn uninstall(&self, type_id: TypeId, name: &'static str) -> DiResult<Option<InstalledModule>> {
		let Some(installed) = self.modules().lock().installed.remove(&type_id) else {
			return Ok(None);
		};
		let rewound = self.table().write().rewind(&installed.journal);
		match rewound {
			Ok(()) => {
				tracing::debug!(module = name, "module bindings rewound for replacement");
				Ok(Some(installed))
			}
			Err(binding) => {
				self.modules().lock().installed.insert(type_id, installed);
				Err(DiError::ModuleRewind {
					module: name,
					binding,
				})
			}
		}
	}

	/// Undoes a failed replacement and restores the module it replaced.
	fn reinstate(
		&self,
		type_id: TypeId,
		name: &'static str,
		previous: InstalledModule,
		partial: &[JournalEntry],
	) {
		{
			let mut table = self.table().write();
			if let Err(binding) = table.rewind(partial) {
				tracing::warn!(
					module = name,
					binding,
					"partial bindings of the failed replacement were overwritten"
				);
			}
			table.replay(&previous.journal);
		}
		tracing::debug!(module = name, "replacement failed, previous module restored");
		self.modules().lock().installed.insert(type_id, previous);
	}
}

/// The capability to add bindings to a container.
///
/// Every container binds its own `Binder`, so providers and modules can ask
/// for one. A binder does not keep its container alive.
#[derive(Clone)]
pub struct Binder {
	container: WeakContainer,
}

impl Binder {
	pub(crate) fn new(container: WeakContainer) -> Self {
		Self { container }
	}

	/// The container this binder adds bindings to.
	pub fn container(&self) -> DiResult<Container> {
		self.container.upgrade().ok_or(DiError::ContainerDropped)
	}

	/// See [`Container::bind`].
	pub fn bind<M>(&self, value: impl Annotate<M>) -> DiResult<&Self> {
		self.container()?.bind(value)?;
		Ok(self)
	}

	/// See [`Container::bind_to`].
	pub fn bind_to<As, M>(&self, implementation: impl Annotate<M>) -> DiResult<&Self>
	where
		As: Injectable,
	{
		self.container()?.bind_to::<As, M>(implementation)?;
		Ok(self)
	}

	/// See [`Container::install`].
	pub fn install<Mo: Module>(&self, module: Mo) -> DiResult<&Self> {
		self.container()?.install(module)?;
		Ok(self)
	}

	/// Binds a provider called at most once.
	pub fn provide<Args, F>(&self, provider: F) -> DiResult<&Self>
	where
		F: Callable<Args>,
		F::Output: Injectable,
	{
		self.bind(Annotation::singleton(Annotation::provider(provider)))
	}

	/// Binds a provider called on every injection.
	pub fn provide_multi<Args, F>(&self, provider: F) -> DiResult<&Self>
	where
		F: Callable<Args>,
		F::Output: Injectable,
	{
		self.bind(Annotation::provider(provider))
	}

	/// Binds a provider contributing to a `Vec`.
	pub fn provide_sequence<Args, F>(&self, provider: F) -> DiResult<&Self>
	where
		F: Callable<Args>,
		F::Output: Injectable,
	{
		self.bind(Annotation::sequence(Annotation::provider(provider)))
	}

	/// Binds a provider contributing to a `HashMap`.
	pub fn provide_mapping<Args, F>(&self, provider: F) -> DiResult<&Self>
	where
		F: Callable<Args>,
		F::Output: Injectable,
	{
		self.bind(Annotation::mapping(Annotation::provider(provider)))
	}
}

impl Injectable for Binder {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::concrete::<Self>().build()
	}
}

impl fmt::Debug for Binder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Binder")
			.field("container", &self.container.upgrade().map(|c| c.id()))
			.finish()
	}
}
