//! Module installation tests
//!
//! These tests verify that:
//! 1. A module's bindings are added through its `Binder`
//! 2. Reinstalling a module type keeps, replaces or rejects it per `reconcile`
//! 3. `Binder` is injectable into providers

use reinhardt_ioc_core::{
	Annotation, Binder, Container, DiError, DiResult, Module, Reconciliation, injectable,
};
use rstest::{fixture, rstest};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[derive(Clone, Debug, PartialEq)]
struct UserName(String);

impl From<String> for UserName {
	fn from(value: String) -> Self {
		UserName(value)
	}
}

injectable!(UserName => [], from [String]);

/// Database settings, reconciled field by field.
#[derive(Debug, Default, PartialEq)]
struct DatabaseModule {
	url: String,
}

impl Module for DatabaseModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		let url = self.url.clone();
		binder.provide(move || url.clone())?;
		Ok(())
	}

	fn reconcile(&self, incoming: &Self) -> Reconciliation {
		Reconciliation::by_value(self, incoming)
	}
}

/// Feature list contributed to the `Vec<String>` sequence.
#[derive(Debug, Default, PartialEq)]
struct FeatureModule {
	features: Vec<String>,
}

impl Module for FeatureModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		let features = self.features.clone();
		binder.provide_sequence(move || features.clone())?;
		Ok(())
	}

	fn reconcile(&self, incoming: &Self) -> Reconciliation {
		Reconciliation::by_value(self, incoming)
	}
}

struct CountingModule {
	installs: Arc<AtomicUsize>,
}

impl Module for CountingModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		self.installs.fetch_add(1, Ordering::SeqCst);
		binder.bind(1u64)?;
		Ok(())
	}
}

struct PluginsModule;

impl Module for PluginsModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		binder
			.provide_sequence(|| "auth".to_string())?
			.provide_sequence(|| vec!["cache".to_string()])?
			.provide_mapping(|| ("retries".to_string(), 3u32))?
			.bind_to::<UserName, _>("admin".to_string())?;
		Ok(())
	}
}

struct NestedModule;

impl Module for NestedModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		binder.install(PluginsModule)?;
		binder.bind(true)?;
		Ok(())
	}
}

struct FailingModule;

impl Module for FailingModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		binder.bind(1i8)?;
		binder.bind(2i8)?;
		Ok(())
	}
}

/// Cache settings; always replaced on reinstall.
#[derive(Debug)]
struct CacheModule {
	size: u32,
	broken: bool,
}

impl Module for CacheModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		binder.bind(self.size)?;
		if self.broken {
			binder.bind(self.size)?;
		}
		Ok(())
	}

	fn reconcile(&self, _incoming: &Self) -> Reconciliation {
		Reconciliation::Replace
	}
}

/// Binds a label, optionally letting another thread bind a `u8` meanwhile.
struct TaggedModule {
	label: &'static str,
	background: Option<u8>,
}

impl Module for TaggedModule {
	fn configure(&self, binder: &Binder) -> DiResult<()> {
		binder.bind(self.label.to_string())?;
		if let Some(value) = self.background {
			thread::scope(|scope| {
				scope
					.spawn(|| binder.bind(value).map(|_| ()))
					.join()
					.unwrap()
			})?;
		}
		Ok(())
	}

	fn reconcile(&self, _incoming: &Self) -> Reconciliation {
		Reconciliation::Replace
	}
}

#[fixture]
fn container() -> Container {
	Container::new()
}

fn database(url: &str) -> DatabaseModule {
	DatabaseModule {
		url: url.to_string(),
	}
}

#[rstest]
fn test_install_configures_bindings(container: Container) {
	// Act
	container.install(database("postgres://localhost")).unwrap();

	// Assert
	assert!(container.is_installed::<DatabaseModule>());
	assert_eq!(container.get::<String>().unwrap(), "postgres://localhost");
}

#[rstest]
fn test_reinstall_default_keeps_existing(container: Container) {
	// Arrange
	let installs = Arc::new(AtomicUsize::new(0));
	container
		.install(CountingModule {
			installs: installs.clone(),
		})
		.unwrap();

	// Act
	let result = container.install(CountingModule {
		installs: installs.clone(),
	});

	// Assert
	assert!(result.is_ok());
	assert_eq!(installs.load(Ordering::SeqCst), 1);
}

#[rstest]
#[case::equal("postgres://a", "postgres://a", "postgres://a")]
#[case::incoming_default("postgres://a", "", "postgres://a")]
#[case::existing_default("", "postgres://b", "postgres://b")]
fn test_reconcile_by_value(
	container: Container,
	#[case] existing: &str,
	#[case] incoming: &str,
	#[case] expected: &str,
) {
	// Arrange
	container.install(database(existing)).unwrap();

	// Act
	container.install(database(incoming)).unwrap();

	// Assert
	assert_eq!(container.get::<String>().unwrap(), expected);
}

#[rstest]
fn test_reconcile_conflict(container: Container) {
	// Arrange
	container.install(database("postgres://a")).unwrap();

	// Act
	let result = container.install(database("postgres://b"));

	// Assert
	assert!(matches!(result, Err(DiError::DuplicateModule(_))));
	assert_eq!(container.get::<String>().unwrap(), "postgres://a");
}

#[rstest]
fn test_replace_fails_when_binding_changed(container: Container) {
	// Arrange
	container.install(FeatureModule::default()).unwrap();
	container
		.bind(Annotation::sequence("extra".to_string()))
		.unwrap();

	// Act
	let result = container.install(FeatureModule {
		features: vec!["search".to_string()],
	});

	// Assert
	match result {
		Err(DiError::ModuleRewind { binding, .. }) => {
			assert_eq!(binding, "alloc::vec::Vec<alloc::string::String>");
		}
		other => panic!("expected ModuleRewind, got {other:?}"),
	}
	assert!(container.is_installed::<FeatureModule>());
	assert_eq!(container.get::<Vec<String>>().unwrap(), vec!["extra"]);
}

#[rstest]
fn test_binder_helpers(container: Container) {
	// Act
	container.install(PluginsModule).unwrap();

	// Assert
	assert_eq!(
		container.get::<Vec<String>>().unwrap(),
		vec!["auth".to_string(), "cache".to_string()]
	);
	assert_eq!(
		container.get::<HashMap<String, u32>>().unwrap(),
		HashMap::from([("retries".to_string(), 3)])
	);
	assert_eq!(
		container.get::<UserName>().unwrap(),
		UserName("admin".to_string())
	);
}

#[rstest]
fn test_nested_install(container: Container) {
	// Act
	container.install(NestedModule).unwrap();

	// Assert
	assert!(container.is_installed::<NestedModule>());
	assert!(container.is_installed::<PluginsModule>());
	assert!(container.get::<bool>().unwrap());
}

#[rstest]
fn test_failing_module_is_not_installed(container: Container) {
	// Act
	let result = container.install(FailingModule);

	// Assert
	assert!(matches!(result, Err(DiError::DuplicateBinding("i8"))));
	assert!(!container.is_installed::<FailingModule>());
	assert_eq!(container.get::<i8>().unwrap(), 1);
}

#[rstest]
fn test_binder_injected_into_provider(container: Container) {
	// Arrange
	container
		.bind(|binder: Binder| binder.container().map(|c| c.id()).unwrap_or_default())
		.unwrap();

	// Act
	let id = container.get::<u64>().unwrap();

	// Assert
	assert_eq!(id, container.id());
}

#[rstest]
fn test_binder_outliving_container() {
	// Arrange
	let container = Container::new();
	let binder = container.binder();
	drop(container);

	// Act
	let result = binder.bind(1u8);

	// Assert
	assert!(matches!(result, Err(DiError::ContainerDropped)));
}

#[rstest]
fn test_failed_replace_restores_previous_module(container: Container) {
	// Arrange
	container
		.install(CacheModule {
			size: 64,
			broken: false,
		})
		.unwrap();

	// Act
	let result = container.install(CacheModule {
		size: 128,
		broken: true,
	});

	// Assert
	assert!(matches!(result, Err(DiError::DuplicateBinding("u32"))));
	assert!(container.is_installed::<CacheModule>());
	assert_eq!(container.get::<u32>().unwrap(), 64);
}

#[rstest]
fn test_restored_module_can_be_replaced_again(container: Container) {
	// Arrange
	container
		.install(CacheModule {
			size: 64,
			broken: false,
		})
		.unwrap();
	let _ = container.install(CacheModule {
		size: 128,
		broken: true,
	});

	// Act
	let result = container.install(CacheModule {
		size: 256,
		broken: false,
	});

	// Assert
	assert!(result.is_ok());
	assert_eq!(container.get::<u32>().unwrap(), 256);
}

#[rstest]
fn test_replace_keeps_bindings_made_by_other_threads(container: Container) {
	// Arrange
	container
		.install(TaggedModule {
			label: "first",
			background: Some(7),
		})
		.unwrap();

	// Act
	container
		.install(TaggedModule {
			label: "second",
			background: None,
		})
		.unwrap();

	// Assert
	assert_eq!(container.get::<String>().unwrap(), "second");
	assert_eq!(container.get::<u8>().unwrap(), 7);
}
