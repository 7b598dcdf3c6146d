//! Child container scoping tests

use reinhardt_ioc_core::{Annotation, Container, ContainerConfig};
use rstest::rstest;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[rstest]
fn test_child_falls_back_to_parent() {
	// Arrange
	let parent = Container::new();
	parent.bind("shared".to_string()).unwrap();
	let child = parent.child();

	// Act
	let value = child.get::<String>().unwrap();

	// Assert
	assert_eq!(value, "shared");
	assert!(!child.is_bound::<String>());
}

#[rstest]
fn test_child_shadows_parent() {
	// Arrange
	let parent = Container::new();
	parent.bind(1i32).unwrap();
	let child = parent.child();
	child.bind(2i32).unwrap();

	// Act & Assert
	assert_eq!(child.get::<i32>().unwrap(), 2);
	assert_eq!(parent.get::<i32>().unwrap(), 1);
}

#[rstest]
fn test_child_bindings_invisible_to_parent() {
	// Arrange
	let parent = Container::new();
	let child = parent.child();
	child.bind(true).unwrap();

	// Act
	let result = parent.get::<bool>();

	// Assert
	assert!(result.unwrap_err().is_unbound());
}

#[rstest]
fn test_parent_provider_resolves_against_parent() {
	// Arrange
	let parent = Container::new();
	parent.bind(10u32).unwrap();
	parent.bind(|n: u32| u64::from(n) * 2).unwrap();
	let child = parent.child();
	child.bind(99u32).unwrap();

	// Act
	let doubled = child.get::<u64>().unwrap();

	// Assert
	assert_eq!(doubled, 20);
}

#[rstest]
fn test_parent_singleton_shared_with_children() {
	// Arrange
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let parent = Container::new();
	parent
		.bind(Annotation::singleton(move || {
			counter.fetch_add(1, Ordering::SeqCst);
			"config".to_string()
		}))
		.unwrap();
	let first = parent.child();
	let second = parent.child();

	// Act
	first.get::<String>().unwrap();
	second.get::<String>().unwrap();
	parent.get::<String>().unwrap();

	// Assert
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_child_sequence_does_not_see_parent_sequence() {
	// Arrange
	let parent = Container::new();
	parent.bind(Annotation::sequence(1u8)).unwrap();
	let child = parent.child();
	child.bind(Annotation::sequence(2u8)).unwrap();

	// Act & Assert
	assert_eq!(child.get::<Vec<u8>>().unwrap(), vec![2]);
	assert_eq!(parent.get::<Vec<u8>>().unwrap(), vec![1]);
}

#[rstest]
fn test_child_inherits_configuration() {
	// Arrange
	let parent = Container::with_config(ContainerConfig {
		implicit_empty_collections: true,
		..ContainerConfig::default()
	});
	let child = parent.child();

	// Act
	let empty = child.get::<HashMap<String, String>>().unwrap();

	// Assert
	assert!(empty.is_empty());
	assert!(child.config().implicit_empty_collections);
	assert_eq!(child.parent().map(Container::id), Some(parent.id()));
}

#[rstest]
fn test_grandchild_resolves_through_chain() {
	// Arrange
	let root = Container::new();
	root.bind('r').unwrap();
	let middle = root.child();
	middle.bind(|c: char| c.to_string()).unwrap();
	let leaf = middle.child();

	// Act
	let value = leaf.get::<String>().unwrap();

	// Assert
	assert_eq!(value, "r");
}

#[rstest]
fn test_child_applies_its_own_empty_collection_setting() {
	// Arrange
	let parent = Container::new();
	parent.bind(Annotation::sequence(7u8)).unwrap();
	let child = Container::builder()
		.parent(parent.clone())
		.implicit_empty_collections(true)
		.build();

	// Act
	let inherited = child.get::<Vec<u8>>().unwrap();
	let empty = child.get::<HashMap<String, u16>>().unwrap();
	let from_parent = parent.get::<HashMap<String, u16>>();

	// Assert
	assert_eq!(inherited, vec![7]);
	assert!(empty.is_empty());
	assert!(from_parent.unwrap_err().is_unbound());
}
