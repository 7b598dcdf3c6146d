//! Property-based tests for binding and resolution
//!
//! Uses proptest to verify invariants of the container:
//! 1. Literal round-trip - a bound literal resolves to an equal value
//! 2. Sequence ordering - contributions concatenate in registration order
//! 3. Mapping overwrite - later contributions win per key
//! 4. Singleton memoization - a singleton is built once however often it is requested
//! 5. Child isolation - child bindings never leak into the parent

use proptest::prelude::*;
use reinhardt_ioc_core::{Annotation, Container};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn prop_literal_round_trip() {
	proptest!(|(value in any::<i64>(), text in ".*")| {
		let container = Container::new();
		container.bind(value).unwrap();
		container.bind(text.clone()).unwrap();

		prop_assert_eq!(container.get::<i64>().unwrap(), value);
		prop_assert_eq!(container.get::<String>().unwrap(), text);
	});
}

#[test]
fn prop_sequence_registration_order() {
	proptest!(|(chunks in prop::collection::vec(prop::collection::vec(any::<u32>(), 0..4), 1..6))| {
		let container = Container::new();
		for chunk in &chunks {
			container.bind(Annotation::sequence(chunk.clone())).unwrap();
		}

		let expected: Vec<u32> = chunks.concat();
		prop_assert_eq!(container.get::<Vec<u32>>().unwrap(), expected);
	});
}

#[test]
fn prop_mapping_later_entries_win() {
	proptest!(|(pairs in prop::collection::vec((0u8..8, any::<i32>()), 1..12))| {
		let container = Container::new();
		let mut expected = HashMap::new();
		for (key, value) in &pairs {
			container.bind(Annotation::mapping((*key, *value))).unwrap();
			expected.insert(*key, *value);
		}

		prop_assert_eq!(container.get::<HashMap<u8, i32>>().unwrap(), expected);
	});
}

#[test]
fn prop_singleton_built_once() {
	proptest!(|(requests in 1usize..20, children in 0usize..4)| {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		let container = Container::new();
		container
			.bind(Annotation::singleton(move || counter.fetch_add(1, Ordering::SeqCst) as u64))
			.unwrap();
		let scopes: Vec<Container> = (0..children).map(|_| container.child()).collect();

		for _ in 0..requests {
			prop_assert_eq!(container.get::<u64>().unwrap(), 0);
			for scope in &scopes {
				prop_assert_eq!(scope.get::<u64>().unwrap(), 0);
			}
		}
		prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
	});
}

#[test]
fn prop_child_bindings_isolated() {
	proptest!(|(parent_value in any::<u16>(), child_value in any::<u16>())| {
		let parent = Container::new();
		parent.bind(parent_value).unwrap();
		let child = parent.child();
		child.bind(child_value).unwrap();
		child.bind(Annotation::sequence(child_value)).unwrap();

		prop_assert_eq!(parent.get::<u16>().unwrap(), parent_value);
		prop_assert_eq!(child.get::<u16>().unwrap(), child_value);
		prop_assert!(parent.get::<Vec<u16>>().is_err());
	});
}
