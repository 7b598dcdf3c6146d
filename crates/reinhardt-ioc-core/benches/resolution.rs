//! Benchmark: Resolution cost per annotation kind

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use reinhardt_ioc_core::{Annotation, Container, injectable, interface};
use std::sync::Arc;

trait Repository: Send + Sync {
	fn table(&self) -> &str;
}

interface!(dyn Repository);

// Benchmark fixture: concrete repository resolved through its interface
#[derive(Clone)]
struct UserRepository {
	table: String,
}

impl Repository for UserRepository {
	fn table(&self) -> &str {
		&self.table
	}
}

injectable!(UserRepository => [dyn Repository]);

fn container() -> Container {
	let container = Container::new();
	container.bind("users".to_string()).unwrap();
	container.bind(8u32).unwrap();
	container
		.bind(Annotation::singleton(|table: String| UserRepository { table }))
		.unwrap();
	container
		.bind(|table: String, size: u32| format!("{table}:{size}").len())
		.unwrap();
	for n in 0..10u64 {
		container.bind(Annotation::sequence(n)).unwrap();
	}
	container
}

fn benchmark_literal(c: &mut Criterion) {
	let container = container();

	c.bench_function("get_literal", |b| {
		b.iter(|| black_box(container.get::<u32>().unwrap()));
	});
}

fn benchmark_provider(c: &mut Criterion) {
	let container = container();

	c.bench_function("get_provider_two_arguments", |b| {
		b.iter(|| black_box(container.get::<usize>().unwrap()));
	});
}

fn benchmark_singleton(c: &mut Criterion) {
	let container = container();

	c.bench_function("get_memoized_singleton", |b| {
		b.iter(|| black_box(container.get::<UserRepository>().unwrap()));
	});
}

fn benchmark_interface(c: &mut Criterion) {
	let container = container();

	c.bench_function("get_interface_scan", |b| {
		b.iter(|| black_box(container.get::<Arc<dyn Repository>>().unwrap().table().len()));
	});
}

fn benchmark_sequence_chain(c: &mut Criterion) {
	let container = container();

	c.bench_function("get_sequence_chain_10", |b| {
		b.iter(|| black_box(container.get::<Vec<u64>>().unwrap()));
	});
}

fn benchmark_child_fallback(c: &mut Criterion) {
	let container = container();
	let child = container.child().child();

	c.bench_function("get_through_two_parents", |b| {
		b.iter(|| black_box(child.get::<u32>().unwrap()));
	});
}

fn benchmark_validate(c: &mut Criterion) {
	let container = container();
	let target = |size: usize, repository: Arc<dyn Repository>| size + repository.table().len();

	c.bench_function("validate_target", |b| {
		b.iter(|| black_box(container.validate(&target).is_ok()));
	});
}

criterion_group!(
	benches,
	benchmark_literal,
	benchmark_provider,
	benchmark_singleton,
	benchmark_interface,
	benchmark_sequence_chain,
	benchmark_child_fallback,
	benchmark_validate
);
criterion_main!(benches);
