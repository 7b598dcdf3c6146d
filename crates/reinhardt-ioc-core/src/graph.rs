//! Dependency graph inspection for development and debugging
//!
//! A [`DependencyGraph`] is an in-memory snapshot of a container's bindings
//! (nodes) and their requirements (edges). It answers structural questions
//! such as which cycles exist or which requirements have no binding of their
//! own. It is not a serialization format.
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_ioc_core::{Annotation, Container};
//!
//! let container = Container::new();
//! container.bind(8080u16).unwrap();
//! container
//!     .bind(Annotation::singleton(|port: u16| format!("localhost:{port}")))
//!     .unwrap();
//!
//! let graph = container.dependency_graph();
//! assert_eq!(graph.dependencies_of("alloc::string::String"), vec!["u16"]);
//! assert!(graph.detect_cycles().is_empty());
//! ```

use crate::annotation::AnnotationKind;
use crate::container::Container;
use std::collections::{BTreeMap, HashSet};

/// A binding in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
	/// Name of the provided type
	pub name: String,
	/// Annotation the binding was created from
	pub kind: AnnotationKind,
	/// Id of the container owning the binding
	pub container: u64,
}

/// Requirement graph of a container and its ancestors
#[derive(Debug, Default)]
pub struct DependencyGraph {
	nodes: BTreeMap<String, GraphNode>,
	edges: Vec<(String, String)>,
}

impl Container {
	/// Snapshots this container and its ancestors as a [`DependencyGraph`].
	///
	/// A type bound both here and in an ancestor is shown once, as the
	/// binding this container would resolve.
	pub fn dependency_graph(&self) -> DependencyGraph {
		let mut graph = DependencyGraph::new();
		let mut scope = Some(self);
		while let Some(container) = scope {
			for binding in container.bindings() {
				let name = binding.provides().name();
				if graph.contains(name) {
					continue;
				}
				graph.add_node(name, binding.kind(), container.id());
				for requirement in binding.requires() {
					graph.add_dependency(name, requirement.name());
				}
			}
			scope = container.parent();
		}
		graph
	}
}

impl DependencyGraph {
	/// Create a new empty dependency graph
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a node to the graph
	///
	/// # Example
	///
	/// ```rust
	/// use reinhardt_ioc_core::AnnotationKind;
	/// use reinhardt_ioc_core::graph::DependencyGraph;
	///
	/// let mut graph = DependencyGraph::new();
	/// graph.add_node("Database", AnnotationKind::Singleton, 1);
	/// assert!(graph.contains("Database"));
	/// ```
	pub fn add_node(&mut self, name: impl Into<String>, kind: AnnotationKind, container: u64) {
		let name = name.into();
		self.nodes.insert(
			name.clone(),
			GraphNode {
				name,
				kind,
				container,
			},
		);
	}

	/// Add a dependency edge from `from` to `to`
	pub fn add_dependency(&mut self, from: impl Into<String>, to: impl Into<String>) {
		self.edges.push((from.into(), to.into()));
	}

	pub fn contains(&self, name: &str) -> bool {
		self.nodes.contains_key(name)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
		self.nodes.values()
	}

	pub fn edges(&self) -> &[(String, String)] {
		&self.edges
	}

	/// Direct requirements of `name`, in declaration order.
	pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
		self.edges
			.iter()
			.filter(|(from, _)| from == name)
			.map(|(_, to)| to.as_str())
			.collect()
	}

	/// Requirements with no node of their own, sorted.
	///
	/// These are resolved through an interface scan or an aggregate, or are
	/// not bound at all.
	pub fn unresolved(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self
			.edges
			.iter()
			.map(|(_, to)| to.as_str())
			.filter(|to| !self.nodes.contains_key(*to))
			.collect();
		names.sort_unstable();
		names.dedup();
		names
	}

	/// Lists the cycles reachable in the requirement graph.
	///
	/// Each cycle starts at the first node of it met by a depth-first walk
	/// over nodes in name order.
	///
	/// # Example
	///
	/// ```rust
	/// use reinhardt_ioc_core::AnnotationKind;
	/// use reinhardt_ioc_core::graph::DependencyGraph;
	///
	/// let mut graph = DependencyGraph::new();
	/// graph.add_node("A", AnnotationKind::Provider, 1);
	/// graph.add_node("B", AnnotationKind::Provider, 1);
	/// graph.add_dependency("A", "B");
	/// graph.add_dependency("B", "A");
	///
	/// assert_eq!(graph.detect_cycles(), vec![vec!["A".to_string(), "B".to_string()]]);
	/// ```
	pub fn detect_cycles(&self) -> Vec<Vec<String>> {
		let mut walk = CycleWalk {
			graph: self,
			finished: HashSet::new(),
			path: Vec::new(),
			cycles: Vec::new(),
		};
		for name in self.nodes.keys() {
			walk.visit(name);
		}
		walk.cycles
	}

	/// Get statistics about the dependency graph
	pub fn statistics(&self) -> GraphStatistics {
		let count = |kind: AnnotationKind| self.nodes.values().filter(|n| n.kind == kind).count();
		GraphStatistics {
			node_count: self.nodes.len(),
			edge_count: self.edges.len(),
			literal_count: count(AnnotationKind::Literal),
			provider_count: count(AnnotationKind::Provider),
			singleton_count: count(AnnotationKind::Singleton),
			collection_count: count(AnnotationKind::Sequence) + count(AnnotationKind::Mapping),
		}
	}
}

/// Depth-first cycle search state.
struct CycleWalk<'a> {
	graph: &'a DependencyGraph,
	finished: HashSet<&'a str>,
	path: Vec<&'a str>,
	cycles: Vec<Vec<String>>,
}

impl<'a> CycleWalk<'a> {
	fn visit(&mut self, name: &'a str) {
		if self.finished.contains(name) {
			return;
		}
		if let Some(start) = self.path.iter().position(|on_path| *on_path == name) {
			self.cycles
				.push(self.path[start..].iter().map(|n| n.to_string()).collect());
			return;
		}
		self.path.push(name);
		let graph = self.graph;
		for (from, to) in &graph.edges {
			if from == name {
				self.visit(to);
			}
		}
		self.path.pop();
		self.finished.insert(name);
	}
}

/// Statistics about a dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStatistics {
	/// Total number of nodes
	pub node_count: usize,
	/// Total number of edges
	pub edge_count: usize,
	/// Number of literal bindings
	pub literal_count: usize,
	/// Number of provider bindings called on every injection
	pub provider_count: usize,
	/// Number of singleton bindings
	pub singleton_count: usize,
	/// Number of sequence and mapping bindings
	pub collection_count: usize,
}
