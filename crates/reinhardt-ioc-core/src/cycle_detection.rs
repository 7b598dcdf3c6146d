//! Thread-local circular dependency detection
//!
//! Every build of a binding runs under a [`ResolutionGuard`]. The guard records
//! the binding's key in a thread-local resolution stack and removes it again on
//! drop, whether the build succeeded or failed.
//!
//! ## Features
//!
//! - **O(1) Circular Detection**: `HashSet` lookup of the key being resolved
//! - **Thread-local**: concurrent resolutions on different threads never see
//!   each other's in-flight keys, so they cannot report false cycles
//! - **Scoped keys**: keys carry the owning container's id, so a child that
//!   shadows a parent type is tracked separately from the parent's binding
//! - **Depth Limiting**: a configurable maximum depth turns runaway recursion
//!   into an error instead of a stack overflow
//! - **RAII**: automatic cleanup via [`ResolutionGuard`]

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Default maximum resolution depth.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 100;

/// Identity of one binding under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
	/// Id of the container owning the binding.
	pub scope: u64,
	/// Type provided by the binding.
	pub type_id: TypeId,
}

impl ResolutionKey {
	pub fn new(scope: u64, type_id: TypeId) -> Self {
		Self { scope, type_id }
	}
}

/// A stack of keys under resolution with O(1) membership checks.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
	/// Set of keys currently being resolved
	resolution_set: HashSet<ResolutionKey>,
	/// Resolution path (for displaying circular paths)
	resolution_path: Vec<(ResolutionKey, &'static str)>,
}

impl ResolutionStack {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn depth(&self) -> usize {
		self.resolution_path.len()
	}

	pub(crate) fn contains(&self, key: &ResolutionKey) -> bool {
		self.resolution_set.contains(key)
	}

	/// Pushes `key`, failing if it is already on the stack or the stack is full.
	pub(crate) fn enter(
		&mut self,
		key: ResolutionKey,
		type_name: &'static str,
		max_depth: usize,
	) -> Result<(), CycleError> {
		if self.resolution_set.contains(&key) {
			return Err(CycleError::CircularDependency {
				type_name: type_name.to_string(),
				path: self.cycle_path(&key, type_name),
			});
		}
		let depth = self.resolution_path.len() + 1;
		if depth > max_depth {
			return Err(CycleError::MaxDepthExceeded(depth));
		}
		self.resolution_set.insert(key);
		self.resolution_path.push((key, type_name));
		Ok(())
	}

	pub(crate) fn exit(&mut self, key: &ResolutionKey) {
		self.resolution_set.remove(key);
		if let Some(pos) = self.resolution_path.iter().rposition(|(k, _)| k == key) {
			self.resolution_path.remove(pos);
		}
	}

	/// Renders the cycle closed by `key` (format: A -> B -> C -> A).
	fn cycle_path(&self, key: &ResolutionKey, type_name: &'static str) -> String {
		match self.resolution_path.iter().position(|(k, _)| k == key) {
			Some(cycle_start) => {
				let cycle: Vec<&str> = self.resolution_path[cycle_start..]
					.iter()
					.map(|(_, name)| *name)
					.collect();
				format!("{} -> {}", cycle.join(" -> "), type_name)
			}
			None => format!("Unknown cycle involving {}", type_name),
		}
	}
}

thread_local! {
	static CYCLE_STATE: RefCell<ResolutionStack> = RefCell::new(ResolutionStack::new());
}

/// Record the start of a resolution.
///
/// The returned guard removes `key` from the thread's resolution stack when
/// dropped.
pub fn begin_resolution(
	key: ResolutionKey,
	type_name: &'static str,
	max_depth: usize,
) -> Result<ResolutionGuard, CycleError> {
	CYCLE_STATE.with(|state| state.borrow_mut().enter(key, type_name, max_depth))?;
	Ok(ResolutionGuard {
		key,
		_not_send: PhantomData,
	})
}

/// Returns `true` if `key` is under resolution on the current thread.
pub fn is_resolving(key: &ResolutionKey) -> bool {
	CYCLE_STATE.with(|state| state.borrow().contains(key))
}

/// Current resolution depth on this thread.
pub fn resolution_depth() -> usize {
	CYCLE_STATE.with(|state| state.borrow().depth())
}

/// RAII guard: Automatic cleanup on Drop
///
/// The guard is tied to the thread that created it.
#[derive(Debug)]
pub struct ResolutionGuard {
	key: ResolutionKey,
	_not_send: PhantomData<*const ()>,
}

impl Drop for ResolutionGuard {
	fn drop(&mut self) {
		// The state may already be gone during thread teardown.
		let _ = CYCLE_STATE.try_with(|state| state.borrow_mut().exit(&self.key));
	}
}

/// Circular dependency error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
	/// Circular dependency detected
	#[error(
		"Circular dependency detected: {type_name}\n  Path: {path}\nThis forms a cycle that cannot be resolved."
	)]
	CircularDependency {
		/// Name of the type involved in the cycle
		type_name: String,
		/// Circular path (format: A -> B -> C -> A)
		path: String,
	},

	/// Maximum resolution depth exceeded
	#[error(
		"Maximum resolution depth exceeded: {0}\nThis likely indicates an extremely deep or circular dependency chain."
	)]
	MaxDepthExceeded(usize),
}
