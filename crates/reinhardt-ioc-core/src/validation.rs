//! Static validation
//!
//! Validation replays resolution over the `requires` of bindings without
//! running any build function, so no provider is called and no singleton is
//! memoized. It reports the first unresolvable requirement and, unlike a plain
//! resolvability check, also the first cycle in the requirement graph.

use crate::binding::Binding;
use crate::callable::Callable;
use crate::container::Container;
use crate::cycle_detection::{ResolutionKey, ResolutionStack};
use crate::error::{DiError, DiResult};
use std::collections::HashSet;

impl Container {
	/// Checks that `target` could be called.
	///
	/// Every binding of this container must have resolvable requirements, then
	/// every parameter of `target` must be resolvable.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_ioc_core::Container;
	///
	/// let container = Container::new();
	/// container.bind(|port: u16| format!("localhost:{port}")).unwrap();
	///
	/// let target = |address: String| address;
	/// assert!(container.validate(&target).is_err());
	///
	/// container.bind(8080u16).unwrap();
	/// assert!(container.validate(&target).is_ok());
	/// ```
	pub fn validate<Args, F>(&self, target: &F) -> DiResult<()>
	where
		F: Callable<Args>,
	{
		let mut validator = Validator::new(self.config().max_resolution_depth);
		validator.check_table(self)?;
		let name = target.name();
		for parameter in target.parameters() {
			let resolution = self
				.resolve(&parameter)
				.map_err(|source| DiError::Unsatisfied {
					requirement: parameter.name(),
					required_by: name,
					source: Box::new(source),
				})?;
			validator.visit(&resolution.owner, &resolution.binding, resolution.key())?;
		}
		Ok(())
	}

	/// Checks every binding of this container without a call target.
	pub fn validate_all(&self) -> DiResult<()> {
		Validator::new(self.config().max_resolution_depth).check_table(self)
	}
}

struct Validator {
	stack: ResolutionStack,
	verified: HashSet<ResolutionKey>,
	max_depth: usize,
}

impl Validator {
	fn new(max_depth: usize) -> Self {
		Self {
			stack: ResolutionStack::new(),
			verified: HashSet::new(),
			max_depth,
		}
	}

	fn check_table(&mut self, container: &Container) -> DiResult<()> {
		for binding in container.bindings() {
			let key = ResolutionKey::new(container.id(), binding.provides().id());
			self.visit(container, &binding, key)?;
		}
		Ok(())
	}

	/// Depth-first walk over the requirements of `binding`.
	fn visit(&mut self, owner: &Container, binding: &Binding, key: ResolutionKey) -> DiResult<()> {
		if self.verified.contains(&key) {
			return Ok(());
		}
		self.stack
			.enter(key, binding.provides().name(), self.max_depth)?;
		let result = self.visit_requirements(owner, binding);
		self.stack.exit(&key);
		result?;
		self.verified.insert(key);
		Ok(())
	}

	fn visit_requirements(&mut self, owner: &Container, binding: &Binding) -> DiResult<()> {
		for requirement in binding.requires() {
			let resolution = owner
				.resolve(requirement)
				.map_err(|source| DiError::Unsatisfied {
					requirement: requirement.name(),
					required_by: binding.provides().name(),
					source: Box::new(source),
				})?;
			self.visit(&resolution.owner, &resolution.binding, resolution.key())?;
		}
		Ok(())
	}
}
