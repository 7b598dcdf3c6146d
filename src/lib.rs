//! # Reinhardt IoC
//!
//! A run-time dependency injection container for Rust.
//!
//! Values are bound to a [`Container`] as annotated literals, providers,
//! singletons, sequences and mappings, then retrieved by type or injected into
//! the parameters of plain functions.
//!
//! ## Core Principles
//!
//! - **Explicit wiring**: every type a container can produce was bound, declared
//!   as an interface implementation, or aggregated from bindings
//! - **Plain functions**: providers and call targets are ordinary closures and
//!   `fn` items; their parameters are the dependency list
//! - **No surprises at build time**: [`Container::validate`] checks a call target
//!   against the bindings without running any provider
//!
//! ## Feature Flags
//!
//! - `dev-tools` - Dependency graph inspection
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_ioc::{Binder, Container, DiResult, Module};
//!
//! struct Settings {
//!     url: &'static str,
//! }
//!
//! impl Module for Settings {
//!     fn configure(&self, binder: &Binder) -> DiResult<()> {
//!         binder.bind(self.url.to_string())?;
//!         binder.provide(|url: String| url.starts_with("postgres://"))?;
//!         Ok(())
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .install(Settings {
//!         url: "postgres://localhost/app",
//!     })
//!     .unwrap();
//!
//! let is_postgres = container.call(|postgres: bool| postgres).unwrap();
//! assert!(is_postgres);
//! ```

pub use reinhardt_ioc_core::*;
