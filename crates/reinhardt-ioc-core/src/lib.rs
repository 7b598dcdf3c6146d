//! # Reinhardt IoC Core
//!
//! A run-time dependency injection container.
//!
//! ## Features
//!
//! - **Annotations**: bind literals, providers, singletons, sequences and mappings
//! - **Interfaces**: resolve `Arc<dyn Trait>` from any binding declared to implement it
//! - **Aggregation**: sequences and mappings merge across bindings, and interface
//!   collections gather every matching contribution
//! - **Scoping**: child containers shadow and fall back to their parent
//! - **Modules**: groups of bindings installed once, with reconciliation on reinstall
//! - **Validation**: check a call target against the bindings without building anything
//!
//! ## Development Tools (dev-tools feature)
//!
//! - **Inspection**: snapshot a container's dependency graph and list its cycles
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_ioc_core::{Annotation, Container, injectable, interface};
//! use std::sync::Arc;
//!
//! trait Stringer: Send + Sync {
//!     fn string(&self) -> String;
//! }
//! interface!(dyn Stringer);
//!
//! #[derive(Clone)]
//! struct Celsius(f64);
//!
//! impl Stringer for Celsius {
//!     fn string(&self) -> String {
//!         format!("{:.1}C", self.0)
//!     }
//! }
//! injectable!(Celsius => [dyn Stringer]);
//!
//! let container = Container::new();
//! container
//!     .bind(Annotation::sequence(|| vec![Celsius(20.0), Celsius(21.5)]))
//!     .unwrap();
//!
//! let report = container
//!     .call(|readings: Vec<Arc<dyn Stringer>>| {
//!         readings.iter().map(|r| r.string()).collect::<Vec<_>>().join(", ")
//!     })
//!     .unwrap();
//! assert_eq!(report, "20.0C, 21.5C");
//! ```

pub mod annotation;
pub mod binding;
pub mod callable;
pub mod config;
pub mod container;
pub mod cycle_detection;
pub mod descriptor;
pub mod error;
pub mod injectable;
mod macros;
pub mod module;
mod validation;
pub mod value;

// Development tools
#[cfg(feature = "dev-tools")]
pub mod graph;

pub use annotation::{Annotate, Annotation, AnnotationKind, AnnotationMarker, LiteralMarker, ProviderMarker};
pub use binding::Binding;
pub use callable::Callable;
pub use config::ContainerConfig;
pub use container::{Container, ContainerBuilder};
pub use descriptor::{ConcreteDescriptor, TypeDescriptor, TypeKind};
pub use error::{BoxError, DiError, DiResult};
pub use injectable::{Injectable, Interface};
pub use module::{Binder, Module, Reconciliation};
pub use value::Value;
