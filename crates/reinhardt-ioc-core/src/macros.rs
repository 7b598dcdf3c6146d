//! Declaration macros for injectable types and interfaces

/// Declares trait object types as injectable interfaces.
///
/// `interface!(dyn Trait)` implements [`Interface`](crate::Interface) for
/// `dyn Trait`, making `Arc<dyn Trait>` injectable.
///
/// # Examples
///
/// ```
/// use reinhardt_ioc_core::{TypeDescriptor, interface};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// interface!(dyn Clock);
///
/// assert!(TypeDescriptor::of::<Arc<dyn Clock>>().is_interface());
/// ```
#[macro_export]
macro_rules! interface {
	($($interface:ty),+ $(,)?) => {
		$(
			impl $crate::Interface for $interface {}
		)+
	};
}

/// Implements [`Injectable`](crate::Injectable) for concrete types.
///
/// Three forms are accepted:
///
/// - `injectable!(A, B)` for plain types,
/// - `injectable!(A => [dyn Trait, ...])` for a type implementing interfaces,
/// - `injectable!(A => [dyn Trait, ...], from [S, ...])` for a type that also
///   converts from other injectable types through `From`.
///
/// # Examples
///
/// ```
/// use reinhardt_ioc_core::{Container, injectable, interface};
/// use std::sync::Arc;
///
/// trait Stringer: Send + Sync {
///     fn string(&self) -> String;
/// }
/// interface!(dyn Stringer);
///
/// #[derive(Clone)]
/// struct Celsius(f64);
///
/// impl Stringer for Celsius {
///     fn string(&self) -> String {
///         format!("{}C", self.0)
///     }
/// }
///
/// injectable!(Celsius => [dyn Stringer]);
///
/// let container = Container::new();
/// container.bind(Celsius(21.5)).unwrap();
///
/// let stringer = container.get::<Arc<dyn Stringer>>().unwrap();
/// assert_eq!(stringer.string(), "21.5C");
/// ```
#[macro_export]
macro_rules! injectable {
	($ty:ty => [$($interface:ty),* $(,)?], from [$($from:ty),* $(,)?]) => {
		impl $crate::Injectable for $ty {
			fn descriptor() -> $crate::TypeDescriptor {
				$crate::TypeDescriptor::concrete::<Self>()
					$(
						.implementing(|value: $ty| {
							::std::sync::Arc::new(value) as ::std::sync::Arc<$interface>
						})
					)*
					$(.convertible_from::<$from>())*
					.build()
			}
		}
	};
	($ty:ty => [$($interface:ty),* $(,)?]) => {
		$crate::injectable!($ty => [$($interface),*], from []);
	};
	($($ty:ty),+ $(,)?) => {
		$(
			$crate::injectable!($ty => [], from []);
		)+
	};
}

#[cfg(test)]
mod tests {
	use crate::{Container, DiError, TypeDescriptor};
	use rstest::rstest;
	use std::sync::Arc;

	trait Greeter: Send + Sync {
		fn greet(&self) -> String;
	}

	interface!(dyn Greeter);

	#[derive(Clone, Debug, PartialEq)]
	struct English;

	impl Greeter for English {
		fn greet(&self) -> String {
			"hello".to_string()
		}
	}

	#[derive(Clone, Debug, PartialEq)]
	struct Name(String);

	impl From<String> for Name {
		fn from(value: String) -> Self {
			Name(value)
		}
	}

	#[derive(Clone, Debug, PartialEq)]
	struct Plain;

	injectable!(English => [dyn Greeter]);
	injectable!(Name => [], from [String]);
	injectable!(Plain);

	#[rstest]
	fn test_declared_interface_is_satisfied() {
		// Arrange
		let greeter = TypeDescriptor::of::<Arc<dyn Greeter>>();

		// Act & Assert
		assert!(TypeDescriptor::of::<English>().satisfies(&greeter));
		assert!(!TypeDescriptor::of::<Plain>().satisfies(&greeter));
	}

	#[rstest]
	fn test_declared_conversion_is_used_by_bind_to() {
		// Arrange
		let container = Container::new();

		// Act
		container.bind_to::<Name, _>("gopher".to_string()).unwrap();

		// Assert
		assert_eq!(container.get::<Name>().unwrap(), Name("gopher".to_string()));
	}

	#[rstest]
	fn test_undeclared_conversion_is_rejected() {
		// Arrange
		let container = Container::new();

		// Act
		let result = container.bind_to::<Plain, _>(1u8);

		// Assert
		assert!(matches!(result, Err(DiError::Conversion { .. })));
	}
}
