//! Call-time injection tests

use reinhardt_ioc_core::{Annotation, Container, DiError};
use rstest::{fixture, rstest};
use std::fmt;

#[derive(Debug)]
struct NotFound(String);

impl fmt::Display for NotFound {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} not found", self.0)
	}
}

impl std::error::Error for NotFound {}

#[fixture]
fn container() -> Container {
	let container = Container::new();
	container.bind("alice".to_string()).unwrap();
	container.bind(30u8).unwrap();
	container
}

fn describe(name: String, age: u8) -> String {
	format!("{name} ({age})")
}

#[rstest]
fn test_call_function_item(container: Container) {
	// Act
	let description = container.call(describe).unwrap();

	// Assert
	assert_eq!(description, "alice (30)");
}

#[rstest]
fn test_call_without_arguments(container: Container) {
	// Act
	let value = container.call(|| 5i32).unwrap();

	// Assert
	assert_eq!(value, 5);
}

#[rstest]
fn test_call_returns_unit(container: Container) {
	// Act
	let result = container.call(|_: String| ());

	// Assert
	assert!(result.is_ok());
}

#[rstest]
fn test_call_reports_failing_argument_position(container: Container) {
	// Act
	let result = container.call(|_: String, _: u8, _: bool| ());

	// Assert
	match result {
		Err(DiError::Argument {
			position,
			type_name,
			source,
			..
		}) => {
			assert_eq!(position, 3);
			assert_eq!(type_name, "bool");
			assert!(matches!(*source, DiError::Unbound("bool")));
		}
		other => panic!("expected Argument, got {other:?}"),
	}
}

#[rstest]
fn test_call_reports_nested_provider_failure(container: Container) {
	// Arrange
	container.bind(|flag: bool| u16::from(flag)).unwrap();

	// Act
	let error = container.call(|port: u16| port).unwrap_err();

	// Assert
	assert!(error.is_unbound());
	assert!(
		error
			.to_string()
			.starts_with("couldn't inject argument 1 (u16) of ")
	);
}

#[rstest]
fn test_try_call_passes_target_error_through(container: Container) {
	// Act
	let result = container.try_call(|name: String| -> Result<u8, NotFound> { Err(NotFound(name)) });

	// Assert
	match result {
		Err(DiError::Returned(error)) => {
			assert_eq!(error.to_string(), "alice not found");
			assert!(error.downcast_ref::<NotFound>().is_some());
		}
		other => panic!("expected Returned, got {other:?}"),
	}
}

#[rstest]
fn test_try_call_success(container: Container) {
	// Act
	let result = container.try_call(|age: u8| -> Result<u8, NotFound> { Ok(age + 1) });

	// Assert
	assert_eq!(result.unwrap(), 31);
}

#[rstest]
fn test_try_call_injection_failure_is_not_returned(container: Container) {
	// Act
	let result = container.try_call(|_: f64| -> Result<(), NotFound> { Ok(()) });

	// Assert
	assert!(matches!(result, Err(DiError::Argument { .. })));
}

#[rstest]
fn test_call_uses_provider_output(container: Container) {
	// Arrange
	container
		.bind(Annotation::provider(|name: String, age: u8| describe(name, age).len()))
		.unwrap();

	// Act
	let length = container.call(|len: usize| len).unwrap();

	// Assert
	assert_eq!(length, "alice (30)".len());
}

#[rstest]
fn test_get_value_by_descriptor(container: Container) {
	// Arrange
	let descriptor = reinhardt_ioc_core::TypeDescriptor::of::<u8>();

	// Act
	let value = container.get_value(&descriptor).unwrap();

	// Assert
	assert_eq!(value.downcast::<u8>(), Some(30));
	assert_eq!(value.type_name(), "u8");
}
