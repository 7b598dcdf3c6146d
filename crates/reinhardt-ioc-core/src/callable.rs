//! Parameter reflection for plain Rust functions.
//!
//! [`Callable`] is implemented for every `Fn` of up to eight injectable
//! parameters. The `Args` type parameter is the tuple of parameter types; it
//! only exists to keep the implementations for different arities apart.

use crate::descriptor::TypeDescriptor;
use crate::error::{DiError, DiResult};
use crate::injectable::Injectable;
use crate::value::Value;

/// A function whose parameters can be resolved from a container.
pub trait Callable<Args>: Send + Sync + 'static {
	/// Return type of the function.
	type Output;

	/// Parameter types in declared order.
	fn parameters(&self) -> Vec<TypeDescriptor>;

	/// Invokes the function with already resolved arguments.
	///
	/// `arguments` must match [`parameters`](Callable::parameters) in length
	/// and order.
	fn invoke(&self, arguments: Vec<Value>) -> DiResult<Self::Output>;

	/// Name used in error messages.
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

fn next_argument<T: Injectable>(arguments: &mut impl Iterator<Item = Value>) -> DiResult<T> {
	let value = arguments.next().ok_or(DiError::TypeMismatch {
		expected: std::any::type_name::<T>(),
		actual: "<missing argument>",
	})?;
	value.downcast::<T>().ok_or(DiError::TypeMismatch {
		expected: std::any::type_name::<T>(),
		actual: value.type_name(),
	})
}

macro_rules! impl_callable {
	($($arg:ident),*) => {
		impl<Func, Out, $($arg,)*> Callable<($($arg,)*)> for Func
		where
			Func: Fn($($arg),*) -> Out + Send + Sync + 'static,
			$($arg: Injectable,)*
		{
			type Output = Out;

			fn parameters(&self) -> Vec<TypeDescriptor> {
				vec![$(TypeDescriptor::of::<$arg>()),*]
			}

			#[allow(non_snake_case, unused_mut, unused_variables)]
			fn invoke(&self, arguments: Vec<Value>) -> DiResult<Out> {
				let mut arguments = arguments.into_iter();
				$(let $arg = next_argument::<$arg>(&mut arguments)?;)*
				Ok(self($($arg),*))
			}
		}
	};
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);
impl_callable!(A1, A2, A3, A4, A5, A6, A7);
impl_callable!(A1, A2, A3, A4, A5, A6, A7, A8);
