//! Injectable and Interface traits

use crate::descriptor::TypeDescriptor;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// A type that can be bound in and resolved from a [`Container`](crate::Container).
///
/// Resolution hands out clones, so injectable types are cheap to clone or
/// wrapped in `Arc`. Implementations describe the type's structure through
/// [`TypeDescriptor`]; most user types use the [`injectable!`](crate::injectable)
/// macro instead of implementing this by hand.
///
/// # Built-in implementations
///
/// - primitives, `String` and `&'static str`
/// - `Option<T>` (convertible from `T`)
/// - `Vec<T>` (a sequence of `T`)
/// - `HashMap<K, V>` (a mapping from `K` to `V`)
/// - `(K, V)` (a pair that may contribute to `HashMap<K, V>`)
/// - `Arc<dyn Trait>` for every trait declared with [`interface!`](crate::interface)
pub trait Injectable: Clone + Send + Sync + 'static {
	/// Describes `Self`.
	///
	/// Call [`TypeDescriptor::of`] instead of this to get the cached descriptor.
	fn descriptor() -> TypeDescriptor;
}

/// Marks a trait object type as an injectable interface.
///
/// Implement it for `dyn Trait` (or use [`interface!`](crate::interface)); the
/// injectable value is then `Arc<dyn Trait>`.
pub trait Interface: Send + Sync + 'static {}

impl<I: ?Sized + Interface> Injectable for Arc<I> {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::interface::<I>()
	}
}

impl<T: Injectable> Injectable for Vec<T> {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::sequence::<T>()
	}
}

impl<K, V> Injectable for HashMap<K, V>
where
	K: Injectable + Eq + Hash,
	V: Injectable,
{
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::mapping::<K, V>()
	}
}

impl<K, V> Injectable for (K, V)
where
	K: Injectable + Eq + Hash,
	V: Injectable,
{
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::concrete::<Self>().pair().build()
	}
}

impl<T: Injectable> Injectable for Option<T> {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::concrete::<Self>()
			.convertible_from::<T>()
			.build()
	}
}

macro_rules! impl_injectable {
	($($ty:ty $(=> [$($from:ty),+ $(,)?])?),+ $(,)?) => {
		$(
			impl Injectable for $ty {
				fn descriptor() -> TypeDescriptor {
					TypeDescriptor::concrete::<Self>()
						$($(.convertible_from::<$from>())+)?
						.build()
				}
			}
		)+
	};
}

impl_injectable!(
	bool,
	char,
	i8,
	u8,
	f32,
	&'static str,
	i16 => [i8, u8],
	u16 => [u8],
	i32 => [i8, u8, i16, u16],
	u32 => [u8, u16, char],
	i64 => [i8, u8, i16, u16, i32, u32],
	u64 => [u8, u16, u32],
	i128 => [i8, u8, i16, u16, i32, u32, i64, u64],
	u128 => [u8, u16, u32, u64],
	isize => [i8, u8, i16],
	usize => [u8, u16],
	f64 => [f32, i8, u8, i16, u16, i32, u32],
	String => [&'static str, char],
);
