//! Member traits and the erased per-variant codec.
//!
//! # Role
//!
//! This module defines what a type must be to participate in a family:
//! [`Variant`] is the compile-time contract for concrete, tagged members,
//! [`Member`] is the object-safe view the dispatcher hands back from decode.
//! [`VariantCodec`] erases a variant's serde entry points behind plain `fn`
//! pointers so the store and dispatcher need no generic context.

use std::any::{Any, TypeId};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Compile-time requirements for a concrete, tagged variant type.
///
/// Blanket-implemented; any owned serde type qualifies.
pub trait Variant: Serialize + DeserializeOwned + Any + Send + Sync {}

impl<T> Variant for T where T: Serialize + DeserializeOwned + Any + Send + Sync {}

/// Object-safe view of a decoded family member.
pub trait Member: Any + Send + Sync {
	fn as_any(&self) -> &dyn Any;
	fn into_any(self: Box<Self>) -> Box<dyn Any>;
	fn type_name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn Member {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Member").field("type_name", &self.type_name()).finish()
	}
}

impl<T: Any + Send + Sync> Member for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Box<Self>) -> Box<dyn Any> {
		self
	}

	fn type_name(&self) -> &'static str {
		std::any::type_name::<T>()
	}
}

/// Identity of a registered type: stable id plus a diagnostic name.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TypeInfo {
	pub id: TypeId,
	pub name: &'static str,
}

impl TypeInfo {
	pub fn of<T: Any>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}
}

/// Erased encode/decode entry points for one variant type.
///
/// Built once at registration time. The first codec registered for a
/// `(type, tag)` pair wins; idempotent re-registration never replaces it.
pub(crate) struct VariantCodec {
	pub encode: fn(&dyn Any) -> Result<Value, serde_json::Error>,
	pub decode: fn(Value) -> Result<Box<dyn Member>, serde_json::Error>,
}

impl VariantCodec {
	pub(crate) fn of<T: Variant>() -> Self {
		Self {
			encode: encode_erased::<T>,
			decode: decode_erased::<T>,
		}
	}
}

fn encode_erased<T: Variant>(value: &dyn Any) -> Result<Value, serde_json::Error> {
	// The dispatcher selects the codec by the value's TypeId, so the
	// downcast cannot fail.
	let value = value
		.downcast_ref::<T>()
		.expect("variant codec invoked with a value of another type");
	serde_json::to_value(value)
}

fn decode_erased<T: Variant>(payload: Value) -> Result<Box<dyn Member>, serde_json::Error> {
	let value: T = serde_json::from_value(payload)?;
	Ok(Box::new(value))
}
