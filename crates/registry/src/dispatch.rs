//! Tagged-union encode/decode over `serde_json` values.
//!
//! # Role
//!
//! The dispatcher reads the lineage snapshot on demand (never cached) and
//! routes between the family's variants: encode serializes through the
//! variant's own codec and injects the discriminator; decode reads the
//! discriminator, resolves it lineage-wide, and delegates the remaining
//! fields to the resolved variant's decoder.
//!
//! # Invariants
//!
//! - Decode is all-or-nothing per payload and never mutates registry state.
//! - Tags are globally unique per lineage, so decode needs exactly one
//!   resolve call; there is never a candidate search.

use std::any::{Any, TypeId};

use serde::Serialize;
use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::family::Family;
use crate::inject::inject_tag;
use crate::member::Member;
use crate::store::Entry;

/// Input accepted by the permissive decode path.
pub enum Coercible {
	/// An already-constructed member, passed through after a membership check.
	Instance(Box<dyn Member>),
	/// A tagged payload map, decoded as in strict mode.
	Payload(Value),
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "map",
	}
}

impl Family {
	/// Encodes `value`, injecting the discriminator when its type is a
	/// registered variant anywhere in the lineage.
	///
	/// Types outside the lineage pass through the default serde encoding
	/// unchanged, as do registered variants whose encoding is not a map
	/// (the wire contract only covers map-shaped variants).
	pub fn encode<T: Serialize + Any>(&self, value: &T) -> Result<Value, EncodeError> {
		let encoded = serde_json::to_value(value).map_err(|source| EncodeError::Serialize {
			type_name: std::any::type_name::<T>(),
			source,
		})?;
		let snap = self.node.lineage.snapshot();
		match snap.reverse_resolve(TypeId::of::<T>()) {
			Some(entry) => self.finish_encode(encoded, entry.as_ref()),
			None => Ok(encoded),
		}
	}

	/// Encodes a type-erased member, typically one returned by
	/// [`Family::decode`]. Unlike [`Family::encode`] there is no
	/// pass-through: a type outside the lineage is an error.
	pub fn encode_member(&self, member: &dyn Member) -> Result<Value, EncodeError> {
		let snap = self.node.lineage.snapshot();
		let Some(entry) = snap.reverse_resolve(member.as_any().type_id()) else {
			return Err(EncodeError::NotInFamily {
				type_name: member.type_name(),
				family: self.name(),
			});
		};
		let encoded =
			(entry.codec.encode)(member.as_any()).map_err(|source| EncodeError::Serialize {
				type_name: entry.ty.name,
				source,
			})?;
		self.finish_encode(encoded, entry.as_ref())
	}

	fn finish_encode(&self, encoded: Value, entry: &Entry) -> Result<Value, EncodeError> {
		match encoded {
			Value::Object(mut map) => {
				inject_tag(&mut map, self.keyword(), &entry.tag, entry.ty.name)?;
				Ok(Value::Object(map))
			}
			other => Ok(other),
		}
	}

	/// Strict decode: only tagged payload maps are accepted.
	///
	/// The discriminator key is stripped before the remaining fields are
	/// delegated to the resolved variant's decoder.
	pub fn decode(&self, payload: Value) -> Result<Box<dyn Member>, DecodeError> {
		let Value::Object(mut map) = payload else {
			return Err(DecodeError::NotAMap {
				found: value_kind(&payload),
			});
		};
		let keyword = self.keyword();
		let Some(tag_value) = map.remove(keyword) else {
			return Err(DecodeError::MissingTag {
				keyword: keyword.to_owned(),
			});
		};
		let Value::String(tag) = tag_value else {
			return Err(DecodeError::InvalidTagValue {
				keyword: keyword.to_owned(),
				found: value_kind(&tag_value),
			});
		};
		let snap = self.node.lineage.snapshot();
		let Some(entry) = snap.resolve(&tag) else {
			return Err(DecodeError::UnknownTag {
				tag,
				family: self.name(),
			});
		};
		(entry.codec.decode)(Value::Object(map))
			.map_err(|source| DecodeError::Variant { tag, source })
	}

	/// Permissive decode: accepts an already-constructed member as-is, or a
	/// tagged payload map decoded as in strict mode.
	pub fn coerce(&self, input: Coercible) -> Result<Box<dyn Member>, DecodeError> {
		match input {
			Coercible::Instance(member) => {
				let snap = self.node.lineage.snapshot();
				if snap.reverse_resolve(member.as_any().type_id()).is_none() {
					return Err(DecodeError::ForeignInstance {
						type_name: member.type_name(),
						family: self.name(),
					});
				}
				Ok(member)
			}
			Coercible::Payload(payload) => self.decode(payload),
		}
	}

	/// Strict decode followed by a downcast to the expected variant.
	pub fn decode_as<T: Any>(&self, payload: Value) -> Result<T, DecodeError> {
		let member = self.decode(payload)?;
		let actual = member.type_name();
		member
			.into_any()
			.downcast::<T>()
			.map(|boxed| *boxed)
			.map_err(|_| DecodeError::WrongVariant {
				actual,
				requested: std::any::type_name::<T>(),
			})
	}
}
