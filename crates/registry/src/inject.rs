//! Discriminator field injection.
//!
//! # Role
//!
//! Materializes the constant discriminator field on an encoded field map.
//! A variant that declares the keyword-named field itself is accepted only
//! when the existing value already equals the registered tag; running the
//! injection twice over the same map is therefore a no-op.

use serde_json::{Map, Value};

use crate::dispatch::value_kind;
use crate::error::EncodeError;

/// Adds `keyword: tag` to an encoded field map.
pub(crate) fn inject_tag(
	map: &mut Map<String, Value>,
	keyword: &str,
	tag: &str,
	type_name: &'static str,
) -> Result<(), EncodeError> {
	match map.get(keyword) {
		None => {
			map.insert(keyword.to_owned(), Value::String(tag.to_owned()));
			Ok(())
		}
		Some(Value::String(existing)) if existing == tag => Ok(()),
		Some(other) => Err(EncodeError::TagFieldConflict {
			keyword: keyword.to_owned(),
			type_name,
			tag: tag.to_owned(),
			found: match other {
				Value::String(s) => format!("{s:?}"),
				other => value_kind(other).to_owned(),
			},
		}),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::{Map, Value, json};

	use super::inject_tag;
	use crate::error::EncodeError;

	fn map_of(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => unreachable!(),
		}
	}

	#[test]
	fn inserts_the_tag_when_absent() {
		let mut map = map_of(json!({"content": "hi"}));
		inject_tag(&mut map, "type", "text", "Text").unwrap();
		assert_eq!(map.get("type"), Some(&json!("text")));
	}

	#[test]
	fn equal_existing_field_is_idempotent() {
		let mut map = map_of(json!({"type": "text", "content": "hi"}));
		inject_tag(&mut map, "type", "text", "Text").unwrap();
		inject_tag(&mut map, "type", "text", "Text").unwrap();
		assert_eq!(map.get("type"), Some(&json!("text")));
	}

	#[test]
	fn conflicting_existing_field_is_rejected() {
		let mut map = map_of(json!({"type": "image"}));
		let err = inject_tag(&mut map, "type", "text", "Text").unwrap_err();
		assert!(matches!(err, EncodeError::TagFieldConflict { .. }));

		let mut map = map_of(json!({"type": 9}));
		let err = inject_tag(&mut map, "type", "text", "Text").unwrap_err();
		assert!(matches!(err, EncodeError::TagFieldConflict { found, .. } if found == "number"));
	}
}
