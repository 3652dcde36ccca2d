//! Error taxonomy for the declaration, query, and wire boundaries.
//!
//! Declaration errors indicate programming mistakes and are meant to abort
//! the defining module's initialization (the `family!` macro panics on
//! them). Query and wire errors are recoverable conditions returned to the
//! immediate caller; the dispatcher never retries or suppresses them.

use thiserror::Error;

/// Declaration-time failures.
#[derive(Debug, Clone, Error)]
pub enum DeclareError {
	/// Tag was empty at variant declaration.
	#[error("tag for {type_name} must be a non-empty string")]
	InvalidTag { type_name: &'static str },

	/// Tag keyword was empty at family declaration.
	#[error("tag keyword for family {family:?} must be a non-empty string")]
	EmptyKeyword { family: &'static str },

	/// Tag already owned by a different type somewhere in the lineage.
	#[error(
		"tag {tag:?} in family {family:?} is already registered to {existing}, rejecting {incoming}"
	)]
	DuplicateTag {
		tag: String,
		family: &'static str,
		existing: &'static str,
		incoming: &'static str,
	},

	/// A family root was declared with a tag of its own.
	#[error("family root {family:?} must not carry a tag (got {tag:?})")]
	TaggedRoot { family: &'static str, tag: String },

	/// A derived family tried to change the lineage's tag keyword.
	#[error("family {family:?} cannot change the lineage tag keyword from {expected:?} to {got:?}")]
	KeywordMismatch {
		family: &'static str,
		expected: String,
		got: String,
	},

	/// A registered type was re-declared with a different tag.
	#[error("{type_name} is already registered as {existing_tag:?}, cannot rebind to {new_tag:?}")]
	ConflictingAttachment {
		type_name: &'static str,
		existing_tag: String,
		new_tag: String,
	},

	/// A type attempted to join a second, unrelated family lineage.
	#[error("{type_name} already belongs to the {existing:?} lineage, cannot join {incoming:?}")]
	ForeignLineage {
		type_name: &'static str,
		existing: &'static str,
		incoming: &'static str,
	},
}

/// Query-time failures.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
	#[error("no variant tagged {tag:?} in family {family:?}")]
	UnknownTag { tag: String, family: &'static str },

	#[error("{type_name} does not belong to any registry family")]
	NotInFamily { type_name: &'static str },
}

/// Encode-side wire failures.
#[derive(Debug, Error)]
pub enum EncodeError {
	#[error("failed to serialize {type_name}: {source}")]
	Serialize {
		type_name: &'static str,
		#[source]
		source: serde_json::Error,
	},

	/// The variant already carries the discriminator field with another value.
	#[error("field {keyword:?} on {type_name} holds {found}, expected tag {tag:?}")]
	TagFieldConflict {
		keyword: String,
		type_name: &'static str,
		tag: String,
		found: String,
	},

	/// Erased encode of a value whose type never joined this family.
	#[error("{type_name} is not a member of family {family:?}")]
	NotInFamily {
		type_name: &'static str,
		family: &'static str,
	},
}

/// Decode-side wire failures. Decode is all-or-nothing per payload.
#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("tagged payload must be a map, got {found}")]
	NotAMap { found: &'static str },

	#[error("payload is missing the {keyword:?} discriminator field")]
	MissingTag { keyword: String },

	#[error("discriminator field {keyword:?} must hold a string, got {found}")]
	InvalidTagValue {
		keyword: String,
		found: &'static str,
	},

	#[error("no variant tagged {tag:?} in family {family:?}")]
	UnknownTag { tag: String, family: &'static str },

	/// Permissive mode was handed an instance outside the family.
	#[error("{type_name} is not a member of family {family:?}")]
	ForeignInstance {
		type_name: &'static str,
		family: &'static str,
	},

	/// Downcast target did not match the decoded variant.
	#[error("payload decodes to {actual}, not {requested}")]
	WrongVariant {
		actual: &'static str,
		requested: &'static str,
	},

	#[error("variant {tag:?} failed to deserialize: {source}")]
	Variant {
		tag: String,
		#[source]
		source: serde_json::Error,
	},
}
