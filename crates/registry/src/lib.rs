//! Hierarchical tag registries with tagged-union serialization.
//!
//! A [`Family`] anchors a lineage of related variant types sharing a string
//! discriminator ("tag"). Variants register once, at declaration time; the
//! family then resolves tags to types, types to tags, and round-trips any
//! member through a self-describing map payload, without the caller knowing
//! which variant is present ahead of time.
//!
//! Derived families ([`Family::subfamily`]) narrow a lineage: their
//! registrations stay visible to every ancestor's full-resolution queries,
//! while each level's owned set covers only its own subtree. Tags are
//! unique across a whole lineage; unrelated lineages are fully isolated.
//!
//! Registration is expected during a single-threaded startup phase, but the
//! store is hardened anyway: writers serialize on a per-lineage lock and
//! publish immutable snapshots, so resolve/encode/decode stay lock-free.
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use typereg::Family;
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Text {
//!     content: String,
//! }
//!
//! let message = Family::create("Message");
//! message.register::<Text>("text")?;
//!
//! let payload = message.encode(&Text { content: "hi".into() })?;
//! assert_eq!(payload["type"], "text");
//!
//! let decoded: Text = message.decode_as(payload)?;
//! assert_eq!(decoded.content, "hi");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dispatch;
mod error;
mod family;
mod inject;
mod macros;
mod member;
mod store;

pub use dispatch::Coercible;
pub use error::{DeclareError, DecodeError, EncodeError, QueryError};
pub use family::{DEFAULT_KEYWORD, Declaration, Family, declare_family};
pub use member::{Member, TypeInfo, Variant};

#[cfg(test)]
mod tests;
