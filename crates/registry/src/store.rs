//! Lineage-shared tag table with snapshot publication.
//!
//! # Role
//!
//! One [`Lineage`] exists per family lineage root. Every family level holds
//! an `Arc` to it plus a level path; narrowing ("owned entries") queries
//! filter by owner path instead of copying data, so a tag registered after a
//! derived family is created still becomes visible to ancestors without a
//! broadcast step. Writers serialize on a mutex and publish a fresh
//! snapshot; readers load the current snapshot atomically and never block.
//!
//! # Invariants
//!
//! - `by_tag` and `by_type` are mutual inverses over the entry set.
//! - Entries are append-only; a published snapshot is never mutated.
//! - An entry's owner path always starts at the lineage root (`0`).

use std::any::TypeId;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::DeclareError;
use crate::member::{TypeInfo, VariantCodec};

/// Dense path from the lineage root to a family level.
///
/// The root is `[0]`; each derived family appends a fresh component. A level
/// owns an entry iff its path is a prefix of the entry owner's path.
pub(crate) type LevelPath = Arc<[u32]>;

pub(crate) fn is_prefix(prefix: &[u32], path: &[u32]) -> bool {
	path.len() >= prefix.len() && &path[..prefix.len()] == prefix
}

/// One registered variant.
pub(crate) struct Entry {
	pub tag: Box<str>,
	pub ty: TypeInfo,
	pub owner: LevelPath,
	pub codec: VariantCodec,
}

/// Immutable view of a lineage's registrations.
pub(crate) struct Snapshot {
	by_tag: FxHashMap<Box<str>, Arc<Entry>>,
	by_type: FxHashMap<TypeId, Arc<Entry>>,
}

impl Snapshot {
	fn empty() -> Self {
		Self {
			by_tag: FxHashMap::default(),
			by_type: FxHashMap::default(),
		}
	}

	/// Full resolution: any tag registered anywhere in the lineage.
	pub fn resolve(&self, tag: &str) -> Option<&Arc<Entry>> {
		self.by_tag.get(tag)
	}

	/// Inverse of [`Snapshot::resolve`], scoped the same way.
	pub fn reverse_resolve(&self, id: TypeId) -> Option<&Arc<Entry>> {
		self.by_type.get(&id)
	}

	/// Entries owned by `level`: registered at that level or below it.
	pub fn owned<'a>(&'a self, level: &'a [u32]) -> impl Iterator<Item = &'a Arc<Entry>> {
		self.by_tag
			.values()
			.filter(move |entry| is_prefix(level, &entry.owner))
	}

}

/// Shared state of one family lineage.
pub(crate) struct Lineage {
	/// Lineage root name, for diagnostics.
	pub label: &'static str,
	keyword: Box<str>,
	snap: ArcSwap<Snapshot>,
	/// Next derived-level component; doubles as the registration lock.
	/// Reads never take it.
	write: Mutex<u32>,
}

impl Lineage {
	pub fn new(label: &'static str, keyword: &str) -> Arc<Self> {
		Arc::new(Self {
			label,
			keyword: keyword.into(),
			snap: ArcSwap::from_pointee(Snapshot::empty()),
			write: Mutex::new(1),
		})
	}

	pub fn keyword(&self) -> &str {
		&self.keyword
	}

	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.snap.load_full()
	}

	/// Allocates the next level component for a derived family.
	pub fn next_level(&self) -> u32 {
		let mut next = self.write.lock();
		let level = *next;
		*next += 1;
		level
	}

	/// Registers `(tag, type)` at `owner`, publishing a fresh snapshot.
	///
	/// Idempotent for a repeated `(tag, type)` pair; the first codec wins.
	/// The pair becomes visible at `owner` and at every ancestor level.
	pub fn register(
		&self,
		tag: &str,
		ty: TypeInfo,
		owner: &LevelPath,
		codec: VariantCodec,
	) -> Result<(), DeclareError> {
		let _write = self.write.lock();
		let old = self.snap.load_full();

		if let Some(existing) = old.by_tag.get(tag) {
			if existing.ty.id == ty.id {
				return Ok(());
			}
			return Err(DeclareError::DuplicateTag {
				tag: tag.to_owned(),
				family: self.label,
				existing: existing.ty.name,
				incoming: ty.name,
			});
		}
		if let Some(existing) = old.by_type.get(&ty.id) {
			return Err(DeclareError::ConflictingAttachment {
				type_name: ty.name,
				existing_tag: existing.tag.to_string(),
				new_tag: tag.to_owned(),
			});
		}

		let entry = Arc::new(Entry {
			tag: tag.into(),
			ty,
			owner: owner.clone(),
			codec,
		});
		let mut by_tag = old.by_tag.clone();
		let mut by_type = old.by_type.clone();
		by_tag.insert(entry.tag.clone(), entry.clone());
		by_type.insert(ty.id, entry);
		self.snap.store(Arc::new(Snapshot { by_tag, by_type }));

		tracing::debug!(family = self.label, tag, variant = ty.name, "registered variant");
		Ok(())
	}
}
