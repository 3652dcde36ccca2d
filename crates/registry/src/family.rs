//! Family handles and the declaration lifecycle.
//!
//! # Role
//!
//! A [`Family`] is an explicitly constructed handle to one level of a
//! registry lineage. Creating a family anchors a fresh lineage;
//! [`Family::subfamily`] layers a derived level over an existing one.
//! Variant and intermediate declarations go through the handle and happen
//! once, at type-definition time.
//!
//! # Invariants
//!
//! - The tag keyword is fixed when the lineage is created.
//! - A type joins at most one lineage, enforced by the global claims table.
//! - Registration is append-only; nothing is ever unregistered.

use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{DeclareError, QueryError};
use crate::member::{Member, TypeInfo, Variant, VariantCodec};
use crate::store::{LevelPath, Lineage, is_prefix};

/// Default discriminator field name for new lineages.
pub const DEFAULT_KEYWORD: &str = "type";

/// Handle to one level of a registry lineage. Cheap to clone.
#[derive(Clone)]
pub struct Family {
	pub(crate) node: Arc<FamilyNode>,
}

pub(crate) struct FamilyNode {
	pub name: &'static str,
	pub path: LevelPath,
	pub parent: Option<Arc<FamilyNode>>,
	pub lineage: Arc<Lineage>,
}

/// What a declaration under a family means.
///
/// Decided explicitly by the declaring caller rather than inferred from
/// base-type position.
#[derive(Clone, Copy, Debug)]
pub enum Declaration<'a> {
	/// Abstract chain participant; no tag, no codec, not a wire endpoint.
	Intermediate,
	/// Concrete, serializable variant with its lineage-unique tag.
	Variant(&'a str),
}

/// Membership claim pinning a type to the family it registered under.
struct Claim {
	family: Arc<FamilyNode>,
}

static CLAIMS: LazyLock<Mutex<FxHashMap<TypeId, Claim>>> =
	LazyLock::new(|| Mutex::new(FxHashMap::default()));

/// Declares a family root, either anchoring a fresh lineage or layering a
/// derived level over `ancestor`.
///
/// Roots must never carry a tag; a derived root cannot change the lineage's
/// keyword. Prefer [`Family::create`], [`Family::create_with_keyword`], and
/// [`Family::subfamily`] unless the declaration is driven by external input.
pub fn declare_family(
	name: &'static str,
	ancestor: Option<&Family>,
	keyword: Option<&str>,
	tag: Option<&str>,
) -> Result<Family, DeclareError> {
	if let Some(tag) = tag {
		return Err(DeclareError::TaggedRoot {
			family: name,
			tag: tag.to_owned(),
		});
	}
	match ancestor {
		None => Family::create_with_keyword(name, keyword.unwrap_or(DEFAULT_KEYWORD)),
		Some(parent) => {
			if let Some(kw) = keyword {
				if kw != parent.keyword() {
					return Err(DeclareError::KeywordMismatch {
						family: name,
						expected: parent.keyword().to_owned(),
						got: kw.to_owned(),
					});
				}
			}
			Ok(parent.subfamily(name))
		}
	}
}

impl Family {
	/// Anchors a fresh lineage with the default keyword.
	pub fn create(name: &'static str) -> Family {
		Self::new_root(name, DEFAULT_KEYWORD)
	}

	/// Anchors a fresh lineage with a custom tag keyword.
	pub fn create_with_keyword(name: &'static str, keyword: &str) -> Result<Family, DeclareError> {
		if keyword.is_empty() {
			return Err(DeclareError::EmptyKeyword { family: name });
		}
		Ok(Self::new_root(name, keyword))
	}

	fn new_root(name: &'static str, keyword: &str) -> Family {
		tracing::debug!(family = name, keyword, "declared lineage root");
		Family {
			node: Arc::new(FamilyNode {
				name,
				path: Arc::from(vec![0u32]),
				parent: None,
				lineage: Lineage::new(name, keyword),
			}),
		}
	}

	/// Declares a derived family layered over this level.
	///
	/// Variants registered under the child are visible to this level's
	/// full-resolution queries; the child's owned set stays its own.
	pub fn subfamily(&self, name: &'static str) -> Family {
		let level = self.node.lineage.next_level();
		let mut path = self.node.path.to_vec();
		path.push(level);
		tracing::debug!(family = name, parent = self.node.name, "declared derived family");
		Family {
			node: Arc::new(FamilyNode {
				name,
				path: Arc::from(path),
				parent: Some(self.node.clone()),
				lineage: self.node.lineage.clone(),
			}),
		}
	}

	/// Declares `T` under this family, with the kind made explicit.
	pub fn declare<T: Variant>(&self, decl: Declaration<'_>) -> Result<(), DeclareError> {
		match decl {
			Declaration::Intermediate => self.register_intermediate::<T>(),
			Declaration::Variant(tag) => self.register::<T>(tag),
		}
	}

	/// Registers the concrete variant `T` with `tag`.
	///
	/// Idempotent for a repeated `(T, tag)` pair. Fails on an empty tag, a
	/// tag owned elsewhere in the lineage, rebinding `T` to a new tag, or a
	/// `T` that already joined an unrelated lineage.
	pub fn register<T: Variant>(&self, tag: &str) -> Result<(), DeclareError> {
		let ty = TypeInfo::of::<T>();
		if tag.is_empty() {
			return Err(DeclareError::InvalidTag { type_name: ty.name });
		}
		let mut claims = CLAIMS.lock();
		self.check_claim(&claims, ty)?;
		self.node
			.lineage
			.register(tag, ty, &self.node.path, VariantCodec::of::<T>())?;
		claims.entry(ty.id).or_insert(Claim {
			family: self.node.clone(),
		});
		Ok(())
	}

	/// Declares `T` as an abstract chain participant with no tag.
	///
	/// Intermediates get no tag store entry and are not wire endpoints; they
	/// only pin `T` to this lineage for membership queries.
	pub fn register_intermediate<T: Any>(&self) -> Result<(), DeclareError> {
		let ty = TypeInfo::of::<T>();
		let mut claims = CLAIMS.lock();
		self.check_claim(&claims, ty)?;
		claims.entry(ty.id).or_insert_with(|| {
			tracing::debug!(family = self.node.name, member = ty.name, "declared intermediate");
			Claim {
				family: self.node.clone(),
			}
		});
		Ok(())
	}

	fn check_claim(
		&self,
		claims: &FxHashMap<TypeId, Claim>,
		ty: TypeInfo,
	) -> Result<(), DeclareError> {
		match claims.get(&ty.id) {
			Some(claim) if !Arc::ptr_eq(&claim.family.lineage, &self.node.lineage) => {
				Err(DeclareError::ForeignLineage {
					type_name: ty.name,
					existing: claim.family.lineage.label,
					incoming: self.node.lineage.label,
				})
			}
			_ => Ok(()),
		}
	}

	/// Nearest family the type `T` registered under.
	pub fn of<T: Any>() -> Result<Family, QueryError> {
		Self::of_id(TypeId::of::<T>(), std::any::type_name::<T>())
	}

	/// Nearest family a value's runtime type registered under.
	pub fn of_value(value: &dyn Member) -> Result<Family, QueryError> {
		Self::of_id(value.as_any().type_id(), value.type_name())
	}

	fn of_id(id: TypeId, type_name: &'static str) -> Result<Family, QueryError> {
		let claims = CLAIMS.lock();
		claims
			.get(&id)
			.map(|claim| Family {
				node: claim.family.clone(),
			})
			.ok_or(QueryError::NotInFamily { type_name })
	}

	pub fn name(&self) -> &'static str {
		self.node.name
	}

	/// Discriminator field name shared by the whole lineage.
	pub fn keyword(&self) -> &str {
		self.node.lineage.keyword()
	}

	pub fn parent(&self) -> Option<Family> {
		self.node.parent.clone().map(|node| Family { node })
	}

	/// Tags owned by this level: registered here or in a derived subfamily.
	/// Ancestor- and sibling-owned tags are excluded.
	pub fn tags(&self) -> BTreeSet<String> {
		let snap = self.node.lineage.snapshot();
		snap.owned(&self.node.path)
			.map(|entry| entry.tag.to_string())
			.collect()
	}

	/// Full-resolution lookup: any tag visible from this level, including
	/// variants registered under derived families.
	pub fn type_for_tag(&self, tag: &str) -> Result<TypeInfo, QueryError> {
		let snap = self.node.lineage.snapshot();
		snap.resolve(tag)
			.map(|entry| entry.ty)
			.ok_or_else(|| QueryError::UnknownTag {
				tag: tag.to_owned(),
				family: self.node.name,
			})
	}

	/// Tag registered for `T` anywhere in the lineage, if any.
	pub fn tag_for_type<T: Any>(&self) -> Option<String> {
		self.tag_for_id(TypeId::of::<T>())
	}

	/// Tag of a value's runtime type, if registered in the lineage.
	pub fn tag_of_value(&self, value: &dyn Member) -> Option<String> {
		self.tag_for_id(value.as_any().type_id())
	}

	fn tag_for_id(&self, id: TypeId) -> Option<String> {
		let snap = self.node.lineage.snapshot();
		snap.reverse_resolve(id).map(|entry| entry.tag.to_string())
	}

	/// True when `T` is a tagged variant owned by this level's subtree.
	pub fn is_variant<T: Any>(&self) -> bool {
		self.is_variant_id(TypeId::of::<T>())
	}

	/// True when a value's runtime type is a variant of this level's subtree.
	pub fn is_variant_value(&self, value: &dyn Member) -> bool {
		self.is_variant_id(value.as_any().type_id())
	}

	fn is_variant_id(&self, id: TypeId) -> bool {
		let snap = self.node.lineage.snapshot();
		snap.reverse_resolve(id)
			.is_some_and(|entry| is_prefix(&self.node.path, &entry.owner))
	}
}

impl PartialEq for Family {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.node, &other.node)
	}
}

impl Eq for Family {}

impl std::fmt::Debug for Family {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Family")
			.field("name", &self.node.name)
			.field("keyword", &self.keyword())
			.field("path", &self.node.path)
			.finish()
	}
}
