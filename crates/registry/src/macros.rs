//! Declaration macros.

/// Declares a lazily-initialized family static and registers its variants.
///
/// This macro generates:
/// - A `static` [`LazyLock<Family>`](std::sync::LazyLock) anchoring the
///   lineage and registering every listed variant on first use
/// - A `pub const TAG: &str` on each listed variant, so the discriminator
///   is readable but never constructor-assignable
///
/// Declaration errors ([`DeclareError`](crate::DeclareError)) are
/// programming mistakes; they abort initialization with a panic naming the
/// offending declaration.
///
/// # Example
///
/// ```ignore
/// family! {
///     pub static MESSAGE: Family = "Message", keyword "type", {
///         Text => "text",
///         Image => "image",
///     };
/// }
///
/// assert_eq!(Text::TAG, "text");
/// let payload = MESSAGE.encode(&Text { content: "hi".into() })?;
/// ```
#[macro_export]
macro_rules! family {
	($vis:vis static $NAME:ident: Family = $label:literal $(, keyword $kw:literal)?, {
		$($variant:ty => $tag:literal),* $(,)?
	};) => {
		$vis static $NAME: ::std::sync::LazyLock<$crate::Family> =
			::std::sync::LazyLock::new(|| {
				let family = $crate::family!(@root $label $(, $kw)?);
				$(
					if let Err(err) = family.register::<$variant>($tag) {
						panic!("family {}: {err}", $label);
					}
				)*
				family
			});
		$(
			impl $variant {
				/// Registered discriminator value for this variant.
				pub const TAG: &'static str = $tag;
			}
		)*
	};
	(@root $label:literal) => {
		$crate::Family::create($label)
	};
	(@root $label:literal, $kw:literal) => {
		match $crate::Family::create_with_keyword($label, $kw) {
			Ok(family) => family,
			Err(err) => panic!("family {}: {err}", $label),
		}
	};
}
