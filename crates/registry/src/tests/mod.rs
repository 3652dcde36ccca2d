//! End-to-end scenarios over the declaration macro and the wire boundary.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Coercible, DecodeError, Family};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Text {
	pub content: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Image {
	pub url: String,
}

crate::family! {
	pub static MESSAGE: Family = "Message", keyword "type", {
		Text => "text",
		Image => "image",
	};
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Paragraph {
	pub text: String,
}

crate::family! {
	pub static DOCUMENT: Family = "Document", keyword "kind", {
		Paragraph => "paragraph",
	};
}

#[test]
fn encode_produces_the_tagged_wire_map() {
	let payload = MESSAGE.encode(&Text { content: "hi".into() }).unwrap();
	assert_eq!(payload, json!({"type": "text", "content": "hi"}));
}

#[test]
fn decode_routes_on_the_tag() {
	let image: Image = MESSAGE
		.decode_as(json!({"type": "image", "url": "http://x"}))
		.unwrap();
	assert_eq!(image, Image { url: "http://x".into() });
}

#[test]
fn decode_without_a_tag_fails() {
	let err = MESSAGE.decode(json!({"content": "hi"})).unwrap_err();
	assert!(matches!(err, DecodeError::MissingTag { keyword } if keyword == "type"));
}

#[test]
fn decode_with_an_unknown_tag_fails() {
	let err = MESSAGE
		.decode(json!({"type": "video", "url": "x"}))
		.unwrap_err();
	assert!(matches!(err, DecodeError::UnknownTag { tag, .. } if tag == "video"));
}

#[test]
fn round_trip_through_an_erased_member() {
	let original = Image { url: "http://x".into() };
	let payload = MESSAGE.encode(&original).unwrap();

	let member = MESSAGE.decode(payload.clone()).unwrap();
	assert!(MESSAGE.is_variant_value(member.as_ref()));
	assert_eq!(MESSAGE.tag_of_value(member.as_ref()).as_deref(), Some("image"));

	let re_encoded = MESSAGE.encode_member(member.as_ref()).unwrap();
	assert_eq!(re_encoded, payload);
	assert_eq!(member.as_any().downcast_ref::<Image>(), Some(&original));
}

#[test]
fn round_trip_preserves_every_variant() {
	let text = MESSAGE.encode(&Text { content: "a".into() }).unwrap();
	let image = MESSAGE.encode(&Image { url: "b".into() }).unwrap();

	assert_eq!(
		MESSAGE.decode_as::<Text>(text).unwrap(),
		Text { content: "a".into() }
	);
	assert_eq!(MESSAGE.decode_as::<Image>(image).unwrap(), Image { url: "b".into() });
}

#[test]
fn query_surface_matches_the_declarations() {
	assert_eq!(MESSAGE.name(), "Message");
	assert_eq!(MESSAGE.keyword(), "type");
	let expected: std::collections::BTreeSet<String> =
		["image", "text"].iter().map(|s| s.to_string()).collect();
	assert_eq!(MESSAGE.tags(), expected);
	assert_eq!(
		MESSAGE.type_for_tag("text").unwrap().id,
		std::any::TypeId::of::<Text>()
	);
	assert_eq!(MESSAGE.tag_for_type::<Image>().as_deref(), Some("image"));
	assert!(MESSAGE.is_variant::<Text>());
	assert!(!MESSAGE.is_variant::<Paragraph>());

	assert_eq!(Text::TAG, "text");
	assert_eq!(Image::TAG, "image");
}

#[test]
fn nearest_family_is_recoverable_from_the_type() {
	let family = Family::of::<Text>().unwrap();
	assert_eq!(family, *MESSAGE);
}

#[test]
fn permissive_mode_accepts_instances_and_payloads() {
	let member = MESSAGE
		.coerce(Coercible::Instance(Box::new(Text { content: "hi".into() })))
		.unwrap();
	assert_eq!(member.as_any().downcast_ref::<Text>().unwrap().content, "hi");

	let member = MESSAGE
		.coerce(Coercible::Payload(json!({"type": "text", "content": "hi"})))
		.unwrap();
	assert_eq!(member.as_any().downcast_ref::<Text>().unwrap().content, "hi");
}

#[test]
fn custom_keyword_families_tag_under_their_own_field() {
	let payload = DOCUMENT.encode(&Paragraph { text: "p".into() }).unwrap();
	assert_eq!(payload, json!({"kind": "paragraph", "text": "p"}));

	let decoded: Paragraph = DOCUMENT.decode_as(payload).unwrap();
	assert_eq!(decoded.text, "p");

	// "type" is just an ordinary field for this lineage.
	let err = DOCUMENT
		.decode(json!({"type": "paragraph", "text": "p"}))
		.unwrap_err();
	assert!(matches!(err, DecodeError::MissingTag { keyword } if keyword == "kind"));
}

#[test]
fn lineages_declared_by_macro_are_isolated() {
	assert!(!MESSAGE.is_variant::<Paragraph>());
	assert!(!DOCUMENT.is_variant::<Text>());
	assert!(DOCUMENT.type_for_tag("text").is_err());
}
