//! Property tests for the universal properties spec.md §8 requires of the
//! compiler: idempotent validation, order-invariant resolution, includes
//! expansion, effective-tag/possible-tags agreement, and integer bounds
//! correctness. Grounded on the teacher's `tests/proptest_dsl.rs` /
//! `tests/proptest_types.rs` (a `proptest!` block per property, named
//! strategies for the generated identifiers).

use proptest::prelude::*;
use tlv_schema_core::SchemaCollection;

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "includes"
            | "id"
            | "tag"
            | "range"
            | "length"
            | "extensible"
            | "optional"
            | "private"
            | "invariant"
            | "nullable"
            | "tag-order"
            | "schema-order"
            | "any-order"
            | "8bit"
            | "16bit"
            | "32bit"
            | "64bit"
    )
}

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,10}".prop_filter("not a keyword", |s| !is_keyword(s))
}

fn vendor_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,10}".prop_filter("not a keyword", |s| !is_keyword(s))
}

fn load(text: &str) -> SchemaCollection {
    let mut collection = SchemaCollection::new();
    tlv_schema_dsl::load_into(&mut collection, "prop.tlv", text).expect("fixture text always parses");
    collection
}

proptest! {
    /// Universal property 1: `validate()` called twice on an unchanged
    /// collection returns the same diagnostics, in the same order.
    #[test]
    fn validate_is_idempotent(name in vendor_name(), id in 0u32..65536) {
        let text = format!("{name} => VENDOR [ id {id} ]\n");
        let mut collection = load(&text);
        let first = collection.validate().to_vec();
        let second = collection.validate().to_vec();
        prop_assert_eq!(first, second);
    }

    /// Universal property 2: two files that cross-reference each other (a
    /// profile in one naming a vendor declared in the other) resolve to
    /// the same target and produce the same diagnostics regardless of
    /// which file is loaded first — the symbol index is built from the
    /// whole collection before resolution ever runs.
    #[test]
    fn resolution_is_order_invariant(vendor in vendor_name(), profile in vendor_name(), vendor_id in 0u32..65536) {
        prop_assume!(vendor != profile);
        let a = format!("{vendor} => VENDOR [ id {vendor_id} ]\n");
        let b = format!("{profile} => PROFILE [ id {vendor}:3 ]\n");

        let mut forward = SchemaCollection::new();
        tlv_schema_dsl::load_into(&mut forward, "a.tlv", &a).unwrap();
        tlv_schema_dsl::load_into(&mut forward, "b.tlv", &b).unwrap();
        let forward_messages: Vec<String> = forward.validate().iter().map(|d| d.message.clone()).collect();

        let mut backward = SchemaCollection::new();
        tlv_schema_dsl::load_into(&mut backward, "b.tlv", &b).unwrap();
        tlv_schema_dsl::load_into(&mut backward, "a.tlv", &a).unwrap();
        let backward_messages: Vec<String> = backward.validate().iter().map(|d| d.message.clone()).collect();

        prop_assert_eq!(forward_messages, backward_messages);
        prop_assert!(forward_messages.is_empty());

        let forward_profile = forward.get_profile(&profile).unwrap();
        let backward_profile = backward.get_profile(&profile).unwrap();
        let expected = ((vendor_id as i64) << 16) | 3;
        prop_assert_eq!(forward_profile.numeric_id(), Some(expected));
        prop_assert_eq!(backward_profile.numeric_id(), Some(expected));
    }

    /// Universal property 3: `allFields()` on a structure is its directly
    /// declared fields followed by its included field group's fields, in
    /// order.
    #[test]
    fn includes_expansion_concatenates_in_order(direct in field_name(), included in field_name()) {
        prop_assume!(direct != included);
        let text = format!(
            "fg => FIELD GROUP {{ {included} [2]: INTEGER }}\ns => STRUCTURE {{ {direct} [1]: INTEGER, includes fg }}\n"
        );
        let mut collection = load(&text);
        collection.validate();
        let type_def = collection.get_type_def("s").unwrap();
        let fields = type_def.fields().unwrap();
        let names: Vec<&str> = fields.all_fields().iter().map(|f| f.name()).collect();
        prop_assert_eq!(names, vec![direct.as_str(), included.as_str()]);
    }

    /// Universal property 5: for every 8/16/32/64-bit width, the boundary
    /// values classify on the correct side of the bound.
    #[test]
    fn integer_bounds_classify_boundaries_correctly(width in prop_oneof![Just(8u32), Just(16), Just(32), Just(64)]) {
        let text = format!("u => UNSIGNED INTEGER [ range {width}bit ]\n");
        let mut collection = load(&text);
        collection.validate();
        let type_def = collection.get_type_def("u").unwrap();
        let bounds = type_def.integer_bounds().unwrap();
        prop_assert_eq!(bounds.lower, 0);
        let expected_upper: i128 = (1i128 << width) - 1;
        prop_assert_eq!(bounds.upper, expected_upper);
    }
}

/// Universal property 4: `effectiveTag() == possibleTags()[0]` exactly when
/// there is exactly one possible tag; ambiguous when there is more than
/// one; `None` when there are none. Not a `proptest!` block — the three
/// cases are enumerated directly, since the interesting variable is the
/// *shape* of the possible-tags set, not a randomized scalar.
#[test]
fn effective_tag_agrees_with_possible_tags_single_case() {
    let mut collection = load("single-tag => STRUCTURE { f [3]: INTEGER }\n");
    collection.validate();
    let type_def = collection.get_type_def("single-tag").unwrap();
    let fields = type_def.fields().unwrap();
    let field = fields.get_field("f").unwrap();
    let possible = field.possible_tags();
    assert_eq!(possible.len(), 1);
    let effective = field.effective_tag().unwrap();
    assert_eq!(effective, possible[0].clone());
}

#[test]
fn effective_tag_is_ambiguous_when_more_than_one_tag_is_possible() {
    let mut collection = load(
        "holder => STRUCTURE { f: CHOICE OF { a [1]: STRING, b [2]: BOOLEAN } }\n",
    );
    collection.validate();
    let type_def = collection.get_type_def("holder").unwrap();
    let fields = type_def.fields().unwrap();
    let field = fields.get_field("f").unwrap();
    let tags = field.possible_tags();
    assert_eq!(tags.len(), 2, "each tagged CHOICE OF alternate should contribute its own tag: {tags:?}");
    assert!(tags.iter().all(Option::is_some), "alternates carried explicit tags, none should be untagged");
    assert!(field.effective_tag().is_err());
}

#[test]
fn effective_tag_is_none_when_no_tag_is_reachable() {
    let mut collection = load("untagged => STRUCTURE { f: INTEGER }\n");
    collection.validate();
    let type_def = collection.get_type_def("untagged").unwrap();
    let fields = type_def.fields().unwrap();
    let field = fields.get_field("f").unwrap();
    let tags = field.possible_tags();
    assert!(tags.iter().all(Option::is_none), "no tag is reachable, every entry should be the untagged sentinel: {tags:?}");
    assert_eq!(field.effective_tag().unwrap(), None);
}
