//! The allowed-qualifier matrix: which qualifier kinds may appear on which
//! node kinds. Mirrors the `_allowedQualifiers` class attribute on each
//! `SchemaNode` subclass in the original implementation.

use super::NodeKind;

/// A qualifier kind, grouped for "at most one of this kind" checks,
/// independent of the qualifier's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierGroup {
    Extensible,
    Optional,
    Private,
    Invariant,
    Nullable,
    Order,
    Range,
    Length,
    Tag,
    Id,
}

/// The qualifier groups a node kind allows, in the order the original
/// `_allowedQualifiers` tuples list them (order is immaterial to
/// correctness but kept for readability).
pub fn allowed_qualifiers(kind: &NodeKind) -> &'static [QualifierGroup] {
    use QualifierGroup::*;
    match kind {
        NodeKind::Vendor { .. } => &[Id],
        NodeKind::Profile { .. } => &[Id],
        NodeKind::Message { .. } => &[Id],
        NodeKind::StatusCode { .. } => &[Id],
        NodeKind::TypeDef { .. } => &[Tag],
        NodeKind::Float { .. } => &[Range, Nullable],
        NodeKind::Boolean { .. } => &[Nullable],
        NodeKind::StringTy { .. } => &[Length, Nullable],
        NodeKind::ByteStringTy { .. } => &[Length, Nullable],
        NodeKind::NullTy { .. } => &[],
        NodeKind::AnyTy { .. } => &[],
        NodeKind::SignedInteger { .. } => &[Range, Nullable],
        NodeKind::UnsignedInteger { .. } => &[Range, Nullable],
        NodeKind::Structure { .. } => &[Extensible, Order, Private, Invariant, Nullable],
        NodeKind::FieldGroup { .. } => &[],
        NodeKind::ChoiceOf { .. } => &[Nullable],
        NodeKind::Array { .. } => &[Length, Nullable],
        NodeKind::List { .. } => &[Length, Nullable],
        NodeKind::StructureField { .. } => &[Tag, Optional],
        NodeKind::ChoiceAlternate { .. } => &[Tag],
        // PatternElement's allowed qualifiers depend on whether the
        // parent is an ARRAY (none) or a LIST (Tag); the validator looks
        // that up contextually via `pattern_element_allowed_qualifiers`.
        NodeKind::PatternElement { .. } => &[],
        _ => &[],
    }
}

/// `PatternElement` has a context-dependent allowed set: `Tag` within a
/// `LIST`, none within an `ARRAY` (mirrors `LinearTypePatternElement._allowedQualifiers`).
pub fn pattern_element_allowed_qualifiers(parent_is_list: bool) -> &'static [QualifierGroup] {
    if parent_is_list {
        &[QualifierGroup::Tag]
    } else {
        &[]
    }
}
