//! Values the schema never states directly but the wire format depends on:
//! effective integer bounds, a type definition's effective default tag, the
//! set of tags a use of a type could actually carry on the wire, and the
//! numeric profile id a vendor/profile pair composes to.
//!
//! None of this is cached on the AST. The collection recomputes it lazily
//! per call and the caller is free to memoize; spec §4.4 places no
//! requirement on recomputation cost, only on correctness after reload.

use std::collections::HashSet;

use crate::ast::{Ast, NodeId, NodeKind, QualifierGroup, QualifierKind, RangeBody, VendorSlot};
use crate::resolver::Resolution;

/// Inclusive bounds of an integer type, widened to `i128` so a 64-bit
/// unsigned upper bound (`2^64 - 1`) never overflows the arithmetic used to
/// compute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerBounds {
    pub lower: i128,
    pub upper: i128,
}

const DEFAULT_INTEGER_WIDTH: u32 = 64;

fn bounds_for_width(signed: bool, width: u32) -> IntegerBounds {
    if signed {
        let upper = (1i128 << (width - 1)) - 1;
        let lower = -(1i128 << (width - 1));
        IntegerBounds { lower, upper }
    } else {
        let upper = (1i128 << width) - 1;
        IntegerBounds { lower: 0, upper }
    }
}

/// The effective bounds of a `SIGNED INTEGER` / `UNSIGNED INTEGER` type
/// node: its explicit `range` qualifier if present, else a default 64-bit
/// range (spec §3 "INTEGER types default to a 64-bit range when
/// unqualified").
pub fn effective_integer_bounds(ast: &Ast, node: NodeId) -> IntegerBounds {
    let signed = matches!(ast.node(node).kind, NodeKind::SignedInteger { .. });
    let natural = bounds_for_width(signed, DEFAULT_INTEGER_WIDTH);

    let Some(qual) = ast.qualifier(node, QualifierGroup::Range) else {
        return natural;
    };
    let NodeKind::Qualifier(QualifierKind::Range(body)) = &ast.node(qual).kind else {
        unreachable!("a Range-group qualifier always carries QualifierKind::Range")
    };
    match body {
        RangeBody::Width(w) => bounds_for_width(signed, *w),
        RangeBody::Explicit { lower, upper } => IntegerBounds {
            lower: lower.map(|n| n.as_f64() as i128).unwrap_or(natural.lower),
            upper: upper.map(|n| n.as_f64() as i128).unwrap_or(natural.upper),
        },
    }
}

/// Walks a type definition's reference chain looking for the first `tag`
/// qualifier attached to a `TypeDef` along the way (spec §4.4 "a reference
/// inherits the default tag of the type it ultimately names, unless it
/// specifies its own"). Returns the `Qualifier` node carrying the tag, or
/// `None` if no definition in the chain carries one.
pub fn effective_default_tag(ast: &Ast, resolution: &Resolution, type_def: NodeId) -> Option<NodeId> {
    let mut current = type_def;
    let mut visited = HashSet::new();
    loop {
        if !visited.insert(current) {
            return None;
        }
        if let Some(q) = ast.qualifier(current, QualifierGroup::Tag) {
            return Some(q);
        }
        let underlying = ast.underlying_type(current)?;
        match &ast.node(underlying).kind {
            NodeKind::ReferencedType { .. } => current = resolution.type_def_of_reference(underlying)?,
            _ => return None,
        }
    }
}

/// Every leaf `ChoiceAlternate` under a `CHOICE OF` type, descending into
/// nested choices so a `CHOICE OF { CHOICE OF { ... } }` contributes its
/// innermost alternates rather than the intermediate choice itself.
pub fn leaf_alternates(ast: &Ast, choice_node: NodeId) -> Vec<NodeId> {
    let NodeKind::ChoiceOf { alternates, .. } = &ast.node(choice_node).kind else {
        return vec![];
    };
    let mut out = Vec::new();
    for &alt in alternates {
        let ty = ast.underlying_type(alt).expect("a ChoiceAlternate always has a type");
        if matches!(ast.node(ty).kind, NodeKind::ChoiceOf { .. }) {
            out.extend(leaf_alternates(ast, ty));
        } else {
            out.push(alt);
        }
    }
    out
}

/// The set of tags a use of `node` could carry on the wire: its own
/// explicit tag (a `StructureField`, `ChoiceAlternate`, `PatternElement`, or
/// `TypeDef` all carry their own `tag` qualifier directly, separate from
/// their underlying type); failing that, the effective default tag of
/// whatever its underlying type references; failing that (a `CHOICE OF`),
/// the union of its leaf alternates' own possible tags; otherwise a single
/// untagged (`None`) possibility. An empty result means the reference never
/// resolved, so no possible tag can be determined at all.
///
/// `node` may be either a tag-bearing wrapper (whose own qualifier list is
/// checked first, then whose `underlying_type` is inspected) or a bare type
/// node passed directly (e.g. a `CHOICE OF` node itself) — `underlying_type`
/// returns `None` for the latter, so `node` itself is inspected instead.
pub fn possible_tags(ast: &Ast, resolution: &Resolution, node: NodeId) -> Vec<Option<NodeId>> {
    if let Some(q) = ast.qualifier(node, QualifierGroup::Tag) {
        return vec![Some(q)];
    }
    let type_node = ast.underlying_type(node).unwrap_or(node);
    match &ast.node(type_node).kind {
        NodeKind::ReferencedType { .. } => match resolution.type_def_of_reference(type_node) {
            Some(type_def) => vec![effective_default_tag(ast, resolution, type_def)],
            None => vec![],
        },
        NodeKind::ChoiceOf { .. } => leaf_alternates(ast, type_node)
            .into_iter()
            .flat_map(|alt| possible_tags(ast, resolution, alt))
            .collect(),
        _ => vec![None],
    }
}

/// The numeric id a `Vendor` node declares via its own `id` qualifier.
pub fn vendor_numeric_id(ast: &Ast, vendor_node: NodeId) -> Option<i64> {
    let q = ast.qualifier(vendor_node, QualifierGroup::Id)?;
    let NodeKind::Qualifier(QualifierKind::Id { id_num, .. }) = &ast.node(q).kind else {
        return None;
    };
    Some(*id_num)
}

/// The vendor id an `id` qualifier's vendor slot resolves to, following a
/// named vendor reference through [`Resolution`] if needed.
pub fn resolved_vendor_id(ast: &Ast, resolution: &Resolution, id_qual: NodeId) -> Option<i64> {
    let NodeKind::Qualifier(QualifierKind::Id { vendor, .. }) = &ast.node(id_qual).kind else {
        return None;
    };
    match vendor {
        None => None,
        Some(VendorSlot::Number(n)) => Some(*n),
        Some(VendorSlot::Name(_)) => {
            let vendor_node = resolution.vendor_of_id_qual(id_qual)?;
            vendor_numeric_id(ast, vendor_node)
        }
    }
}

/// Every field a `STRUCTURE`/`FIELD GROUP` exposes, expanding `includes`
/// transitively and visiting each included `FIELD GROUP` type definition at
/// most once so a diamond inclusion never contributes the same field twice
/// (spec §6.1 "allFields" / §4.5 "includes expansion").
pub fn effective_fields(ast: &Ast, resolution: &Resolution, container: NodeId) -> Vec<(String, NodeId)> {
    let mut visited = HashSet::new();
    effective_fields_inner(ast, resolution, container, &mut visited)
}

fn effective_fields_inner(
    ast: &Ast,
    resolution: &Resolution,
    container: NodeId,
    visited: &mut HashSet<NodeId>,
) -> Vec<(String, NodeId)> {
    let members: &[NodeId] = match &ast.node(container).kind {
        NodeKind::Structure { members, .. } | NodeKind::FieldGroup { members, .. } => members,
        _ => return vec![],
    };
    let mut out = Vec::new();
    for &member in members {
        match &ast.node(member).kind {
            NodeKind::StructureField { name, .. } => out.push((name.clone(), member)),
            NodeKind::StructureIncludes { .. } => {
                let Some(type_def) = resolution.includes_target(member) else { continue };
                if !visited.insert(type_def) {
                    continue;
                }
                let underlying = ast.underlying_type(type_def).expect("TypeDef has an underlying type");
                if matches!(ast.node(underlying).kind, NodeKind::FieldGroup { .. }) {
                    out.extend(effective_fields_inner(ast, resolution, underlying, visited));
                }
            }
            _ => {}
        }
    }
    out
}

/// Composes a vendor id and a bare numeric id into a single profile id:
/// `(vendorId << 16) | idNum` when scoped to a vendor, else `idNum` alone
/// (spec §3 "profile identification").
pub fn profile_id(vendor_id: Option<i64>, id_num: i64) -> i64 {
    match vendor_id {
        Some(v) => (v << 16) | id_num,
        None => id_num,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NumericLiteral, TagBody};
    use crate::source_map::{Position, SourceId, SourceRef, Span};

    fn dummy_ref() -> SourceRef {
        SourceRef::new(SourceId(0), Span::point(Position::new(1, 1, 0)))
    }

    #[test]
    fn default_bounds_are_64_bit() {
        let mut ast = Ast::new();
        let node = ast.push(
            NodeKind::UnsignedInteger { quals: vec![], values: vec![] },
            dummy_ref(),
            None,
        );
        let bounds = effective_integer_bounds(&ast, node);
        assert_eq!(bounds.lower, 0);
        assert_eq!(bounds.upper, (1i128 << 64) - 1);
    }

    #[test]
    fn width_qualifier_narrows_signed_bounds() {
        let mut ast = Ast::new();
        let qual = ast.push(
            NodeKind::Qualifier(QualifierKind::Range(RangeBody::Width(8))),
            dummy_ref(),
            None,
        );
        let node = ast.push(
            NodeKind::SignedInteger { quals: vec![qual], values: vec![] },
            dummy_ref(),
            None,
        );
        let bounds = effective_integer_bounds(&ast, node);
        assert_eq!(bounds.lower, -128);
        assert_eq!(bounds.upper, 127);
    }

    #[test]
    fn explicit_bounds_override_defaults() {
        let mut ast = Ast::new();
        let qual = ast.push(
            NodeKind::Qualifier(QualifierKind::Range(RangeBody::Explicit {
                lower: Some(NumericLiteral::Integer(10)),
                upper: Some(NumericLiteral::Integer(20)),
            })),
            dummy_ref(),
            None,
        );
        let node = ast.push(
            NodeKind::SignedInteger { quals: vec![qual], values: vec![] },
            dummy_ref(),
            None,
        );
        let bounds = effective_integer_bounds(&ast, node);
        assert_eq!(bounds.lower, 10);
        assert_eq!(bounds.upper, 20);
    }

    #[test]
    fn leaf_alternates_flattens_nested_choices() {
        let mut ast = Ast::new();
        let inner_ty = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        let inner_alt = ast.push(
            NodeKind::ChoiceAlternate { name: Some("b".into()), quals: vec![], ty: inner_ty, docs: None },
            dummy_ref(),
            None,
        );
        let inner_choice = ast.push(
            NodeKind::ChoiceOf { quals: vec![], alternates: vec![inner_alt] },
            dummy_ref(),
            None,
        );
        let outer_alt_choice = ast.push(
            NodeKind::ChoiceAlternate { name: None, quals: vec![], ty: inner_choice, docs: None },
            dummy_ref(),
            None,
        );
        let sibling_ty = ast.push(NodeKind::Float { quals: vec![] }, dummy_ref(), None);
        let sibling_alt = ast.push(
            NodeKind::ChoiceAlternate { name: Some("f".into()), quals: vec![], ty: sibling_ty, docs: None },
            dummy_ref(),
            None,
        );
        let outer_choice = ast.push(
            NodeKind::ChoiceOf { quals: vec![], alternates: vec![outer_alt_choice, sibling_alt] },
            dummy_ref(),
            None,
        );

        let leaves = leaf_alternates(&ast, outer_choice);
        assert_eq!(leaves, vec![inner_alt, sibling_alt]);
    }

    #[test]
    fn profile_id_composes_vendor_and_number() {
        assert_eq!(profile_id(Some(1), 2), (1 << 16) | 2);
        assert_eq!(profile_id(None, 5), 5);
    }

    #[test]
    fn effective_default_tag_is_none_without_a_tag_qualifier() {
        let mut ast = Ast::new();
        let underlying = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        let type_def = ast.push(
            NodeKind::TypeDef { name: "Flag".into(), quals: vec![], underlying, docs: None },
            dummy_ref(),
            None,
        );
        let resolution = Resolution::default();
        assert_eq!(effective_default_tag(&ast, &resolution, type_def), None);
    }

    #[test]
    fn tag_body_anonymous_is_anonymous() {
        assert!(TagBody::Anonymous.is_anonymous());
    }
}
