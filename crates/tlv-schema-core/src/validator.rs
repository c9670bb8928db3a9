//! Semantic validation: every structural rule spec §4.5 describes, run
//! once a schema is loaded and resolved. Validation never raises — it
//! accumulates [`Diagnostic`]s and returns them all, so a caller sees every
//! problem in one pass rather than stopping at the first (spec §7 "Error
//! Handling Design").

use std::collections::{HashMap, HashSet};

use crate::ast::{Ast, NodeId, NodeKind, QualifierGroup, QualifierKind, TagBody};
use crate::derived::{effective_fields, effective_integer_bounds, leaf_alternates, possible_tags, vendor_numeric_id};
use crate::diagnostic::Diagnostic;
use crate::resolver::Resolution;
use crate::symbol_index::SymbolIndex;

pub fn validate(ast: &Ast, index: &SymbolIndex, resolution: &Resolution) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    // Per-node rules first, so a bad id on one definition never hides a
    // structural problem on the same or a sibling node (spec §7: "numeric
    // out-of-range checks ... do not cascade").
    check_qualifier_capabilities(ast, &mut diagnostics);
    check_required_id_qualifiers(ast, &mut diagnostics);
    check_duplicate_definitions(ast, index, &mut diagnostics);
    check_structure_fields(ast, resolution, &mut diagnostics);
    check_field_tags(ast, resolution, &mut diagnostics);
    check_field_group_not_allowed(ast, resolution, &mut diagnostics);
    check_includes_targets(ast, resolution, &mut diagnostics);
    check_duplicate_includes(ast, resolution, &mut diagnostics);
    check_length_and_range_bounds(ast, &mut diagnostics);
    check_range_type_constraints(ast, &mut diagnostics);
    check_pattern_quantifiers(ast, &mut diagnostics);
    check_named_siblings_unique(ast, &mut diagnostics);
    check_choice_types(ast, resolution, &mut diagnostics);
    check_id_and_tag_numbers(ast, &mut diagnostics);
    check_enum_values_in_range(ast, &mut diagnostics);
    check_definition_scopes(ast, &mut diagnostics);
    check_id_value_ranges(ast, resolution, &mut diagnostics);

    // Cross-node rules run last (spec §4.6 / §7: "cross-cutting checks run
    // after per-node rules").
    check_unique_message_and_status_ids(ast, &mut diagnostics);
    check_vendor_and_profile_id_consistency(ast, index, resolution, &mut diagnostics);

    diagnostics
}

/// Every qualifier attached to a node must belong to a group that node
/// kind allows, and at most one qualifier of a given group may appear on
/// any one node (spec §4.2 "Qualifiers").
fn check_qualifier_capabilities(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let kind = &ast.node(id).kind;
        if matches!(kind, NodeKind::Qualifier(_)) {
            continue;
        }
        let allowed = allowed_for(ast, id);
        let mut seen = HashSet::new();
        for &q in ast.quals_of(id) {
            let NodeKind::Qualifier(qk) = &ast.node(q).kind else { continue };
            let group = qk.group();
            if !allowed.contains(&group) {
                diagnostics.push(
                    Diagnostic::new(format!(
                        "{} not allowed on {}",
                        qk.construct_name(),
                        ast.construct_name(id)
                    ))
                    .with_source_ref(ast.node(q).source_ref),
                );
            }
            if !seen.insert(group) {
                diagnostics.push(
                    Diagnostic::new("duplicate qualifier")
                        .with_detail(format!("{} appears more than once on {}", qk.construct_name(), ast.construct_name(id)))
                        .with_source_ref(ast.node(q).source_ref),
                );
            }
        }
    }
}

fn allowed_for(ast: &Ast, id: NodeId) -> Vec<QualifierGroup> {
    if let NodeKind::PatternElement { .. } = &ast.node(id).kind {
        let parent_is_list = ast
            .node(id)
            .parent
            .is_some_and(|p| matches!(ast.node(p).kind, NodeKind::List { .. }));
        return crate::ast::pattern_element_allowed_qualifiers(parent_is_list).to_vec();
    }
    crate::ast::allowed_qualifiers(&ast.node(id).kind).to_vec()
}

/// `VENDOR`, `PROFILE`, `MESSAGE`, and `STATUS CODE` definitions must carry
/// exactly the `id` qualifier they're allowed (spec §3: "every vendor,
/// profile, message, and status code is identified by a numeric id").
fn check_required_id_qualifiers(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let needs_id = matches!(
            ast.node(id).kind,
            NodeKind::Vendor { .. } | NodeKind::Profile { .. } | NodeKind::Message { .. } | NodeKind::StatusCode { .. }
        );
        if needs_id && ast.qualifier(id, QualifierGroup::Id).is_none() {
            diagnostics.push(
                Diagnostic::new(format!("{} is missing a required id qualifier", ast.construct_name(id)))
                    .with_source_ref(ast.node(id).source_ref),
            );
        }
    }
}

/// More than one definition sharing a fully qualified name is an error,
/// regardless of which kind of definition it is.
fn check_duplicate_definitions(ast: &Ast, index: &SymbolIndex, diagnostics: &mut Vec<Diagnostic>) {
    for table in [&index.vendors, &index.namespaces, &index.profiles, &index.type_defs] {
        let mut fqns: Vec<&String> = table.keys().collect();
        fqns.sort();
        for fqn in fqns {
            let nodes = &table[fqn];
            if nodes.len() > 1 {
                for &dup in &nodes[1..] {
                    diagnostics.push(
                        Diagnostic::new(format!("duplicate definition of '{fqn}'"))
                            .with_source_ref(ast.node(dup).source_ref),
                    );
                }
            }
        }
    }
}

/// Duplicate field names within a `STRUCTURE`/`FIELD GROUP`, counting
/// fields brought in transitively through `includes` but visiting each
/// included `FIELD GROUP` type definition at most once so a diamond
/// inclusion of the same group isn't reported twice for the same field.
fn check_structure_fields(ast: &Ast, resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        if !matches!(ast.node(id).kind, NodeKind::Structure { .. } | NodeKind::FieldGroup { .. }) {
            continue;
        }
        let entries = effective_fields(ast, resolution, id);
        let mut by_name: HashMap<&str, Vec<NodeId>> = HashMap::new();
        for (name, node) in &entries {
            by_name.entry(name.as_str()).or_default().push(*node);
        }
        let mut names: Vec<&str> = by_name.keys().copied().collect();
        names.sort();
        for name in names {
            let nodes = &by_name[name];
            if nodes.len() > 1 {
                // If every colliding field is directly declared on the same
                // included `FIELD GROUP` rather than on this container, that
                // group reports the duplicate itself when `all_nodes` visits
                // it in turn. Reporting it again here, at every structure
                // that transitively includes the group, would multiply one
                // problem into one diagnostic per include site.
                let owners: Vec<NodeId> = nodes.iter().filter_map(|&n| ast.node(n).parent).collect();
                let owned_elsewhere =
                    owners.len() == nodes.len() && owners.iter().all(|&o| o == owners[0]) && owners[0] != id;
                if owned_elsewhere {
                    continue;
                }
                for &dup in &nodes[1..] {
                    diagnostics.push(
                        Diagnostic::new(format!("duplicate field in {}: {name}", ast.construct_name(id)))
                            .with_source_ref(ast.node(dup).source_ref),
                    );
                }
            }
        }
    }
}

/// Each field a `STRUCTURE`/`FIELD GROUP` exposes (direct or through
/// `includes`) must carry exactly one non-anonymous tag, and no two fields
/// of the same container may share a possible tag (spec §3 invariant 5,
/// §4.5 table rows "missing tag" / "invalid use of anonymous tag" /
/// "duplicate tag"). A field's tag is its own `tag` qualifier if present,
/// else whatever its type's reference chain or `CHOICE OF` union implies.
fn check_field_tags(ast: &Ast, resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        if !matches!(ast.node(id).kind, NodeKind::Structure { .. } | NodeKind::FieldGroup { .. }) {
            continue;
        }
        let construct = ast.construct_name(id);
        let mut seen: HashMap<(u8, i64, i64), NodeId> = HashMap::new();
        for (name, field) in effective_fields(ast, resolution, id) {
            match ast.qualifier(field, QualifierGroup::Tag) {
                Some(q) => {
                    let NodeKind::Qualifier(QualifierKind::Tag(body)) = &ast.node(q).kind else {
                        continue;
                    };
                    if matches!(body, TagBody::Anonymous) {
                        diagnostics.push(
                            Diagnostic::new("invalid use of anonymous tag")
                                .with_detail(format!("fields within a {construct} cannot declare an anonymous tag"))
                                .with_source_ref(ast.node(field).source_ref),
                        );
                        continue;
                    }
                    let key = tag_key(ast, resolution, q);
                    if let Some(&first) = seen.get(&key) {
                        if first != field {
                            diagnostics.push(
                                Diagnostic::new(format!("duplicate tag in {construct}: {}", tag_display(ast, q)))
                                    .with_source_ref(ast.node(field).source_ref),
                            );
                        }
                    } else {
                        seen.insert(key, field);
                    }
                }
                None => {
                    let ty = ast.underlying_type(field).expect("a structure field always has a type");
                    let tags = possible_tags(ast, resolution, ty);
                    if tags.is_empty() || tags.iter().all(Option::is_none) {
                        diagnostics.push(
                            Diagnostic::new(format!("missing tag on {construct} field: {name}"))
                                .with_source_ref(ast.node(field).source_ref),
                        );
                        continue;
                    }
                    for t in tags.into_iter().flatten() {
                        let key = tag_key(ast, resolution, t);
                        if let Some(&first) = seen.get(&key) {
                            if first != field {
                                diagnostics.push(
                                    Diagnostic::new(format!("duplicate tag in {construct}: {}", tag_display(ast, t)))
                                        .with_source_ref(ast.node(field).source_ref),
                                );
                            }
                        } else {
                            seen.insert(key, field);
                        }
                    }
                }
            }
        }
    }
}

/// Neither a structure/field-group field nor an array/list element may
/// resolve (directly or via reference chain) to a `FIELD GROUP` (spec §3
/// invariant 4).
fn check_field_group_not_allowed(ast: &Ast, resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    let mut check = |ty: NodeId, diagnostics: &mut Vec<Diagnostic>| {
        if resolves_to_field_group(ast, resolution, ty) {
            diagnostics.push(
                Diagnostic::new("FIELD GROUP type not allowed").with_source_ref(ast.node(ty).source_ref),
            );
        }
    };
    for id in ast.all_nodes() {
        match &ast.node(id).kind {
            NodeKind::StructureField { ty, .. } => check(*ty, diagnostics),
            NodeKind::Array { body, .. } | NodeKind::List { body, .. } => match body {
                crate::ast::SequencedBody::Uniform(ty) => check(*ty, diagnostics),
                crate::ast::SequencedBody::Pattern(elems) => {
                    for &elem in elems {
                        if let NodeKind::PatternElement { ty, .. } = &ast.node(elem).kind {
                            check(*ty, diagnostics);
                        }
                    }
                }
            },
            _ => {}
        }
    }
}

fn resolves_to_field_group(ast: &Ast, resolution: &Resolution, ty: NodeId) -> bool {
    match &ast.node(ty).kind {
        NodeKind::FieldGroup { .. } => true,
        NodeKind::ReferencedType { .. } => resolution
            .terminal_type(ty)
            .is_some_and(|terminal| matches!(ast.node(terminal).kind, NodeKind::FieldGroup { .. })),
        _ => false,
    }
}

/// No two `includes` statements within the same `STRUCTURE`/`FIELD GROUP`
/// may name the same `FIELD GROUP` type definition (spec §4.5 "duplicate
/// includes statement").
fn check_duplicate_includes(ast: &Ast, resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let members: &[NodeId] = match &ast.node(id).kind {
            NodeKind::Structure { members, .. } | NodeKind::FieldGroup { members, .. } => members,
            _ => continue,
        };
        let mut seen = HashSet::new();
        for &member in members {
            let NodeKind::StructureIncludes { .. } = &ast.node(member).kind else { continue };
            let Some(target) = resolution.includes_target(member) else { continue };
            if !seen.insert(target) {
                diagnostics.push(
                    Diagnostic::new("duplicate includes statement").with_source_ref(ast.node(member).source_ref),
                );
            }
        }
    }
}

/// Named siblings must be unique: `CHOICE OF` alternates among their
/// immediate siblings (spec §3 invariant 6), and named `ARRAY`/`LIST`
/// pattern elements within the same pattern (spec §4.5 "duplicate item").
fn check_named_siblings_unique(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        match &ast.node(id).kind {
            NodeKind::ChoiceOf { alternates, .. } => {
                let mut seen: HashMap<&str, NodeId> = HashMap::new();
                for &alt in alternates {
                    let Some(name) = ast.simple_name(alt) else { continue };
                    if seen.contains_key(name) {
                        diagnostics.push(
                            Diagnostic::new("duplicate CHOICE OF alternate").with_source_ref(ast.node(alt).source_ref),
                        );
                    } else {
                        seen.insert(name, alt);
                    }
                }
            }
            NodeKind::Array { body, .. } | NodeKind::List { body, .. } => {
                let crate::ast::SequencedBody::Pattern(elems) = body else { continue };
                let construct = ast.construct_name(id);
                let mut seen: HashMap<&str, NodeId> = HashMap::new();
                for &elem in elems {
                    let Some(name) = ast.simple_name(elem) else { continue };
                    if seen.contains_key(name) {
                        diagnostics.push(
                            Diagnostic::new(format!("duplicate item in {construct}: {name}"))
                                .with_source_ref(ast.node(elem).source_ref),
                        );
                    } else {
                        seen.insert(name, elem);
                    }
                }
            }
            _ => {}
        }
    }
}

/// `range` qualifiers carry extra type-dependent constraints (spec §3
/// invariant 8): a `FLOAT`'s width form only allows 32 or 64 bits; an
/// integer's explicit bounds must themselves be integer literals, not
/// decimals.
fn check_range_type_constraints(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let is_float = matches!(ast.node(id).kind, NodeKind::Float { .. });
        let is_integer = matches!(ast.node(id).kind, NodeKind::SignedInteger { .. } | NodeKind::UnsignedInteger { .. });
        if !is_float && !is_integer {
            continue;
        }
        let Some(q) = ast.qualifier(id, QualifierGroup::Range) else { continue };
        let NodeKind::Qualifier(QualifierKind::Range(body)) = &ast.node(q).kind else { continue };
        match body {
            crate::ast::RangeBody::Width(w) if is_float && *w != 32 && *w != 64 => {
                diagnostics.push(
                    Diagnostic::new("only 32bit and 64bit range qualifiers allowed on FLOAT type")
                        .with_source_ref(ast.node(q).source_ref),
                );
            }
            crate::ast::RangeBody::Explicit { lower, upper } if is_integer => {
                let non_integer = lower.is_some_and(|n| !n.is_integer()) || upper.is_some_and(|n| !n.is_integer());
                if non_integer {
                    let type_name = ast.construct_name(id);
                    diagnostics.push(
                        Diagnostic::new(format!(
                            "bounds values for range qualifier on {type_name} must be integers"
                        ))
                        .with_source_ref(ast.node(q).source_ref),
                    );
                }
            }
            _ => {}
        }
    }
}

/// An `includes` statement must name a `FIELD GROUP`, not any other type.
fn check_includes_targets(ast: &Ast, resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let NodeKind::StructureIncludes { target_name } = &ast.node(id).kind else { continue };
        let Some(type_def) = resolution.includes_target(id) else { continue };
        let underlying = ast.underlying_type(type_def).expect("TypeDef has an underlying type");
        if !matches!(ast.node(underlying).kind, NodeKind::FieldGroup { .. }) {
            diagnostics.push(
                Diagnostic::new(format!("includes target '{target_name}' is not a FIELD GROUP"))
                    .with_source_ref(ast.node(id).source_ref),
            );
        }
    }
}

/// `length` and `range` qualifiers with explicit bounds must have a lower
/// bound that does not exceed the upper bound, and a non-negative lower
/// bound.
fn check_length_and_range_bounds(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let NodeKind::Qualifier(kind) = &ast.node(id).kind else { continue };
        match kind {
            QualifierKind::Length { lower, upper } => {
                if *lower < 0 {
                    diagnostics.push(
                        Diagnostic::new(format!("length qualifier lower bound {lower} must not be negative"))
                            .with_source_ref(ast.node(id).source_ref),
                    );
                }
                if let Some(upper) = upper {
                    if upper < lower {
                        diagnostics.push(
                            Diagnostic::new(format!(
                                "length qualifier upper bound {upper} is less than lower bound {lower}"
                            ))
                            .with_source_ref(ast.node(id).source_ref),
                        );
                    }
                }
            }
            QualifierKind::Range(crate::ast::RangeBody::Explicit { lower: Some(lo), upper: Some(hi) }) => {
                if hi.as_f64() < lo.as_f64() {
                    diagnostics.push(
                        Diagnostic::new("range qualifier upper bound is less than its lower bound")
                            .with_source_ref(ast.node(id).source_ref),
                    );
                }
            }
            QualifierKind::Range(crate::ast::RangeBody::Width(w)) if *w == 0 => {
                diagnostics.push(
                    Diagnostic::new("range qualifier width must be greater than zero")
                        .with_source_ref(ast.node(id).source_ref),
                );
            }
            _ => {}
        }
    }
}

/// A pattern element's quantifier lower bound must not exceed its upper
/// bound when both are finite.
fn check_pattern_quantifiers(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let NodeKind::PatternElement { lower, upper, .. } = &ast.node(id).kind else { continue };
        if let (crate::ast::Bound::Finite(lo), crate::ast::Bound::Finite(hi)) = (lower, upper) {
            if hi < lo {
                diagnostics.push(
                    Diagnostic::new(format!("pattern element quantifier upper bound {hi} is less than lower bound {lo}"))
                        .with_source_ref(ast.node(id).source_ref),
                );
            }
        }
    }
}

/// `CHOICE OF` must have at least one alternate. Tag ambiguity among its
/// leaf alternates is not a choice-level error (the original's
/// `ChoiceType.validate` checks only duplicate alternate names); an
/// untagged leaf is instead reflected in the no-tag sentinel of
/// [`possible_tags`] and caught, if at all, at the field that uses it.
fn check_choice_types(ast: &Ast, resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let NodeKind::ChoiceOf { alternates, .. } = &ast.node(id).kind else { continue };
        if alternates.is_empty() {
            diagnostics.push(
                Diagnostic::new("CHOICE OF must have at least one alternate")
                    .with_source_ref(ast.node(id).source_ref),
            );
        }
    }

    for id in ast.all_nodes() {
        let NodeKind::StructureField { ty, name, .. } = &ast.node(id).kind else { continue };
        if let Some(choice_node) = resolves_to_choice(ast, resolution, *ty) {
            let has_untagged_leaf = leaf_alternates(ast, choice_node)
                .into_iter()
                .any(|alt| possible_tags(ast, resolution, alt).iter().any(Option::is_none));
            if has_untagged_leaf {
                diagnostics.push(
                    Diagnostic::new(format!("field '{name}' has a CHOICE OF alternate with no determinable tag"))
                        .with_source_ref(ast.node(id).source_ref),
                );
            }
        }
    }
}

fn resolves_to_choice(ast: &Ast, resolution: &Resolution, ty: NodeId) -> Option<NodeId> {
    match &ast.node(ty).kind {
        NodeKind::ChoiceOf { .. } => Some(ty),
        NodeKind::ReferencedType { .. } => {
            let terminal = resolution.terminal_type(ty)?;
            resolves_to_choice(ast, resolution, terminal)
        }
        _ => None,
    }
}

/// A tag's identity for duplicate/collision comparisons: `(kind, tagNum,
/// profileId)`. Two `[Foo:1]`/`[Bar:1]` profile-specific tags must compare
/// unequal even though their `tag_num` matches, since they live in
/// different profiles' tag spaces (the original's `Tag.asTuple()` is
/// `(profileId, tagNum)`) — so the profile slot is resolved to a numeric
/// identity and folded into the key alongside the tag number.
fn tag_key(ast: &Ast, resolution: &Resolution, qual: NodeId) -> (u8, i64, i64) {
    let NodeKind::Qualifier(QualifierKind::Tag(body)) = &ast.node(qual).kind else {
        return (u8::MAX, 0, 0);
    };
    match body {
        TagBody::Anonymous => (0, 0, 0),
        TagBody::ContextSpecific { tag_num } => (1, *tag_num, 0),
        TagBody::ProfileSpecific { tag_num, profile } => {
            let profile_identity = match profile {
                crate::ast::ProfileSlot::Number(n) => *n,
                crate::ast::ProfileSlot::Name(_) | crate::ast::ProfileSlot::CurrentProfile => {
                    match resolution.profile_of_tag_qual(qual) {
                        Some(p) => profile_numeric_id(ast, resolution, p).unwrap_or(i64::from(qual.0)),
                        // Unresolved profile: already diagnosed in pass C.
                        // Key by the qualifier itself so this tag never
                        // spuriously collides with another unresolved one.
                        None => i64::from(qual.0),
                    }
                }
            };
            (2, *tag_num, profile_identity)
        }
    }
}

/// Renders a tag qualifier the way the original's `Tag.__str__` does, for
/// use in the `<tag>` slot of "duplicate tag in …: <tag>" (spec §4.5).
fn tag_display(ast: &Ast, qual: NodeId) -> String {
    let NodeKind::Qualifier(QualifierKind::Tag(body)) = &ast.node(qual).kind else {
        return String::new();
    };
    match body {
        TagBody::Anonymous => "anon".to_string(),
        TagBody::ContextSpecific { tag_num } => format!("{tag_num} (context-specific)"),
        TagBody::ProfileSpecific { tag_num, profile } => {
            let profile_text = match profile {
                crate::ast::ProfileSlot::Number(n) => n.to_string(),
                crate::ast::ProfileSlot::Name(name) => name.clone(),
                crate::ast::ProfileSlot::CurrentProfile => "*".to_string(),
            };
            format!("{profile_text}:{tag_num} (profile-specific)")
        }
    }
}

/// `id` and `tag` qualifier numbers must be non-negative.
fn check_id_and_tag_numbers(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let NodeKind::Qualifier(kind) = &ast.node(id).kind else { continue };
        match kind {
            QualifierKind::Id { id_num, .. } if *id_num < 0 => {
                diagnostics.push(
                    Diagnostic::new(format!("id qualifier value {id_num} must not be negative"))
                        .with_source_ref(ast.node(id).source_ref),
                );
            }
            QualifierKind::Tag(TagBody::ContextSpecific { tag_num }) if *tag_num < 0 => {
                diagnostics.push(
                    Diagnostic::new(format!("tag qualifier value {tag_num} must not be negative"))
                        .with_source_ref(ast.node(id).source_ref),
                );
            }
            QualifierKind::Tag(TagBody::ProfileSpecific { tag_num, .. }) if *tag_num < 0 => {
                diagnostics.push(
                    Diagnostic::new(format!("tag qualifier value {tag_num} must not be negative"))
                        .with_source_ref(ast.node(id).source_ref),
                );
            }
            _ => {}
        }
    }
}

/// Enumerated integer values must fall within the effective bounds their
/// `range` qualifier (or the 64-bit default) implies (spec §3 invariant 7).
fn check_enum_values_in_range(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let values: &[NodeId] = match &ast.node(id).kind {
            NodeKind::SignedInteger { values, .. } | NodeKind::UnsignedInteger { values, .. } => values,
            _ => continue,
        };
        if values.is_empty() {
            continue;
        }
        let bounds = effective_integer_bounds(ast, id);
        for &v in values {
            let NodeKind::IntegerEnumValue { value, .. } = &ast.node(v).kind else { continue };
            let value = *value as i128;
            if value < bounds.lower || value > bounds.upper {
                diagnostics.push(
                    Diagnostic::new(format!("enumerated integer value out of range: {value}"))
                        .with_source_ref(ast.node(v).source_ref),
                );
            }
        }
    }
}

/// Placement rules from spec §3 invariant 13: `VENDOR` only at global scope
/// (not nested in a namespace or profile), `PROFILE` never nested in another
/// `PROFILE`, `MESSAGE`/`STATUS CODE` only directly inside a `PROFILE`.
fn check_definition_scopes(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        match &ast.node(id).kind {
            NodeKind::Vendor { .. } => {
                if ast.node(id).parent.is_some_and(|p| !matches!(ast.node(p).kind, NodeKind::File { .. })) {
                    diagnostics.push(
                        Diagnostic::new("VENDOR definition not at global scope")
                            .with_source_ref(ast.node(id).source_ref),
                    );
                }
            }
            NodeKind::Profile { .. } => {
                if ast.containing_profile(id).is_some() {
                    diagnostics.push(
                        Diagnostic::new("PROFILE definition not allowed within another PROFILE definition")
                            .with_source_ref(ast.node(id).source_ref),
                    );
                }
            }
            NodeKind::Message { .. } => {
                if !ast.node(id).parent.is_some_and(|p| matches!(ast.node(p).kind, NodeKind::Profile { .. })) {
                    diagnostics.push(
                        Diagnostic::new("MESSAGE definition not within PROFILE definition")
                            .with_source_ref(ast.node(id).source_ref),
                    );
                }
            }
            NodeKind::StatusCode { .. } => {
                if !ast.node(id).parent.is_some_and(|p| matches!(ast.node(p).kind, NodeKind::Profile { .. })) {
                    diagnostics.push(
                        Diagnostic::new("STATUS CODE definition not within PROFILE definition")
                            .with_source_ref(ast.node(id).source_ref),
                    );
                }
            }
            _ => {}
        }
    }
}

/// Numeric id-value range checks from spec §3 invariant 10: vendor ids in
/// `0..=65535`, profile ids in `0..=2^32-1` (or vendor/number pair each in
/// `0..=65535`), message ids in `0..=255`, status code ids in `0..=65535`.
fn check_id_value_ranges(ast: &Ast, resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        match &ast.node(id).kind {
            NodeKind::Vendor { .. } => {
                let Some(q) = ast.qualifier(id, QualifierGroup::Id) else { continue };
                let NodeKind::Qualifier(QualifierKind::Id { id_num, vendor }) = &ast.node(q).kind else { continue };
                if vendor.is_some() {
                    diagnostics.push(
                        Diagnostic::new("VENDOR id qualifier must not be vendor-scoped")
                            .with_source_ref(ast.node(q).source_ref),
                    );
                }
                if !(0..=0xFFFF).contains(id_num) {
                    diagnostics.push(
                        Diagnostic::new(format!("invalid id value for VENDOR definition: {id_num}"))
                            .with_source_ref(ast.node(q).source_ref),
                    );
                }
            }
            NodeKind::Profile { .. } => {
                let Some(q) = ast.qualifier(id, QualifierGroup::Id) else { continue };
                let NodeKind::Qualifier(QualifierKind::Id { id_num, vendor }) = &ast.node(q).kind else { continue };
                let in_range = match vendor {
                    None => (0..=0xFFFF_FFFFi64).contains(id_num),
                    Some(_) => {
                        let vendor_id = crate::derived::resolved_vendor_id(ast, resolution, q);
                        (0..=0xFFFF).contains(id_num)
                            && vendor_id.map_or(true, |v| (0..=0xFFFF).contains(&v))
                    }
                };
                if !in_range {
                    diagnostics.push(
                        Diagnostic::new(format!("invalid id value for PROFILE definition: {id_num}"))
                            .with_source_ref(ast.node(q).source_ref),
                    );
                }
            }
            NodeKind::Message { .. } => {
                let Some(q) = ast.qualifier(id, QualifierGroup::Id) else { continue };
                let NodeKind::Qualifier(QualifierKind::Id { id_num, .. }) = &ast.node(q).kind else { continue };
                if !(0..=255).contains(id_num) {
                    diagnostics.push(
                        Diagnostic::new(format!("invalid id value for MESSAGE definition: {id_num}"))
                            .with_source_ref(ast.node(q).source_ref),
                    );
                }
            }
            NodeKind::StatusCode { .. } => {
                let Some(q) = ast.qualifier(id, QualifierGroup::Id) else { continue };
                let NodeKind::Qualifier(QualifierKind::Id { id_num, .. }) = &ast.node(q).kind else { continue };
                if !(0..=0xFFFF).contains(id_num) {
                    diagnostics.push(
                        Diagnostic::new(format!("invalid id value for STATUS CODE definition: {id_num}"))
                            .with_source_ref(ast.node(q).source_ref),
                    );
                }
            }
            _ => {}
        }
    }
}

/// Within one `PROFILE`, no two `MESSAGE`s share an id and no two
/// `STATUS CODE`s share an id (spec §3 invariant 12).
fn check_unique_message_and_status_ids(ast: &Ast, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let NodeKind::Profile { statements, .. } = &ast.node(id).kind else { continue };
        let mut messages: HashMap<i64, Vec<NodeId>> = HashMap::new();
        let mut status_codes: HashMap<i64, Vec<NodeId>> = HashMap::new();
        for &stmt in statements {
            match &ast.node(stmt).kind {
                NodeKind::Message { .. } => {
                    if let Some(n) = id_num_of(ast, stmt) {
                        messages.entry(n).or_default().push(stmt);
                    }
                }
                NodeKind::StatusCode { .. } => {
                    if let Some(n) = id_num_of(ast, stmt) {
                        status_codes.entry(n).or_default().push(stmt);
                    }
                }
                _ => {}
            }
        }
        for (n, nodes) in &messages {
            for &dup in &nodes[1..] {
                diagnostics.push(
                    Diagnostic::new(format!("duplicate message id: {n}")).with_source_ref(ast.node(dup).source_ref),
                );
            }
        }
        for (n, nodes) in &status_codes {
            for &dup in &nodes[1..] {
                diagnostics.push(
                    Diagnostic::new(format!("duplicate status code id: {n}")).with_source_ref(ast.node(dup).source_ref),
                );
            }
        }
    }
}

fn id_num_of(ast: &Ast, id: NodeId) -> Option<i64> {
    let q = ast.qualifier(id, QualifierGroup::Id)?;
    let NodeKind::Qualifier(QualifierKind::Id { id_num, .. }) = &ast.node(q).kind else { return None };
    Some(*id_num)
}

/// Whole-collection rules from spec §3 invariant 11: two vendors (or two
/// profiles) sharing a name must share an id; two profiles with distinct
/// fully-qualified names must have distinct ids.
fn check_vendor_and_profile_id_consistency(
    ast: &Ast,
    index: &SymbolIndex,
    resolution: &Resolution,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut vendor_fqns: Vec<&String> = index.vendors.keys().collect();
    vendor_fqns.sort();
    for fqn in vendor_fqns {
        let nodes = &index.vendors[fqn];
        let mut first_id: Option<i64> = None;
        for &v in nodes {
            let Some(n) = vendor_numeric_id(ast, v) else { continue };
            match first_id {
                None => first_id = Some(n),
                Some(f) if f != n => diagnostics.push(
                    Diagnostic::new(format!("inconsistent vendor id: 0x{n:08X} ({n})"))
                        .with_source_ref(ast.node(v).source_ref),
                ),
                _ => {}
            }
        }
    }

    let mut profile_fqns: Vec<&String> = index.profiles.keys().collect();
    profile_fqns.sort();
    let mut by_fqn: std::collections::BTreeMap<&str, Vec<(NodeId, i64)>> = std::collections::BTreeMap::new();
    for fqn in &profile_fqns {
        let nodes = &index.profiles[*fqn];
        let mut ids = Vec::new();
        for &p in nodes {
            if let Some(n) = profile_numeric_id(ast, resolution, p) {
                ids.push((p, n));
            }
        }
        let first_id = ids.first().map(|&(_, n)| n);
        for &(p, n) in &ids[1..] {
            if Some(n) != first_id {
                diagnostics.push(
                    Diagnostic::new(format!("inconsistent profile id: 0x{n:08X} ({n})"))
                        .with_source_ref(ast.node(p).source_ref),
                );
            }
        }
        by_fqn.insert(fqn.as_str(), ids);
    }

    // Distinct-name, distinct-id check: compare every pair of differently
    // named profile groups (in fully qualified name order) by their first
    // representative's id.
    let groups: Vec<(&str, i64)> = by_fqn
        .iter()
        .filter_map(|(&fqn, ids)| ids.first().map(|&(_, n)| (fqn, n)))
        .collect();
    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            let (fqn_a, id_a) = groups[i];
            let (fqn_b, id_b) = groups[j];
            if fqn_a != fqn_b && id_a == id_b {
                let node = by_fqn[fqn_b][0].0;
                diagnostics.push(
                    Diagnostic::new(format!("non-unique profile id: 0x{id_b:08X} ({id_b})"))
                        .with_source_ref(ast.node(node).source_ref),
                );
            }
        }
    }
}

fn profile_numeric_id(ast: &Ast, resolution: &Resolution, profile: NodeId) -> Option<i64> {
    let q = ast.qualifier(profile, QualifierGroup::Id)?;
    let NodeKind::Qualifier(QualifierKind::Id { id_num, vendor }) = &ast.node(q).kind else { return None };
    let vendor_id = match vendor {
        None => None,
        Some(_) => crate::derived::resolved_vendor_id(ast, resolution, q),
    };
    Some(crate::derived::profile_id(vendor_id, *id_num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, RangeBody};
    use crate::source_map::{Position, SourceId, SourceRef, Span};

    fn dummy_ref() -> SourceRef {
        SourceRef::new(SourceId(0), Span::point(Position::new(1, 1, 0)))
    }

    #[test]
    fn flags_disallowed_qualifier() {
        let mut ast = Ast::new();
        let qual = ast.push(NodeKind::Qualifier(QualifierKind::Private), dummy_ref(), None);
        let node = ast.push(NodeKind::Boolean { quals: vec![qual] }, dummy_ref(), None);
        ast.set_parent(qual, node);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![node] }, dummy_ref(), None);
        ast.set_parent(node, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("not allowed on BOOLEAN type")));
    }

    #[test]
    fn flags_length_bounds_inverted() {
        let mut ast = Ast::new();
        let qual = ast.push(
            NodeKind::Qualifier(QualifierKind::Length { lower: 10, upper: Some(5) }),
            dummy_ref(),
            None,
        );
        let node = ast.push(NodeKind::StringTy { quals: vec![qual] }, dummy_ref(), None);
        ast.set_parent(qual, node);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![node] }, dummy_ref(), None);
        ast.set_parent(node, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("is less than lower bound")));
    }

    #[test]
    fn flags_range_width_zero() {
        let mut ast = Ast::new();
        let qual = ast.push(
            NodeKind::Qualifier(QualifierKind::Range(RangeBody::Width(0))),
            dummy_ref(),
            None,
        );
        let node = ast.push(NodeKind::UnsignedInteger { quals: vec![qual], values: vec![] }, dummy_ref(), None);
        ast.set_parent(qual, node);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![node] }, dummy_ref(), None);
        ast.set_parent(node, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("width must be greater than zero")));
    }

    #[test]
    fn flags_choice_with_no_alternates() {
        let mut ast = Ast::new();
        let node = ast.push(NodeKind::ChoiceOf { quals: vec![], alternates: vec![] }, dummy_ref(), None);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![node] }, dummy_ref(), None);
        ast.set_parent(node, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("must have at least one alternate")));
    }

    fn structure_with_field(ast: &mut Ast, ty: NodeId, tag_qual: Option<NodeId>) -> NodeId {
        let field_quals = tag_qual.into_iter().collect::<Vec<_>>();
        let field = ast.push(
            NodeKind::StructureField { name: "f".into(), quals: field_quals.clone(), ty, docs: None },
            dummy_ref(),
            None,
        );
        for &q in &field_quals {
            ast.set_parent(q, field);
        }
        ast.set_parent(ty, field);
        let structure = ast.push(NodeKind::Structure { quals: vec![], members: vec![field] }, dummy_ref(), None);
        ast.set_parent(field, structure);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![structure] }, dummy_ref(), None);
        ast.set_parent(structure, file);
        ast.register_file(file);
        structure
    }

    #[test]
    fn flags_missing_tag_on_structure_field() {
        let mut ast = Ast::new();
        let ty = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        structure_with_field(&mut ast, ty, None);
        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("missing tag on")));
    }

    #[test]
    fn flags_anonymous_tag_on_structure_field() {
        let mut ast = Ast::new();
        let tag = ast.push(
            NodeKind::Qualifier(QualifierKind::Tag(TagBody::Anonymous)),
            dummy_ref(),
            None,
        );
        let ty = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        structure_with_field(&mut ast, ty, Some(tag));
        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("invalid use of anonymous tag")));
    }

    /// Two profile-specific tags with the same tag number but different
    /// profile slots must not collide: `[1234:5]` and `[5678:5]` are
    /// distinct tags, since a tag number is only unique within its own
    /// profile's tag space.
    #[test]
    fn distinct_profile_specific_tags_with_the_same_number_do_not_collide() {
        let mut ast = Ast::new();
        let tag_a = ast.push(
            NodeKind::Qualifier(QualifierKind::Tag(TagBody::ProfileSpecific {
                profile: crate::ast::ProfileSlot::Number(1234),
                tag_num: 5,
            })),
            dummy_ref(),
            None,
        );
        let ty_a = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        let field_a = ast.push(
            NodeKind::StructureField { name: "a".into(), quals: vec![tag_a], ty: ty_a, docs: None },
            dummy_ref(),
            None,
        );
        ast.set_parent(tag_a, field_a);
        ast.set_parent(ty_a, field_a);

        let tag_b = ast.push(
            NodeKind::Qualifier(QualifierKind::Tag(TagBody::ProfileSpecific {
                profile: crate::ast::ProfileSlot::Number(5678),
                tag_num: 5,
            })),
            dummy_ref(),
            None,
        );
        let ty_b = ast.push(NodeKind::Float { quals: vec![] }, dummy_ref(), None);
        let field_b = ast.push(
            NodeKind::StructureField { name: "b".into(), quals: vec![tag_b], ty: ty_b, docs: None },
            dummy_ref(),
            None,
        );
        ast.set_parent(tag_b, field_b);
        ast.set_parent(ty_b, field_b);

        let structure = ast.push(
            NodeKind::Structure { quals: vec![], members: vec![field_a, field_b] },
            dummy_ref(),
            None,
        );
        ast.set_parent(field_a, structure);
        ast.set_parent(field_b, structure);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![structure] }, dummy_ref(), None);
        ast.set_parent(structure, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(!diags.iter().any(|d| d.message.contains("duplicate tag")), "unexpected diagnostics: {diags:?}");
    }

    /// Two fields sharing the same profile-specific tag — same profile
    /// *and* same tag number — is a genuine duplicate.
    #[test]
    fn flags_duplicate_profile_specific_tag_in_same_profile() {
        let mut ast = Ast::new();
        let tag_a = ast.push(
            NodeKind::Qualifier(QualifierKind::Tag(TagBody::ProfileSpecific {
                profile: crate::ast::ProfileSlot::Number(1234),
                tag_num: 5,
            })),
            dummy_ref(),
            None,
        );
        let ty_a = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        let field_a = ast.push(
            NodeKind::StructureField { name: "a".into(), quals: vec![tag_a], ty: ty_a, docs: None },
            dummy_ref(),
            None,
        );
        ast.set_parent(tag_a, field_a);
        ast.set_parent(ty_a, field_a);

        let tag_b = ast.push(
            NodeKind::Qualifier(QualifierKind::Tag(TagBody::ProfileSpecific {
                profile: crate::ast::ProfileSlot::Number(1234),
                tag_num: 5,
            })),
            dummy_ref(),
            None,
        );
        let ty_b = ast.push(NodeKind::Float { quals: vec![] }, dummy_ref(), None);
        let field_b = ast.push(
            NodeKind::StructureField { name: "b".into(), quals: vec![tag_b], ty: ty_b, docs: None },
            dummy_ref(),
            None,
        );
        ast.set_parent(tag_b, field_b);
        ast.set_parent(ty_b, field_b);

        let structure = ast.push(
            NodeKind::Structure { quals: vec![], members: vec![field_a, field_b] },
            dummy_ref(),
            None,
        );
        ast.set_parent(field_a, structure);
        ast.set_parent(field_b, structure);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![structure] }, dummy_ref(), None);
        ast.set_parent(structure, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("duplicate tag in STRUCTURE type: 1234:5 (profile-specific)")));
    }

    #[test]
    fn flags_field_group_type_used_directly_as_a_field_type() {
        let mut ast = Ast::new();
        let fg = ast.push(NodeKind::FieldGroup { quals: vec![], members: vec![] }, dummy_ref(), None);
        let tag = ast.push(
            NodeKind::Qualifier(QualifierKind::Tag(TagBody::ContextSpecific { tag_num: 1 })),
            dummy_ref(),
            None,
        );
        structure_with_field(&mut ast, fg, Some(tag));
        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("FIELD GROUP type not allowed")));
    }

    #[test]
    fn flags_duplicate_includes_statement() {
        let mut ast = Ast::new();
        let fg_underlying = ast.push(NodeKind::FieldGroup { quals: vec![], members: vec![] }, dummy_ref(), None);
        let fg_def = ast.push(
            NodeKind::TypeDef { name: "G".into(), quals: vec![], underlying: fg_underlying, docs: None },
            dummy_ref(),
            None,
        );
        ast.set_parent(fg_underlying, fg_def);
        let inc_a = ast.push(NodeKind::StructureIncludes { target_name: "G".into() }, dummy_ref(), None);
        let inc_b = ast.push(NodeKind::StructureIncludes { target_name: "G".into() }, dummy_ref(), None);
        let structure = ast.push(
            NodeKind::Structure { quals: vec![], members: vec![inc_a, inc_b] },
            dummy_ref(),
            None,
        );
        ast.set_parent(inc_a, structure);
        ast.set_parent(inc_b, structure);
        let file = ast.push(
            NodeKind::File { name: "a.tlv".into(), statements: vec![fg_def, structure] },
            dummy_ref(),
            None,
        );
        ast.set_parent(fg_def, file);
        ast.set_parent(structure, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let (resolution, _) = crate::resolver::resolve(&ast, &index);
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("duplicate includes statement")));
    }

    #[test]
    fn flags_duplicate_choice_alternate_names() {
        let mut ast = Ast::new();
        let ty_a = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        let alt_a = ast.push(
            NodeKind::ChoiceAlternate { name: Some("x".into()), quals: vec![], ty: ty_a, docs: None },
            dummy_ref(),
            None,
        );
        let ty_b = ast.push(NodeKind::Float { quals: vec![] }, dummy_ref(), None);
        let alt_b = ast.push(
            NodeKind::ChoiceAlternate { name: Some("x".into()), quals: vec![], ty: ty_b, docs: None },
            dummy_ref(),
            None,
        );
        let choice = ast.push(
            NodeKind::ChoiceOf { quals: vec![], alternates: vec![alt_a, alt_b] },
            dummy_ref(),
            None,
        );
        ast.set_parent(alt_a, choice);
        ast.set_parent(alt_b, choice);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![choice] }, dummy_ref(), None);
        ast.set_parent(choice, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("duplicate CHOICE OF alternate")));
    }

    /// A `CHOICE OF` is not itself responsible for tag ambiguity among its
    /// alternates — two alternates sharing a tag, or left untagged, is not
    /// a choice-level error (the original's `ChoiceType.validate` checks
    /// only duplicate alternate names). Both untagged alternates here must
    /// surface as the no-tag sentinel, not a diagnostic.
    #[test]
    fn untagged_choice_alternates_are_not_a_choice_level_error() {
        let mut ast = Ast::new();
        let ty_a = ast.push(NodeKind::Boolean { quals: vec![] }, dummy_ref(), None);
        let alt_a =
            ast.push(NodeKind::ChoiceAlternate { name: Some("x".into()), quals: vec![], ty: ty_a, docs: None }, dummy_ref(), None);
        ast.set_parent(ty_a, alt_a);

        let ty_b = ast.push(NodeKind::Float { quals: vec![] }, dummy_ref(), None);
        let alt_b =
            ast.push(NodeKind::ChoiceAlternate { name: Some("y".into()), quals: vec![], ty: ty_b, docs: None }, dummy_ref(), None);
        ast.set_parent(ty_b, alt_b);

        let choice = ast.push(
            NodeKind::ChoiceOf { quals: vec![], alternates: vec![alt_a, alt_b] },
            dummy_ref(),
            None,
        );
        ast.set_parent(alt_a, choice);
        ast.set_parent(alt_b, choice);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![choice] }, dummy_ref(), None);
        ast.set_parent(choice, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.is_empty(), "expected no diagnostics, got {diags:?}");
    }

    #[test]
    fn flags_range_width_not_32_or_64_on_float() {
        let mut ast = Ast::new();
        let qual = ast.push(
            NodeKind::Qualifier(QualifierKind::Range(RangeBody::Width(16))),
            dummy_ref(),
            None,
        );
        let node = ast.push(NodeKind::Float { quals: vec![qual] }, dummy_ref(), None);
        ast.set_parent(qual, node);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![node] }, dummy_ref(), None);
        ast.set_parent(node, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags
            .iter()
            .any(|d| d.message.contains("only 32bit and 64bit range qualifiers allowed on FLOAT type")));
    }

    #[test]
    fn flags_non_integer_range_bounds_on_integer_type() {
        let mut ast = Ast::new();
        let qual = ast.push(
            NodeKind::Qualifier(QualifierKind::Range(RangeBody::Explicit {
                lower: Some(crate::ast::NumericLiteral::Decimal(1.5)),
                upper: Some(crate::ast::NumericLiteral::Integer(10)),
            })),
            dummy_ref(),
            None,
        );
        let node = ast.push(
            NodeKind::SignedInteger { quals: vec![qual], values: vec![] },
            dummy_ref(),
            None,
        );
        ast.set_parent(qual, node);
        let file = ast.push(NodeKind::File { name: "a.tlv".into(), statements: vec![node] }, dummy_ref(), None);
        ast.set_parent(node, file);
        ast.register_file(file);

        let index = SymbolIndex::build(&ast);
        let resolution = Resolution::default();
        let diags = validate(&ast, &index, &resolution);
        assert!(diags.iter().any(|d| d.message.contains("must be integers")));
    }
}
