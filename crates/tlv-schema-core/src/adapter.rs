//! Turns a [`ParseEvent`] tree into [`Ast`] nodes: expands dotted namespace
//! declarations into nested `Namespace` nodes, attaches dedented doc
//! comments to the construct that follows them, normalizes pattern-element
//! quantifiers to a `(lower, upper)` [`Bound`] pair, and fixes up parent
//! links once each container's children are known.
//!
//! The adapter never rejects anything on semantic grounds (unknown names,
//! duplicate definitions, disallowed qualifiers) — that is the validator's
//! job once the whole AST exists. It only rejects parse-event shapes that
//! cannot correspond to any grammar production.

use crate::ast::{Ast, Bound, NodeId, NodeKind, NumericLiteral, OrderKind, ProfileSlot, QualifierKind, RangeBody, SequencedBody, TagBody, VendorSlot};
use crate::error::ParseError;
use crate::parse_event::{ParseEvent, Rule};
use crate::source_map::{SourceId, SourceRef, Span};

/// Adapts one parsed source file into the AST, returning the new `File`
/// node's id. The caller registers it with [`Ast::register_file`].
pub fn adapt_file(ast: &mut Ast, source_id: SourceId, file_name: &str, event: &ParseEvent) -> Result<NodeId, ParseError> {
    let ctx = Ctx { source_id };
    let (rule, span, children) = expect_node(event)?;
    if rule != Rule::File {
        return Err(ctx.malformed(span, format!("expected a schema file, found {rule:?}")));
    }
    let statement_events = flatten_statements(children);
    let mut statements = Vec::with_capacity(statement_events.len());
    for s in statement_events {
        statements.push(adapt_statement(&ctx, ast, s, None)?);
    }
    let id = ast.push(
        NodeKind::File {
            name: file_name.to_string(),
            statements: statements.clone(),
        },
        ctx.source_ref(span),
        None,
    );
    for s in &statements {
        ast.set_parent(*s, id);
    }
    Ok(id)
}

struct Ctx {
    source_id: SourceId,
}

impl Ctx {
    fn source_ref(&self, span: Span) -> SourceRef {
        SourceRef::new(self.source_id, span)
    }

    fn malformed(&self, span: Span, message: impl Into<String>) -> ParseError {
        ParseError::MalformedConstruct {
            message: message.into(),
            source_ref: self.source_ref(span),
        }
    }
}

fn expect_node(event: &ParseEvent) -> Result<(Rule, Span, &[ParseEvent]), ParseError> {
    match event {
        ParseEvent::Node { rule, span, children } => Ok((*rule, *span, children.as_slice())),
        other => Err(ParseError::UnexpectedToken {
            found: format!("{other:?}"),
            source_ref: SourceRef::new(SourceId(0), other.span()),
        }),
    }
}

/// `Statements` may appear either as a wrapper node or be inlined directly;
/// this accepts both shapes.
fn flatten_statements(children: &[ParseEvent]) -> &[ParseEvent] {
    if let [ParseEvent::Node { rule: Rule::Statements, children: inner, .. }] = children {
        inner.as_slice()
    } else {
        children
    }
}

fn take_doc(children: &[ParseEvent]) -> (Option<String>, &[ParseEvent]) {
    match children.first() {
        Some(ParseEvent::Doc { text, .. }) => (Some(text.clone()), &children[1..]),
        _ => (None, children),
    }
}

fn take_quals<'a>(children: &'a [ParseEvent]) -> (Option<&'a ParseEvent>, &'a [ParseEvent]) {
    match children.first() {
        Some(ev @ ParseEvent::Node { rule: Rule::QualList, .. }) => (Some(ev), &children[1..]),
        _ => (None, children),
    }
}

fn expect_name(ctx: &Ctx, event: &ParseEvent) -> Result<(String, Span), ParseError> {
    match event {
        ParseEvent::Name { text, span, .. } => Ok((text.clone(), *span)),
        other => Err(ctx.malformed(other.span(), format!("expected a name, found {other:?}"))),
    }
}

fn expect_int(ctx: &Ctx, event: &ParseEvent) -> Result<(i64, Span), ParseError> {
    match event {
        ParseEvent::Number { text, span } => {
            let value = parse_int_literal(text).ok_or_else(|| ParseError::NumberOutOfRange {
                text: text.clone(),
                source_ref: ctx.source_ref(*span),
            })?;
            Ok((value, *span))
        }
        other => Err(ctx.malformed(other.span(), format!("expected a number, found {other:?}"))),
    }
}

fn parse_int_literal(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<i64>().ok()
    }
}

fn expect_numeric_literal(ctx: &Ctx, event: &ParseEvent) -> Result<NumericLiteral, ParseError> {
    match event {
        ParseEvent::Number { .. } => Ok(NumericLiteral::Integer(expect_int(ctx, event)?.0)),
        ParseEvent::Decimal { text, span } => {
            let value: f64 = text.parse().map_err(|_| ParseError::NumberOutOfRange {
                text: text.clone(),
                source_ref: ctx.source_ref(*span),
            })?;
            Ok(NumericLiteral::Decimal(value))
        }
        other => Err(ctx.malformed(other.span(), format!("expected a numeric literal, found {other:?}"))),
    }
}

fn expect_bound(ctx: &Ctx, event: &ParseEvent) -> Result<Bound, ParseError> {
    match event {
        ParseEvent::Wildcard { .. } => Ok(Bound::Infinite),
        ParseEvent::Number { .. } => Ok(Bound::Finite(expect_int(ctx, event)?.0 as u64)),
        other => Err(ctx.malformed(other.span(), format!("expected a quantifier bound, found {other:?}"))),
    }
}

// ---------------------------------------------------------------------
// Qualifiers
// ---------------------------------------------------------------------

fn adapt_quals(ctx: &Ctx, ast: &mut Ast, qual_list: Option<&ParseEvent>) -> Result<Vec<NodeId>, ParseError> {
    let Some(event) = qual_list else { return Ok(vec![]) };
    let (_, _, children) = expect_node(event)?;
    let mut out = Vec::with_capacity(children.len());
    for qual_event in children {
        out.push(adapt_qualifier(ctx, ast, qual_event)?);
    }
    Ok(out)
}

fn adapt_qualifier(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent) -> Result<NodeId, ParseError> {
    let (rule, span, children) = expect_node(event)?;
    let kind = match rule {
        Rule::QualExtensible => QualifierKind::Extensible,
        Rule::QualOptional => QualifierKind::Optional,
        Rule::QualPrivate => QualifierKind::Private,
        Rule::QualInvariant => QualifierKind::Invariant,
        Rule::QualNullable => QualifierKind::Nullable,
        Rule::QualOrder => {
            let (name, name_span) = expect_name(ctx, children.first().ok_or_else(|| {
                ctx.malformed(span, "order qualifier missing its keyword")
            })?)?;
            let order = match name.as_str() {
                "tag-order" => OrderKind::TagOrder,
                "schema-order" => OrderKind::SchemaOrder,
                "any-order" => OrderKind::AnyOrder,
                other => {
                    return Err(ctx.malformed(name_span, format!("unknown order qualifier '{other}'")))
                }
            };
            QualifierKind::Order(order)
        }
        Rule::QualRangeWidth => {
            let (width, _) = expect_int(ctx, children.first().ok_or_else(|| {
                ctx.malformed(span, "range qualifier missing its width")
            })?)?;
            QualifierKind::Range(RangeBody::Width(width as u32))
        }
        Rule::QualRangeBounds => {
            let lower = children.first().map(|e| expect_numeric_literal(ctx, e)).transpose()?;
            let upper = children.get(1).map(|e| expect_numeric_literal(ctx, e)).transpose()?;
            QualifierKind::Range(RangeBody::Explicit { lower, upper })
        }
        Rule::QualLength => {
            let lower = children
                .first()
                .map(|e| expect_int(ctx, e))
                .transpose()?
                .map(|(v, _)| v)
                .unwrap_or(0);
            let upper = children.get(1).map(|e| expect_int(ctx, e)).transpose()?.map(|(v, _)| v);
            QualifierKind::Length { lower, upper }
        }
        Rule::QualTag => adapt_tag_qualifier(ctx, span, children)?,
        Rule::QualId => {
            let (id_num, _) = expect_int(ctx, children.first().ok_or_else(|| {
                ctx.malformed(span, "id qualifier missing its number")
            })?)?;
            let vendor = match children.get(1) {
                Some(ParseEvent::Name { text, .. }) => Some(VendorSlot::Name(text.clone())),
                Some(ev @ ParseEvent::Number { .. }) => Some(VendorSlot::Number(expect_int(ctx, ev)?.0)),
                _ => None,
            };
            QualifierKind::Id { id_num, vendor }
        }
        other => return Err(ctx.malformed(span, format!("'{other:?}' is not a qualifier"))),
    };
    Ok(ast.push(NodeKind::Qualifier(kind), ctx.source_ref(span), None))
}

fn adapt_tag_qualifier(ctx: &Ctx, span: Span, children: &[ParseEvent]) -> Result<QualifierKind, ParseError> {
    match children {
        [] => Ok(QualifierKind::Tag(TagBody::Anonymous)),
        [num] => {
            let (tag_num, _) = expect_int(ctx, num)?;
            Ok(QualifierKind::Tag(TagBody::ContextSpecific { tag_num }))
        }
        [profile, num] => {
            let profile = match profile {
                ParseEvent::Wildcard { .. } => ProfileSlot::CurrentProfile,
                ParseEvent::Name { text, .. } => ProfileSlot::Name(text.clone()),
                ev @ ParseEvent::Number { .. } => ProfileSlot::Number(expect_int(ctx, ev)?.0),
                other => return Err(ctx.malformed(other.span(), "invalid profile slot in tag qualifier")),
            };
            let (tag_num, _) = expect_int(ctx, num)?;
            Ok(QualifierKind::Tag(TagBody::ProfileSpecific { profile, tag_num }))
        }
        _ => Err(ctx.malformed(span, "tag qualifier takes at most a profile slot and a tag number")),
    }
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

fn adapt_statement(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (rule, span, _) = expect_node(event)?;
    match rule {
        Rule::Namespace => adapt_namespace(ctx, ast, event, parent),
        Rule::Vendor => adapt_vendor(ctx, ast, event, parent),
        Rule::Profile => adapt_profile(ctx, ast, event, parent),
        Rule::Message | Rule::MessageEmptyPayload => adapt_message(ctx, ast, event, parent),
        Rule::StatusCode => adapt_status_code(ctx, ast, event, parent),
        Rule::TypeDef => adapt_type_def(ctx, ast, event, parent),
        other => Err(ctx.malformed(span, format!("'{other:?}' is not a top-level statement"))),
    }
}

/// Expands `namespace a.b.c { ... }` into nested `Namespace` nodes, the
/// innermost of which holds the body's statements.
fn adapt_namespace(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (docs, rest) = take_doc(children);
    let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(span, "namespace missing a name"))?;
    let (dotted, name_span) = expect_name(ctx, name_event)?;
    let body = rest.first().ok_or_else(|| ctx.malformed(span, "namespace missing a body"))?;
    let (_, _, body_children) = expect_node(body)?;
    let statement_events = flatten_statements(body_children);

    let segments: Vec<&str> = dotted.split('.').collect();
    build_namespace_chain(ctx, ast, &segments, name_span, docs, statement_events, parent)
}

fn build_namespace_chain(
    ctx: &Ctx,
    ast: &mut Ast,
    segments: &[&str],
    name_span: Span,
    docs: Option<String>,
    statement_events: &[ParseEvent],
    parent: Option<NodeId>,
) -> Result<NodeId, ParseError> {
    let (head, rest) = segments.split_first().expect("namespace name has at least one segment");
    if rest.is_empty() {
        let mut statements = Vec::with_capacity(statement_events.len());
        for s in statement_events {
            statements.push(adapt_statement(ctx, ast, s, None)?);
        }
        let id = ast.push(
            NodeKind::Namespace {
                name: (*head).to_string(),
                statements: statements.clone(),
                docs,
            },
            ctx.source_ref(name_span),
            parent,
        );
        for s in &statements {
            ast.set_parent(*s, id);
        }
        Ok(id)
    } else {
        let inner_id = build_namespace_chain(ctx, ast, rest, name_span, docs, statement_events, None)?;
        let id = ast.push(
            NodeKind::Namespace {
                name: (*head).to_string(),
                statements: vec![inner_id],
                docs: None,
            },
            ctx.source_ref(name_span),
            parent,
        );
        ast.set_parent(inner_id, id);
        Ok(id)
    }
}

fn adapt_vendor(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (docs, rest) = take_doc(children);
    let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(span, "VENDOR missing a name"))?;
    let (name, _) = expect_name(ctx, name_event)?;
    let (qual_list, _) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let id = ast.push(
        NodeKind::Vendor { name, quals: quals.clone(), docs },
        ctx.source_ref(span),
        parent,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    Ok(id)
}

fn adapt_profile(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (docs, rest) = take_doc(children);
    let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(span, "PROFILE missing a name"))?;
    let (name, _) = expect_name(ctx, name_event)?;
    let (qual_list, rest) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let statement_events: &[ParseEvent] = match rest.first() {
        Some(body) => {
            let (_, _, body_children) = expect_node(body)?;
            flatten_statements(body_children)
        }
        None => &[],
    };
    let mut statements = Vec::with_capacity(statement_events.len());
    for s in statement_events {
        statements.push(adapt_statement(ctx, ast, s, None)?);
    }
    let id = ast.push(
        NodeKind::Profile {
            name,
            quals: quals.clone(),
            statements: statements.clone(),
            docs,
        },
        ctx.source_ref(span),
        parent,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    for s in &statements {
        ast.set_parent(*s, id);
    }
    Ok(id)
}

fn adapt_message(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (rule, span, children) = expect_node(event)?;
    let empty_payload = rule == Rule::MessageEmptyPayload;
    let (docs, rest) = take_doc(children);
    let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(span, "MESSAGE missing a name"))?;
    let (name, _) = expect_name(ctx, name_event)?;
    let (qual_list, rest) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let payload = if empty_payload {
        None
    } else {
        match rest.first() {
            Some(payload_event) => Some(adapt_type(ctx, ast, payload_event, None)?),
            None => None,
        }
    };
    let id = ast.push(
        NodeKind::Message {
            name,
            quals: quals.clone(),
            payload,
            empty_payload,
            docs,
        },
        ctx.source_ref(span),
        parent,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    if let Some(p) = payload {
        ast.set_parent(p, id);
    }
    Ok(id)
}

fn adapt_status_code(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (docs, rest) = take_doc(children);
    let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(span, "STATUS CODE missing a name"))?;
    let (name, _) = expect_name(ctx, name_event)?;
    let (qual_list, _) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let id = ast.push(
        NodeKind::StatusCode { name, quals: quals.clone(), docs },
        ctx.source_ref(span),
        parent,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    Ok(id)
}

fn adapt_type_def(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (docs, rest) = take_doc(children);
    let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(span, "type definition missing a name"))?;
    let (name, _) = expect_name(ctx, name_event)?;
    let (qual_list, rest) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let underlying_event = rest.first().ok_or_else(|| ctx.malformed(span, "type definition missing its underlying type"))?;
    let underlying = adapt_type(ctx, ast, underlying_event, None)?;
    let id = ast.push(
        NodeKind::TypeDef {
            name,
            quals: quals.clone(),
            underlying,
            docs,
        },
        ctx.source_ref(span),
        parent,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    ast.set_parent(underlying, id);
    Ok(id)
}

// ---------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------

fn adapt_type(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
    let (rule, span, children) = expect_node(event)?;
    match rule {
        Rule::TypeSignedInteger => adapt_integer_type(ctx, ast, span, children, parent, true),
        Rule::TypeUnsignedInteger => adapt_integer_type(ctx, ast, span, children, parent, false),
        Rule::TypeFloat => adapt_simple_quals_type(ctx, ast, span, children, parent, NodeKind::Float { quals: vec![] }),
        Rule::TypeBoolean => adapt_simple_quals_type(ctx, ast, span, children, parent, NodeKind::Boolean { quals: vec![] }),
        Rule::TypeString => adapt_simple_quals_type(ctx, ast, span, children, parent, NodeKind::StringTy { quals: vec![] }),
        Rule::TypeByteString => adapt_simple_quals_type(ctx, ast, span, children, parent, NodeKind::ByteStringTy { quals: vec![] }),
        Rule::TypeNull => adapt_simple_quals_type(ctx, ast, span, children, parent, NodeKind::NullTy { quals: vec![] }),
        Rule::TypeAny => adapt_simple_quals_type(ctx, ast, span, children, parent, NodeKind::AnyTy { quals: vec![] }),
        Rule::TypeStructure => adapt_members_type(ctx, ast, span, children, parent, false),
        Rule::TypeFieldGroup => adapt_members_type(ctx, ast, span, children, parent, true),
        Rule::TypeArray => adapt_sequenced_type(ctx, ast, span, children, parent, false),
        Rule::TypeList => adapt_sequenced_type(ctx, ast, span, children, parent, true),
        Rule::TypeChoiceOf => adapt_choice_type(ctx, ast, span, children, parent),
        Rule::TypeReference => adapt_reference_type(ctx, ast, span, children, parent),
        other => Err(ctx.malformed(span, format!("'{other:?}' is not a type"))),
    }
}

fn adapt_integer_type(
    ctx: &Ctx,
    ast: &mut Ast,
    span: Span,
    children: &[ParseEvent],
    parent: Option<NodeId>,
    signed: bool,
) -> Result<NodeId, ParseError> {
    let (qual_list, rest) = take_quals(children);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let values = match rest.first() {
        Some(ev @ ParseEvent::Node { rule: Rule::EnumValues, .. }) => adapt_enum_values(ctx, ast, ev)?,
        _ => vec![],
    };
    let kind = if signed {
        NodeKind::SignedInteger { quals: quals.clone(), values: values.clone() }
    } else {
        NodeKind::UnsignedInteger { quals: quals.clone(), values: values.clone() }
    };
    let id = ast.push(kind, ctx.source_ref(span), parent);
    for q in &quals {
        ast.set_parent(*q, id);
    }
    for v in &values {
        ast.set_parent(*v, id);
    }
    Ok(id)
}

fn adapt_enum_values(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent) -> Result<Vec<NodeId>, ParseError> {
    let (_, _, children) = expect_node(event)?;
    let mut out = Vec::with_capacity(children.len());
    for value_event in children {
        let (_, vspan, vchildren) = expect_node(value_event)?;
        let (docs, rest) = take_doc(vchildren);
        let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(vspan, "enum value missing a name"))?;
        let (name, _) = expect_name(ctx, name_event)?;
        let num_event = rest.first().ok_or_else(|| ctx.malformed(vspan, "enum value missing its number"))?;
        let (value, _) = expect_int(ctx, num_event)?;
        out.push(ast.push(
            NodeKind::IntegerEnumValue { name, value, docs },
            ctx.source_ref(vspan),
            None,
        ));
    }
    Ok(out)
}

fn adapt_simple_quals_type(
    ctx: &Ctx,
    ast: &mut Ast,
    span: Span,
    children: &[ParseEvent],
    parent: Option<NodeId>,
    template: NodeKind,
) -> Result<NodeId, ParseError> {
    let (qual_list, _) = take_quals(children);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let kind = match template {
        NodeKind::Float { .. } => NodeKind::Float { quals: quals.clone() },
        NodeKind::Boolean { .. } => NodeKind::Boolean { quals: quals.clone() },
        NodeKind::StringTy { .. } => NodeKind::StringTy { quals: quals.clone() },
        NodeKind::ByteStringTy { .. } => NodeKind::ByteStringTy { quals: quals.clone() },
        NodeKind::NullTy { .. } => NodeKind::NullTy { quals: quals.clone() },
        NodeKind::AnyTy { .. } => NodeKind::AnyTy { quals: quals.clone() },
        _ => unreachable!("adapt_simple_quals_type called with a non-simple template"),
    };
    let id = ast.push(kind, ctx.source_ref(span), parent);
    for q in &quals {
        ast.set_parent(*q, id);
    }
    Ok(id)
}

fn adapt_members_type(
    ctx: &Ctx,
    ast: &mut Ast,
    span: Span,
    children: &[ParseEvent],
    parent: Option<NodeId>,
    field_group: bool,
) -> Result<NodeId, ParseError> {
    let (qual_list, rest) = take_quals(children);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let mut members = Vec::new();
    if let Some(members_event) = rest.first() {
        let (_, _, member_children) = expect_node(members_event)?;
        for member_event in member_children {
            let (mrule, _, _) = expect_node(member_event)?;
            let member_id = match mrule {
                Rule::StructureIncludes => adapt_structure_includes(ctx, ast, member_event)?,
                _ => adapt_structure_field(ctx, ast, member_event)?,
            };
            members.push(member_id);
        }
    }
    let kind = if field_group {
        NodeKind::FieldGroup { quals: quals.clone(), members: members.clone() }
    } else {
        NodeKind::Structure { quals: quals.clone(), members: members.clone() }
    };
    let id = ast.push(kind, ctx.source_ref(span), parent);
    for q in &quals {
        ast.set_parent(*q, id);
    }
    for m in &members {
        ast.set_parent(*m, id);
    }
    Ok(id)
}

fn adapt_structure_field(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (docs, rest) = take_doc(children);
    let (name_event, rest) = rest.split_first().ok_or_else(|| ctx.malformed(span, "field missing a name"))?;
    let (name, _) = expect_name(ctx, name_event)?;
    let (qual_list, rest) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let ty_event = rest.first().ok_or_else(|| ctx.malformed(span, "field missing a type"))?;
    let ty = adapt_type(ctx, ast, ty_event, None)?;
    let id = ast.push(
        NodeKind::StructureField { name, quals: quals.clone(), ty, docs },
        ctx.source_ref(span),
        None,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    ast.set_parent(ty, id);
    Ok(id)
}

fn adapt_structure_includes(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let name_event = children.first().ok_or_else(|| ctx.malformed(span, "includes statement missing a type name"))?;
    let (target_name, _) = expect_name(ctx, name_event)?;
    Ok(ast.push(NodeKind::StructureIncludes { target_name }, ctx.source_ref(span), None))
}

fn adapt_sequenced_type(
    ctx: &Ctx,
    ast: &mut Ast,
    span: Span,
    children: &[ParseEvent],
    parent: Option<NodeId>,
    is_list: bool,
) -> Result<NodeId, ParseError> {
    let (qual_list, rest) = take_quals(children);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let pattern_event = rest.first().ok_or_else(|| ctx.malformed(span, "missing element type pattern"))?;
    let (_, _, pattern_children) = expect_node(pattern_event)?;

    let (body, body_ids) = adapt_elem_type_pattern(ctx, ast, pattern_children)?;
    let kind = if is_list {
        NodeKind::List { quals: quals.clone(), body }
    } else {
        NodeKind::Array { quals: quals.clone(), body }
    };
    let id = ast.push(kind, ctx.source_ref(span), parent);
    for q in &quals {
        ast.set_parent(*q, id);
    }
    for c in &body_ids {
        ast.set_parent(*c, id);
    }
    Ok(id)
}

fn adapt_elem_type_pattern(
    ctx: &Ctx,
    ast: &mut Ast,
    children: &[ParseEvent],
) -> Result<(SequencedBody, Vec<NodeId>), ParseError> {
    match children {
        [single] => {
            let (rule, _, _) = expect_node(single)?;
            if rule == Rule::PatternElement {
                let elem = adapt_pattern_element(ctx, ast, single)?;
                Ok((SequencedBody::Pattern(vec![elem]), vec![elem]))
            } else {
                let ty = adapt_type(ctx, ast, single, None)?;
                Ok((SequencedBody::Uniform(ty), vec![ty]))
            }
        }
        many => {
            let mut elems = Vec::with_capacity(many.len());
            for e in many {
                elems.push(adapt_pattern_element(ctx, ast, e)?);
            }
            Ok((SequencedBody::Pattern(elems.clone()), elems))
        }
    }
}

fn adapt_pattern_element(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (name, rest): (Option<String>, &[ParseEvent]) = match children.first() {
        Some(ParseEvent::Name { text, .. }) => (Some(text.clone()), &children[1..]),
        Some(ParseEvent::Wildcard { .. }) => (None, &children[1..]),
        _ => (None, children),
    };
    let (qual_list, rest) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let ty_event = rest.first().ok_or_else(|| ctx.malformed(span, "pattern element missing a type"))?;
    let ty = adapt_type(ctx, ast, ty_event, None)?;
    let quantifier_event = rest.get(1);
    let (lower, upper) = match quantifier_event {
        Some(q) => {
            let (_, qspan, qchildren) = expect_node(q)?;
            match qchildren {
                [] => (Bound::Finite(1), Bound::Finite(1)),
                [one] => {
                    let b = expect_bound(ctx, one)?;
                    (b, b)
                }
                [lo, hi] => (expect_bound(ctx, lo)?, expect_bound(ctx, hi)?),
                _ => return Err(ctx.malformed(qspan, "quantifier takes at most two bounds")),
            }
        }
        None => (Bound::Finite(1), Bound::Finite(1)),
    };
    let id = ast.push(
        NodeKind::PatternElement { name, quals: quals.clone(), ty, lower, upper },
        ctx.source_ref(span),
        None,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    ast.set_parent(ty, id);
    Ok(id)
}

fn adapt_choice_type(
    ctx: &Ctx,
    ast: &mut Ast,
    span: Span,
    children: &[ParseEvent],
    parent: Option<NodeId>,
) -> Result<NodeId, ParseError> {
    let (qual_list, rest) = take_quals(children);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let mut alternates = Vec::new();
    if let Some(alternates_event) = rest.first() {
        let (_, _, alt_children) = expect_node(alternates_event)?;
        for alt_event in alt_children {
            alternates.push(adapt_choice_alternate(ctx, ast, alt_event)?);
        }
    }
    let id = ast.push(
        NodeKind::ChoiceOf { quals: quals.clone(), alternates: alternates.clone() },
        ctx.source_ref(span),
        parent,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    for a in &alternates {
        ast.set_parent(*a, id);
    }
    Ok(id)
}

fn adapt_choice_alternate(ctx: &Ctx, ast: &mut Ast, event: &ParseEvent) -> Result<NodeId, ParseError> {
    let (_, span, children) = expect_node(event)?;
    let (docs, rest) = take_doc(children);
    let (name, rest): (Option<String>, &[ParseEvent]) = match rest.first() {
        Some(ParseEvent::Name { text, .. }) => (Some(text.clone()), &rest[1..]),
        Some(ParseEvent::Wildcard { .. }) => (None, &rest[1..]),
        _ => (None, rest),
    };
    let (qual_list, rest) = take_quals(rest);
    let quals = adapt_quals(ctx, ast, qual_list)?;
    let ty_event = rest.first().ok_or_else(|| ctx.malformed(span, "choice alternate missing a type"))?;
    let ty = adapt_type(ctx, ast, ty_event, None)?;
    let id = ast.push(
        NodeKind::ChoiceAlternate { name, quals: quals.clone(), ty, docs },
        ctx.source_ref(span),
        None,
    );
    for q in &quals {
        ast.set_parent(*q, id);
    }
    ast.set_parent(ty, id);
    Ok(id)
}

fn adapt_reference_type(
    ctx: &Ctx,
    ast: &mut Ast,
    span: Span,
    children: &[ParseEvent],
    parent: Option<NodeId>,
) -> Result<NodeId, ParseError> {
    let name_event = children.first().ok_or_else(|| ctx.malformed(span, "type reference missing a name"))?;
    let (target_name, _) = expect_name(ctx, name_event)?;
    Ok(ast.push(NodeKind::ReferencedType { target_name }, ctx.source_ref(span), parent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_event::Rule;
    use crate::source_map::Position;

    fn name(text: &str) -> ParseEvent {
        ParseEvent::Name {
            text: text.to_string(),
            span: Span::point(Position::new(1, 1, 0)),
            quoted: false,
        }
    }

    fn num(text: &str) -> ParseEvent {
        ParseEvent::Number {
            text: text.to_string(),
            span: Span::point(Position::new(1, 1, 0)),
        }
    }

    fn span() -> Span {
        Span::point(Position::new(1, 1, 0))
    }

    #[test]
    fn adapts_vendor_with_id_qualifier() {
        let mut ast = Ast::new();
        let qual_list = ParseEvent::node(
            Rule::QualList,
            span(),
            vec![ParseEvent::node(Rule::QualId, span(), vec![num("9")])],
        );
        let vendor = ParseEvent::node(Rule::Vendor, span(), vec![name("acme"), qual_list]);
        let file = ParseEvent::node(Rule::File, span(), vec![vendor]);

        let id = adapt_file(&mut ast, SourceId(0), "a.tlv", &file).expect("adapts");
        let file_node = ast.node(id);
        let NodeKind::File { statements, .. } = &file_node.kind else {
            panic!("expected file")
        };
        assert_eq!(statements.len(), 1);
        let NodeKind::Vendor { name, quals, .. } = &ast.node(statements[0]).kind else {
            panic!("expected vendor")
        };
        assert_eq!(name, "acme");
        assert_eq!(quals.len(), 1);
        let NodeKind::Qualifier(QualifierKind::Id { id_num, vendor }) = &ast.node(quals[0]).kind else {
            panic!("expected id qualifier")
        };
        assert_eq!(*id_num, 9);
        assert!(vendor.is_none());
    }

    #[test]
    fn expands_dotted_namespace_into_nested_nodes() {
        let mut ast = Ast::new();
        let underlying = ParseEvent::node(Rule::TypeBoolean, span(), vec![]);
        let type_def = ParseEvent::node(Rule::TypeDef, span(), vec![name("Flag"), underlying]);
        let body = ParseEvent::node(Rule::Statements, span(), vec![type_def]);
        let ns = ParseEvent::node(Rule::Namespace, span(), vec![name("a.b"), body]);
        let file = ParseEvent::node(Rule::File, span(), vec![ns]);

        let id = adapt_file(&mut ast, SourceId(0), "a.tlv", &file).expect("adapts");
        let NodeKind::File { statements, .. } = &ast.node(id).kind else {
            panic!("expected file")
        };
        let outer = statements[0];
        assert_eq!(ast.simple_name(outer), Some("a"));
        let NodeKind::Namespace { statements: outer_statements, .. } = &ast.node(outer).kind else {
            panic!("expected namespace")
        };
        let inner = outer_statements[0];
        assert_eq!(ast.simple_name(inner), Some("b"));
        let NodeKind::Namespace { statements: inner_statements, .. } = &ast.node(inner).kind else {
            panic!("expected inner namespace")
        };
        assert_eq!(ast.simple_name(inner_statements[0]), Some("Flag"));
        assert_eq!(ast.fully_qualified_name(inner_statements[0]), "a.b.Flag");
    }
}
