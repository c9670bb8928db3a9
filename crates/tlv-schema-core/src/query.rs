//! Read-only, typed views over a resolved [`Ast`] (spec §6.1 "Query API").
//!
//! Consumers (the `dump` CLI command, tests, a future language server) walk
//! a schema through these `*Ref` wrappers instead of matching on raw
//! [`NodeKind`] and juggling [`NodeId`]s themselves.

use std::fmt;

use crate::ast::{Ast, NodeId, NodeKind};
use crate::derived::{
    effective_default_tag, effective_fields, effective_integer_bounds, leaf_alternates, possible_tags,
    IntegerBounds,
};
use crate::resolver::Resolution;

/// Shared context every `*Ref` borrows: the AST and its resolution tables.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub ast: &'a Ast,
    pub resolution: &'a Resolution,
}

impl<'a> Context<'a> {
    pub fn new(ast: &'a Ast, resolution: &'a Resolution) -> Self {
        Self { ast, resolution }
    }
}

/// One loaded source file's top-level statements.
#[derive(Clone, Copy)]
pub struct FileHandle<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> FileHandle<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    pub fn name(&self) -> &'a str {
        let NodeKind::File { name, .. } = &self.cx.ast.node(self.id).kind else {
            unreachable!("FileHandle always wraps a File node")
        };
        name
    }

    pub fn statements(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let cx = self.cx;
        cx.ast.children(self.id).into_iter().map(move |id| NodeRef::new(cx, id))
    }
}

/// Any top-level or namespace-level statement, dispatched to its concrete
/// typed wrapper.
#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    Namespace(NamespaceRef<'a>),
    Vendor(VendorRef<'a>),
    Profile(ProfileRef<'a>),
    Message(MessageRef<'a>),
    StatusCode(StatusCodeRef<'a>),
    TypeDef(TypeDefRef<'a>),
    Other(Context<'a>, NodeId),
}

impl<'a> NodeRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        match &cx.ast.node(id).kind {
            NodeKind::Namespace { .. } => NodeRef::Namespace(NamespaceRef { cx, id }),
            NodeKind::Vendor { .. } => NodeRef::Vendor(VendorRef { cx, id }),
            NodeKind::Profile { .. } => NodeRef::Profile(ProfileRef { cx, id }),
            NodeKind::Message { .. } => NodeRef::Message(MessageRef { cx, id }),
            NodeKind::StatusCode { .. } => NodeRef::StatusCode(StatusCodeRef { cx, id }),
            NodeKind::TypeDef { .. } => NodeRef::TypeDef(TypeDefRef { cx, id }),
            _ => NodeRef::Other(cx, id),
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Namespace(r) => r.id,
            NodeRef::Vendor(r) => r.id,
            NodeRef::Profile(r) => r.id,
            NodeRef::Message(r) => r.id,
            NodeRef::StatusCode(r) => r.id,
            NodeRef::TypeDef(r) => r.id,
            NodeRef::Other(_, id) => *id,
        }
    }

    pub fn construct_name(&self, ast: &Ast) -> &'static str {
        ast.construct_name(self.id())
    }
}

#[derive(Clone, Copy)]
pub struct NamespaceRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> NamespaceRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    pub fn name(&self) -> &'a str {
        self.cx.ast.simple_name(self.id).expect("namespace always has a name")
    }

    pub fn fully_qualified_name(&self) -> String {
        self.cx.ast.fully_qualified_name(self.id)
    }

    pub fn statements(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let cx = self.cx;
        cx.ast.children(self.id).into_iter().map(move |id| NodeRef::new(cx, id))
    }
}

#[derive(Clone, Copy)]
pub struct VendorRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> VendorRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    pub fn name(&self) -> &'a str {
        self.cx.ast.simple_name(self.id).expect("vendor always has a name")
    }

    pub fn numeric_id(&self) -> Option<i64> {
        crate::derived::vendor_numeric_id(self.cx.ast, self.id)
    }
}

#[derive(Clone, Copy)]
pub struct ProfileRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> ProfileRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    pub fn name(&self) -> &'a str {
        self.cx.ast.simple_name(self.id).expect("profile always has a name")
    }

    pub fn fully_qualified_name(&self) -> String {
        self.cx.ast.fully_qualified_name(self.id)
    }

    pub fn numeric_id(&self) -> Option<i64> {
        let q = self.cx.ast.qualifier(self.id, crate::ast::QualifierGroup::Id)?;
        let NodeKind::Qualifier(crate::ast::QualifierKind::Id { id_num, vendor }) = &self.cx.ast.node(q).kind else {
            return None;
        };
        let vendor_id = match vendor {
            None => None,
            Some(crate::ast::VendorSlot::Number(n)) => Some(*n),
            Some(crate::ast::VendorSlot::Name(_)) => self
                .cx
                .resolution
                .vendor_of_id_qual(q)
                .and_then(|v| crate::derived::vendor_numeric_id(self.cx.ast, v)),
        };
        Some(crate::derived::profile_id(vendor_id, *id_num))
    }

    pub fn statements(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let cx = self.cx;
        cx.ast.children(self.id).into_iter().map(move |id| NodeRef::new(cx, id))
    }
}

#[derive(Clone, Copy)]
pub struct MessageRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> MessageRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    pub fn name(&self) -> &'a str {
        self.cx.ast.simple_name(self.id).expect("message always has a name")
    }

    pub fn has_payload(&self) -> bool {
        let NodeKind::Message { empty_payload, .. } = &self.cx.ast.node(self.id).kind else {
            unreachable!("MessageRef always wraps a Message node")
        };
        !empty_payload
    }
}

#[derive(Clone, Copy)]
pub struct StatusCodeRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> StatusCodeRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    pub fn name(&self) -> &'a str {
        self.cx.ast.simple_name(self.id).expect("status code always has a name")
    }
}

#[derive(Clone, Copy)]
pub struct TypeDefRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> TypeDefRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    pub fn name(&self) -> &'a str {
        self.cx.ast.simple_name(self.id).expect("type definition always has a name")
    }

    pub fn fully_qualified_name(&self) -> String {
        self.cx.ast.fully_qualified_name(self.id)
    }

    pub fn underlying_construct_name(&self) -> &'static str {
        let underlying = self.cx.ast.underlying_type(self.id).expect("TypeDef has an underlying type");
        self.cx.ast.construct_name(underlying)
    }

    /// The tag this definition gives its own references, following its
    /// reference chain if it has no `tag` qualifier of its own.
    pub fn effective_default_tag(&self) -> Option<TagSummary> {
        let q = effective_default_tag(self.cx.ast, self.cx.resolution, self.id)?;
        tag_summary(self.cx.ast, q)
    }

    /// Integer bounds, if the underlying type is an integer type.
    pub fn integer_bounds(&self) -> Option<IntegerBounds> {
        let underlying = self.cx.ast.underlying_type(self.id)?;
        match self.cx.ast.node(underlying).kind {
            NodeKind::SignedInteger { .. } | NodeKind::UnsignedInteger { .. } => {
                Some(effective_integer_bounds(self.cx.ast, underlying))
            }
            _ => None,
        }
    }

    /// A field view, if the underlying type is a `STRUCTURE`/`FIELD GROUP`.
    pub fn fields(&self) -> Option<FieldsRef<'a>> {
        let underlying = self.cx.ast.underlying_type(self.id)?;
        match self.cx.ast.node(underlying).kind {
            NodeKind::Structure { .. } | NodeKind::FieldGroup { .. } => Some(FieldsRef::new(self.cx, underlying)),
            _ => None,
        }
    }

    /// A choice view, if the underlying type is a `CHOICE OF`.
    pub fn choice(&self) -> Option<ChoiceRef<'a>> {
        let underlying = self.cx.ast.underlying_type(self.id)?;
        match self.cx.ast.node(underlying).kind {
            NodeKind::ChoiceOf { .. } => Some(ChoiceRef::new(self.cx, underlying)),
            _ => None,
        }
    }

    /// The single tag a reference to this definition would carry, failing
    /// if more than one is possible.
    pub fn effective_tag(&self) -> Result<Option<TagSummary>, AmbiguousTagError> {
        effective_tag(self.cx.ast, self.cx.resolution, self.id)
    }
}

/// A `STRUCTURE` or `FIELD GROUP` type, with `includes` expanded.
#[derive(Clone, Copy)]
pub struct FieldsRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> FieldsRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    /// Every field this container exposes, direct fields first, then the
    /// fields of each `includes`d `FIELD GROUP` expanded in declaration
    /// order (spec §6.1 "allFields").
    pub fn all_fields(&self) -> Vec<FieldRef<'a>> {
        effective_fields(self.cx.ast, self.cx.resolution, self.id)
            .into_iter()
            .map(|(_, id)| FieldRef { cx: self.cx, id })
            .collect()
    }

    /// The first field (direct or included) matching `name`.
    pub fn get_field(&self, name: &str) -> Option<FieldRef<'a>> {
        effective_fields(self.cx.ast, self.cx.resolution, self.id)
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| FieldRef { cx: self.cx, id })
    }
}

#[derive(Clone, Copy)]
pub struct FieldRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> FieldRef<'a> {
    pub fn name(&self) -> &'a str {
        self.cx.ast.simple_name(self.id).expect("structure field always has a name")
    }

    pub fn ty(&self) -> NodeId {
        self.cx.ast.underlying_type(self.id).expect("structure field always has a type")
    }

    pub fn effective_tag(&self) -> Result<Option<TagSummary>, AmbiguousTagError> {
        effective_tag(self.cx.ast, self.cx.resolution, self.id)
    }

    pub fn possible_tags(&self) -> Vec<Option<TagSummary>> {
        possible_tag_summaries(self.cx.ast, self.cx.resolution, self.id)
    }
}

/// A `CHOICE OF` type.
#[derive(Clone, Copy)]
pub struct ChoiceRef<'a> {
    cx: Context<'a>,
    id: NodeId,
}

impl<'a> ChoiceRef<'a> {
    pub fn new(cx: Context<'a>, id: NodeId) -> Self {
        Self { cx, id }
    }

    /// Every leaf alternate (descending into nested choices), paired with
    /// its effective name — its own name, or a computed `alternate-N` for
    /// an anonymous one (spec §4.1) — and the tags it could carry on the
    /// wire (spec §6.1 "allLeafAlternatesWithNamesAndTags").
    pub fn all_leaf_alternates_with_names_and_tags(&self) -> Vec<(String, Vec<Option<TagSummary>>)> {
        leaf_alternates(self.cx.ast, self.id)
            .into_iter()
            .map(|alt| {
                let name = self.cx.ast.effective_name(alt);
                (name, possible_tag_summaries(self.cx.ast, self.cx.resolution, alt))
            })
            .collect()
    }

    /// The union of every leaf alternate's possible tags.
    pub fn possible_tags(&self) -> Vec<Option<TagSummary>> {
        possible_tag_summaries(self.cx.ast, self.cx.resolution, self.id)
    }

    /// The leaf alternate named `name`, if one exists — matched against
    /// the effective name so an anonymous alternate is reachable by its
    /// computed `alternate-N` name too.
    pub fn get_alternate(&self, name: &str) -> Option<NodeId> {
        leaf_alternates(self.cx.ast, self.id)
            .into_iter()
            .find(|&alt| self.cx.ast.effective_name(alt) == name)
    }
}

/// Returned by [`effective_tag`] when a type could carry more than one tag
/// on the wire: the caller asked for "the" tag, and there isn't a single
/// one to give (spec §6.1 "effectiveTag ... fails if ambiguous").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbiguousTagError;

impl fmt::Display for AmbiguousTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ambiguous effective tag: more than one possible tag")
    }
}

impl std::error::Error for AmbiguousTagError {}

/// The single tag a use of `node` carries, or `None` if it carries no tag
/// at all. Errors when more than one tag is possible rather than silently
/// picking one. `node` is whatever [`possible_tags`] accepts: a tag-bearing
/// wrapper or a bare type node.
pub fn effective_tag(
    ast: &Ast,
    resolution: &Resolution,
    node: NodeId,
) -> Result<Option<TagSummary>, AmbiguousTagError> {
    let tags = possible_tags(ast, resolution, node);
    match tags.len() {
        0 => Ok(None),
        1 => Ok(tags.into_iter().next().unwrap().and_then(|q| tag_summary(ast, q))),
        _ => Err(AmbiguousTagError),
    }
}

/// A plain-data rendering of a resolved `tag` qualifier, independent of the
/// `Ast` it came from, suitable for the `dump` command's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSummary {
    Anonymous,
    ContextSpecific(i64),
    ProfileSpecific { profile: String, tag_num: i64 },
}

impl fmt::Display for TagSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSummary::Anonymous => write!(f, "anonymous"),
            TagSummary::ContextSpecific(n) => write!(f, "context-specific {n}"),
            TagSummary::ProfileSpecific { profile, tag_num } => {
                write!(f, "profile-specific {profile}:{tag_num}")
            }
        }
    }
}

fn tag_summary(ast: &Ast, qual: NodeId) -> Option<TagSummary> {
    let NodeKind::Qualifier(crate::ast::QualifierKind::Tag(body)) = &ast.node(qual).kind else {
        return None;
    };
    Some(match body {
        crate::ast::TagBody::Anonymous => TagSummary::Anonymous,
        crate::ast::TagBody::ContextSpecific { tag_num } => TagSummary::ContextSpecific(*tag_num),
        crate::ast::TagBody::ProfileSpecific { profile, tag_num } => TagSummary::ProfileSpecific {
            profile: match profile {
                crate::ast::ProfileSlot::Name(n) => n.clone(),
                crate::ast::ProfileSlot::CurrentProfile => "*".to_string(),
                crate::ast::ProfileSlot::Number(n) => n.to_string(),
            },
            tag_num: *tag_num,
        },
    })
}

/// Every tag a use of `ty` could carry on the wire, rendered as plain data.
pub fn possible_tag_summaries(ast: &Ast, resolution: &Resolution, ty: NodeId) -> Vec<Option<TagSummary>> {
    possible_tags(ast, resolution, ty)
        .into_iter()
        .map(|t| t.and_then(|q| tag_summary(ast, q)))
        .collect()
}
