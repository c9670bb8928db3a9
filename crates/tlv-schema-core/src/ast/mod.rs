//! The AST data model: a tagged tree of nodes, arena-allocated and
//! addressed by [`NodeId`]. Every node carries a source reference and a
//! (non-owning) parent link, per spec §3 "Lifecycle and ownership".

mod capability;

pub use capability::{allowed_qualifiers, pattern_element_allowed_qualifiers, QualifierGroup};

use crate::source_map::SourceRef;

/// A handle into an [`Ast`] arena. Indices are never reused or removed —
/// the arena only grows during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// A 0/1/n/infinity quantity, used for pattern-element quantifiers and
/// length/range bound encodings that admit "unbounded".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Finite(u64),
    Infinite,
}

/// One of the three forms a numeric literal may take in qualifier bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericLiteral {
    Integer(i64),
    Decimal(f64),
}

impl NumericLiteral {
    pub fn as_f64(self) -> f64 {
        match self {
            NumericLiteral::Integer(i) => i as f64,
            NumericLiteral::Decimal(d) => d,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, NumericLiteral::Integer(_))
    }
}

/// Order qualifier kind (`tag-order | schema-order | any-order`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    TagOrder,
    SchemaOrder,
    AnyOrder,
}

/// The `range` qualifier body: either a bit width or an explicit pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeBody {
    Width(u32),
    Explicit {
        lower: Option<NumericLiteral>,
        upper: Option<NumericLiteral>,
    },
}

/// A vendor slot in an `id` qualifier: either unscoped, a name to resolve,
/// or a literal numeric vendor id.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorSlot {
    Name(String),
    Number(i64),
}

/// A profile slot in a `tag` qualifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSlot {
    Name(String),
    CurrentProfile,
    Number(i64),
}

/// The `tag` qualifier body.
#[derive(Debug, Clone, PartialEq)]
pub enum TagBody {
    Anonymous,
    ContextSpecific { tag_num: i64 },
    ProfileSpecific { profile: ProfileSlot, tag_num: i64 },
}

impl TagBody {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, TagBody::Anonymous)
    }
}

/// A qualifier node kind. Qualifiers are themselves arena nodes so they
/// carry their own [`SourceRef`] and can be reported on individually.
#[derive(Debug, Clone, PartialEq)]
pub enum QualifierKind {
    Extensible,
    Optional,
    Private,
    Invariant,
    Nullable,
    Order(OrderKind),
    Range(RangeBody),
    Length { lower: i64, upper: Option<i64> },
    Tag(TagBody),
    Id { id_num: i64, vendor: Option<VendorSlot> },
}

impl QualifierKind {
    /// The human-readable construct name used in validator messages
    /// ("<X> qualifier not allowed on <Y>").
    pub fn construct_name(&self) -> &'static str {
        match self {
            QualifierKind::Extensible => "extensible qualifier",
            QualifierKind::Optional => "optional qualifier",
            QualifierKind::Private => "private qualifier",
            QualifierKind::Invariant => "invariant qualifier",
            QualifierKind::Nullable => "nullable qualifier",
            QualifierKind::Order(OrderKind::TagOrder) => "tag-order qualifier",
            QualifierKind::Order(OrderKind::SchemaOrder) => "schema-order qualifier",
            QualifierKind::Order(OrderKind::AnyOrder) => "any-order qualifier",
            QualifierKind::Range(_) => "range qualifier",
            QualifierKind::Length { .. } => "length qualifier",
            QualifierKind::Tag(_) => "tag qualifier",
            QualifierKind::Id { .. } => "id qualifier",
        }
    }

    pub fn group(&self) -> QualifierGroup {
        match self {
            QualifierKind::Extensible => QualifierGroup::Extensible,
            QualifierKind::Optional => QualifierGroup::Optional,
            QualifierKind::Private => QualifierGroup::Private,
            QualifierKind::Invariant => QualifierGroup::Invariant,
            QualifierKind::Nullable => QualifierGroup::Nullable,
            QualifierKind::Order(_) => QualifierGroup::Order,
            QualifierKind::Range(_) => QualifierGroup::Range,
            QualifierKind::Length { .. } => QualifierGroup::Length,
            QualifierKind::Tag(_) => QualifierGroup::Tag,
            QualifierKind::Id { .. } => QualifierGroup::Id,
        }
    }
}

/// The body of a uniform or patterned `array`/`list` type.
#[derive(Debug, Clone)]
pub enum SequencedBody {
    Uniform(NodeId),
    Pattern(Vec<NodeId>),
}

/// Every AST node kind, flattened into one tagged enum. Definitions,
/// qualifiers, types, and type-components are distinguished by the
/// `matches!`-style dispatch the validator and derived-value engine use
/// throughout (spec §9's "small set of shared capabilities").
#[derive(Debug, Clone)]
pub enum NodeKind {
    // ----- top level -----
    File {
        name: String,
        statements: Vec<NodeId>,
    },
    Namespace {
        name: String,
        statements: Vec<NodeId>,
        docs: Option<String>,
    },
    Vendor {
        name: String,
        quals: Vec<NodeId>,
        docs: Option<String>,
    },
    Profile {
        name: String,
        quals: Vec<NodeId>,
        statements: Vec<NodeId>,
        docs: Option<String>,
    },
    Message {
        name: String,
        quals: Vec<NodeId>,
        payload: Option<NodeId>,
        empty_payload: bool,
        docs: Option<String>,
    },
    StatusCode {
        name: String,
        quals: Vec<NodeId>,
        docs: Option<String>,
    },
    TypeDef {
        name: String,
        quals: Vec<NodeId>,
        underlying: NodeId,
        docs: Option<String>,
    },

    // ----- qualifiers -----
    Qualifier(QualifierKind),

    // ----- types -----
    SignedInteger {
        quals: Vec<NodeId>,
        values: Vec<NodeId>,
    },
    UnsignedInteger {
        quals: Vec<NodeId>,
        values: Vec<NodeId>,
    },
    Float {
        quals: Vec<NodeId>,
    },
    Boolean {
        quals: Vec<NodeId>,
    },
    StringTy {
        quals: Vec<NodeId>,
    },
    ByteStringTy {
        quals: Vec<NodeId>,
    },
    NullTy {
        quals: Vec<NodeId>,
    },
    AnyTy {
        quals: Vec<NodeId>,
    },
    Structure {
        quals: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    FieldGroup {
        quals: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    Array {
        quals: Vec<NodeId>,
        body: SequencedBody,
    },
    List {
        quals: Vec<NodeId>,
        body: SequencedBody,
    },
    ChoiceOf {
        quals: Vec<NodeId>,
        alternates: Vec<NodeId>,
    },
    ReferencedType {
        target_name: String,
    },

    // ----- type components -----
    IntegerEnumValue {
        name: String,
        value: i64,
        docs: Option<String>,
    },
    StructureField {
        name: String,
        quals: Vec<NodeId>,
        ty: NodeId,
        docs: Option<String>,
    },
    StructureIncludes {
        target_name: String,
    },
    ChoiceAlternate {
        name: Option<String>,
        quals: Vec<NodeId>,
        ty: NodeId,
        docs: Option<String>,
    },
    PatternElement {
        name: Option<String>,
        quals: Vec<NodeId>,
        ty: NodeId,
        lower: Bound,
        upper: Bound,
    },
}

/// One arena-allocated AST node: its kind, source reference, and parent.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub source_ref: SourceRef,
    pub parent: Option<NodeId>,
}

/// Owns every node across every loaded file, addressed by [`NodeId`].
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    files: Vec<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, source_ref: SourceRef, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node {
            kind,
            source_ref,
            parent,
        });
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub fn register_file(&mut self, id: NodeId) {
        self.files.push(id);
    }

    /// Rewires a node's parent link. The adapter builds children before
    /// their container exists (the container's [`NodeKind`] embeds the
    /// children's [`NodeId`]s), so children are pushed with a placeholder
    /// parent and corrected once the container's id is known.
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.nodes[id.0 as usize].parent = Some(parent);
    }

    pub fn files(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.files.iter().copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immediate children of a node, in declaration order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.node(id).kind {
            NodeKind::File { statements, .. } => statements.clone(),
            NodeKind::Namespace { statements, .. } => statements.clone(),
            NodeKind::Vendor { quals, .. } => quals.clone(),
            NodeKind::Profile {
                quals, statements, ..
            } => quals.iter().chain(statements.iter()).copied().collect(),
            NodeKind::Message { quals, payload, .. } => {
                let mut v = quals.clone();
                v.extend(payload.iter().copied());
                v
            }
            NodeKind::StatusCode { quals, .. } => quals.clone(),
            NodeKind::TypeDef {
                quals, underlying, ..
            } => {
                let mut v = quals.clone();
                v.push(*underlying);
                v
            }
            NodeKind::Qualifier(_) => vec![],
            NodeKind::SignedInteger { quals, values } | NodeKind::UnsignedInteger { quals, values } => {
                quals.iter().chain(values.iter()).copied().collect()
            }
            NodeKind::Float { quals }
            | NodeKind::Boolean { quals }
            | NodeKind::StringTy { quals }
            | NodeKind::ByteStringTy { quals }
            | NodeKind::NullTy { quals }
            | NodeKind::AnyTy { quals } => quals.clone(),
            NodeKind::Structure { quals, members } | NodeKind::FieldGroup { quals, members } => {
                quals.iter().chain(members.iter()).copied().collect()
            }
            NodeKind::Array { quals, body } | NodeKind::List { quals, body } => {
                let mut v = quals.clone();
                match body {
                    SequencedBody::Uniform(elem) => v.push(*elem),
                    SequencedBody::Pattern(elems) => v.extend(elems.iter().copied()),
                }
                v
            }
            NodeKind::ChoiceOf { quals, alternates } => {
                quals.iter().chain(alternates.iter()).copied().collect()
            }
            NodeKind::ReferencedType { .. } => vec![],
            NodeKind::IntegerEnumValue { .. } => vec![],
            NodeKind::StructureField { quals, ty, .. } => {
                let mut v = quals.clone();
                v.push(*ty);
                v
            }
            NodeKind::StructureIncludes { .. } => vec![],
            NodeKind::ChoiceAlternate { quals, ty, .. } => {
                let mut v = quals.clone();
                v.push(*ty);
                v
            }
            NodeKind::PatternElement { quals, ty, .. } => {
                let mut v = quals.clone();
                v.push(*ty);
                v
            }
        }
    }

    /// All descendants of `id`, including `id` itself, in pre-order.
    pub fn all_nodes_under(&self, id: NodeId) -> Vec<NodeId> {
        fn walk(ast: &Ast, id: NodeId, out: &mut Vec<NodeId>) {
            out.push(id);
            for child in ast.children(id) {
                walk(ast, child, out);
            }
        }
        let mut out = Vec::new();
        walk(self, id, &mut out);
        out
    }

    /// All nodes across every loaded file, in load/declaration order.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for file in self.files.clone() {
            out.extend(self.all_nodes_under(file));
        }
        out
    }

    /// Walks up parent links, innermost first, yielding ancestors.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.node(p).parent;
        }
        out
    }

    /// The nearest ancestor that is a `Namespace` or `Profile` node (both
    /// contribute a namespace segment to fully qualified names).
    pub fn containing_namespace(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|&a| matches!(self.node(a).kind, NodeKind::Namespace { .. } | NodeKind::Profile { .. }))
    }

    /// The nearest ancestor that is a `Profile` node.
    pub fn containing_profile(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|&a| matches!(self.node(a).kind, NodeKind::Profile { .. }))
    }

    /// The simple (unqualified) name of a node, if it has one.
    pub fn simple_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Namespace { name, .. }
            | NodeKind::Vendor { name, .. }
            | NodeKind::Profile { name, .. }
            | NodeKind::Message { name, .. }
            | NodeKind::StatusCode { name, .. }
            | NodeKind::TypeDef { name, .. }
            | NodeKind::IntegerEnumValue { name, .. }
            | NodeKind::StructureField { name, .. } => Some(name.as_str()),
            NodeKind::ChoiceAlternate { name, .. } | NodeKind::PatternElement { name, .. } => {
                name.as_deref()
            }
            _ => None,
        }
    }

    /// The effective name of a node (spec §4.1): its own name if it has
    /// one, else a computed 1-based positional name among its siblings —
    /// `element-N` for an anonymous `ARRAY`/`LIST` pattern element,
    /// `alternate-N` for an anonymous `CHOICE OF` alternate.
    pub fn effective_name(&self, id: NodeId) -> String {
        if let Some(name) = self.simple_name(id) {
            return name.to_string();
        }
        match &self.node(id).kind {
            NodeKind::ChoiceAlternate { .. } => {
                format!("alternate-{}", self.choice_sibling_index(id).unwrap_or(0))
            }
            NodeKind::PatternElement { .. } => {
                format!("element-{}", self.pattern_sibling_index(id).unwrap_or(0))
            }
            _ => String::new(),
        }
    }

    fn choice_sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.node(id).parent?;
        match &self.node(parent).kind {
            NodeKind::ChoiceOf { alternates, .. } => alternates.iter().position(|&a| a == id).map(|i| i + 1),
            _ => None,
        }
    }

    fn pattern_sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.node(id).parent?;
        let elems: &[NodeId] = match &self.node(parent).kind {
            NodeKind::Array { body: SequencedBody::Pattern(elems), .. } => elems,
            NodeKind::List { body: SequencedBody::Pattern(elems), .. } => elems,
            _ => return None,
        };
        elems.iter().position(|&e| e == id).map(|i| i + 1)
    }

    /// The fully qualified dotted name of a `Namespace`, `Profile`, or
    /// `TypeDef` node: the dotted path from the outermost enclosing
    /// namespace/profile to this node's simple name.
    pub fn fully_qualified_name(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        if let Some(name) = self.simple_name(id) {
            segments.push(name.to_string());
        }
        let mut cur = self.containing_namespace(id);
        while let Some(ns) = cur {
            if let Some(name) = self.simple_name(ns) {
                segments.push(name.to_string());
            }
            cur = self.containing_namespace(ns);
        }
        segments.reverse();
        segments.join(".")
    }

    pub fn quals_of(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Vendor { quals, .. }
            | NodeKind::Profile { quals, .. }
            | NodeKind::Message { quals, .. }
            | NodeKind::StatusCode { quals, .. }
            | NodeKind::TypeDef { quals, .. }
            | NodeKind::SignedInteger { quals, .. }
            | NodeKind::UnsignedInteger { quals, .. }
            | NodeKind::Float { quals }
            | NodeKind::Boolean { quals }
            | NodeKind::StringTy { quals }
            | NodeKind::ByteStringTy { quals }
            | NodeKind::NullTy { quals }
            | NodeKind::AnyTy { quals }
            | NodeKind::Structure { quals, .. }
            | NodeKind::FieldGroup { quals, .. }
            | NodeKind::Array { quals, .. }
            | NodeKind::List { quals, .. }
            | NodeKind::ChoiceOf { quals, .. }
            | NodeKind::StructureField { quals, .. }
            | NodeKind::ChoiceAlternate { quals, .. }
            | NodeKind::PatternElement { quals, .. } => quals,
            _ => &[],
        }
    }

    /// The qualifier of a given group attached to `id`, if any (first match).
    pub fn qualifier(&self, id: NodeId, group: QualifierGroup) -> Option<NodeId> {
        self.quals_of(id)
            .iter()
            .copied()
            .find(|&q| matches!(&self.node(q).kind, NodeKind::Qualifier(k) if k.group() == group))
    }

    /// The underlying type node of a node that has one (`TypeDef`,
    /// `StructureField`, `ChoiceAlternate`, `PatternElement`).
    pub fn underlying_type(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).kind {
            NodeKind::TypeDef { underlying, .. } => Some(*underlying),
            NodeKind::StructureField { ty, .. } => Some(*ty),
            NodeKind::ChoiceAlternate { ty, .. } => Some(*ty),
            NodeKind::PatternElement { ty, .. } => Some(*ty),
            _ => None,
        }
    }

    /// Returns the schema-construct display name used in validator
    /// messages and diagnostics (mirrors `_schemaConstruct` in the
    /// original implementation).
    pub fn construct_name(&self, id: NodeId) -> &'static str {
        match &self.node(id).kind {
            NodeKind::File { .. } => "schema file",
            NodeKind::Namespace { .. } => "namespace definition",
            NodeKind::Vendor { .. } => "VENDOR definition",
            NodeKind::Profile { .. } => "PROFILE definition",
            NodeKind::Message { .. } => "MESSAGE definition",
            NodeKind::StatusCode { .. } => "STATUS CODE definition",
            NodeKind::TypeDef { .. } => "type definition",
            NodeKind::Qualifier(k) => k.construct_name(),
            NodeKind::SignedInteger { .. } => "SIGNED INTEGER type",
            NodeKind::UnsignedInteger { .. } => "UNSIGNED INTEGER type",
            NodeKind::Float { .. } => "FLOAT type",
            NodeKind::Boolean { .. } => "BOOLEAN type",
            NodeKind::StringTy { .. } => "STRING type",
            NodeKind::ByteStringTy { .. } => "BYTE STRING type",
            NodeKind::NullTy { .. } => "NULL type",
            NodeKind::AnyTy { .. } => "ANY type",
            NodeKind::Structure { .. } => "STRUCTURE type",
            NodeKind::FieldGroup { .. } => "FIELD GROUP type",
            NodeKind::Array { .. } => "ARRAY type",
            NodeKind::List { .. } => "LIST type",
            NodeKind::ChoiceOf { .. } => "CHOICE OF type",
            NodeKind::ReferencedType { .. } => "type reference",
            NodeKind::IntegerEnumValue { .. } => "enumerated value",
            NodeKind::StructureField { .. } => "STRUCTURE or FIELD GROUP field",
            NodeKind::StructureIncludes { .. } => "STRUCTURE includes statement",
            NodeKind::ChoiceAlternate { .. } => "CHOICE alternate",
            NodeKind::PatternElement { .. } => "linear type pattern element",
        }
    }
}
