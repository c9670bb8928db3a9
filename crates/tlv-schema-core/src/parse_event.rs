//! The event vocabulary the core's [`crate::adapter`] consumes.
//!
//! Spec §1 deliberately keeps the concrete grammar and tokenizer out of the
//! core: "the core only consumes a stream of parse events with source
//! positions." A [`ParseEvent`] tree is that stream — one event per grammar
//! production, each carrying its children in the fixed order the grammar
//! defines (name, then qualifiers, then body), mirroring a generic parser
//! tree (rule name + ordered children + position) rather than a
//! grammar-specific AST. Any front end (hand-written recursive descent,
//! a parser-combinator crate, a parser generator) can produce this tree;
//! `tlv-schema-dsl` is one concrete producer.

use crate::source_map::Span;

/// The grammar production a [`ParseEvent::Node`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    File,
    Statements,
    Namespace,
    Vendor,
    Profile,
    Message,
    MessageEmptyPayload,
    StatusCode,
    TypeDef,
    QualList,
    QualExtensible,
    QualOptional,
    QualPrivate,
    QualInvariant,
    QualNullable,
    QualOrder,
    QualRangeWidth,
    QualRangeBounds,
    QualLength,
    QualTag,
    QualId,
    TypeSignedInteger,
    TypeUnsignedInteger,
    TypeFloat,
    TypeBoolean,
    TypeString,
    TypeByteString,
    TypeNull,
    TypeAny,
    TypeStructure,
    TypeFieldGroup,
    TypeArray,
    TypeList,
    TypeChoiceOf,
    TypeReference,
    EnumValues,
    EnumValue,
    Members,
    StructureField,
    StructureIncludes,
    Alternates,
    ChoiceAlternate,
    ElemTypePattern,
    PatternElement,
    Quantifier,
}

/// A single node in the parse-event tree.
#[derive(Debug, Clone)]
pub enum ParseEvent {
    /// A grammar production with an ordered list of child events.
    Node {
        rule: Rule,
        span: Span,
        children: Vec<ParseEvent>,
    },
    /// A bare or quoted identifier token (`Name`, `"Name"`, or a dotted
    /// scoped name `a.b.c`).
    Name { text: String, span: Span, quoted: bool },
    /// An integer literal token, kept as text so the adapter can choose
    /// signed/unsigned/hex parsing per context.
    Number { text: String, span: Span },
    /// A decimal literal token (has a `.` or exponent), used for float
    /// range bounds.
    Decimal { text: String, span: Span },
    /// A string literal's unescaped content.
    StringLit { text: String, span: Span },
    /// A documentation-comment block, already dedented.
    Doc { text: String, span: Span },
    /// The `*` current-profile wildcard token.
    Wildcard { span: Span },
}

impl ParseEvent {
    pub fn span(&self) -> Span {
        match self {
            ParseEvent::Node { span, .. }
            | ParseEvent::Name { span, .. }
            | ParseEvent::Number { span, .. }
            | ParseEvent::Decimal { span, .. }
            | ParseEvent::StringLit { span, .. }
            | ParseEvent::Doc { span, .. }
            | ParseEvent::Wildcard { span } => *span,
        }
    }

    pub fn node(rule: Rule, span: Span, children: Vec<ParseEvent>) -> Self {
        ParseEvent::Node {
            rule,
            span,
            children,
        }
    }
}
