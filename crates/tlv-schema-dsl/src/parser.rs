//! A hand-written recursive-descent parser for the TLV schema DSL, producing
//! a [`ParseEvent`] tree (spec §1: "the core only consumes a stream of parse
//! events with source positions").
//!
//! Grammar notes (no EBNF file survives in the source this was distilled
//! from, so this is reconstructed from its test suite):
//!
//! ```text
//! file            := statement*
//! statement       := namespace | vendor | profile | message | status_code | type_def
//! namespace       := doc? 'namespace' dotted_name '{' statement* '}'
//! vendor          := doc? name '=>' 'VENDOR' qual_list?
//! profile         := doc? name '=>' 'PROFILE' qual_list? ('{' statement* '}')?
//! message         := doc? name '=>' 'MESSAGE' qual_list? (':' type | 'EMPTY')?
//! status_code     := doc? name '=>' 'STATUS' 'CODE' qual_list?
//! type_def        := doc? name qual_list? '=>' type
//! sequenced_type  := ('ARRAY'|'LIST') qual_list? ( 'OF' type | '{' pattern_element,* '}' )
//! ```
//!
//! A qualifier list is a bracketed, comma-separated list of qualifiers.
//! Most qualifiers use a leading keyword (`extensible`, `range 8bit`, `id 9`,
//! ...); a bare `tag` body may also appear with no `tag` keyword at all —
//! this is the bracket shorthand seen directly after a name
//! (`field-1 [ 1 ] : Type`, `type-1 [ *:42 ] => INTEGER`).

use tlv_schema_core::error::ParseError;
use tlv_schema_core::parse_event::{ParseEvent, Rule};
use tlv_schema_core::source_map::{SourceId, SourceRef, Span};

use crate::lexer::{lex, Lexed};
use crate::token::Token;

/// Parses one complete schema source into a `File` parse event.
pub fn parse(source_id: SourceId, text: &str) -> Result<ParseEvent, ParseError> {
    let tokens = lex(source_id, text)?;
    let mut parser = Parser {
        source_id,
        tokens,
        pos: 0,
    };
    let file = parser.parse_file()?;
    parser.expect_eof()?;
    Ok(file)
}

struct Parser<'a> {
    source_id: SourceId,
    tokens: Vec<Lexed<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(t) => t.span,
            None => self
                .tokens
                .last()
                .map(|t| t.span)
                .unwrap_or_else(|| Span::point(tlv_schema_core::source_map::Position::new(1, 1, 0))),
        }
    }

    fn source_ref(&self, span: Span) -> SourceRef {
        SourceRef::new(self.source_id, span)
    }

    fn eof_error(&self, expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedEof { expected: expected.into() }
    }

    fn unexpected(&self, found: &Token, span: Span) -> ParseError {
        ParseError::UnexpectedToken {
            found: found.description(),
            source_ref: self.source_ref(span),
        }
    }

    /// Advances past the current token and returns its `Lexed` record.
    fn bump(&mut self) -> Option<Lexed<'a>> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<Lexed<'a>, ParseError> {
        match self.peek() {
            Some(tok) if *tok == expected => Ok(self.bump().unwrap()),
            Some(tok) => {
                let span = self.current_span();
                let found = tok.clone();
                Err(self.unexpected(&found, span))
            }
            None => Err(self.eof_error(expected.description())),
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => {
                let span = self.current_span();
                let found = tok.clone();
                Err(self.unexpected(&found, span))
            }
        }
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    // -- names -----------------------------------------------------------

    fn expect_name(&mut self) -> Result<ParseEvent, ParseError> {
        match self.peek() {
            Some(Token::Ident) => {
                let lexed = self.bump().unwrap();
                Ok(ParseEvent::Name {
                    text: lexed.text.to_string(),
                    span: lexed.span,
                    quoted: false,
                })
            }
            Some(Token::QuotedName) => {
                let lexed = self.bump().unwrap();
                let inner = &lexed.text[1..lexed.text.len() - 1];
                Ok(ParseEvent::Name {
                    text: inner.to_string(),
                    span: lexed.span,
                    quoted: true,
                })
            }
            Some(tok) => {
                let span = self.current_span();
                let found = tok.clone();
                Err(self.unexpected(&found, span))
            }
            None => Err(self.eof_error("a name")),
        }
    }

    fn expect_number(&mut self) -> Result<ParseEvent, ParseError> {
        match self.peek() {
            Some(Token::IntLiteral) => {
                let lexed = self.bump().unwrap();
                Ok(ParseEvent::Number {
                    text: lexed.text.to_string(),
                    span: lexed.span,
                })
            }
            Some(tok) => {
                let span = self.current_span();
                let found = tok.clone();
                Err(self.unexpected(&found, span))
            }
            None => Err(self.eof_error("an integer literal")),
        }
    }

    /// A numeric literal that may be an integer or a decimal, used in
    /// `range` bounds.
    fn expect_numeric_literal(&mut self) -> Result<ParseEvent, ParseError> {
        match self.peek() {
            Some(Token::DecimalLiteral) => {
                let lexed = self.bump().unwrap();
                Ok(ParseEvent::Decimal {
                    text: lexed.text.to_string(),
                    span: lexed.span,
                })
            }
            Some(Token::IntLiteral) => self.expect_number(),
            Some(tok) => {
                let span = self.current_span();
                let found = tok.clone();
                Err(self.unexpected(&found, span))
            }
            None => Err(self.eof_error("a numeric literal")),
        }
    }

    fn take_doc(&mut self) -> Option<ParseEvent> {
        let mut text: Option<String> = None;
        let mut span = None;
        while let Some(Token::DocComment(_)) = self.peek() {
            let lexed = self.bump().unwrap();
            let Token::DocComment(line) = lexed.token else { unreachable!() };
            let entry = text.get_or_insert_with(String::new);
            if !entry.is_empty() {
                entry.push('\n');
            }
            entry.push_str(line.trim_start());
            span.get_or_insert(lexed.span);
        }
        text.map(|text| ParseEvent::Doc { text, span: span.unwrap() })
    }

    // -- top level ---------------------------------------------------------

    fn parse_file(&mut self) -> Result<ParseEvent, ParseError> {
        let start = self.current_span();
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        let end = statements.last().map(|s: &ParseEvent| s.span()).unwrap_or(start);
        Ok(ParseEvent::node(Rule::File, Span::new(start.start, end.end), statements))
    }

    fn parse_statement(&mut self) -> Result<ParseEvent, ParseError> {
        let doc = self.take_doc();
        if self.at(&Token::Namespace) {
            return self.parse_namespace(doc);
        }
        let name = self.expect_name()?;
        self.parse_named_statement(doc, name)
    }

    fn parse_named_statement(&mut self, doc: Option<ParseEvent>, name: ParseEvent) -> Result<ParseEvent, ParseError> {
        let start = doc.as_ref().map(|d| d.span()).unwrap_or_else(|| name.span());
        // A type definition may carry a qualifier list before `=>`;
        // VENDOR/PROFILE/MESSAGE/STATUS CODE only ever carry theirs after
        // the keyword, so a `[` here unambiguously means a type def.
        if self.at(&Token::LBracket) {
            let quals = self.parse_qual_list()?;
            self.expect(Token::FatArrow)?;
            let ty = self.parse_type()?;
            let end = ty.span();
            let mut children = Vec::new();
            children.extend(doc);
            children.push(name);
            children.push(quals);
            children.push(ty);
            return Ok(ParseEvent::node(Rule::TypeDef, Span::new(start.start, end.end), children));
        }

        self.expect(Token::FatArrow)?;
        match self.peek() {
            Some(Token::Vendor) => self.finish_vendor(start, doc, name),
            Some(Token::Profile) => self.finish_profile(start, doc, name),
            Some(Token::Message) => self.finish_message(start, doc, name),
            Some(Token::Status) => self.finish_status_code(start, doc, name),
            Some(_) => {
                let ty = self.parse_type()?;
                let end = ty.span();
                let mut children = Vec::new();
                children.extend(doc);
                children.push(name);
                children.push(ty);
                Ok(ParseEvent::node(Rule::TypeDef, Span::new(start.start, end.end), children))
            }
            None => Err(self.eof_error("a type or a VENDOR/PROFILE/MESSAGE/STATUS CODE keyword")),
        }
    }

    fn parse_namespace(&mut self, doc: Option<ParseEvent>) -> Result<ParseEvent, ParseError> {
        let start = doc.as_ref().map(|d| d.span()).unwrap_or_else(|| self.current_span());
        self.expect(Token::Namespace)?;
        let name = self.expect_name()?;
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.at(&Token::RBrace) {
            statements.push(self.parse_statement()?);
        }
        let close = self.expect(Token::RBrace)?;
        let body = ParseEvent::node(Rule::Statements, name.span(), statements);
        let mut children = Vec::new();
        children.extend(doc);
        children.push(name);
        children.push(body);
        Ok(ParseEvent::node(Rule::Namespace, Span::new(start.start, close.span.end), children))
    }

    fn finish_vendor(&mut self, start: Span, doc: Option<ParseEvent>, name: ParseEvent) -> Result<ParseEvent, ParseError> {
        let kw = self.expect(Token::Vendor)?;
        let quals = self.maybe_qual_list()?;
        let end = quals.as_ref().map(|q| q.span()).unwrap_or(kw.span);
        let mut children = Vec::new();
        children.extend(doc);
        children.push(name);
        children.extend(quals);
        Ok(ParseEvent::node(Rule::Vendor, Span::new(start.start, end.end), children))
    }

    fn finish_profile(&mut self, start: Span, doc: Option<ParseEvent>, name: ParseEvent) -> Result<ParseEvent, ParseError> {
        let kw = self.expect(Token::Profile)?;
        let quals = self.maybe_qual_list()?;
        let mut end = quals.as_ref().map(|q| q.span()).unwrap_or(kw.span);
        let body = if self.at(&Token::LBrace) {
            self.bump();
            let mut statements = Vec::new();
            while !self.at(&Token::RBrace) {
                statements.push(self.parse_statement()?);
            }
            let close = self.expect(Token::RBrace)?;
            end = close.span;
            Some(ParseEvent::node(Rule::Statements, kw.span, statements))
        } else {
            None
        };
        let mut children = Vec::new();
        children.extend(doc);
        children.push(name);
        children.extend(quals);
        children.extend(body);
        Ok(ParseEvent::node(Rule::Profile, Span::new(start.start, end.end), children))
    }

    fn finish_message(&mut self, start: Span, doc: Option<ParseEvent>, name: ParseEvent) -> Result<ParseEvent, ParseError> {
        let kw = self.expect(Token::Message)?;
        let quals = self.maybe_qual_list()?;
        let mut end = quals.as_ref().map(|q| q.span()).unwrap_or(kw.span);
        let mut children = Vec::new();
        children.extend(doc);
        children.push(name);
        children.extend(quals);
        let rule = if self.at(&Token::Empty) {
            let empty = self.bump().unwrap();
            end = empty.span;
            Rule::MessageEmptyPayload
        } else if self.at(&Token::Colon) {
            self.bump();
            let ty = self.parse_type()?;
            end = ty.span();
            children.push(ty);
            Rule::Message
        } else {
            Rule::Message
        };
        Ok(ParseEvent::node(rule, Span::new(start.start, end.end), children))
    }

    fn finish_status_code(&mut self, start: Span, doc: Option<ParseEvent>, name: ParseEvent) -> Result<ParseEvent, ParseError> {
        self.expect(Token::Status)?;
        let code_kw = self.expect(Token::Code)?;
        let quals = self.maybe_qual_list()?;
        let end = quals.as_ref().map(|q| q.span()).unwrap_or(code_kw.span);
        let mut children = Vec::new();
        children.extend(doc);
        children.push(name);
        children.extend(quals);
        Ok(ParseEvent::node(Rule::StatusCode, Span::new(start.start, end.end), children))
    }

    // -- qualifiers ----------------------------------------------------

    fn maybe_qual_list(&mut self) -> Result<Option<ParseEvent>, ParseError> {
        if self.at(&Token::LBracket) {
            Ok(Some(self.parse_qual_list()?))
        } else {
            Ok(None)
        }
    }

    fn parse_qual_list(&mut self) -> Result<ParseEvent, ParseError> {
        let open = self.expect(Token::LBracket)?;
        let mut quals = Vec::new();
        if !self.at(&Token::RBracket) {
            quals.push(self.parse_qualifier()?);
            while self.at(&Token::Comma) {
                self.bump();
                quals.push(self.parse_qualifier()?);
            }
        }
        let close = self.expect(Token::RBracket)?;
        Ok(ParseEvent::node(Rule::QualList, Span::new(open.span.start, close.span.end), quals))
    }

    fn parse_qualifier(&mut self) -> Result<ParseEvent, ParseError> {
        let start = self.current_span();
        match self.peek() {
            Some(Token::Extensible) => {
                self.bump();
                Ok(ParseEvent::node(Rule::QualExtensible, start, vec![]))
            }
            Some(Token::Optional) => {
                self.bump();
                Ok(ParseEvent::node(Rule::QualOptional, start, vec![]))
            }
            Some(Token::Private) => {
                self.bump();
                Ok(ParseEvent::node(Rule::QualPrivate, start, vec![]))
            }
            Some(Token::Invariant) => {
                self.bump();
                Ok(ParseEvent::node(Rule::QualInvariant, start, vec![]))
            }
            Some(Token::Nullable) => {
                self.bump();
                Ok(ParseEvent::node(Rule::QualNullable, start, vec![]))
            }
            Some(Token::TagOrder) | Some(Token::SchemaOrder) | Some(Token::AnyOrder) => {
                let lexed = self.bump().unwrap();
                let keyword = ParseEvent::Name {
                    text: lexed.text.to_string(),
                    span: lexed.span,
                    quoted: false,
                };
                Ok(ParseEvent::node(Rule::QualOrder, lexed.span, vec![keyword]))
            }
            Some(Token::Range) => {
                self.bump();
                self.parse_range_body(start)
            }
            Some(Token::Length) => {
                self.bump();
                self.parse_length_body(start)
            }
            Some(Token::Id) => {
                self.bump();
                self.parse_id_body(start)
            }
            Some(Token::Tag) => {
                self.bump();
                let (children, end) = self.parse_tag_body_contents()?;
                Ok(ParseEvent::node(Rule::QualTag, Span::new(start.start, end.end), children))
            }
            // Bracket shorthand: a tag body with no leading `tag` keyword.
            Some(Token::Star) | Some(Token::IntLiteral) => {
                let (children, end) = self.parse_tag_body_contents()?;
                Ok(ParseEvent::node(Rule::QualTag, Span::new(start.start, end.end), children))
            }
            Some(tok) => {
                let found = tok.clone();
                Err(self.unexpected(&found, start))
            }
            None => Err(self.eof_error("a qualifier")),
        }
    }

    fn parse_range_body(&mut self, start: Span) -> Result<ParseEvent, ParseError> {
        match self.peek() {
            Some(Token::Bit8) | Some(Token::Bit16) | Some(Token::Bit32) | Some(Token::Bit64) => {
                let lexed = self.bump().unwrap();
                let width = match lexed.token {
                    Token::Bit8 => "8",
                    Token::Bit16 => "16",
                    Token::Bit32 => "32",
                    Token::Bit64 => "64",
                    _ => unreachable!(),
                };
                let width_event = ParseEvent::Number { text: width.to_string(), span: lexed.span };
                Ok(ParseEvent::node(Rule::QualRangeWidth, Span::new(start.start, lexed.span.end), vec![width_event]))
            }
            _ => {
                let lower = self.expect_numeric_literal()?;
                self.expect(Token::DotDot)?;
                let upper = self.expect_numeric_literal()?;
                let end = upper.span();
                Ok(ParseEvent::node(Rule::QualRangeBounds, Span::new(start.start, end.end), vec![lower, upper]))
            }
        }
    }

    fn parse_length_body(&mut self, start: Span) -> Result<ParseEvent, ParseError> {
        let lower = self.expect_number()?;
        let mut end = lower.span();
        let mut children = vec![lower];
        if self.at(&Token::DotDot) {
            self.bump();
            let upper = self.expect_number()?;
            end = upper.span();
            children.push(upper);
        }
        Ok(ParseEvent::node(Rule::QualLength, Span::new(start.start, end.end), children))
    }

    fn parse_id_body(&mut self, start: Span) -> Result<ParseEvent, ParseError> {
        // `id N` or `id <vendorScope>:N`. The scope (if present) comes
        // first in the source but is emitted as the *second* child, since
        // the adapter always treats children[0] as the id number.
        let first = match self.peek() {
            Some(Token::Ident) => self.expect_name()?,
            Some(Token::IntLiteral) => self.expect_number()?,
            Some(tok) => {
                let found = tok.clone();
                return Err(self.unexpected(&found, self.current_span()));
            }
            None => return Err(self.eof_error("an id number or vendor scope")),
        };
        if self.at(&Token::Colon) {
            self.bump();
            let num = self.expect_number()?;
            let end = num.span();
            Ok(ParseEvent::node(Rule::QualId, Span::new(start.start, end.end), vec![num, first]))
        } else {
            let end = first.span();
            Ok(ParseEvent::node(Rule::QualId, Span::new(start.start, end.end), vec![first]))
        }
    }

    /// Parses a tag body's contents, the leading `tag` keyword (if any)
    /// already consumed by the caller: nothing, `N`, `*:N`, `name:N`, or
    /// `N:N`.
    fn parse_tag_body_contents(&mut self) -> Result<(Vec<ParseEvent>, Span), ParseError> {
        let slot = match self.peek() {
            Some(Token::Star) => {
                let lexed = self.bump().unwrap();
                Some(ParseEvent::Wildcard { span: lexed.span })
            }
            Some(Token::Ident) => Some(self.expect_name()?),
            Some(Token::IntLiteral) => Some(self.expect_number()?),
            _ => None,
        };
        let Some(slot) = slot else {
            return Ok((vec![], self.current_span()));
        };
        if self.at(&Token::Colon) {
            self.bump();
            let num = self.expect_number()?;
            let end = num.span();
            Ok((vec![slot, num], end))
        } else {
            // The slot we read was actually the tag number itself
            // (`[ 1 ]`, no profile scope).
            let end = slot.span();
            Ok((vec![slot], end))
        }
    }

    // -- types ---------------------------------------------------------

    fn parse_type(&mut self) -> Result<ParseEvent, ParseError> {
        let start = self.current_span();
        match self.peek() {
            Some(Token::Signed) => {
                self.bump();
                self.expect(Token::Integer)?;
                self.finish_integer_type(start, Rule::TypeSignedInteger)
            }
            Some(Token::Unsigned) => {
                self.bump();
                self.expect(Token::Integer)?;
                self.finish_integer_type(start, Rule::TypeUnsignedInteger)
            }
            Some(Token::Integer) => {
                self.bump();
                self.finish_integer_type(start, Rule::TypeSignedInteger)
            }
            Some(Token::FloatKw) => {
                self.bump();
                self.finish_simple_type(start, Rule::TypeFloat)
            }
            Some(Token::BooleanKw) => {
                self.bump();
                self.finish_simple_type(start, Rule::TypeBoolean)
            }
            Some(Token::Byte) => {
                self.bump();
                self.expect(Token::StringKw)?;
                self.finish_simple_type(start, Rule::TypeByteString)
            }
            Some(Token::StringKw) => {
                self.bump();
                self.finish_simple_type(start, Rule::TypeString)
            }
            Some(Token::NullKw) => {
                self.bump();
                self.finish_simple_type(start, Rule::TypeNull)
            }
            Some(Token::AnyKw) => {
                self.bump();
                self.finish_simple_type(start, Rule::TypeAny)
            }
            Some(Token::Structure) => {
                self.bump();
                self.finish_members_type(start, Rule::TypeStructure)
            }
            Some(Token::Field) => {
                self.bump();
                self.expect(Token::Group)?;
                self.finish_members_type(start, Rule::TypeFieldGroup)
            }
            Some(Token::Array) => {
                self.bump();
                self.finish_sequenced_type(start, Rule::TypeArray)
            }
            Some(Token::List) => {
                self.bump();
                self.finish_sequenced_type(start, Rule::TypeList)
            }
            Some(Token::Choice) => {
                self.bump();
                self.finish_choice_type(start)
            }
            Some(Token::Ident) | Some(Token::QuotedName) => {
                let name = self.expect_name()?;
                let end = name.span();
                Ok(ParseEvent::node(Rule::TypeReference, Span::new(start.start, end.end), vec![name]))
            }
            Some(tok) => {
                let found = tok.clone();
                Err(self.unexpected(&found, start))
            }
            None => Err(self.eof_error("a type")),
        }
    }

    fn finish_integer_type(&mut self, start: Span, rule: Rule) -> Result<ParseEvent, ParseError> {
        let quals = self.maybe_qual_list()?;
        let mut end = quals.as_ref().map(|q| q.span()).unwrap_or(start);
        let mut children = Vec::new();
        children.extend(quals);
        if self.at(&Token::LBrace) {
            let values = self.parse_enum_values()?;
            end = values.span();
            children.push(values);
        }
        Ok(ParseEvent::node(rule, Span::new(start.start, end.end), children))
    }

    fn parse_enum_values(&mut self) -> Result<ParseEvent, ParseError> {
        let open = self.expect(Token::LBrace)?;
        let mut values = Vec::new();
        while !self.at(&Token::RBrace) {
            values.push(self.parse_enum_value()?);
            if self.at(&Token::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        let close = self.expect(Token::RBrace)?;
        Ok(ParseEvent::node(Rule::EnumValues, Span::new(open.span.start, close.span.end), values))
    }

    fn parse_enum_value(&mut self) -> Result<ParseEvent, ParseError> {
        let doc = self.take_doc();
        let name = self.expect_name()?;
        self.expect(Token::Equals)?;
        let num = self.expect_number()?;
        let start = doc.as_ref().map(|d| d.span()).unwrap_or_else(|| name.span());
        let end = num.span();
        let mut children = Vec::new();
        children.extend(doc);
        children.push(name);
        children.push(num);
        Ok(ParseEvent::node(Rule::EnumValue, Span::new(start.start, end.end), children))
    }

    fn finish_simple_type(&mut self, start: Span, rule: Rule) -> Result<ParseEvent, ParseError> {
        let quals = self.maybe_qual_list()?;
        let end = quals.as_ref().map(|q| q.span()).unwrap_or(start);
        let mut children = Vec::new();
        children.extend(quals);
        Ok(ParseEvent::node(rule, Span::new(start.start, end.end), children))
    }

    fn finish_members_type(&mut self, start: Span, rule: Rule) -> Result<ParseEvent, ParseError> {
        let quals = self.maybe_qual_list()?;
        let mut children = Vec::new();
        children.extend(quals);
        let open = self.expect(Token::LBrace)?;
        let mut members = Vec::new();
        while !self.at(&Token::RBrace) {
            members.push(self.parse_member()?);
            if self.at(&Token::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        let close = self.expect(Token::RBrace)?;
        children.push(ParseEvent::node(Rule::Members, open.span, members));
        Ok(ParseEvent::node(rule, Span::new(start.start, close.span.end), children))
    }

    fn parse_member(&mut self) -> Result<ParseEvent, ParseError> {
        if self.at(&Token::Includes) {
            let kw = self.bump().unwrap();
            let name = self.expect_name()?;
            let end = name.span();
            return Ok(ParseEvent::node(Rule::StructureIncludes, Span::new(kw.span.start, end.end), vec![name]));
        }
        let doc = self.take_doc();
        let start = doc.as_ref().map(|d| d.span()).unwrap_or_else(|| self.current_span());
        let name = self.expect_name()?;
        let quals = self.maybe_qual_list()?;
        self.expect(Token::Colon)?;
        let ty = self.parse_type()?;
        let end = ty.span();
        let mut children = Vec::new();
        children.extend(doc);
        children.push(name);
        children.extend(quals);
        children.push(ty);
        Ok(ParseEvent::node(Rule::StructureField, Span::new(start.start, end.end), children))
    }

    fn finish_sequenced_type(&mut self, start: Span, rule: Rule) -> Result<ParseEvent, ParseError> {
        let quals = self.maybe_qual_list()?;
        let mut children = Vec::new();
        children.extend(quals);
        let pattern = self.parse_elem_type_pattern()?;
        let end = pattern.span();
        children.push(pattern);
        Ok(ParseEvent::node(rule, Span::new(start.start, end.end), children))
    }

    /// `OF <type>` for a uniform element type, or a bare `{ pattern-element,* }`
    /// for a patterned one (no `OF` keyword in the patterned form).
    fn parse_elem_type_pattern(&mut self) -> Result<ParseEvent, ParseError> {
        let start = self.current_span();
        if self.at(&Token::Of) {
            self.bump();
            let ty = self.parse_type()?;
            let end = ty.span();
            Ok(ParseEvent::node(Rule::ElemTypePattern, Span::new(start.start, end.end), vec![ty]))
        } else {
            self.expect(Token::LBrace)?;
            let mut elems = Vec::new();
            while !self.at(&Token::RBrace) {
                elems.push(self.parse_pattern_element()?);
                if self.at(&Token::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
            let close = self.expect(Token::RBrace)?;
            Ok(ParseEvent::node(Rule::ElemTypePattern, Span::new(start.start, close.span.end), elems))
        }
    }

    /// An optional leading name/wildcard is present only when it is
    /// immediately followed by `:` or a qualifier list — otherwise a bare
    /// identifier is itself a type reference (an unnamed element).
    fn has_name_prefix(&self) -> bool {
        matches!(self.peek_at(1), Some(Token::Colon) | Some(Token::LBracket))
            && matches!(self.peek(), Some(Token::Ident) | Some(Token::QuotedName) | Some(Token::Star))
    }

    fn parse_pattern_element(&mut self) -> Result<ParseEvent, ParseError> {
        let start = self.current_span();
        let name = if self.has_name_prefix() {
            match self.peek() {
                Some(Token::Star) => {
                    let lexed = self.bump().unwrap();
                    Some(ParseEvent::Wildcard { span: lexed.span })
                }
                _ => Some(self.expect_name()?),
            }
        } else {
            None
        };
        let quals = self.maybe_qual_list()?;
        if name.is_some() {
            self.expect(Token::Colon)?;
        }
        let ty = self.parse_type()?;
        let mut end = ty.span();
        let mut children = Vec::new();
        children.extend(name);
        children.extend(quals);
        children.push(ty);
        if let Some(quant) = self.maybe_quantifier()? {
            end = quant.span();
            children.push(quant);
        }
        Ok(ParseEvent::node(Rule::PatternElement, Span::new(start.start, end.end), children))
    }

    fn maybe_quantifier(&mut self) -> Result<Option<ParseEvent>, ParseError> {
        let start = self.current_span();
        match self.peek() {
            Some(Token::Question) => {
                let lexed = self.bump().unwrap();
                let zero = ParseEvent::Number { text: "0".into(), span: lexed.span };
                let one = ParseEvent::Number { text: "1".into(), span: lexed.span };
                Ok(Some(ParseEvent::node(Rule::Quantifier, lexed.span, vec![zero, one])))
            }
            Some(Token::Star) => {
                let lexed = self.bump().unwrap();
                let zero = ParseEvent::Number { text: "0".into(), span: lexed.span };
                let inf = ParseEvent::Wildcard { span: lexed.span };
                Ok(Some(ParseEvent::node(Rule::Quantifier, lexed.span, vec![zero, inf])))
            }
            Some(Token::Plus) => {
                let lexed = self.bump().unwrap();
                let one = ParseEvent::Number { text: "1".into(), span: lexed.span };
                let inf = ParseEvent::Wildcard { span: lexed.span };
                Ok(Some(ParseEvent::node(Rule::Quantifier, lexed.span, vec![one, inf])))
            }
            Some(Token::LBrace) => {
                self.bump();
                let lower = self.expect_number()?;
                let bounds = if self.at(&Token::DotDot) {
                    self.bump();
                    let upper = if self.at(&Token::Star) {
                        let lexed = self.bump().unwrap();
                        ParseEvent::Wildcard { span: lexed.span }
                    } else {
                        self.expect_number()?
                    };
                    vec![lower, upper]
                } else {
                    vec![lower]
                };
                let close = self.expect(Token::RBrace)?;
                Ok(Some(ParseEvent::node(Rule::Quantifier, Span::new(start.start, close.span.end), bounds)))
            }
            _ => Ok(None),
        }
    }

    fn finish_choice_type(&mut self, start: Span) -> Result<ParseEvent, ParseError> {
        self.expect(Token::Of)?;
        let quals = self.maybe_qual_list()?;
        let mut children = Vec::new();
        children.extend(quals);
        let open = self.expect(Token::LBrace)?;
        let mut alts = Vec::new();
        while !self.at(&Token::RBrace) {
            alts.push(self.parse_choice_alternate()?);
            if self.at(&Token::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        let close = self.expect(Token::RBrace)?;
        children.push(ParseEvent::node(Rule::Alternates, open.span, alts));
        Ok(ParseEvent::node(Rule::TypeChoiceOf, Span::new(start.start, close.span.end), children))
    }

    fn parse_choice_alternate(&mut self) -> Result<ParseEvent, ParseError> {
        let doc = self.take_doc();
        let start = doc.as_ref().map(|d| d.span()).unwrap_or_else(|| self.current_span());
        let name = if self.has_name_prefix() {
            match self.peek() {
                Some(Token::Star) => {
                    let lexed = self.bump().unwrap();
                    Some(ParseEvent::Wildcard { span: lexed.span })
                }
                _ => Some(self.expect_name()?),
            }
        } else {
            None
        };
        let quals = self.maybe_qual_list()?;
        if name.is_some() {
            self.expect(Token::Colon)?;
        }
        let ty = self.parse_type()?;
        let end = ty.span();
        let mut children = Vec::new();
        children.extend(doc);
        children.extend(name);
        children.extend(quals);
        children.push(ty);
        Ok(ParseEvent::node(Rule::ChoiceAlternate, Span::new(start.start, end.end), children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv_schema_core::ast::{Ast, NodeKind, QualifierKind};

    fn parse_ok(text: &str) -> ParseEvent {
        parse(SourceId(0), text).expect("parses")
    }

    fn adapt(text: &str) -> (Ast, tlv_schema_core::ast::NodeId) {
        let event = parse_ok(text);
        let mut ast = Ast::new();
        let file = tlv_schema_core::adapter::adapt_file(&mut ast, SourceId(0), "t.tlv", &event).expect("adapts");
        (ast, file)
    }

    #[test]
    fn parses_vendor_with_id() {
        let (ast, file) = adapt("acme => VENDOR [ id 9 ]\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::Vendor { name, quals, .. } = &ast.node(statements[0]).kind else { panic!() };
        assert_eq!(name, "acme");
        let NodeKind::Qualifier(QualifierKind::Id { id_num, vendor }) = &ast.node(quals[0]).kind else { panic!() };
        assert_eq!(*id_num, 9);
        assert!(vendor.is_none());
    }

    #[test]
    fn parses_profile_with_vendor_scoped_id_and_body() {
        let (ast, file) = adapt(
            "vendor-1 => VENDOR [ id 0xAAAA ]\n\
             profile-1 => PROFILE [ id vendor-1:0xBBBB ]\n\
             {\n\
                 type-4 [ 4 ] => STRING\n\
             }\n",
        );
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::Profile { name, statements: inner, .. } = &ast.node(statements[1]).kind else { panic!() };
        assert_eq!(name, "profile-1");
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn parses_message_with_empty_payload() {
        let (ast, file) = adapt("msg2 => MESSAGE [ id 2 ] EMPTY\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::Message { empty_payload, payload, .. } = &ast.node(statements[0]).kind else { panic!() };
        assert!(*empty_payload);
        assert!(payload.is_none());
    }

    #[test]
    fn parses_message_with_inline_payload() {
        let (ast, file) = adapt("msg3 => MESSAGE [ id 3 ] : ARRAY OF STRING\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::Message { empty_payload, payload, .. } = &ast.node(statements[0]).kind else { panic!() };
        assert!(!*empty_payload);
        assert!(payload.is_some());
    }

    #[test]
    fn parses_message_with_no_payload() {
        let (ast, file) = adapt("msg1 => MESSAGE [ id 1 ]\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::Message { empty_payload, payload, .. } = &ast.node(statements[0]).kind else { panic!() };
        assert!(!*empty_payload);
        assert!(payload.is_none());
    }

    #[test]
    fn parses_status_code() {
        let (ast, file) = adapt("sc => STATUS CODE [ id 7 ]\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        assert!(matches!(ast.node(statements[0]).kind, NodeKind::StatusCode { .. }));
    }

    #[test]
    fn parses_structure_with_tag_shorthand_fields() {
        let (ast, file) = adapt(
            "point => STRUCTURE\n\
             {\n\
                 x [1] : INTEGER,\n\
                 y [*:2] : INTEGER,\n\
             }\n",
        );
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { underlying, .. } = &ast.node(statements[0]).kind else { panic!() };
        let NodeKind::Structure { members, .. } = &ast.node(*underlying).kind else { panic!() };
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn parses_includes_and_field_group() {
        let (ast, file) = adapt(
            "common-fields => FIELD GROUP\n\
             {\n\
                 a [1] : INTEGER,\n\
             }\n\
             rec => STRUCTURE\n\
             {\n\
                 includes common-fields,\n\
                 b [2] : STRING,\n\
             }\n",
        );
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { underlying, .. } = &ast.node(statements[1]).kind else { panic!() };
        let NodeKind::Structure { members, .. } = &ast.node(*underlying).kind else { panic!() };
        assert!(matches!(ast.node(members[0]).kind, NodeKind::StructureIncludes { .. }));
    }

    #[test]
    fn parses_array_pattern_elements_with_no_of_keyword() {
        let (ast, file) = adapt(
            "rec => ARRAY\n\
             {\n\
                 elem-a : INTEGER,\n\
                 elem-b : INTEGER ?,\n\
                          FLOAT +,\n\
             }\n",
        );
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { underlying, .. } = &ast.node(statements[0]).kind else { panic!() };
        let NodeKind::Array { body, .. } = &ast.node(*underlying).kind else { panic!() };
        assert!(matches!(body, tlv_schema_core::ast::SequencedBody::Pattern(elems) if elems.len() == 3));
    }

    #[test]
    fn parses_array_of_uniform_type() {
        let (ast, file) = adapt("rec => ARRAY OF INTEGER\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { underlying, .. } = &ast.node(statements[0]).kind else { panic!() };
        let NodeKind::Array { body, .. } = &ast.node(*underlying).kind else { panic!() };
        assert!(matches!(body, tlv_schema_core::ast::SequencedBody::Uniform(_)));
    }

    #[test]
    fn parses_choice_of_with_named_and_unnamed_alternates() {
        let (ast, file) = adapt(
            "v => CHOICE OF\n\
             {\n\
                 int-val : INTEGER,\n\
                 STRING,\n\
             }\n",
        );
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { underlying, .. } = &ast.node(statements[0]).kind else { panic!() };
        let NodeKind::ChoiceOf { alternates, .. } = &ast.node(*underlying).kind else { panic!() };
        assert_eq!(alternates.len(), 2);
    }

    #[test]
    fn parses_choice_alternate_with_tag_before_colon() {
        let (ast, file) = adapt(
            "v => CHOICE OF\n\
             {\n\
                 alt4 [4] : ARRAY OF ANY,\n\
             }\n",
        );
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { underlying, .. } = &ast.node(statements[0]).kind else { panic!() };
        let NodeKind::ChoiceOf { alternates, .. } = &ast.node(*underlying).kind else { panic!() };
        let NodeKind::ChoiceAlternate { name, .. } = &ast.node(alternates[0]).kind else { panic!() };
        assert_eq!(name.as_deref(), Some("alt4"));
    }

    #[test]
    fn parses_dotted_namespace() {
        let (ast, file) = adapt("namespace a.b { Flag => BOOLEAN }\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        assert_eq!(ast.fully_qualified_name(statements[0]), "a");
    }

    #[test]
    fn parses_doc_comments() {
        let (ast, file) = adapt("/// a vendor\nacme => VENDOR [ id 1 ]\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::Vendor { docs, .. } = &ast.node(statements[0]).kind else { panic!() };
        assert_eq!(docs.as_deref(), Some("a vendor"));
    }

    #[test]
    fn parses_integer_enum_values() {
        let (ast, file) = adapt("e => INTEGER [ range 8bit ] { ok = 127, bad = -128 }\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { underlying, .. } = &ast.node(statements[0]).kind else { panic!() };
        let NodeKind::SignedInteger { values, .. } = &ast.node(*underlying).kind else { panic!() };
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn parses_explicit_tag_keyword_alongside_general_quals() {
        let (ast, file) = adapt("test [ extensible, tag 42, id 9 ] => INTEGER\n");
        let NodeKind::File { statements, .. } = &ast.node(file).kind else { panic!() };
        let NodeKind::TypeDef { quals, .. } = &ast.node(statements[0]).kind else { panic!() };
        assert_eq!(quals.len(), 3);
    }

    #[test]
    fn rejects_unknown_byte() {
        let err = parse(SourceId(0), "acme => VENDOR @\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn rejects_malformed_trailing_input() {
        let err = parse(SourceId(0), "acme => VENDOR [ id 1 ] ]\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }
}
