//! # tlv-schema-dsl
//!
//! The concrete tokenizer and parser for the TLV Schema DSL: the textual
//! syntax for `VENDOR`/`PROFILE`/`MESSAGE`/`STATUS CODE`/type definitions
//! that `tlv-schema-core` resolves, validates, and derives values over.
//!
//! Spec §1 draws a hard line between this crate and the core: "the core
//! only consumes a stream of parse events with source positions." This
//! crate's only job is producing that stream — a [`tlv_schema_core::parse_event::ParseEvent`]
//! tree — from schema source text. It never builds an AST node itself;
//! `tlv_schema_core::adapter::adapt_file` does that from the event tree
//! this crate's [`parse`] returns.
//!
//! # Example
//!
//! ```
//! use tlv_schema_core::ast::{Ast, NodeKind};
//! use tlv_schema_core::source_map::SourceMap;
//!
//! let mut sources = SourceMap::new();
//! let text = "acme => VENDOR [ id 9 ]\n";
//! let source_id = sources.add("acme.tlv", text);
//!
//! let event = tlv_schema_dsl::parse(source_id, text).expect("parses");
//! let mut ast = Ast::new();
//! let file = tlv_schema_core::adapter::adapt_file(&mut ast, source_id, "acme.tlv", &event)
//!     .expect("adapts");
//! let NodeKind::File { name, .. } = &ast.node(file).kind else { unreachable!() };
//! assert_eq!(name, "acme.tlv");
//! ```

mod lexer;
pub mod parser;
pub mod token;

use tlv_schema_core::error::ParseError;
use tlv_schema_core::source_map::SourceId;
use tlv_schema_core::SchemaCollection;

pub use parser::parse;

/// Parses `text` and adapts it into `collection` under `name` in one step —
/// the convenience a consumer (the CLI's `validate`/`dump` commands, a
/// future language server) reaches for instead of wiring
/// [`parse`] + [`SchemaCollection::load_parsed_at`] by hand.
///
/// Allocating the [`SourceId`] through `collection` itself (rather than a
/// scratch [`tlv_schema_core::source_map::SourceMap`]) before parsing means
/// a lex/parse error and a later adapter error both carry a `SourceId` that
/// already resolves against `collection.sources()` — a caller never needs a
/// second source map just to render one.
pub fn load_into(collection: &mut SchemaCollection, name: &str, text: &str) -> Result<(), ParseError> {
    let source_id: SourceId = collection.alloc_source(name, text);
    let event = parse(source_id, text)?;
    collection.load_parsed_at(source_id, name, &event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_into_adapts_and_registers_the_file() {
        let mut collection = SchemaCollection::new();
        load_into(&mut collection, "acme.tlv", "acme => VENDOR [ id 9 ]\n").expect("loads");
        let names: Vec<&str> = collection.files().map(|f| f.name()).collect();
        assert!(names.contains(&"acme.tlv"));
        assert!(collection.get_vendor("acme").is_some());
    }

    #[test]
    fn load_into_surfaces_a_parse_error_against_the_collection_sources() {
        let mut collection = SchemaCollection::new();
        let err = load_into(&mut collection, "bad.tlv", "acme => VENDOR [ @@ ]\n").unwrap_err();
        assert!(err.format(collection.sources()).starts_with("bad.tlv:"));
    }
}
