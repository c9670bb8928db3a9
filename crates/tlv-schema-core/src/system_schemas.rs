//! The built-in schema fragment spec §6.3 requires to be implicitly loaded
//! before validation: a `common` vendor with id 0, so that any schema
//! referencing the `common` vendor resolves.
//!
//! Built directly as [`Ast`] nodes rather than stored as source text —
//! `tlv-schema-core` has no parser of its own (see the crate's top-level
//! doc comment on the core/dsl dependency direction), so there is nothing
//! here that could turn DSL text into a parse-event tree.

use crate::ast::{Ast, NodeId, NodeKind, QualifierKind};
use crate::source_map::{Position, SourceId, SourceRef, Span};

/// The logical source name the bootstrap fragment is recorded under, so a
/// diagnostic pointing at it still renders a sensible location.
pub const BOOTSTRAP_SOURCE_NAME: &str = "<built-in>";

/// The source text the bootstrap fragment corresponds to (spec §6.3),
/// recorded in the source map purely for diagnostic rendering — it is
/// never tokenized or parsed.
pub const BOOTSTRAP_SOURCE_TEXT: &str = "VENDOR common [ id 0 ]\n";

/// Builds the `VENDOR common [ id 0 ]` fragment directly as AST nodes under
/// `source_id` and returns the new `File` node's id. The caller registers
/// it with [`Ast::register_file`].
pub fn install_bootstrap(ast: &mut Ast, source_id: SourceId) -> NodeId {
    let point = Position::new(1, 1, 0);
    let source_ref = SourceRef::new(source_id, Span::point(point));

    let id_qual = ast.push(
        NodeKind::Qualifier(QualifierKind::Id {
            id_num: 0,
            vendor: None,
        }),
        source_ref,
        None,
    );
    let vendor = ast.push(
        NodeKind::Vendor {
            name: "common".to_string(),
            quals: vec![id_qual],
            docs: None,
        },
        source_ref,
        None,
    );
    ast.set_parent(id_qual, vendor);

    let file = ast.push(
        NodeKind::File {
            name: BOOTSTRAP_SOURCE_NAME.to_string(),
            statements: vec![vendor],
        },
        source_ref,
        None,
    );
    ast.set_parent(vendor, file);
    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::vendor_numeric_id;

    #[test]
    fn bootstrap_declares_common_vendor_with_id_zero() {
        let mut ast = Ast::new();
        let file = install_bootstrap(&mut ast, SourceId(0));
        ast.register_file(file);

        let vendor = ast
            .all_nodes()
            .into_iter()
            .find(|&id| matches!(ast.node(id).kind, NodeKind::Vendor { .. }))
            .expect("bootstrap registers a Vendor node");
        assert_eq!(ast.simple_name(vendor), Some("common"));
        assert_eq!(vendor_numeric_id(&ast, vendor), Some(0));
    }
}
