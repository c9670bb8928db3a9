//! Builds the four name tables (vendors, namespaces, profiles, type
//! definitions) the resolver searches, and performs the innermost-namespace-
//! first lookup spec §4.3 "Name Resolution" describes.

use std::collections::HashMap;

use crate::ast::{Ast, NodeId, NodeKind};

/// A multimap from fully qualified name to every node declared under that
/// name. More than one entry for a name is itself a validation error
/// (duplicate definition), so the index keeps all of them rather than
/// silently keeping the last.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    pub vendors: HashMap<String, Vec<NodeId>>,
    pub namespaces: HashMap<String, Vec<NodeId>>,
    pub profiles: HashMap<String, Vec<NodeId>>,
    pub type_defs: HashMap<String, Vec<NodeId>>,
}

impl SymbolIndex {
    /// Walks every loaded node once and buckets the definitions that
    /// participate in name resolution by their fully qualified name.
    pub fn build(ast: &Ast) -> Self {
        let mut index = SymbolIndex::default();
        for id in ast.all_nodes() {
            let fqn = ast.fully_qualified_name(id);
            match &ast.node(id).kind {
                NodeKind::Vendor { .. } => index.vendors.entry(fqn).or_default().push(id),
                NodeKind::Namespace { .. } => index.namespaces.entry(fqn).or_default().push(id),
                NodeKind::Profile { .. } => index.profiles.entry(fqn).or_default().push(id),
                NodeKind::TypeDef { .. } => index.type_defs.entry(fqn).or_default().push(id),
                _ => {}
            }
        }
        index
    }

    /// Resolves a type reference's target name, searching the namespace
    /// enclosing `from` first and widening outward to the schema root
    /// (spec §4.3: "the innermost enclosing namespace is searched first").
    /// `target_name` may itself be dotted (an explicit scoped reference),
    /// in which case it is resolved relative to each candidate scope in turn.
    pub fn resolve_type_def(&self, ast: &Ast, from: NodeId, target_name: &str) -> Option<NodeId> {
        self.resolve_in(&self.type_defs, ast, from, target_name)
    }

    pub fn resolve_vendor(&self, ast: &Ast, from: NodeId, target_name: &str) -> Option<NodeId> {
        self.resolve_in(&self.vendors, ast, from, target_name)
    }

    pub fn resolve_profile(&self, ast: &Ast, from: NodeId, target_name: &str) -> Option<NodeId> {
        self.resolve_in(&self.profiles, ast, from, target_name)
    }

    fn resolve_in(
        &self,
        table: &HashMap<String, Vec<NodeId>>,
        ast: &Ast,
        from: NodeId,
        target_name: &str,
    ) -> Option<NodeId> {
        let mut scope = ast.containing_namespace(from);
        loop {
            let candidate = match scope {
                Some(ns) => format!("{}.{}", ast.fully_qualified_name(ns), target_name),
                None => target_name.to_string(),
            };
            if let Some(hits) = table.get(&candidate) {
                if let Some(&first) = hits.first() {
                    return Some(first);
                }
            }
            match scope {
                Some(ns) => scope = ast.containing_namespace(ns),
                None => return None,
            }
        }
    }
}
