//! Name resolution: three passes over a loaded [`Ast`], each widening what
//! the next pass can see (spec §4.3 "Resolution passes").
//!
//! Resolution results are never written back onto AST nodes — they live in
//! [`Resolution`], a set of side tables keyed by [`NodeId`]. Re-running
//! `resolve` (as `validate()` does on every call) simply rebuilds the
//! tables from scratch; there is no incremental invalidation to get wrong.

use std::collections::{HashMap, HashSet};

use crate::ast::{Ast, NodeId, NodeKind, ProfileSlot, QualifierKind, VendorSlot};
use crate::diagnostic::Diagnostic;
use crate::symbol_index::SymbolIndex;

/// Side tables populated by [`resolve`].
#[derive(Debug, Default)]
pub struct Resolution {
    /// `ReferencedType` node -> the `TypeDef` its name resolved to (Pass A).
    type_def_of_reference: HashMap<NodeId, NodeId>,
    /// `StructureIncludes` node -> the `TypeDef` its name resolved to (Pass A).
    includes_target: HashMap<NodeId, NodeId>,
    /// `ReferencedType` node -> the terminal non-reference type reached by
    /// following its `TypeDef` chain (Pass B).
    terminal_type: HashMap<NodeId, NodeId>,
    /// `Qualifier(Id { vendor: Some(VendorSlot::Name(_)), .. })` node ->
    /// the `Vendor` it names (Pass C).
    vendor_of_id_qual: HashMap<NodeId, NodeId>,
    /// `Qualifier(Tag(ProfileSpecific { profile: Name(_) | CurrentProfile, .. }))`
    /// node -> the `Profile` it names (Pass C).
    profile_of_tag_qual: HashMap<NodeId, NodeId>,
}

impl Resolution {
    pub fn type_def_of_reference(&self, reference: NodeId) -> Option<NodeId> {
        self.type_def_of_reference.get(&reference).copied()
    }

    pub fn includes_target(&self, includes: NodeId) -> Option<NodeId> {
        self.includes_target.get(&includes).copied()
    }

    /// The non-reference type a `ReferencedType` node ultimately names,
    /// after following every intermediate `TypeDef => <other reference>`
    /// hop. `None` if the reference never resolved or the chain cycles.
    pub fn terminal_type(&self, reference: NodeId) -> Option<NodeId> {
        self.terminal_type.get(&reference).copied()
    }

    pub fn vendor_of_id_qual(&self, qual: NodeId) -> Option<NodeId> {
        self.vendor_of_id_qual.get(&qual).copied()
    }

    pub fn profile_of_tag_qual(&self, qual: NodeId) -> Option<NodeId> {
        self.profile_of_tag_qual.get(&qual).copied()
    }
}

pub fn resolve(ast: &Ast, index: &SymbolIndex) -> (Resolution, Vec<Diagnostic>) {
    let mut resolution = Resolution::default();
    let mut diagnostics = Vec::new();

    pass_a_names(ast, index, &mut resolution, &mut diagnostics);
    pass_b_chains(ast, &mut resolution, &mut diagnostics);
    pass_c_vendor_profile(ast, index, &mut resolution, &mut diagnostics);

    (resolution, diagnostics)
}

fn pass_a_names(ast: &Ast, index: &SymbolIndex, resolution: &mut Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        match &ast.node(id).kind {
            NodeKind::ReferencedType { target_name } => {
                match index.resolve_type_def(ast, id, target_name) {
                    Some(def) => {
                        resolution.type_def_of_reference.insert(id, def);
                    }
                    None => diagnostics.push(
                        Diagnostic::new(format!("invalid type reference '{target_name}'"))
                            .with_source_ref(ast.node(id).source_ref),
                    ),
                }
            }
            NodeKind::StructureIncludes { target_name } => {
                match index.resolve_type_def(ast, id, target_name) {
                    Some(def) => {
                        resolution.includes_target.insert(id, def);
                    }
                    None => diagnostics.push(
                        Diagnostic::new(format!("invalid type reference '{target_name}'"))
                            .with_source_ref(ast.node(id).source_ref),
                    ),
                }
            }
            _ => {}
        }
    }
}

fn pass_b_chains(ast: &Ast, resolution: &mut Resolution, diagnostics: &mut Vec<Diagnostic>) {
    let reference_ids: Vec<NodeId> = resolution.type_def_of_reference.keys().copied().collect();
    for reference in reference_ids {
        match follow_chain(ast, resolution, reference) {
            Ok(terminal) => {
                resolution.terminal_type.insert(reference, terminal);
            }
            Err(ChainError::Cycle(name)) => diagnostics.push(
                Diagnostic::new(format!("circular type reference involving '{name}'"))
                    .with_source_ref(ast.node(reference).source_ref),
            ),
        }
    }
}

enum ChainError {
    Cycle(String),
}

/// Follows `ReferencedType => TypeDef => ReferencedType => ...` until a
/// non-reference type is reached, per spec §4.3 "reference chains are
/// flattened and attached to the originating reference node".
fn follow_chain(ast: &Ast, resolution: &Resolution, start: NodeId) -> Result<NodeId, ChainError> {
    let mut current = start;
    let mut visited_type_defs = HashSet::new();
    loop {
        let Some(type_def) = resolution.type_def_of_reference(current) else {
            // Unresolved; already diagnosed in pass A. Treat as a dead end
            // rather than a cycle so we don't double-report.
            return Ok(current);
        };
        if !visited_type_defs.insert(type_def) {
            let name = ast.simple_name(type_def).unwrap_or("?").to_string();
            return Err(ChainError::Cycle(name));
        }
        let underlying = ast
            .underlying_type(type_def)
            .expect("TypeDef always has an underlying type");
        match &ast.node(underlying).kind {
            NodeKind::ReferencedType { .. } => current = underlying,
            _ => return Ok(underlying),
        }
    }
}

fn pass_c_vendor_profile(ast: &Ast, index: &SymbolIndex, resolution: &mut Resolution, diagnostics: &mut Vec<Diagnostic>) {
    for id in ast.all_nodes() {
        let NodeKind::Qualifier(kind) = &ast.node(id).kind else { continue };
        match kind {
            QualifierKind::Id { vendor: Some(VendorSlot::Name(name)), .. } => {
                match index.resolve_vendor(ast, id, name) {
                    Some(v) => {
                        resolution.vendor_of_id_qual.insert(id, v);
                    }
                    None => diagnostics.push(
                        Diagnostic::new(format!("invalid vendor reference '{name}'"))
                            .with_source_ref(ast.node(id).source_ref),
                    ),
                }
            }
            QualifierKind::Tag(tag) => {
                let profile_name = match tag {
                    crate::ast::TagBody::ProfileSpecific { profile: ProfileSlot::Name(name), .. } => Some(name.clone()),
                    crate::ast::TagBody::ProfileSpecific { profile: ProfileSlot::CurrentProfile, .. } => {
                        match ast.containing_profile(id) {
                            Some(p) => {
                                resolution.profile_of_tag_qual.insert(id, p);
                                None
                            }
                            None => {
                                diagnostics.push(
                                    Diagnostic::new("invalid reference to current profile")
                                        .with_source_ref(ast.node(id).source_ref),
                                );
                                None
                            }
                        }
                    }
                    _ => None,
                };
                if let Some(name) = profile_name {
                    match index.resolve_profile(ast, id, &name) {
                        Some(p) => {
                            resolution.profile_of_tag_qual.insert(id, p);
                        }
                        None => diagnostics.push(
                            Diagnostic::new(format!("invalid profile reference '{name}'"))
                                .with_source_ref(ast.node(id).source_ref),
                        ),
                    }
                }
            }
            _ => {}
        }
    }
}
