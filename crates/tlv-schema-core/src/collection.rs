//! Orchestrates the pipeline spec §4.6 describes: load parsed files into
//! the AST, build the symbol index, resolve references, and run the
//! validator — all behind one state machine so a caller can't query a
//! collection before it's ready, and so `validate()` stays safely
//! re-runnable after further files are loaded.

use tracing::{debug, instrument};

use crate::adapter::adapt_file;
use crate::ast::{Ast, NodeId};
use crate::diagnostic::Diagnostic;
use crate::error::ParseError;
use crate::parse_event::ParseEvent;
use crate::query::{Context, FileHandle, NamespaceRef, NodeRef, ProfileRef, TypeDefRef, VendorRef};
use crate::resolver::{resolve, Resolution};
use crate::source_map::{SourceId, SourceMap};
use crate::symbol_index::SymbolIndex;
use crate::system_schemas::{install_bootstrap, BOOTSTRAP_SOURCE_NAME, BOOTSTRAP_SOURCE_TEXT};

/// Where a [`SchemaCollection`] sits in its lifecycle (spec §4.6
/// "Empty → Loaded → Resolved → Validated").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Empty,
    Loaded,
    Resolved,
    Validated,
}

/// Everything loaded into one compilation unit: every source file's text
/// and AST nodes, the symbol index and resolution built from them, and the
/// diagnostics from the most recent validation.
///
/// The default schema fragment (spec §6.3, the `common` vendor) is loaded
/// into every collection at construction, ahead of any caller-supplied
/// file, so it is always present by the time `validate()` needs it.
pub struct SchemaCollection {
    sources: SourceMap,
    ast: Ast,
    index: SymbolIndex,
    resolution: Resolution,
    diagnostics: Vec<Diagnostic>,
    state: LoadState,
}

impl Default for SchemaCollection {
    fn default() -> Self {
        let mut sources = SourceMap::new();
        let mut ast = Ast::new();
        let source_id = sources.add(BOOTSTRAP_SOURCE_NAME, BOOTSTRAP_SOURCE_TEXT);
        let file = install_bootstrap(&mut ast, source_id);
        ast.register_file(file);
        Self {
            sources,
            ast,
            index: SymbolIndex::default(),
            resolution: Resolution::default(),
            diagnostics: Vec::new(),
            state: LoadState::Loaded,
        }
    }
}

impl SchemaCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Records `name`/`text` in the source map ahead of parsing, so a front
    /// end can tag lex/parse errors with a [`SourceId`] that already lines
    /// up with this collection's own source map — see [`Self::load_parsed_at`].
    pub fn alloc_source(&mut self, name: &str, text: &str) -> SourceId {
        self.sources.add(name, text)
    }

    /// Adapts one already-parsed file into the AST under a [`SourceId`]
    /// previously returned by [`Self::alloc_source`]. The concrete syntax is
    /// `tlv-schema-dsl`'s concern; this only ever consumes the
    /// [`ParseEvent`] tree a front end produced.
    #[instrument(skip(self, event), fields(file = name))]
    pub fn load_parsed_at(&mut self, source_id: SourceId, name: &str, event: &ParseEvent) -> Result<(), ParseError> {
        let file_id = adapt_file(&mut self.ast, source_id, name, event)?;
        self.ast.register_file(file_id);
        self.state = LoadState::Loaded;
        debug!("loaded schema file");
        Ok(())
    }

    /// Adapts one already-parsed file into the AST under `name`, recording
    /// `text` in the source map so diagnostics referencing it can render a
    /// location. The concrete syntax is `tlv-schema-dsl`'s concern; this
    /// only ever consumes the [`ParseEvent`] tree a front end produced.
    ///
    /// Equivalent to allocating a source with [`Self::alloc_source`] and
    /// adapting it with [`Self::load_parsed_at`] in one step, for callers
    /// that already have a complete [`ParseEvent`] tree in hand and don't
    /// need the [`SourceId`] to tag earlier parse errors.
    pub fn load_parsed(&mut self, name: &str, text: &str, event: &ParseEvent) -> Result<(), ParseError> {
        let source_id = self.alloc_source(name, text);
        self.load_parsed_at(source_id, name, event)
    }

    /// Runs name resolution (spec §4.3) over the current AST. Idempotent:
    /// always rebuilds the symbol index and resolution tables from
    /// scratch, so calling it again after loading more files never leaves
    /// stale entries from an earlier AST behind.
    pub fn resolve(&mut self) -> &[Diagnostic] {
        self.index = SymbolIndex::build(&self.ast);
        let (resolution, diagnostics) = resolve(&self.ast, &self.index);
        self.resolution = resolution;
        self.diagnostics = diagnostics;
        self.state = LoadState::Resolved;
        &self.diagnostics
    }

    /// Runs name resolution then semantic validation (spec §4.6): resolver
    /// passes A–C, then every node's per-node rules, then cross-node rules.
    /// Safe to call repeatedly — each call recomputes the symbol index,
    /// resolution, and diagnostics from the current AST rather than
    /// accumulating state from a previous call.
    #[instrument(skip(self))]
    pub fn validate(&mut self) -> &[Diagnostic] {
        self.index = SymbolIndex::build(&self.ast);
        let (resolution, mut diagnostics) = resolve(&self.ast, &self.index);
        diagnostics.extend(crate::validator::validate(&self.ast, &self.index, &resolution));
        self.resolution = resolution;
        self.diagnostics = diagnostics;
        self.state = LoadState::Validated;
        debug!(diagnostic_count = self.diagnostics.len(), "validated schema collection");
        &self.diagnostics
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `true` once `validate()` has run and found nothing to report.
    pub fn is_valid(&self) -> bool {
        matches!(self.state, LoadState::Validated) && self.diagnostics.is_empty()
    }

    fn context(&self) -> Context<'_> {
        Context::new(&self.ast, &self.resolution)
    }

    /// Every loaded file (including the built-in bootstrap fragment) as a
    /// typed, read-only handle (spec §6.1).
    pub fn files(&self) -> impl Iterator<Item = FileHandle<'_>> + '_ {
        let cx = self.context();
        self.ast.files().map(move |id| FileHandle::new(cx, id))
    }

    /// A top-level or namespace-level statement by id, dispatched to its
    /// concrete typed view.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self.context(), id)
    }

    /// Every node across every loaded file, dispatched to its concrete
    /// typed view (spec §6.1 "allNodes"). Callers filter the iterator
    /// themselves (e.g. `.filter(|n| matches!(n, NodeRef::Vendor(_)))`)
    /// rather than this method taking a predicate — a plain iterator
    /// adapter composes better than a callback parameter.
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        let cx = self.context();
        self.ast.all_nodes().into_iter().map(move |id| NodeRef::new(cx, id))
    }

    /// Looks up a `VENDOR` definition by name (spec §3(13): vendors are
    /// always declared at global scope, so a vendor's name is already its
    /// fully qualified name). The first declaration wins when more than one
    /// shares the name (spec §4.2's "duplicate" is a validator concern, not
    /// a lookup concern).
    pub fn get_vendor(&self, name: &str) -> Option<VendorRef<'_>> {
        let &id = self.index.vendors.get(name)?.first()?;
        Some(VendorRef::new(self.context(), id))
    }

    /// Looks up a `PROFILE` definition by its fully qualified (dotted) name.
    pub fn get_profile(&self, fully_qualified_name: &str) -> Option<ProfileRef<'_>> {
        let &id = self.index.profiles.get(fully_qualified_name)?.first()?;
        Some(ProfileRef::new(self.context(), id))
    }

    /// Looks up a type definition by its fully qualified (dotted) name.
    pub fn get_type_def(&self, fully_qualified_name: &str) -> Option<TypeDefRef<'_>> {
        let &id = self.index.type_defs.get(fully_qualified_name)?.first()?;
        Some(TypeDefRef::new(self.context(), id))
    }

    /// Every `namespace` node declared under a given fully qualified
    /// (dotted) name — more than one is possible since the same dotted
    /// namespace path may be reopened across files or via dotted-name
    /// expansion (spec §4.1 "Dotted namespace expansion").
    pub fn get_namespaces(&self, fully_qualified_name: &str) -> Vec<NamespaceRef<'_>> {
        let cx = self.context();
        self.index
            .namespaces
            .get(fully_qualified_name)
            .map(|ids| ids.iter().map(|&id| NamespaceRef::new(cx, id)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collection_starts_loaded_with_the_common_vendor() {
        let collection = SchemaCollection::new();
        assert_eq!(collection.state(), LoadState::Loaded);
        let names: Vec<&str> = collection.files().map(|f| f.name()).collect();
        assert_eq!(names, vec![BOOTSTRAP_SOURCE_NAME]);
    }

    #[test]
    fn validate_on_bootstrap_alone_reports_no_diagnostics() {
        let mut collection = SchemaCollection::new();
        let diagnostics = collection.validate();
        assert!(diagnostics.is_empty());
        assert!(collection.is_valid());
    }

    #[test]
    fn validate_is_idempotent() {
        let mut collection = SchemaCollection::new();
        let first = collection.validate().to_vec();
        let second = collection.validate().to_vec();
        assert_eq!(first, second);
    }
}
