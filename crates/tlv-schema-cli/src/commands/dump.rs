use std::path::Path;

use tlv_schema_core::ast::{
    Ast, Bound, NodeId, NodeKind, NumericLiteral, OrderKind, ProfileSlot, QualifierKind, RangeBody, TagBody,
    VendorSlot,
};
use tlv_schema_core::source_map::SourceMap;
use tlv_schema_core::SchemaCollection;

use crate::cli::DumpArgs;
use crate::error::CliError;

/// Runs `dump`: loads every file into one collection (no resolution or
/// validation — `dump` reflects the raw AST, not derived values) and prints
/// an indented per-node summary: construct title, source position,
/// documentation, and qualifier list (spec §6.4 "dump").
pub fn run(args: &DumpArgs) -> Result<String, CliError> {
    let mut collection = SchemaCollection::new();
    let mut parse_errors = Vec::new();

    for path in &args.files {
        let text = read_file(path)?;
        let name = path.display().to_string();
        if let Err(err) = tlv_schema_dsl::load_into(&mut collection, &name, &text) {
            parse_errors.push(err.format(collection.sources()));
        }
    }

    let mut out = String::new();
    if !parse_errors.is_empty() {
        for err in &parse_errors {
            out.push_str(err);
            out.push_str("\n\n");
        }
    }
    for file in collection.ast().files() {
        dump_node(collection.ast(), collection.sources(), file, 0, &mut out);
    }
    Ok(out)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn dump_node(ast: &Ast, sources: &SourceMap, id: NodeId, indent: usize, out: &mut String) {
    let node = ast.node(id);
    let pad = "  ".repeat(indent);

    out.push_str(&pad);
    out.push_str(ast.construct_name(id));
    let name = ast.effective_name(id);
    if !name.is_empty() {
        out.push_str(": ");
        out.push_str(&name);
    }
    out.push_str(&format!("  ({})", sources.file_pos_str(node.source_ref)));
    out.push('\n');

    if let Some(doc) = docs_of(&node.kind) {
        out.push_str(&pad);
        out.push_str("  doc:");
        out.push_str(doc);
        out.push('\n');
    }

    if let NodeKind::PatternElement { lower, upper, .. } = &node.kind {
        out.push_str(&pad);
        out.push_str(&format!("  quantifier: {}..{}\n", bound_str(*lower), bound_str(*upper)));
    }

    let quals = ast.quals_of(id);
    if !quals.is_empty() {
        out.push_str(&pad);
        out.push_str("  qualifiers: ");
        let parts: Vec<String> = quals.iter().map(|&q| qualifier_summary(ast, q)).collect();
        out.push_str(&parts.join(", "));
        out.push('\n');
    }

    for child in ast.children(id) {
        if matches!(ast.node(child).kind, NodeKind::Qualifier(_)) {
            continue;
        }
        dump_node(ast, sources, child, indent + 1, out);
    }
}

fn docs_of(kind: &NodeKind) -> Option<&str> {
    match kind {
        NodeKind::Namespace { docs, .. }
        | NodeKind::Vendor { docs, .. }
        | NodeKind::Profile { docs, .. }
        | NodeKind::Message { docs, .. }
        | NodeKind::StatusCode { docs, .. }
        | NodeKind::TypeDef { docs, .. }
        | NodeKind::StructureField { docs, .. }
        | NodeKind::ChoiceAlternate { docs, .. }
        | NodeKind::IntegerEnumValue { docs, .. } => docs.as_deref(),
        _ => None,
    }
}

fn qualifier_summary(ast: &Ast, qual: NodeId) -> String {
    let NodeKind::Qualifier(kind) = &ast.node(qual).kind else {
        return String::new();
    };
    match kind {
        QualifierKind::Extensible => "extensible".to_string(),
        QualifierKind::Optional => "optional".to_string(),
        QualifierKind::Private => "private".to_string(),
        QualifierKind::Invariant => "invariant".to_string(),
        QualifierKind::Nullable => "nullable".to_string(),
        QualifierKind::Order(OrderKind::TagOrder) => "tag-order".to_string(),
        QualifierKind::Order(OrderKind::SchemaOrder) => "schema-order".to_string(),
        QualifierKind::Order(OrderKind::AnyOrder) => "any-order".to_string(),
        QualifierKind::Range(RangeBody::Width(w)) => format!("range {w}bit"),
        QualifierKind::Range(RangeBody::Explicit { lower, upper }) => format!(
            "range {}..{}",
            lower.map(numeric_str).unwrap_or_else(|| "-inf".to_string()),
            upper.map(numeric_str).unwrap_or_else(|| "+inf".to_string()),
        ),
        QualifierKind::Length { lower, upper } => match upper {
            Some(upper) => format!("length {lower}..{upper}"),
            None => format!("length {lower}.."),
        },
        QualifierKind::Tag(body) => format!("tag {}", tag_body_str(body)),
        QualifierKind::Id { id_num, vendor } => match vendor {
            None => format!("id {id_num}"),
            Some(VendorSlot::Name(name)) => format!("id {name}:{id_num}"),
            Some(VendorSlot::Number(n)) => format!("id 0x{n:X}:{id_num}"),
        },
    }
}

fn numeric_str(n: NumericLiteral) -> String {
    match n {
        NumericLiteral::Integer(i) => i.to_string(),
        NumericLiteral::Decimal(d) => d.to_string(),
    }
}

fn tag_body_str(body: &TagBody) -> String {
    match body {
        TagBody::Anonymous => "anonymous".to_string(),
        TagBody::ContextSpecific { tag_num } => format!("context-specific {tag_num}"),
        TagBody::ProfileSpecific { profile, tag_num } => {
            let profile = match profile {
                ProfileSlot::Name(name) => name.clone(),
                ProfileSlot::CurrentProfile => "*".to_string(),
                ProfileSlot::Number(n) => n.to_string(),
            };
            format!("profile-specific {profile}:{tag_num}")
        }
    }
}

fn bound_str(bound: Bound) -> String {
    match bound {
        Bound::Finite(n) => n.to_string(),
        Bound::Infinite => "inf".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".tlv").tempfile().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn dump_includes_bootstrap_and_loaded_file() {
        let file = write_temp("acme => VENDOR [ id 9 ]\n");
        let args = DumpArgs {
            files: vec![file.path().to_path_buf()],
        };
        let output = run(&args).unwrap();
        assert!(output.contains("<built-in>"));
        assert!(output.contains("VENDOR definition: acme"));
        assert!(output.contains("qualifiers: id 9"));
    }

    #[test]
    fn dump_renders_source_position() {
        let file = write_temp("acme => VENDOR [ id 9 ]\n");
        let args = DumpArgs {
            files: vec![file.path().to_path_buf()],
        };
        let output = run(&args).unwrap();
        assert!(output.contains(&format!("{}:1:1", file.path().display())));
    }

    #[test]
    fn dump_renders_doc_comments() {
        let file = write_temp("/// a widget id\nWidgetId => UNSIGNED INTEGER\n");
        let args = DumpArgs {
            files: vec![file.path().to_path_buf()],
        };
        let output = run(&args).unwrap();
        assert!(output.contains("doc: a widget id"));
    }

    #[test]
    fn dump_renders_pattern_element_quantifiers() {
        let file = write_temp("thing => LIST { item : INTEGER *, flag : BOOLEAN ? }\n");
        let args = DumpArgs {
            files: vec![file.path().to_path_buf()],
        };
        let output = run(&args).unwrap();
        assert!(output.contains("quantifier: 0..inf"));
        assert!(output.contains("quantifier: 0..1"));
    }

    #[test]
    fn dump_names_anonymous_pattern_elements_and_choice_alternates_positionally() {
        let file = write_temp(
            "thing => LIST { INTEGER *, BOOLEAN ? }\nv => CHOICE OF { INTEGER, STRING }\n",
        );
        let args = DumpArgs {
            files: vec![file.path().to_path_buf()],
        };
        let output = run(&args).unwrap();
        assert!(output.contains("linear type pattern element: element-1"));
        assert!(output.contains("linear type pattern element: element-2"));
        assert!(output.contains("CHOICE alternate: alternate-1"));
        assert!(output.contains("CHOICE alternate: alternate-2"));
    }

    #[test]
    fn dump_reports_parse_errors_without_panicking() {
        let file = write_temp("acme => VENDOR [ @@ ]\n");
        let args = DumpArgs {
            files: vec![file.path().to_path_buf()],
        };
        let output = run(&args).unwrap();
        assert!(output.contains("ERROR"));
    }
}
