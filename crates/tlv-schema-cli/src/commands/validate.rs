use std::collections::HashSet;
use std::path::Path;

use tlv_schema_core::SchemaCollection;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Runs `validate`: loads every file into one collection, then runs
/// resolution and the full validator rule suite once over all of them,
/// printing diagnostics to stderr unless `--silent` is set.
///
/// Returns the total diagnostic count (parse errors plus semantic
/// diagnostics); the caller uses it directly as the process exit code
/// (spec §6.4: "exit code equals the number of errors").
pub fn run(args: &ValidateArgs) -> Result<usize, CliError> {
    let mut collection = SchemaCollection::new();
    let mut parse_error_count = 0usize;

    for path in &args.files {
        let text = read_file(path)?;
        let name = path.display().to_string();
        if let Err(err) = tlv_schema_dsl::load_into(&mut collection, &name, &text) {
            parse_error_count += 1;
            if !args.silent {
                eprintln!("{}\n", err.format(collection.sources()));
            }
        }
    }

    let diagnostics = collection.validate().to_vec();
    if !args.silent {
        // spec §6.4: "de-duplicating identical NOTE lines" — the block
        // (location + message + source excerpt) is printed for every
        // diagnostic; the NOTE line is suppressed after its detail text
        // has already been shown once.
        let mut printed_details = HashSet::new();
        for diagnostic in &diagnostics {
            let with_detail = match &diagnostic.detail {
                Some(detail) => printed_details.insert(detail.clone()),
                None => true,
            };
            eprintln!("{}\n", diagnostic.format(collection.sources(), with_detail));
        }
    }

    Ok(parse_error_count + diagnostics.len())
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
