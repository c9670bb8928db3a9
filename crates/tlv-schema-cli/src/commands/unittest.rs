use tlv_schema_core::SchemaCollection;

use crate::cli::UnittestArgs;
use crate::error::CliError;

/// Runs `unittest`: the embedded scenario checks from spec §8, each
/// exercising one invariant of the compiler end to end (parse, resolve,
/// validate, query) against a small inline schema. Unlike `validate`/`dump`,
/// these scenarios carry their own schema text — there is nothing to load
/// from disk.
pub fn run(args: &UnittestArgs) -> Result<i32, CliError> {
    let all = scenarios();
    let selected: Vec<&(&str, fn() -> Result<(), String>)> = if args.names.is_empty() {
        all.iter().collect()
    } else {
        let unknown: Vec<String> = args
            .names
            .iter()
            .filter(|n| !all.iter().any(|(name, _)| name == n.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(CliError::UnknownScenarios(unknown));
        }
        all.iter().filter(|(name, _)| args.names.iter().any(|n| n == name)).collect()
    };

    let mut failures = 0;
    for (name, scenario) in &selected {
        match scenario() {
            Ok(()) => {
                if args.verbosity > 0 {
                    println!("ok   {name}");
                }
            }
            Err(message) => {
                failures += 1;
                println!("FAIL {name}: {message}");
            }
        }
    }
    if args.verbosity > 0 || failures > 0 {
        println!("{} passed, {} failed", selected.len() - failures, failures);
    }
    Ok(failures as i32)
}

fn scenarios() -> Vec<(&'static str, fn() -> Result<(), String>)> {
    vec![
        ("e1_happy_path_structure", e1_happy_path_structure),
        ("e2_duplicate_field_via_includes", e2_duplicate_field_via_includes),
        ("e3_profile_id_composition", e3_profile_id_composition),
        ("e4_choice_possible_tags_sentinel", e4_choice_possible_tags_sentinel),
        ("e5_circular_reference", e5_circular_reference),
        ("e6_enum_value_out_of_range", e6_enum_value_out_of_range),
    ]
}

fn load(text: &str) -> Result<SchemaCollection, String> {
    let mut collection = SchemaCollection::new();
    tlv_schema_dsl::load_into(&mut collection, "scenario.tlv", text)
        .map_err(|err| err.format(collection.sources()))?;
    Ok(collection)
}

fn e1_happy_path_structure() -> Result<(), String> {
    let mut collection = load(
        "temperature-sample => STRUCTURE\n{\n  temperature [1] : FLOAT,\n  timestamp   [2] : UNSIGNED INTEGER\n}\n",
    )?;
    let diagnostics = collection.validate();
    if !diagnostics.is_empty() {
        return Err(format!("expected zero diagnostics, got {}", diagnostics.len()));
    }
    let type_def = collection
        .get_type_def("temperature-sample")
        .ok_or("temperature-sample not found by query API")?;
    let fields = type_def.fields().ok_or("expected a structure with fields")?;
    if fields.get_field("temperature").is_none() {
        return Err("field 'temperature' missing from structure".to_string());
    }
    Ok(())
}

fn e2_duplicate_field_via_includes() -> Result<(), String> {
    let mut collection = load(
        "fg => FIELD GROUP { f1 [0]: INTEGER, f2 [1]: INTEGER, f1 [2]: STRING }\ns => STRUCTURE { includes fg }\n",
    )?;
    let diagnostics = collection.validate();
    if diagnostics.len() != 1 {
        return Err(format!("expected exactly one diagnostic, got {}", diagnostics.len()));
    }
    Ok(())
}

fn e3_profile_id_composition() -> Result<(), String> {
    let mut collection = load("acme => VENDOR [ id 7 ]\np => PROFILE [ id acme:3 ]\n")?;
    collection.validate();
    let profile = collection.get_profile("p").ok_or("profile 'p' not found by query API")?;
    let numeric_id = profile.numeric_id().ok_or("profile has no resolvable numeric id")?;
    let expected = (7i64 << 16) | 3;
    if numeric_id != expected {
        return Err(format!("expected profile id {expected:#x}, got {numeric_id:#x}"));
    }
    Ok(())
}

fn e4_choice_possible_tags_sentinel() -> Result<(), String> {
    let mut collection = load("reading => CHOICE OF { temperature: FLOAT, status: STRING }\n")?;
    let diagnostics = collection.validate();
    if !diagnostics.is_empty() {
        return Err(format!("expected zero diagnostics, got {}", diagnostics.len()));
    }
    let type_def = collection.get_type_def("reading").ok_or("reading not found by query API")?;
    let choice = type_def.choice().ok_or("expected a CHOICE type")?;
    let tags = choice.possible_tags();
    if tags.len() != 2 || !tags.iter().all(Option::is_none) {
        return Err(format!("expected two untagged (sentinel) alternates, got {tags:?}"));
    }
    Ok(())
}

fn e5_circular_reference() -> Result<(), String> {
    let mut collection = load("a => b\nb => c\nc => a\n")?;
    let diagnostics = collection.validate();
    if diagnostics.len() != 3 {
        return Err(format!("expected three diagnostics (one per cycle member), got {}", diagnostics.len()));
    }
    Ok(())
}

fn e6_enum_value_out_of_range() -> Result<(), String> {
    let mut collection = load("status => UNSIGNED INTEGER [ range 8bit ] { ok = 0, bad = 300 }\n")?;
    let diagnostics = collection.validate();
    if diagnostics.len() != 1 {
        return Err(format!("expected exactly one diagnostic, got {}", diagnostics.len()));
    }
    Ok(())
}
