use std::path::PathBuf;

/// Errors the CLI binary itself can raise, distinct from the schema's own
/// `ParseError`/`Diagnostic` data, which the `validate`/`dump` commands
/// render directly rather than wrapping here (spec §7 keeps semantic
/// diagnostics as plain data, never exceptions).
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown scenario name(s): {}", .0.join(", "))]
    UnknownScenarios(Vec<String>),
}

impl CliError {
    /// The process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } => 1,
            CliError::UnknownScenarios(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_exit_code() {
        let err = CliError::Io {
            path: PathBuf::from("missing.tlv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("missing.tlv"));
    }

    #[test]
    fn unknown_scenarios_exit_code() {
        let err = CliError::UnknownScenarios(vec!["bogus".into()]);
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("bogus"));
    }
}
