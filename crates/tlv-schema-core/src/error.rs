use std::fmt;

use crate::source_map::{SourceMap, SourceRef};

/// Errors raised while turning source text into a parse-event tree or while
/// adapting a parse-event tree into the AST. Semantic problems (missing
/// references, qualifier misuse, bound violations, ...) are never raised
/// here — they are accumulated as [`crate::diagnostic::Diagnostic`]s by the
/// validator instead (see spec §7 "Error Handling Design").
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The tokenizer found a byte sequence it could not classify.
    UnexpectedToken { found: String, source_ref: SourceRef },
    /// The parser expected one of a set of productions and found something else.
    UnexpectedEof { expected: String },
    /// A statement or qualifier keyword was recognized but used where the
    /// grammar does not allow it (e.g. a qualifier list with no body).
    MalformedConstruct {
        message: String,
        source_ref: SourceRef,
    },
    /// A numeric literal did not fit the type the grammar position requires.
    NumberOutOfRange {
        text: String,
        source_ref: SourceRef,
    },
}

impl ParseError {
    pub fn source_ref(&self) -> Option<SourceRef> {
        match self {
            ParseError::UnexpectedToken { source_ref, .. }
            | ParseError::MalformedConstruct { source_ref, .. }
            | ParseError::NumberOutOfRange { source_ref, .. } => Some(*source_ref),
            ParseError::UnexpectedEof { .. } => None,
        }
    }

    /// Renders the error the same way a [`crate::diagnostic::Diagnostic`] is
    /// rendered, so parse failures and validation failures look the same on
    /// the command line.
    pub fn format(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        if let Some(r) = self.source_ref() {
            out.push_str(&sources.file_pos_str(r));
            out.push_str(": ");
        }
        out.push_str("ERROR: ");
        out.push_str(&self.to_string());
        if let Some(r) = self.source_ref() {
            out.push_str("\n\n");
            out.push_str(&sources.line_summary_str(r));
        }
        out
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, .. } => {
                write!(f, "unexpected token '{found}'")
            }
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            Self::MalformedConstruct { message, .. } => write!(f, "{message}"),
            Self::NumberOutOfRange { text, .. } => {
                write!(f, "numeric literal '{text}' is out of range")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_map::Span;

    #[test]
    fn error_display_messages() {
        let mut sm = SourceMap::new();
        let id = sm.add("a.tlv", "@@\n");
        let pos = sm.position_at(id, 0);
        let source_ref = SourceRef::new(id, Span::point(pos));

        let cases = vec![
            (
                ParseError::UnexpectedToken {
                    found: "@@".into(),
                    source_ref,
                },
                "unexpected token '@@'",
            ),
            (
                ParseError::UnexpectedEof {
                    expected: "a type name".into(),
                },
                "unexpected end of input, expected a type name",
            ),
            (
                ParseError::NumberOutOfRange {
                    text: "99999999999999999999".into(),
                    source_ref,
                },
                "numeric literal '99999999999999999999' is out of range",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn format_includes_location_and_caret() {
        let mut sm = SourceMap::new();
        let id = sm.add("a.tlv", "VENDOR foo [ bogus 1 ]\n");
        let pos = sm.position_at(id, 13);
        let source_ref = SourceRef::new(id, Span::point(pos));
        let err = ParseError::MalformedConstruct {
            message: "unknown qualifier 'bogus'".into(),
            source_ref,
        };
        let formatted = err.format(&sm);
        assert!(formatted.starts_with("a.tlv:1:14: ERROR: unknown qualifier 'bogus'"));
        assert!(formatted.ends_with('^'));
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ParseError::UnexpectedEof {
            expected: "'}'".into(),
        });
        assert!(err.to_string().contains("unexpected end of input"));
    }
}
