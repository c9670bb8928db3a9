//! Plain-data diagnostics accumulated by the validator, and the parse-level
//! error raised from `load_*`.

use std::fmt;

use crate::source_map::{SourceMap, SourceRef};

/// A single semantic error found during validation.
///
/// Diagnostics are plain data; the validator never raises exceptions across
/// the validation boundary (see spec §9 "Design Notes").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub detail: Option<String>,
    pub source_ref: Option<SourceRef>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            source_ref: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source_ref(mut self, source_ref: SourceRef) -> Self {
        self.source_ref = Some(source_ref);
        self
    }

    /// Renders the diagnostic per spec §6.2:
    ///
    /// ```text
    /// <source>:<line>:<col>: ERROR: <message>
    /// NOTE: <detail>
    ///
    /// <line>
    ///       ^
    /// ```
    pub fn format(&self, sources: &SourceMap, with_detail: bool) -> String {
        let mut out = String::new();
        if let Some(r) = self.source_ref {
            out.push_str(&sources.file_pos_str(r));
            out.push_str(": ");
        }
        out.push_str("ERROR: ");
        out.push_str(&self.message);
        if with_detail {
            if let Some(detail) = &self.detail {
                out.push_str("\nNOTE: ");
                out.push_str(detail);
            }
        }
        if let Some(r) = self.source_ref {
            out.push_str("\n\n");
            out.push_str(&sources.line_summary_str(r));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_map::{Position, Span};

    #[test]
    fn format_with_source_and_detail() {
        let mut sm = SourceMap::new();
        let id = sm.add("a.tlv", "f1 [0]: INTEGER\n");
        let pos = sm.position_at(id, 0);
        let r = SourceRef::new(id, Span::point(pos));
        let d = Diagnostic::new("duplicate field in FIELD GROUP type: f1")
            .with_detail("fields within a FIELD GROUP must have unique names")
            .with_source_ref(r);
        let formatted = d.format(&sm, true);
        assert!(formatted.starts_with("a.tlv:1:1: ERROR: duplicate field"));
        assert!(formatted.contains("NOTE: fields within"));
        assert!(formatted.ends_with("^"));
    }

    #[test]
    fn format_suppresses_detail_when_requested() {
        let mut sm = SourceMap::new();
        let id = sm.add("a.tlv", "x\n");
        let pos = sm.position_at(id, 0);
        let r = SourceRef::new(id, Span::point(pos));
        let d = Diagnostic::new("msg").with_detail("detail").with_source_ref(r);
        assert!(!d.format(&sm, false).contains("NOTE:"));
    }

    #[test]
    fn format_without_source_ref() {
        let sm = SourceMap::new();
        let d = Diagnostic::new("no location");
        assert_eq!(d.format(&sm, true), "ERROR: no location");
    }
}
