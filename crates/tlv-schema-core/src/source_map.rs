//! Records each schema source and converts positions into human-readable
//! locations with a caret underline of the offending line.

use std::fmt;

/// Identifies one loaded schema source within a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// A single position within a source: 1-based line/column plus the byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// A start/end position pair within one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width span at the given position, used when a node has no
    /// natural end (e.g. synthesized namespace nodes from dotted expansion).
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// Identifies a source file and a position/span pair within it, used for
/// diagnostics and the `dump` AST summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub source: SourceId,
    pub span: Span,
}

impl SourceRef {
    pub fn new(source: SourceId, span: Span) -> Self {
        Self { source, span }
    }
}

/// One loaded schema source: a logical name plus its full text.
struct Entry {
    name: String,
    text: String,
    /// Byte offset of the start of each line, `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

fn compute_line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

/// Owns every schema source loaded into a collection and renders
/// human-readable locations for diagnostics.
#[derive(Default)]
pub struct SourceMap {
    entries: Vec<Entry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source and returns its [`SourceId`].
    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> SourceId {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        self.entries.push(Entry {
            name: name.into(),
            text,
            line_starts,
        });
        SourceId((self.entries.len() - 1) as u32)
    }

    pub fn name(&self, id: SourceId) -> &str {
        &self.entries[id.0 as usize].name
    }

    pub fn text(&self, id: SourceId) -> &str {
        &self.entries[id.0 as usize].text
    }

    /// Converts a byte offset into a 1-based line/column [`Position`].
    pub fn position_at(&self, id: SourceId, offset: u32) -> Position {
        let entry = &self.entries[id.0 as usize];
        let line_idx = match entry.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = entry.line_starts[line_idx];
        let column = offset.saturating_sub(line_start);
        Position::new((line_idx + 1) as u32, column + 1, offset)
    }

    /// `<source>:<line>:<col>` for diagnostics.
    pub fn file_pos_str(&self, r: SourceRef) -> String {
        format!(
            "{}:{}:{}",
            self.name(r.source),
            r.span.start.line,
            r.span.start.column
        )
    }

    /// The offending source line plus a caret underline starting at the span's start column.
    pub fn line_summary_str(&self, r: SourceRef) -> String {
        let entry = &self.entries[r.source.0 as usize];
        let text = &entry.text;
        let start_offset = r.span.start.offset as usize;
        let line_start = text[..start_offset.min(text.len())]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let line_end = text[start_offset.min(text.len())..]
            .find('\n')
            .map(|i| i + start_offset)
            .unwrap_or(text.len());
        let line = &text[line_start..line_end];
        let indent_len = start_offset.saturating_sub(line_start);
        let indent: String = line
            .chars()
            .take(indent_len)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        format!("{line}\n{indent}^")
    }
}

impl fmt::Debug for SourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceMap")
            .field("files", &self.entries.iter().map(|e| &e.name).collect::<Vec<_>>())
            .finish()
    }
}
