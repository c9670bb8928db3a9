//! Wraps [`Token::lexer`] with byte-offset-to-`Position` tracking, since the
//! parse-event tree the parser builds carries line/column spans directly
//! (spec §1: "the core only consumes a stream of parse events with source
//! positions" — nothing downstream recomputes them).

use logos::Logos;

use tlv_schema_core::error::ParseError;
use tlv_schema_core::source_map::{Position, SourceId, SourceRef, Span};

use crate::token::Token;

/// One lexed token, still borrowing from the source text.
#[derive(Debug, Clone)]
pub struct Lexed<'a> {
    pub token: Token,
    pub text: &'a str,
    pub span: Span,
}

fn line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

fn position_at(starts: &[u32], offset: u32) -> Position {
    let line_idx = match starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    let line_start = starts[line_idx];
    let column = offset.saturating_sub(line_start);
    Position::new((line_idx + 1) as u32, column + 1, offset)
}

/// Tokenizes `text`, attaching a `Span` to every token so the parser never
/// has to touch byte offsets directly. `source_id` only tags the location
/// of a byte sequence logos couldn't classify.
pub fn lex(source_id: SourceId, text: &str) -> Result<Vec<Lexed<'_>>, ParseError> {
    let starts = line_starts(text);
    let mut out = Vec::new();
    let mut lexer = Token::lexer(text);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(position_at(&starts, range.start as u32), position_at(&starts, range.end as u32));
        match result {
            Ok(token) => out.push(Lexed {
                token,
                text: &text[range],
                span,
            }),
            Err(()) => {
                return Err(ParseError::UnexpectedToken {
                    found: text[range].to_string(),
                    source_ref: SourceRef::new(source_id, span),
                })
            }
        }
    }
    Ok(out)
}
