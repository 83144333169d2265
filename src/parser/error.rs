//! Parser error types
//!
//! A closed taxonomy, each error carrying a
//! `(line, column, kind, near)` plus up to five location hints the parser
//! accumulates as it goes, so a single short propagation path (`?`) is
//! enough to produce a high-quality diagnostic at the top. A plain `enum`
//! with a hand-written `Display`, no `thiserror`.

use crate::cursor::Position;

/// The closed set of parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    QuoteNotClosed,
    QuoteClosedWithTooManyQuotes,
    CommentNotClosed,
    CommentClosedWithTooManySlashes,
    AttributesNotClosed,
    BodyNotClosed,
    CompoundNotClosed,
    CompoundMayNotContain,
    EntityNotClosed,
    UnexpectedTab,
    ExpectedContentAfterEquals,
    InvalidChar,
}

impl ErrorKind {
    fn description(self) -> &'static str {
        match self {
            ErrorKind::QuoteNotClosed => "quote not closed",
            ErrorKind::QuoteClosedWithTooManyQuotes => "quote closed with too many quotes",
            ErrorKind::CommentNotClosed => "comment not closed",
            ErrorKind::CommentClosedWithTooManySlashes => "comment closed with too many slashes",
            ErrorKind::AttributesNotClosed => "attributes not closed",
            ErrorKind::BodyNotClosed => "body not closed",
            ErrorKind::CompoundNotClosed => "compound not closed",
            ErrorKind::CompoundMayNotContain => "compound may only contain quotes and entities",
            ErrorKind::EntityNotClosed => "entity not closed",
            ErrorKind::UnexpectedTab => "unexpected tab",
            ErrorKind::ExpectedContentAfterEquals => "expected content after '='",
            ErrorKind::InvalidChar => "invalid character",
        }
    }
}

/// Location hints accumulated while parsing, surfaced in the rendered
/// diagnostic when relevant.
#[derive(Debug, Clone, Default)]
pub struct LocationHints {
    pub last_brace_open: Option<Position>,
    pub last_attr_paren_open: Option<Position>,
    pub last_equals: Option<Position>,
    pub last_quote_start: Option<Position>,
    /// A quote closed at exactly the right depth but immediately followed
    /// by more `'` — likely meant as a deeper quote. Tracked separately
    /// from `last_quote_start`.
    pub last_suspicious_quote_end: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub position: Position,
    pub kind: ErrorKind,
    /// A short excerpt of source near the error, for the caret diagnostic.
    pub near: String,
    pub hints: LocationHints,
}

impl ParseError {
    pub fn new(position: Position, kind: ErrorKind, near: impl Into<String>) -> Self {
        ParseError { position, kind, near: near.into(), hints: LocationHints::default() }
    }

    pub fn with_hints(mut self, hints: LocationHints) -> Self {
        self.hints = hints;
        self
    }

    /// Render a caret diagnostic: source line, caret at the offending
    /// column, and an optional hint.
    pub fn render(&self, source_line: &str) -> String {
        let mut out = format!(
            "{}:{}: error: {}\n{}\n{}^\n",
            self.position.line,
            self.position.col,
            self.kind.description(),
            source_line,
            " ".repeat(self.position.col.saturating_sub(1)),
        );
        if let Some(hint) = self.hint() {
            out.push_str(&hint);
            out.push('\n');
        }
        out
    }

    fn hint(&self) -> Option<String> {
        match self.kind {
            ErrorKind::QuoteNotClosed | ErrorKind::QuoteClosedWithTooManyQuotes => {
                self.hints.last_suspicious_quote_end.or(self.hints.last_quote_start).map(|p| {
                    format!(
                        "hint: the quote opened at line {} column {} may need more single-quotes",
                        p.line, p.col
                    )
                })
            }
            ErrorKind::AttributesNotClosed => self
                .hints
                .last_attr_paren_open
                .map(|p| format!("hint: attributes opened at line {} column {} are not closed", p.line, p.col)),
            ErrorKind::BodyNotClosed => self
                .hints
                .last_brace_open
                .map(|p| format!("hint: body opened at line {} column {} is not closed", p.line, p.col)),
            ErrorKind::ExpectedContentAfterEquals => self
                .hints
                .last_equals
                .map(|p| format!("hint: '=' at line {} column {} expects a value", p.line, p.col)),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.line,
            self.position.col,
            self.kind.description()
        )
    }
}

impl std::error::Error for ParseError {}
