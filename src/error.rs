//! Crate-wide error type
//!
//! Wraps the narrower [`ParseError`] plus the I/O and config failures that
//! only show up once parsing is wired to files and custom themes. Same
//! hand-written `Display`/`std::error::Error` shape as `ParseError` — no
//! `thiserror`.

use std::fmt;

use crate::parser::ParseError;

#[derive(Debug)]
pub enum XmqError {
    Parse(ParseError),
    Io { path: String, source: std::io::Error },
    ThemeIo { path: String, source: std::io::Error },
    ThemeParse { path: String, source: serde_json::Error },
}

impl fmt::Display for XmqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmqError::Parse(e) => write!(f, "{e}"),
            XmqError::Io { path, source } => write!(f, "{path}: {source}"),
            XmqError::ThemeIo { path, source } => write!(f, "theme {path}: {source}"),
            XmqError::ThemeParse { path, source } => write!(f, "theme {path}: {source}"),
        }
    }
}

impl std::error::Error for XmqError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XmqError::Parse(e) => Some(e),
            XmqError::Io { source, .. } => Some(source),
            XmqError::ThemeIo { source, .. } => Some(source),
            XmqError::ThemeParse { source, .. } => Some(source),
        }
    }
}

impl From<ParseError> for XmqError {
    fn from(e: ParseError) -> Self {
        XmqError::Parse(e)
    }
}
