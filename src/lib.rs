//! `xmq` — a bidirectional converter and toolkit for XMQ, a textual
//! tree-serialization language isomorphic to a subset of XML/HTML/JSON.
//!
//! This crate implements the lexical/syntactic core: the tokenizer, the
//! quote-balancing and incidental-indentation algorithm, the recursive
//! descent parser, the in-memory tree model, and the pretty-printer. Color
//! theming and the XML/HTML/JSON/IXML adapters are thin layers on top of
//! this core; the CFG/Earley engine for IXML grammars and the libxml2 DOM
//! bridge are external collaborators and are not part of this crate.

pub mod cli;
pub mod cursor;
pub mod document;
pub mod error;
pub mod lexer;
pub mod linebuilder;
pub mod log;
pub mod names;
pub mod parser;
pub mod printer;
pub mod quote;
pub mod theme;
pub mod tree;

pub use document::Document;
pub use error::XmqError;
pub use linebuilder::{line_printf, Arg, LineConfig};
pub use parser::{Actions, ParseError, Parser};
pub use printer::{PrintSettings, Printer, RenderTarget};
pub use tree::{Node, TreeActions};
