//! Recursive-descent parser (component D)
//!
//! Drives [`Lexer::peek_token`]/[`eat_token`] against the xmq grammar,
//! invoking an [`Actions`] implementation rather than building a tree
//! directly — a phase-driven recursive descent feeding a builder
//! interface.

pub mod actions;
pub mod error;

pub use actions::{Actions, AttributeValue, CompoundFragment};
pub use error::{ErrorKind, LocationHints, ParseError};

use crate::lexer::{Lexer, Token, TokenKind};
use crate::log::LogContext;
use crate::names;

pub struct Parser<'a> {
    full_source: &'a [u8],
    lexer: Lexer<'a>,
    hints: LocationHints,
    log: LogContext,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Parser {
            full_source: src,
            lexer: Lexer::new(src),
            hints: LocationHints::default(),
            log: LogContext::default(),
        }
    }

    /// Attach a [`LogContext`] the parser consults for trace/error
    /// diagnostics as it runs, per design note 9 ("promote to a context
    /// object threaded through parse/print calls").
    pub fn with_log(mut self, log: LogContext) -> Self {
        self.log = log;
        self
    }

    /// Parse the whole source into `actions`, starting from its root
    /// handle. If the source has more than one top-level element and
    /// `implicit_root_name` is `Some`, the parser wraps them in a
    /// synthetic root element of that name.
    pub fn parse<A: Actions>(
        &mut self,
        actions: &mut A,
        implicit_root_name: Option<&str>,
    ) -> Result<(), ParseError> {
        self.log.trace("parser", format_args!("starting parse of {} bytes", self.full_source.len()));
        let root = actions.root();
        let result = if let Some(name) = implicit_root_name {
            if self.counts_more_than_one_top_level_element()? {
                let wrapper = actions.append_element(root, name);
                self.parse_xmq(wrapper, actions)
            } else {
                self.parse_xmq(root, actions)
            }
        } else {
            self.parse_xmq(root, actions)
        };
        if let Err(e) = &result {
            self.log.error("parser", format_args!("{e}"));
        }
        result
    }

    /// Look-ahead used only to decide whether `implicit_root_name` applies
    /// — it's used iff the source has more than one top-level element.
    /// Re-lexing from scratch keeps the main parse simple; XMQ documents
    /// are small in-memory buffers, so this is cheap.
    fn counts_more_than_one_top_level_element(&self) -> Result<bool, ParseError> {
        let mut probe = Lexer::new(self.full_source);
        let mut hints = LocationHints::default();
        let mut depth = 0i32;
        let mut top_level_elements = 0;
        loop {
            match probe.peek_token() {
                TokenKind::None => break,
                TokenKind::BraceClose if depth == 0 => break,
                TokenKind::BraceOpen => {
                    probe.eat_token(&mut hints)?;
                    depth += 1;
                }
                TokenKind::BraceClose => {
                    probe.eat_token(&mut hints)?;
                    depth -= 1;
                }
                TokenKind::ParenOpen => {
                    probe.eat_token(&mut hints)?;
                    let mut paren_depth = 1;
                    while paren_depth > 0 {
                        match probe.eat_token(&mut hints)? {
                            Token::ParenOpen => paren_depth += 1,
                            Token::ParenClose => paren_depth -= 1,
                            Token::None => break,
                            _ => {}
                        }
                    }
                }
                TokenKind::Text if depth == 0 => {
                    probe.eat_token(&mut hints)?;
                    top_level_elements += 1;
                }
                _ => {
                    probe.eat_token(&mut hints)?;
                }
            }
        }
        Ok(top_level_elements > 1)
    }

    fn err(&self, kind: ErrorKind, near: impl Into<String>) -> ParseError {
        ParseError::new(self.lexer.position(), kind, near).with_hints(self.hints.clone())
    }

    fn parse_xmq<A: Actions>(&mut self, parent: A::Handle, actions: &mut A) -> Result<(), ParseError> {
        loop {
            match self.lexer.peek_token() {
                TokenKind::None | TokenKind::BraceClose => return Ok(()),
                TokenKind::Comment => {
                    if let Token::Comment(text, single_line) = self.lexer.eat_token(&mut self.hints)? {
                        actions.append_comment(parent, &text, single_line);
                    }
                }
                TokenKind::Quote => {
                    if let Token::Quote(text) = self.lexer.eat_token(&mut self.hints)? {
                        actions.append_data(parent, &text);
                    }
                }
                TokenKind::Text => {
                    self.parse_node(parent, actions)?;
                }
                _ => {
                    return Err(self.err(ErrorKind::InvalidChar, "unexpected token"));
                }
            }
        }
    }

    fn parse_node<A: Actions>(&mut self, parent: A::Handle, actions: &mut A) -> Result<(), ParseError> {
        let name = match self.lexer.eat_token(&mut self.hints)? {
            Token::Text(s) => s,
            _ => return Err(self.err(ErrorKind::InvalidChar, "expected a name")),
        };
        if !names::is_valid_name(&name) || names::split_namespace(&name).is_none() {
            return Err(self.err(ErrorKind::InvalidChar, name));
        }
        self.log.trace("parser", format_args!("element {name}"));

        let node = actions.append_element(parent, &name);

        if self.lexer.peek_token() == TokenKind::ParenOpen {
            self.parse_attributes(node, actions)?;
        }

        match self.lexer.peek_token() {
            TokenKind::Equals => {
                self.lexer.eat_token(&mut self.hints)?;
                self.parse_value_into_children(node, actions)?;
            }
            TokenKind::BraceOpen => {
                self.lexer.eat_token(&mut self.hints)?;
                self.parse_xmq(node, actions)?;
                match self.lexer.eat_token(&mut self.hints)? {
                    Token::BraceClose => {}
                    Token::None => return Err(self.err(ErrorKind::BodyNotClosed, "<eof>")),
                    _ => return Err(self.err(ErrorKind::BodyNotClosed, "unexpected token")),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn parse_attributes<A: Actions>(&mut self, node: A::Handle, actions: &mut A) -> Result<(), ParseError> {
        self.lexer.eat_token(&mut self.hints)?; // '('
        loop {
            match self.lexer.peek_token() {
                TokenKind::ParenClose => {
                    self.lexer.eat_token(&mut self.hints)?;
                    return Ok(());
                }
                TokenKind::None => return Err(self.err(ErrorKind::AttributesNotClosed, "<eof>")),
                TokenKind::Text => {
                    let key = match self.lexer.eat_token(&mut self.hints)? {
                        Token::Text(s) => s,
                        _ => unreachable!(),
                    };
                    if !names::is_valid_name(&key) || names::split_namespace(&key).is_none() {
                        return Err(self.err(ErrorKind::InvalidChar, key));
                    }
                    let value = if self.lexer.peek_token() == TokenKind::Equals {
                        self.lexer.eat_token(&mut self.hints)?;
                        self.parse_value()?
                    } else {
                        AttributeValue::Absent
                    };
                    actions.append_attribute(node, &key, value);
                }
                _ => return Err(self.err(ErrorKind::InvalidChar, "unexpected token in attributes")),
            }
        }
    }

    /// `value := text | quote | compound`, used for attribute values. A
    /// bare `&name;` outside a compound is not one of the grammar's three
    /// alternatives, but the lexer still commits to reading it as soon as
    /// it sees `&` (so a malformed one reports `EntityNotClosed` rather
    /// than `ExpectedContentAfterEquals`); a well-formed one is accepted as
    /// an `AttributeValue::Entity`, the counterpart to `Node::Entity` being
    /// a tree node kind on equal footing with `Text`.
    fn parse_value(&mut self) -> Result<AttributeValue, ParseError> {
        match self.lexer.peek_token() {
            TokenKind::Quote => match self.lexer.eat_token(&mut self.hints)? {
                Token::Quote(s) => Ok(AttributeValue::Text(s)),
                _ => unreachable!(),
            },
            TokenKind::Text => match self.lexer.eat_token(&mut self.hints)? {
                Token::Text(s) => Ok(AttributeValue::Text(s)),
                _ => unreachable!(),
            },
            TokenKind::Entity => match self.lexer.eat_token(&mut self.hints)? {
                Token::Entity(e) => Ok(AttributeValue::Entity(e)),
                _ => unreachable!(),
            },
            TokenKind::ParenOpen => {
                let fragments = self.parse_compound_fragments()?;
                Ok(AttributeValue::Compound(fragments))
            }
            _ => Err(self.err(ErrorKind::ExpectedContentAfterEquals, "expected a value")),
        }
    }

    /// Same grammar, but for a node's own `= value` content: quoted/plain
    /// text becomes a single data child; a compound expands into one child
    /// per fragment, since `Compound` is not itself a tree node kind — it
    /// only exists as an attribute-value shape.
    fn parse_value_into_children<A: Actions>(
        &mut self,
        node: A::Handle,
        actions: &mut A,
    ) -> Result<(), ParseError> {
        match self.lexer.peek_token() {
            TokenKind::Quote => {
                if let Token::Quote(s) = self.lexer.eat_token(&mut self.hints)? {
                    actions.append_data(node, &s);
                }
                Ok(())
            }
            TokenKind::Text => {
                if let Token::Text(s) = self.lexer.eat_token(&mut self.hints)? {
                    actions.append_data(node, &s);
                }
                Ok(())
            }
            TokenKind::Entity => {
                if let Token::Entity(e) = self.lexer.eat_token(&mut self.hints)? {
                    actions.append_entity(node, &e);
                }
                Ok(())
            }
            TokenKind::ParenOpen => {
                for fragment in self.parse_compound_fragments()? {
                    match fragment {
                        CompoundFragment::Text(t) => actions.append_data(node, &t),
                        CompoundFragment::Entity(e) => actions.append_entity(node, &e),
                    }
                }
                Ok(())
            }
            _ => Err(self.err(ErrorKind::ExpectedContentAfterEquals, "expected a value")),
        }
    }

    /// `compound := '(' (quote | entity)* ')'`.
    fn parse_compound_fragments(&mut self) -> Result<Vec<CompoundFragment>, ParseError> {
        self.lexer.eat_token(&mut self.hints)?; // '('
        let mut fragments = Vec::new();
        loop {
            match self.lexer.peek_token() {
                TokenKind::ParenClose => {
                    self.lexer.eat_token(&mut self.hints)?;
                    return Ok(fragments);
                }
                TokenKind::None => return Err(self.err(ErrorKind::CompoundNotClosed, "<eof>")),
                TokenKind::Quote => {
                    if let Token::Quote(s) = self.lexer.eat_token(&mut self.hints)? {
                        fragments.push(CompoundFragment::Text(s));
                    }
                }
                TokenKind::Entity => {
                    if let Token::Entity(e) = self.lexer.eat_token(&mut self.hints)? {
                        fragments.push(CompoundFragment::Entity(e));
                    }
                }
                // Bare text inside a compound is not part of the grammar:
                // a compound may contain only quoted runs and entities.
                _ => return Err(self.err(ErrorKind::CompoundMayNotContain, "unexpected token")),
            }
        }
    }
}
