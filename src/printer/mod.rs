//! The printer (component F)
//!
//! Walks the document tree and renders it back to XMQ source, choosing
//! among the leaf/key-value/key-value-with-attributes/container render
//! forms per node and deferring all quoting decisions to [`crate::quote`].
//! Splits "decide the form" from "render the form" cleanly.

pub mod settings;

pub use settings::{PrintSettings, RenderTarget};

use ego_tree::{NodeRef, Tree};

use crate::lexer::token::is_reserved_char;
use crate::log::LogContext;
use crate::parser::{AttributeValue, CompoundFragment};
use crate::quote::{self, EscapePolicy, QuotePart, QuotePlan};
use crate::theme::{Theme, TokenCategory};
use crate::tree::{Attribute, Node};

pub struct Printer {
    settings: PrintSettings,
    theme: Theme,
    log: LogContext,
}

impl Printer {
    pub fn new(settings: PrintSettings) -> Result<Self, crate::error::XmqError> {
        let theme = crate::theme::resolve_theme(&settings)?;
        Ok(Printer { settings, theme, log: LogContext::default() })
    }

    /// Attach a [`LogContext`] the printer consults for trace diagnostics,
    /// matching [`crate::parser::Parser::with_log`].
    pub fn with_log(mut self, log: LogContext) -> Self {
        self.log = log;
        self
    }

    pub fn print(&self, tree: &Tree<Node>) -> String {
        self.log.trace("printer", format_args!("rendering to {:?}", self.settings.render_to));
        let mut out = String::new();
        self.print_children(&mut out, tree.root(), 0);
        if out.ends_with('\n') {
            out.pop();
        }
        out
    }

    fn newline_indent(&self, out: &mut String, indent: usize) {
        out.push('\n');
        let pad = self.settings.indentation_space.to_string().repeat(indent * self.settings.add_indent);
        if pad.is_empty() {
            return;
        }
        out.push_str(&self.colored(TokenCategory::IndentationWhitespace, &pad));
    }

    fn print_children(&self, out: &mut String, parent: NodeRef<'_, Node>, indent: usize) {
        let children: Vec<_> = parent.children().collect();
        let align_to = self.leaf_alignment_width(&children);

        for (i, child) in children.iter().enumerate() {
            if i > 0 || indent > 0 {
                if !self.settings.compact {
                    self.newline_indent(out, indent);
                } else if i > 0 {
                    out.push(' ');
                }
            }
            self.print_node(out, *child, indent, align_to);
        }
    }

    /// Siblings that are all simple `name = value` leaves get their `=`
    /// columns aligned; returns the padded name width to align to, or
    /// `None` if alignment doesn't apply (compact mode, or not all leaves).
    fn leaf_alignment_width(&self, children: &[NodeRef<'_, Node>]) -> Option<usize> {
        if self.settings.compact || children.len() < 2 {
            return None;
        }
        let mut width = 0usize;
        let mut any = false;
        for child in children {
            match leaf_key_value_prefix_len(*child) {
                Some(n) => {
                    any = true;
                    width = width.max(n);
                }
                None => return None,
            }
        }
        if any {
            Some(width)
        } else {
            None
        }
    }

    fn print_node(&self, out: &mut String, node: NodeRef<'_, Node>, indent: usize, align_to: Option<usize>) {
        match node.value() {
            Node::Root => self.print_children(out, node, indent),
            Node::Comment { text, single_line } => self.print_comment(out, text, *single_line),
            Node::Text(text) => {
                // A `Text` node reached here is always a sibling position in
                // the `(comment | node | quote)*` grammar (an element's own
                // sole-value text is rendered directly by `print_element`
                // instead), where only a quoted literal is legal — never a
                // bare word, regardless of whether it would round-trip
                // unambiguously.
                let col = out.rsplit('\n').next().map(|l| l.chars().count() + 1).unwrap_or(1);
                out.push_str(&self.render_forced_quote(text, col));
            }
            Node::Entity(name) => out.push_str(&self.colored(TokenCategory::ElementValueEntity, &format!("&{name};"))),
            Node::Doctype(text) => out.push_str(&format!("!DOCTYPE = {}", self.render_value(text, false, 1))),
            Node::ProcessingInstruction { target, data } => {
                out.push_str(&format!("?{target} = {}", self.render_value(data, false, 1)));
            }
            Node::Element { name, attributes } => self.print_element(out, node, name, attributes, indent, align_to),
        }
    }

    fn print_comment(&self, out: &mut String, text: &str, single_line: bool) {
        if single_line && !text.contains('\n') {
            out.push_str(&self.colored(TokenCategory::Comment, &format!("// {text}")));
        } else {
            let depth = necessary_comment_depth(text);
            let slashes = "/".repeat(depth);
            let rendered = format!("{slashes}*{text}*{slashes}");
            out.push_str(&self.colored(TokenCategory::Comment, &rendered));
        }
    }

    fn print_element(
        &self,
        out: &mut String,
        node: NodeRef<'_, Node>,
        name: &str,
        attributes: &[Attribute],
        indent: usize,
        align_to: Option<usize>,
    ) {
        let children: Vec<_> = node.children().collect();
        let only_child_kind = sole_content_kind(&children);

        // A name in `name = value` position is its own category
        // (`element-key`) distinct from a bare container tag (`element-name`),
        // per spec §4.G — they're the same anchor in the built-in themes but
        // a custom theme may tell them apart.
        let name_category = if matches!(
            only_child_kind,
            SoleContent::Text(_) | SoleContent::Entity(_) | SoleContent::Compound(_)
        ) {
            TokenCategory::ElementKey
        } else {
            TokenCategory::ElementName
        };
        let name_part = self.namespaced(name, name_category);
        let attrs_part = if attributes.is_empty() { String::new() } else { self.render_attributes(attributes) };

        out.push_str(&name_part);
        out.push_str(&attrs_part);

        match only_child_kind {
            SoleContent::None => {}
            SoleContent::Text(text) => {
                self.push_equals_padded(out, name, attributes, align_to);
                let col = out.rsplit('\n').next().map(|l| l.chars().count() + 1).unwrap_or(1);
                out.push_str(&self.render_value(text, false, col));
            }
            SoleContent::Entity(entity_name) => {
                self.push_equals_padded(out, name, attributes, align_to);
                out.push_str(&self.colored(TokenCategory::ElementValueEntity, &format!("&{entity_name};")));
            }
            SoleContent::Compound(pieces) => {
                // These children are exactly the decomposed fragments of this
                // node's own compound `=` value (only `Text`/`Entity`, no
                // `Element`/`Comment` siblings) — print them back through the
                // compound `( ... )` value syntax rather than `{ }`, or
                // reparsing would scatter them into sibling elements/an
                // invalid bare entity instead of recovering this node's value.
                self.push_equals_padded(out, name, attributes, align_to);
                out.push_str(&self.render_node_compound(&pieces));
            }
            SoleContent::Many => {
                if !self.settings.compact {
                    out.push(' ');
                }
                out.push_str(&self.colored(TokenCategory::BraceOpen, "{"));
                self.print_children(out, node, indent + 1);
                if !self.settings.compact {
                    self.newline_indent(out, indent);
                }
                out.push_str(&self.colored(TokenCategory::BraceClose, "}"));
            }
        }
    }

    fn push_equals_padded(&self, out: &mut String, name: &str, attributes: &[Attribute], align_to: Option<usize>) {
        if self.settings.compact {
            out.push_str(&self.colored(TokenCategory::Equals, "="));
            return;
        }
        if let Some(width) = align_to {
            let used = name.chars().count() + attributes_plain_len(attributes);
            if used < width {
                out.push_str(&" ".repeat(width - used));
            }
        }
        out.push(' ');
        out.push_str(&self.colored(TokenCategory::Equals, "="));
        out.push(' ');
    }

    /// Split `name` on its namespace colon (if any) and color each part;
    /// `local_category` is `ElementKey`/`ElementName`/`AttrKey` depending on
    /// the caller's position, while the namespace prefix gets its own
    /// `*Namespace` category (or `XslOverride` for an `xsl` prefix, which the
    /// original highlights specially since it shadows the stylesheet's own
    /// namespace).
    fn namespaced(&self, name: &str, local_category: TokenCategory) -> String {
        match crate::names::split_namespace(name) {
            Some((Some(ns), local)) => {
                let ns_category = match local_category {
                    TokenCategory::AttrKey => TokenCategory::AttrNamespace,
                    _ => TokenCategory::ElementNamespace,
                };
                let ns_part = if ns == "xsl" {
                    self.colored(TokenCategory::XslOverride, ns)
                } else {
                    self.colored(ns_category, ns)
                };
                format!(
                    "{}{}{}",
                    ns_part,
                    self.colored(TokenCategory::NamespaceColon, ":"),
                    self.colored(local_category, local)
                )
            }
            _ => self.colored(local_category, name),
        }
    }

    fn render_attributes(&self, attributes: &[Attribute]) -> String {
        let mut out = String::from("(");
        for (i, attr) in attributes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            if attr.key == "xmlns" || attr.key.starts_with("xmlns:") {
                out.push_str(&self.colored(TokenCategory::NsDeclaration, &attr.key));
            } else {
                out.push_str(&self.namespaced(&attr.key, TokenCategory::AttrKey));
            }
            match &attr.value {
                AttributeValue::Absent => {}
                other => {
                    out.push('=');
                    out.push_str(&self.render_attribute_value(other));
                }
            }
        }
        out.push(')');
        out
    }

    fn render_attribute_value(&self, value: &AttributeValue) -> String {
        match value {
            AttributeValue::Absent => String::new(),
            AttributeValue::Text(s) => self.render_value(s, true, 1),
            AttributeValue::Entity(e) => self.colored(TokenCategory::AttrValueEntity, &format!("&{e};")),
            AttributeValue::Compound(fragments) => {
                let mut inner = String::new();
                for frag in fragments {
                    match frag {
                        CompoundFragment::Text(t) => inner.push_str(&self.render_compound_fragment_text(t, true)),
                        CompoundFragment::Entity(e) => {
                            inner.push_str(&self.colored(TokenCategory::AttrValueCompoundEntity, &format!("&{e};")))
                        }
                    }
                }
                format!("({inner})")
            }
        }
    }

    /// Render one quoted fragment of an already-split compound value. Unlike
    /// [`Self::render_value`], this never re-evaluates whether the whole
    /// value could be bare — a compound fragment is always a quoted run by
    /// construction (spec §4.C) — it only recomputes the minimal quote
    /// depth needed to re-emit this one fragment.
    fn render_compound_fragment_text(&self, text: &str, is_attribute: bool) -> String {
        let depth = quote::necessary_depth(text);
        let category = if is_attribute { TokenCategory::AttrValueCompoundQuote } else { TokenCategory::ElementValueCompoundQuote };
        self.colored(category, &quote::render_quoted(depth, text, 1, self.settings.explicit_space))
    }

    /// Choose between a bare `Text` token and the full quote engine: a bare
    /// token round-trips unambiguously only when it has no whitespace, no
    /// reserved character, and needs no control-char escaping; everything
    /// else goes through [`quote::plan_quote`] (see `force_quotes`). The
    /// rendered value is always returned pre-colored — category selection
    /// (bare text vs quote vs entity vs compound, element vs attribute)
    /// happens here rather than at each call site.
    fn render_value(&self, payload: &str, is_attribute: bool, col: usize) -> String {
        let policy = self.settings.escape_policy();
        if !self.settings.force_quotes && can_render_bare(payload, &policy) {
            let category = if is_attribute { TokenCategory::AttrValueText } else { TokenCategory::ElementValueText };
            return self.colored(category, payload);
        }
        self.render_plan(&quote::plan_quote(payload, self.settings.compact, is_attribute), col, is_attribute)
    }

    /// Force the full quote engine regardless of [`can_render_bare`] — used
    /// for a `Text`/`Entity` node sitting alongside siblings under `{ }`,
    /// where the grammar only admits a quoted literal as bare data (spec §8).
    fn render_forced_quote(&self, payload: &str, col: usize) -> String {
        self.render_plan(&quote::plan_quote(payload, self.settings.compact, false), col, false)
    }

    /// Re-render a node's own `Text`/`Entity`-only children as a compound
    /// `( ... )` value, the same shape a decomposed `=` attribute value
    /// would have printed through [`Self::render_plan`].
    fn render_node_compound(&self, pieces: &[NodeRef<'_, Node>]) -> String {
        let parts: Vec<QuotePart> = pieces
            .iter()
            .map(|p| match p.value() {
                Node::Text(t) => QuotePart::Quoted { depth: quote::necessary_depth(t), body: t.to_string() },
                Node::Entity(e) => QuotePart::Entity(e.to_string()),
                _ => unreachable!("sole_content_kind only admits Text/Entity into Compound"),
            })
            .collect();
        self.render_plan(&QuotePlan::Compound(parts), 1, false)
    }

    fn render_plan(&self, plan: &QuotePlan, col: usize, is_attribute: bool) -> String {
        match plan {
            QuotePlan::Simple(part) => self.render_part(part, col, is_attribute, false),
            QuotePlan::Compound(parts) => {
                let mut s = String::from("(");
                for part in parts {
                    s.push_str(&self.render_part(part, col, is_attribute, true));
                }
                s.push(')');
                s
            }
        }
    }

    fn render_part(&self, part: &QuotePart, col: usize, is_attribute: bool, compound: bool) -> String {
        match part {
            QuotePart::Quoted { depth, body } => {
                let category = match (is_attribute, compound) {
                    (false, false) => TokenCategory::ElementValueQuote,
                    (false, true) => TokenCategory::ElementValueCompoundQuote,
                    (true, false) => TokenCategory::AttrValueQuote,
                    (true, true) => TokenCategory::AttrValueCompoundQuote,
                };
                self.colored(category, &quote::render_quoted(*depth, body, col, self.settings.explicit_space))
            }
            QuotePart::Entity(e) => {
                let category = match (is_attribute, compound) {
                    (false, false) => TokenCategory::ElementValueEntity,
                    (false, true) => TokenCategory::ElementValueCompoundEntity,
                    (true, false) => TokenCategory::AttrValueEntity,
                    (true, true) => TokenCategory::AttrValueCompoundEntity,
                };
                self.colored(category, &format!("&{e};"))
            }
        }
    }

    fn colored(&self, category: TokenCategory, text: &str) -> String {
        if self.settings.render_raw {
            text.to_string()
        } else {
            self.theme.wrap(category, text)
        }
    }
}

enum SoleContent<'a> {
    None,
    Text(&'a str),
    Entity(&'a str),
    /// Children are exactly the decomposed `Text`/`Entity` fragments of this
    /// node's own compound `=` value (no `Element`/`Comment` siblings).
    Compound(Vec<NodeRef<'a, Node>>),
    Many,
}

fn sole_content_kind<'a>(children: &[NodeRef<'a, Node>]) -> SoleContent<'a> {
    match children {
        [] => SoleContent::None,
        [only] => match only.value() {
            Node::Text(t) => SoleContent::Text(t),
            Node::Entity(e) => SoleContent::Entity(e),
            _ => SoleContent::Many,
        },
        many if many.iter().all(|c| matches!(c.value(), Node::Text(_) | Node::Entity(_))) => {
            SoleContent::Compound(many.to_vec())
        }
        _ => SoleContent::Many,
    }
}

fn leaf_key_value_prefix_len(node: NodeRef<'_, Node>) -> Option<usize> {
    let (name, attrs) = node.value().as_element()?;
    let children: Vec<_> = node.children().collect();
    match sole_content_kind(&children) {
        SoleContent::Text(_) | SoleContent::Entity(_) => Some(name.chars().count() + attributes_plain_len(attrs)),
        _ => None,
    }
}

fn attributes_plain_len(attributes: &[Attribute]) -> usize {
    if attributes.is_empty() {
        return 0;
    }
    // Approximate: exact alignment only matters cosmetically, and the
    // parser accepts any amount of padding before `=`.
    let mut n = 2; // the parens
    for (i, attr) in attributes.iter().enumerate() {
        if i > 0 {
            n += 1;
        }
        n += attr.key.chars().count();
        if !matches!(attr.value, AttributeValue::Absent) {
            n += 1 + attribute_value_plain_len(&attr.value);
        }
    }
    n
}

fn attribute_value_plain_len(value: &AttributeValue) -> usize {
    match value {
        AttributeValue::Absent => 0,
        AttributeValue::Text(s) => s.chars().count(),
        AttributeValue::Entity(e) => e.chars().count() + 2,
        AttributeValue::Compound(fragments) => fragments
            .iter()
            .map(|f| match f {
                CompoundFragment::Text(t) => t.chars().count(),
                CompoundFragment::Entity(e) => e.chars().count() + 2,
            })
            .sum::<usize>()
            + 2,
    }
}

fn can_render_bare(payload: &str, policy: &EscapePolicy) -> bool {
    if payload.is_empty() {
        return false;
    }
    if payload.chars().any(|c| policy.must_escape(c)) {
        return false;
    }
    !payload.bytes().any(is_reserved_char) && !payload.contains('&')
}

/// The minimal block-comment depth `D >= 1` such that `text` contains no
/// `*` followed by a run of exactly `D` slashes (the closing delimiter
/// would otherwise terminate early).
fn necessary_comment_depth(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 1;
    loop {
        let mut collides = false;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'*' {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] == b'/' {
                    j += 1;
                }
                if j - i - 1 == depth {
                    collides = true;
                    break;
                }
            }
            i += 1;
        }
        if !collides {
            return depth;
        }
        depth += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::tree::TreeActions;

    fn print_source(src: &str, settings: PrintSettings) -> String {
        let mut actions = TreeActions::new();
        let mut parser = Parser::new(src.as_bytes());
        parser.parse(&mut actions, None).unwrap();
        let tree = actions.into_tree();
        Printer::new(settings).unwrap().print(&tree)
    }

    #[test]
    fn prints_bare_leaf_value() {
        let out = print_source("car = saab", PrintSettings::default());
        assert_eq!(out, "car = saab");
    }

    #[test]
    fn quotes_value_with_whitespace() {
        let out = print_source("car = 'saab 900'", PrintSettings::default());
        assert_eq!(out, "car = 'saab 900'");
    }

    #[test]
    fn prints_container_with_indent() {
        let out = print_source("car{brand=saab model=900}", PrintSettings::default());
        assert!(out.contains("car {"));
        assert!(out.contains("brand = saab"));
        assert!(out.contains("model = 900"));
    }

    #[test]
    fn prints_attributes() {
        let out = print_source("car(color=blue) = saab", PrintSettings::default());
        assert_eq!(out, "car(color=blue) = saab");
    }

    #[test]
    fn force_quotes_wraps_bare_words() {
        let settings = PrintSettings { force_quotes: true, ..Default::default() };
        let out = print_source("car = saab", settings);
        assert_eq!(out, "car = 'saab'");
    }

    #[test]
    fn compact_mode_has_no_whitespace_padding() {
        let out = print_source("car{brand=saab model=900}", PrintSettings::compact());
        assert_eq!(out, "car{brand=saab model=900}");
    }
}
