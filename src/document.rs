//! The Document API
//!
//! Wraps `Result<Tree<Node>, XmqError>` rather than an out-parameter-plus-
//! `doc_error()` pattern; `error()` still exposes the stored failure for
//! callers that want that C-API shape without its unsafety.

use std::path::Path;

use ego_tree::{NodeRef, Tree};

use crate::error::XmqError;
use crate::log::LogContext;
use crate::parser::Parser;
use crate::tree::{Node, TreeActions};

pub struct Document {
    result: Result<Tree<Node>, XmqError>,
}

impl Document {
    pub fn parse_bytes(src: &[u8], implicit_root_name: Option<&str>) -> Self {
        Self::parse_bytes_with_log(src, implicit_root_name, &LogContext::default())
    }

    /// As [`Self::parse_bytes`], but threading `log` through the parser
    /// for trace/error diagnostics (design note 9).
    pub fn parse_bytes_with_log(
        src: &[u8],
        implicit_root_name: Option<&str>,
        log: &LogContext,
    ) -> Self {
        let mut actions = TreeActions::new();
        let mut parser = Parser::new(src).with_log(log.clone());
        let result = parser
            .parse(&mut actions, implicit_root_name)
            .map(|_| actions.into_tree())
            .map_err(XmqError::from);
        Document { result }
    }

    pub fn parse_file(path: impl AsRef<Path>, implicit_root_name: Option<&str>) -> Self {
        Self::parse_file_with_log(path, implicit_root_name, &LogContext::default())
    }

    pub fn parse_file_with_log(
        path: impl AsRef<Path>,
        implicit_root_name: Option<&str>,
        log: &LogContext,
    ) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => Self::parse_bytes_with_log(&bytes, implicit_root_name, log),
            Err(source) => {
                Document { result: Err(XmqError::Io { path: path.display().to_string(), source }) }
            }
        }
    }

    pub fn error(&self) -> Option<&XmqError> {
        self.result.as_ref().err()
    }

    pub fn tree(&self) -> Option<&Tree<Node>> {
        self.result.as_ref().ok()
    }

    /// The text content at `path` (a `/`-separated chain of element
    /// names from the root), concatenating any `Text` children.
    pub fn get_string(&self, path: &str) -> Option<String> {
        let node = resolve(self.tree()?, path)?;
        text_content(node)
    }

    pub fn get_int(&self, path: &str) -> Option<i64> {
        self.get_string(path)?.trim().parse().ok()
    }

    pub fn get_double(&self, path: &str) -> Option<f64> {
        self.get_string(path)?.trim().parse().ok()
    }

    /// Call `f` once per element matching `path`'s final name segment
    /// under the parent resolved by the rest of the path.
    pub fn foreach<F: FnMut(NodeRef<'_, Node>)>(&self, path: &str, mut f: F) {
        let Some(tree) = self.tree() else { return };
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(last) = segments.pop() else { return };
        let parent = match resolve_segments(tree.root(), &segments) {
            Some(p) => p,
            None => return,
        };
        for child in parent.children() {
            if matches!(child.value(), Node::Element { name, .. } if name == last) {
                f(child);
            }
        }
    }
}

fn resolve<'a>(tree: &'a Tree<Node>, path: &str) -> Option<NodeRef<'a, Node>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    resolve_segments(tree.root(), &segments)
}

fn resolve_segments<'a>(start: NodeRef<'a, Node>, segments: &[&str]) -> Option<NodeRef<'a, Node>> {
    let mut current = start;
    for segment in segments {
        current = current
            .children()
            .find(|c| matches!(c.value(), Node::Element { name, .. } if name == segment))?;
    }
    Some(current)
}

fn text_content(node: NodeRef<'_, Node>) -> Option<String> {
    let mut out = String::new();
    let mut any = false;
    for child in node.children() {
        if let Node::Text(t) = child.value() {
            out.push_str(t);
            any = true;
        }
    }
    any.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_string_navigates_nested_elements() {
        let doc = Document::parse_bytes(b"car{brand=saab}", None);
        assert_eq!(doc.get_string("car/brand").as_deref(), Some("saab"));
    }

    #[test]
    fn get_int_and_double_parse_numeric_content() {
        let doc = Document::parse_bytes(b"car{wheels=4 weight=1337.5}", None);
        assert_eq!(doc.get_int("car/wheels"), Some(4));
        assert_eq!(doc.get_double("car/weight"), Some(1337.5));
    }

    #[test]
    fn error_is_none_for_valid_source() {
        let doc = Document::parse_bytes(b"car=saab", None);
        assert!(doc.error().is_none());
    }

    #[test]
    fn error_is_some_for_invalid_source() {
        let doc = Document::parse_bytes(b"car='unterminated", None);
        assert!(doc.error().is_some());
    }

    #[test]
    fn foreach_visits_every_matching_child() {
        let doc = Document::parse_bytes(b"garage{car=saab car=volvo}", None);
        let mut names = Vec::new();
        doc.foreach("garage/car", |node| {
            if let Node::Element { .. } = node.value() {
                names.push(text_content(node).unwrap_or_default());
            }
        });
        assert_eq!(names, vec!["saab".to_string(), "volvo".to_string()]);
    }

    #[test]
    fn parse_bytes_with_log_still_parses_correctly() {
        let log = LogContext::new(crate::log::Level::Trace);
        let doc = Document::parse_bytes_with_log(b"car=saab", None, &log);
        assert!(doc.error().is_none());
        assert_eq!(doc.get_string("car"), Some("saab".to_string()));
    }
}
