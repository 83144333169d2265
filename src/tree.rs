//! The document tree model (component E)
//!
//! An arena of [`Node`]s addressed by [`ego_tree::NodeId`] — child and
//! attribute lists become index chains rather than owned/cyclic
//! pointers, which keeps freeing the whole document a single drop.
//!
//! [`TreeActions`] is the default [`Actions`] implementation the parser
//! drives when building a tree straight from XMQ source. The reverse
//! direction (building a tree from parsed XML, for `xml2xmq`) does not go
//! through `Actions` at all — it calls the inherent `append_*` methods
//! directly, since XML's doctype/processing-instruction nodes have no XMQ
//! grammar production and so no place in the `Actions` callback surface.

use ego_tree::{NodeId, NodeRef, Tree};

use crate::parser::{Actions, AttributeValue};

/// One attribute on an [`Node::Element`].
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: AttributeValue,
}

/// A node in the document tree: Element, Text, Entity, Comment, Doctype,
/// or Processing Instruction. `Root` is the implicit tree root
/// `ego_tree::Tree` always has; it carries no XMQ content of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Root,
    Element { name: String, attributes: Vec<Attribute> },
    Text(String),
    Entity(String),
    Comment { text: String, single_line: bool },
    Doctype(String),
    ProcessingInstruction { target: String, data: String },
}

impl Node {
    pub fn as_element(&self) -> Option<(&str, &[Attribute])> {
        match self {
            Node::Element { name, attributes } => Some((name, attributes)),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. })
    }
}

/// Owns the document's arena and implements [`Actions`] for the parser.
pub struct TreeActions {
    tree: Tree<Node>,
}

impl TreeActions {
    pub fn new() -> Self {
        TreeActions { tree: Tree::new(Node::Root) }
    }

    pub fn tree(&self) -> &Tree<Node> {
        &self.tree
    }

    pub fn into_tree(self) -> Tree<Node> {
        self.tree
    }

    pub fn root_ref(&self) -> NodeRef<'_, Node> {
        self.tree.root()
    }

    /// Append a doctype node under `parent`. Used by the XML-reading side,
    /// which builds a tree directly rather than through [`Actions`].
    pub fn append_doctype(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.tree.get_mut(parent).expect("valid node handle").append(Node::Doctype(text.to_string())).id()
    }

    /// Append a processing-instruction node under `parent`.
    pub fn append_processing_instruction(&mut self, parent: NodeId, target: &str, data: &str) -> NodeId {
        self.tree
            .get_mut(parent)
            .expect("valid node handle")
            .append(Node::ProcessingInstruction { target: target.to_string(), data: data.to_string() })
            .id()
    }
}

impl Default for TreeActions {
    fn default() -> Self {
        Self::new()
    }
}

impl Actions for TreeActions {
    type Handle = NodeId;

    fn root(&mut self) -> NodeId {
        self.tree.root().id()
    }

    fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.tree
            .get_mut(parent)
            .expect("valid node handle")
            .append(Node::Element { name: name.to_string(), attributes: Vec::new() })
            .id()
    }

    fn append_comment(&mut self, parent: NodeId, text: &str, single_line: bool) {
        self.tree
            .get_mut(parent)
            .expect("valid node handle")
            .append(Node::Comment { text: text.to_string(), single_line });
    }

    fn append_data(&mut self, parent: NodeId, text: &str) {
        self.tree.get_mut(parent).expect("valid node handle").append(Node::Text(text.to_string()));
    }

    fn append_entity(&mut self, parent: NodeId, name: &str) {
        self.tree.get_mut(parent).expect("valid node handle").append(Node::Entity(name.to_string()));
    }

    fn append_attribute(&mut self, node: NodeId, key: &str, value: AttributeValue) {
        let mut node_mut = self.tree.get_mut(node).expect("valid node handle");
        if let Node::Element { attributes, .. } = node_mut.value() {
            attributes.push(Attribute { key: key.to_string(), value });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn builds_a_simple_element_tree() {
        let mut actions = TreeActions::new();
        let mut parser = Parser::new(b"car(color=blue) = 'saab'");
        parser.parse(&mut actions, None).unwrap();

        let tree = actions.into_tree();
        let root = tree.root();
        let car = root.first_child().unwrap();
        let (name, attrs) = car.value().as_element().unwrap();
        assert_eq!(name, "car");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].key, "color");

        let text = car.first_child().unwrap();
        assert_eq!(text.value(), &Node::Text("saab".to_string()));
    }

    #[test]
    fn implicit_root_wraps_multiple_top_level_elements() {
        let mut actions = TreeActions::new();
        let mut parser = Parser::new(b"a=1\nb=2");
        parser.parse(&mut actions, Some("root")).unwrap();

        let tree = actions.into_tree();
        let root = tree.root();
        let wrapper = root.first_child().unwrap();
        let (name, _) = wrapper.value().as_element().unwrap();
        assert_eq!(name, "root");
        assert_eq!(wrapper.children().count(), 2);
    }

    #[test]
    fn single_top_level_element_is_not_wrapped() {
        let mut actions = TreeActions::new();
        let mut parser = Parser::new(b"a=1");
        parser.parse(&mut actions, Some("root")).unwrap();

        let tree = actions.into_tree();
        let root = tree.root();
        let only_child = root.first_child().unwrap();
        let (name, _) = only_child.value().as_element().unwrap();
        assert_eq!(name, "a");
        assert!(root.first_child().unwrap().next_sibling().is_none());
    }
}
