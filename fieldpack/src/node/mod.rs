//! Hierarchical config nodes.
//!
//! A [`ConfigNode`] is a named tree of ordered `key = value` pairs and child
//! nodes with a round-trippable text form (see [`text`]). Two traits describe
//! how field types relate to it:
//!
//! - [`HierarchicalNode`]: the type *is* a node (or a thin wrapper around
//!   one) and is stored as its own text.
//! - [`NodeLoadable`]: the type can populate itself from a node and write
//!   itself into one.

pub mod text;

use std::fmt;
use std::str::FromStr;

use crate::error::NodeError;

/// A named, ordered tree of values and child nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    values: Vec<(String, String)>,
    nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Create an empty node. The name is normalised (see [`text::clean_name`]).
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: text::clean_name(name.as_ref()),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl AsRef<str>) {
        self.name = text::clean_name(name.as_ref());
    }

    /// All values in insertion order.
    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }

    /// All child nodes in insertion order.
    pub fn nodes(&self) -> &[ConfigNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [ConfigNode] {
        &mut self.nodes
    }

    /// `true` if the node has neither values nor children.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.nodes.is_empty()
    }

    /// Remove all values and children, keeping the name.
    pub fn clear(&mut self) {
        self.values.clear();
        self.nodes.clear();
    }

    /// Append a value. Duplicate keys are allowed and kept in order.
    pub fn add_value(&mut self, key: impl AsRef<str>, value: impl fmt::Display) {
        self.values.push((
            text::clean_name(key.as_ref()),
            text::clean_value(&value.to_string()),
        ));
    }

    /// Overwrite the first value stored under `key`, appending it if absent.
    pub fn set_value(&mut self, key: impl AsRef<str>, value: impl fmt::Display) {
        let key = text::clean_name(key.as_ref());
        let value = text::clean_value(&value.to_string());
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.values.push((key, value)),
        }
    }

    /// First value stored under `key`.
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `key`, in order.
    pub fn get_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.iter().any(|(k, _)| k == key)
    }

    /// Remove every value stored under `key`. Returns how many were removed.
    pub fn remove_values(&mut self, key: &str) -> usize {
        let before = self.values.len();
        self.values.retain(|(k, _)| k != key);
        before - self.values.len()
    }

    /// Parse the first value stored under `key`.
    pub fn parse_value<V>(&self, key: &str) -> Result<V, NodeError>
    where
        V: FromStr,
        V::Err: fmt::Display,
    {
        let raw = self.get_value(key).ok_or_else(|| NodeError::MissingValue {
            key: key.to_owned(),
        })?;
        raw.parse().map_err(|e: V::Err| NodeError::InvalidValue {
            key: key.to_owned(),
            value: raw.to_owned(),
            message: e.to_string(),
        })
    }

    /// Append a child node and return a mutable reference to it.
    pub fn add_node(&mut self, node: ConfigNode) -> &mut ConfigNode {
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    /// First child called `name`.
    pub fn get_node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn get_node_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Every child called `name`, in order.
    pub fn get_nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// First child node, regardless of name.
    pub fn first_node(&self) -> Option<&ConfigNode> {
        self.nodes.first()
    }

    /// Replace this node's values and children with copies of `other`'s.
    /// The name is left unchanged.
    pub fn copy_from(&mut self, other: &ConfigNode) {
        self.values = other.values.clone();
        self.nodes = other.nodes.clone();
    }

    /// Render the node (header, braces and content) as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        text::render_into(self, 0, &mut out);
        out
    }

    /// Parse a document. The returned node is an unnamed root whose children
    /// are the document's top-level nodes.
    pub fn parse(source: &str) -> Result<ConfigNode, NodeError> {
        text::parse(source)
    }

    /// Parse a document and take its first top-level node.
    pub fn parse_first(source: &str) -> Result<ConfigNode, NodeError> {
        let mut root = text::parse(source)?;
        if root.nodes.is_empty() {
            return Err(NodeError::MissingNode);
        }
        Ok(root.nodes.swap_remove(0))
    }

    pub(crate) fn push_raw_value(&mut self, key: String, value: String) {
        self.values.push((key, value));
    }

    pub(crate) fn name_raw(name: String) -> Self {
        Self {
            name,
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Types that are stored as a [`ConfigNode`] themselves.
///
/// Implemented by `ConfigNode` and meant for newtypes wrapping one. Fields of
/// such types are packed as the node's text and restored by parsing it back.
pub trait HierarchicalNode: Sized + 'static {
    fn as_node(&self) -> &ConfigNode;

    fn from_node(node: ConfigNode) -> Self;
}

impl HierarchicalNode for ConfigNode {
    fn as_node(&self) -> &ConfigNode {
        self
    }

    fn from_node(node: ConfigNode) -> Self {
        node
    }
}

/// Types that can populate themselves from a node and write themselves into one.
///
/// # Example
///
/// ```ignore
/// struct Engine {
///     thrust: f32,
/// }
///
/// impl NodeLoadable for Engine {
///     fn load(&mut self, node: &ConfigNode) -> Result<(), NodeError> {
///         self.thrust = node.parse_value("thrust")?;
///         Ok(())
///     }
///
///     fn save(&self, node: &mut ConfigNode) {
///         node.add_value("thrust", self.thrust);
///     }
/// }
/// ```
pub trait NodeLoadable: 'static {
    fn load(&mut self, node: &ConfigNode) -> Result<(), NodeError>;

    fn save(&self, node: &mut ConfigNode);
}

impl NodeLoadable for ConfigNode {
    fn load(&mut self, node: &ConfigNode) -> Result<(), NodeError> {
        self.copy_from(node);
        Ok(())
    }

    fn save(&self, node: &mut ConfigNode) {
        node.copy_from(self);
    }
}
