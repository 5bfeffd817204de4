//! Arena-backed value graphs.
//!
//! The dereferencer's output is a graph, not a tree: one node may be
//! reachable from several parents, and cycles are representable. Nodes are
//! stored in an arena and addressed by [`NodeId`], so shared substructure
//! and self-reference never fight single ownership. Two pointers that
//! resolve to the same target share one id; id equality IS reference
//! equality.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::pointer::Pointer;

/// A stable handle into a [`ValueGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One structured value node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Child ids in index order.
    Array(Vec<NodeId>),
    /// Child ids in insertion order.
    Object(Vec<(String, NodeId)>),
    /// A pointer deliberately left unresolved (circular policy "ignore",
    /// or external resolution disabled).
    Ref(String),
}

/// An arena of nodes plus a distinguished root.
#[derive(Debug, Clone, Default)]
pub struct ValueGraph {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl ValueGraph {
    pub fn new() -> ValueGraph {
        ValueGraph::default()
    }

    /// Allocate a node and return its handle.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Replace a node in place. Used to patch placeholder nodes once their
    /// children (possibly including themselves, via a cycle) are built.
    pub fn replace(&mut self, id: NodeId, node: Node) {
        self.nodes[id.0] = node;
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The distinguished root, if one has been set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Navigate from the root by pointer fragment (`"#/a/b"` or `"#"`).
    pub fn node_at(&self, fragment: &str) -> Option<NodeId> {
        let pointer = Pointer::parse(fragment).ok()?;
        let mut id = self.root?;
        for token in pointer.tokens() {
            id = match self.get(id) {
                Node::Object(entries) => entries
                    .iter()
                    .find(|(k, _)| k == token)
                    .map(|(_, child)| *child)?,
                Node::Array(items) => {
                    let idx: usize = token.parse().ok()?;
                    *items.get(idx)?
                }
                _ => return None,
            };
        }
        Some(id)
    }

    /// Expand the graph back into a plain tree.
    ///
    /// Shared acyclic substructure is duplicated; unresolved [`Node::Ref`]s
    /// serialize back to `{"$ref": ...}` objects. A graph without a root
    /// expands to null. Fails if the graph contains a cycle, since a tree
    /// cannot represent one.
    pub fn to_value(&self) -> Result<Value, Error> {
        let Some(root) = self.root else {
            return Ok(Value::Null);
        };
        let mut on_stack = vec![false; self.nodes.len()];
        self.value_of(root, "", &mut on_stack)
    }

    fn value_of(&self, id: NodeId, path: &str, on_stack: &mut [bool]) -> Result<Value, Error> {
        if on_stack[id.0] {
            return Err(Error::CircularReference {
                pointer: format!("#{path}"),
            });
        }
        on_stack[id.0] = true;
        let value = match self.get(id) {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, child) in items.iter().enumerate() {
                    let child_path = format!("{path}/{idx}");
                    out.push(self.value_of(*child, &child_path, on_stack)?);
                }
                Value::Array(out)
            }
            Node::Object(entries) => {
                let mut out = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    let child_path = crate::pointer::join(path, key);
                    out.insert(key.clone(), self.value_of(*child, &child_path, on_stack)?);
                }
                Value::Object(out)
            }
            Node::Ref(target) => {
                let mut out = Map::with_capacity(1);
                out.insert("$ref".to_string(), Value::String(target.clone()));
                Value::Object(out)
            }
        };
        on_stack[id.0] = false;
        Ok(value)
    }
}
