//! Behavior graph nodes.
//!
//! A [`Node`] names the behavior to run through its [`NodeType`], declares
//! its parameters, and carries `flow` data that only the node's own
//! behavior interprets (successor indices, branch targets, and so on).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::NodeIndex;
use crate::param::{ParamValue, SocketRef};

// ---------------------------------------------------------------------------
// Node type keys
// ---------------------------------------------------------------------------

/// Composite `category.name` key selecting a node behavior.
///
/// The category is a namespacing convention inside the key: registry lookups
/// always use the full string. Both `.` and `/` are accepted as separators
/// (`"math.add"`, `"math/add"`); the first one found splits the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeType(String);

impl NodeType {
    pub fn new(key: impl Into<String>) -> Self {
        NodeType(key.into())
    }

    /// Builds the canonical `category.name` key.
    pub fn from_parts(category: &str, name: &str) -> Self {
        NodeType(format!("{category}.{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace part of the key, or `""` when the key has no separator.
    pub fn category(&self) -> &str {
        match self.split_point() {
            Some(at) => &self.0[..at],
            None => "",
        }
    }

    /// The behavior name within the category.
    pub fn name(&self) -> &str {
        match self.split_point() {
            Some(at) => &self.0[at + 1..],
            None => &self.0,
        }
    }

    fn split_point(&self) -> Option<usize> {
        self.0.find(|c| c == '.' || c == '/')
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeType {
    fn from(key: &str) -> Self {
        NodeType::new(key)
    }
}

impl From<String> for NodeType {
    fn from(key: String) -> Self {
        NodeType(key)
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// One unit of computation in a behavior graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Behavior key, looked up in the node registry at evaluation time.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Declared parameters in document order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParamValue>,
    /// Node-specific control data, passed through to the behavior untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub flow: Value,
}

impl Node {
    /// Creates a node with no parameters and null flow data.
    pub fn new(node_type: impl Into<NodeType>) -> Self {
        Node {
            node_type: node_type.into(),
            parameters: IndexMap::new(),
            flow: Value::Null,
        }
    }

    pub fn with_literal(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters
            .insert(name.into(), ParamValue::Literal(value.into()));
        self
    }

    pub fn with_reference(
        mut self,
        name: impl Into<String>,
        node: NodeIndex,
        socket: impl Into<String>,
    ) -> Self {
        self.parameters
            .insert(name.into(), ParamValue::reference(node, socket));
        self
    }

    pub fn with_flow(mut self, flow: Value) -> Self {
        self.flow = flow;
        self
    }

    /// Iterates over `(parameter name, referenced socket)` for every
    /// reference parameter, in declaration order.
    pub fn references(&self) -> impl Iterator<Item = (&str, &SocketRef)> {
        self.parameters
            .iter()
            .filter_map(|(name, param)| param.as_reference().map(|r| (name.as_str(), r)))
    }
}
