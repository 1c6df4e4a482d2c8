//! Runtime error types for the behavior graph interpreter.
//!
//! Every error aborts the current run and carries the [`NodeIndex`] where it
//! was detected. Callers should treat any of them as "the graph is
//! malformed": the engine does not retry or recover.

use behavior_core::{NodeIndex, NodeType};
use serde::{Deserialize, Serialize};

/// Errors that abort an interpreter run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum RuntimeError {
    /// The node's type key has no registered behavior.
    #[error("unknown node type '{node_type}' at node {node}")]
    UnknownNodeType { node: NodeIndex, node_type: NodeType },

    /// A reference parameter names an output that has not been recorded in
    /// this run (a forward reference, or a socket the node never produced).
    #[error(
        "unresolved reference at node {node}: parameter '{parameter}' reads socket '{socket}' of node {producer}, which has no recorded value"
    )]
    UnresolvedReference {
        node: NodeIndex,
        parameter: String,
        producer: NodeIndex,
        socket: String,
    },

    /// The entry index or a successor index lies outside the node sequence.
    /// `from` is the node that named the successor, or `None` for the entry.
    #[error("invalid graph structure: node index {index} out of bounds for {len} node(s){}", describe_origin(.from))]
    InvalidGraphStructure {
        index: NodeIndex,
        len: usize,
        from: Option<NodeIndex>,
    },

    /// The configured step ceiling was reached before the graph halted.
    #[error("step limit ({limit}) exceeded before evaluating node {node}")]
    StepLimitExceeded { limit: usize, node: NodeIndex },

    /// A node behavior reported a failure of its own.
    #[error("node {node} ('{node_type}') failed: {message}")]
    BehaviorFailed {
        node: NodeIndex,
        node_type: NodeType,
        message: String,
    },
}

fn describe_origin(from: &Option<NodeIndex>) -> String {
    match from {
        Some(node) => format!(" (successor of node {node})"),
        None => " (entry point)".to_string(),
    }
}

impl RuntimeError {
    /// The node the error is attributed to.
    pub fn node(&self) -> NodeIndex {
        match self {
            RuntimeError::UnknownNodeType { node, .. }
            | RuntimeError::UnresolvedReference { node, .. }
            | RuntimeError::StepLimitExceeded { node, .. }
            | RuntimeError::BehaviorFailed { node, .. } => *node,
            RuntimeError::InvalidGraphStructure { index, from, .. } => from.unwrap_or(*index),
        }
    }
}
