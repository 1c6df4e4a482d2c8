//! Execution trace recording for the behavior interpreter.
//!
//! When tracing is enabled via [`InterpreterConfig::trace_enabled`], the
//! interpreter records a [`TraceEntry`] for every node evaluation, capturing
//! the node index, its type, resolved parameters, outputs, and successor.
//!
//! [`InterpreterConfig::trace_enabled`]: super::state::InterpreterConfig::trace_enabled

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use behavior_core::{NodeIndex, NodeType, Value};

/// A single entry in the execution trace, recording one node evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// The node that was evaluated.
    pub node: NodeIndex,
    /// The node's type key.
    pub node_type: NodeType,
    /// Parameters after reference resolution.
    pub parameters: IndexMap<String, Value>,
    /// Output sockets recorded for the node.
    pub outputs: IndexMap<String, Value>,
    /// Successor chosen by the behavior (None when the run halted here).
    pub next: Option<NodeIndex>,
}
