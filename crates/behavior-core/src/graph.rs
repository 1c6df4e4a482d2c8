//! Behavior graph documents.
//!
//! A [`BehaviorGraph`] is the unit handed to the interpreter: an ordered
//! node sequence plus the index evaluation starts from. Nodes are addressed
//! by their position, and control flow between them is carried in each
//! node's `flow` data rather than in explicit edges.
//!
//! The document is plain JSON:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "type": "math.const", "parameters": { "value": 5 }, "flow": { "next": 1 } },
//!     { "type": "math.double", "parameters": { "x": { "$node": 0, "socket": "out" } } }
//!   ],
//!   "entry": 0
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::id::NodeIndex;
use crate::node::Node;

/// An ordered node sequence with an entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorGraph {
    /// Nodes, addressed by position.
    pub nodes: Vec<Node>,
    /// Index of the first node to evaluate.
    #[serde(default)]
    pub entry: NodeIndex,
}

impl BehaviorGraph {
    /// Creates a graph starting at node 0.
    pub fn new(nodes: Vec<Node>) -> Self {
        BehaviorGraph {
            nodes,
            entry: NodeIndex(0),
        }
    }

    pub fn with_entry(mut self, entry: NodeIndex) -> Self {
        self.entry = entry;
        self
    }

    /// Parses a graph document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a graph document from an already-decoded JSON value, e.g. one
    /// embedded in a larger asset file.
    pub fn from_json_value(value: Value) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes the graph back to its pretty-printed JSON document form.
    ///
    /// # Errors
    ///
    /// [`CoreError::AmbiguousLiteral`] if any literal parameter carries the
    /// `$node` marker.
    pub fn to_json_string(&self) -> Result<String, CoreError> {
        for param in self.nodes.iter().flat_map(|node| node.parameters.values()) {
            param.to_json()?;
        }
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the node at `index`, if it exists.
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.as_usize())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamValue;
    use serde_json::json;

    const DOUBLE_GRAPH: &str = r#"{
        "nodes": [
            { "type": "math.const", "parameters": { "value": 5 }, "flow": { "next": 1 } },
            { "type": "math.double", "parameters": { "x": { "$node": 0, "socket": "out" } } }
        ],
        "entry": 0
    }"#;

    #[test]
    fn parses_document() {
        let graph = BehaviorGraph::from_json_str(DOUBLE_GRAPH).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.entry, NodeIndex(0));

        let double = graph.get(NodeIndex(1)).unwrap();
        assert_eq!(double.node_type.as_str(), "math.double");
        assert_eq!(double.parameters["x"], ParamValue::reference(NodeIndex(0), "out"));
        assert!(graph.get(NodeIndex(2)).is_none());
    }

    #[test]
    fn entry_defaults_to_zero() {
        let graph = BehaviorGraph::from_json_value(json!({
            "nodes": [{ "type": "flow.noop" }]
        }))
        .unwrap();
        assert_eq!(graph.entry, NodeIndex(0));
    }

    #[test]
    fn malformed_reference_fails_document_parse() {
        let err = BehaviorGraph::from_json_value(json!({
            "nodes": [{ "type": "math.double", "parameters": { "x": { "$node": 0 } } }]
        }))
        .unwrap_err();
        let CoreError::InvalidDocument { reason } = err else {
            panic!("expected InvalidDocument, got {err:?}");
        };
        assert!(reason.contains("$node"), "unexpected reason: {reason}");
    }

    #[test]
    fn missing_nodes_is_invalid() {
        assert!(BehaviorGraph::from_json_str(r#"{"entry": 0}"#).is_err());
        assert!(BehaviorGraph::from_json_str("not json").is_err());
    }

    #[test]
    fn serialized_form_snapshot() {
        let graph = BehaviorGraph::new(vec![
            Node::new("math.const")
                .with_literal("value", 5)
                .with_flow(json!({ "next": 1 })),
            Node::new("math.double").with_reference("x", NodeIndex(0), "out"),
            Node::new("debug.log").with_literal("shape", json!({ "$literal": 1, "socket": "s" })),
        ])
        .with_entry(NodeIndex(0));

        insta::assert_json_snapshot!(graph, @r###"
        {
          "nodes": [
            {
              "type": "math.const",
              "parameters": {
                "value": 5
              },
              "flow": {
                "next": 1
              }
            },
            {
              "type": "math.double",
              "parameters": {
                "x": {
                  "$node": 0,
                  "socket": "out"
                }
              }
            },
            {
              "type": "debug.log",
              "parameters": {
                "shape": {
                  "$literal": 1,
                  "socket": "s"
                }
              }
            }
          ],
          "entry": 0
        }
        "###);
    }

    #[test]
    fn document_roundtrip_keeps_literal_objects() {
        let graph = BehaviorGraph::new(vec![
            Node::new("debug.log").with_literal("cfg", json!({ "$literal": 5 })),
        ]);
        let text = graph.to_json_string().unwrap();
        let back = BehaviorGraph::from_json_str(&text).unwrap();
        assert_eq!(back, graph);
        assert_eq!(back.nodes[0].parameters["cfg"], ParamValue::literal(json!({ "$literal": 5 })));
    }

    #[test]
    fn marker_shaped_literal_is_not_written() {
        let graph = BehaviorGraph::new(vec![
            Node::new("debug.log").with_literal("shape", json!({ "$node": 1, "socket": "s" })),
        ]);
        let err = graph.to_json_string().unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousLiteral { .. }), "{err:?}");
    }
}
