//! Node behaviors and the registry that maps node types to them.
//!
//! A behavior is anything implementing [`NodeBehavior`]: it receives the
//! node's resolved parameters and flow data, may touch host state through
//! the [`BindingContext`], and answers with its outputs and the index of
//! the next node (or none, to halt). The engine never looks inside.
//!
//! The [`NodeRegistry`] is filled once before any interpreter is built and
//! shared read-only afterwards, typically behind an `Arc`.

use std::collections::HashMap;

use indexmap::IndexMap;

use behavior_core::{NodeIndex, NodeType, Value};

use super::binding::BindingContext;

/// Resolved input handed to a behavior.
#[derive(Debug, Clone, Copy)]
pub struct NodeInput<'a> {
    /// Position of the node being evaluated.
    pub index: NodeIndex,
    /// The node's type key.
    pub node_type: &'a NodeType,
    /// Parameters with every reference replaced by its recorded value.
    pub parameters: &'a IndexMap<String, Value>,
    /// The node's flow data, exactly as declared.
    pub flow: &'a Value,
}

impl<'a> NodeInput<'a> {
    /// Looks up a resolved parameter.
    pub fn param(&self, name: &str) -> Option<&'a Value> {
        self.parameters.get(name)
    }

    /// Reads an integer field of the flow object as a node index, the usual
    /// way a node names its successor (`"flow": { "next": 3 }`).
    ///
    /// An absent field is `Ok(None)`, which halts the run when used as the
    /// successor.
    ///
    /// # Errors
    ///
    /// A field that is present but not a non-negative `u32` (including
    /// `null`) is an error, so a malformed successor aborts the run instead
    /// of reading as a halt.
    pub fn flow_index(&self, key: &str) -> Result<Option<NodeIndex>, NodeError> {
        let Some(raw) = self.flow.get(key) else {
            return Ok(None);
        };
        raw.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(|n| Some(NodeIndex(n)))
            .ok_or_else(|| NodeError::new(format!("flow '{key}' is not a node index: {raw}")))
    }
}

/// What a behavior produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutput {
    /// Output sockets, recorded for later references.
    pub result: IndexMap<String, Value>,
    /// The node to evaluate next, or `None` to end the run here.
    pub next_flow: Option<NodeIndex>,
}

impl NodeOutput {
    /// Ends the run after this node.
    pub fn halt() -> Self {
        NodeOutput::default()
    }

    /// Continues at `next`.
    pub fn then(next: NodeIndex) -> Self {
        NodeOutput {
            result: IndexMap::new(),
            next_flow: Some(next),
        }
    }

    /// Adds an output socket.
    pub fn with(mut self, socket: impl Into<String>, value: impl Into<Value>) -> Self {
        self.result.insert(socket.into(), value.into());
        self
    }

    /// Sets the successor, replacing any earlier choice.
    pub fn with_next(mut self, next: Option<NodeIndex>) -> Self {
        self.next_flow = next;
        self
    }
}

/// A failure reported by a behavior itself (bad parameter type, etc.).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NodeError {
    pub message: String,
}

impl NodeError {
    pub fn new(message: impl Into<String>) -> Self {
        NodeError {
            message: message.into(),
        }
    }
}

/// The executable body of a node type.
pub trait NodeBehavior: Send + Sync {
    fn evaluate(
        &self,
        input: NodeInput<'_>,
        context: &BindingContext,
    ) -> Result<NodeOutput, NodeError>;
}

impl<F> NodeBehavior for F
where
    F: Fn(NodeInput<'_>, &BindingContext) -> Result<NodeOutput, NodeError> + Send + Sync,
{
    fn evaluate(
        &self,
        input: NodeInput<'_>,
        context: &BindingContext,
    ) -> Result<NodeOutput, NodeError> {
        self(input, context)
    }
}

/// Lookup table from node type key to behavior.
#[derive(Default)]
pub struct NodeRegistry {
    behaviors: HashMap<NodeType, Box<dyn NodeBehavior>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        NodeRegistry::default()
    }

    /// Registers a behavior under a full key such as `"math.add"`.
    ///
    /// An existing registration for the same key is replaced.
    pub fn register(&mut self, key: impl Into<NodeType>, behavior: impl NodeBehavior + 'static) {
        let key = key.into();
        if self.behaviors.insert(key.clone(), Box::new(behavior)).is_some() {
            tracing::warn!(node_type = %key, "replacing registered node behavior");
        }
    }

    /// Registers a closure as a behavior.
    ///
    /// Equivalent to [`register`](Self::register), but the closure's argument
    /// types are inferred from the behavior signature.
    pub fn register_fn<F>(&mut self, key: impl Into<NodeType>, behavior: F)
    where
        F: Fn(NodeInput<'_>, &BindingContext) -> Result<NodeOutput, NodeError>
            + Send
            + Sync
            + 'static,
    {
        self.register(key, behavior);
    }

    /// Registers a behavior under `category.name`.
    pub fn register_in(
        &mut self,
        category: &str,
        name: &str,
        behavior: impl NodeBehavior + 'static,
    ) {
        self.register(NodeType::from_parts(category, name), behavior);
    }

    pub fn get(&self, node_type: &NodeType) -> Option<&dyn NodeBehavior> {
        self.behaviors.get(node_type).map(|b| b.as_ref())
    }

    pub fn contains(&self, node_type: &NodeType) -> bool {
        self.behaviors.contains_key(node_type)
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Registered keys, sorted.
    pub fn node_types(&self) -> Vec<&NodeType> {
        let mut keys: Vec<&NodeType> = self.behaviors.keys().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("node_types", &self.node_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Constant(i64);

    impl NodeBehavior for Constant {
        fn evaluate(
            &self,
            _input: NodeInput<'_>,
            _context: &BindingContext,
        ) -> Result<NodeOutput, NodeError> {
            Ok(NodeOutput::halt().with("out", self.0))
        }
    }

    fn evaluate(registry: &NodeRegistry, key: &str, flow: Value) -> NodeOutput {
        let node_type = NodeType::new(key);
        let parameters = IndexMap::new();
        let input = NodeInput {
            index: NodeIndex(0),
            node_type: &node_type,
            parameters: &parameters,
            flow: &flow,
        };
        registry
            .get(&node_type)
            .unwrap()
            .evaluate(input, &BindingContext::new())
            .unwrap()
    }

    #[test]
    fn struct_and_closure_behaviors_register() {
        let mut registry = NodeRegistry::new();
        registry.register("math.const", Constant(5));
        registry.register_fn("flow.next", |input, _| {
            Ok(NodeOutput::halt().with_next(input.flow_index("next")?))
        });

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&NodeType::new("flow.next")));
        assert_eq!(
            evaluate(&registry, "math.const", Value::Null),
            NodeOutput::halt().with("out", 5)
        );
        assert_eq!(
            evaluate(&registry, "flow.next", json!({ "next": 7 })),
            NodeOutput::then(NodeIndex(7))
        );
    }

    #[test]
    fn lookup_is_by_full_key() {
        let mut registry = NodeRegistry::new();
        registry.register_in("math", "const", Constant(1));
        assert!(registry.get(&NodeType::new("math/const")).is_none());
        assert!(registry.get(&NodeType::new("const")).is_none());
        assert!(registry.get(&NodeType::new("math.const")).is_some());
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = NodeRegistry::new();
        registry.register("math.const", Constant(1));
        registry.register("math.const", Constant(2));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            evaluate(&registry, "math.const", Value::Null),
            NodeOutput::halt().with("out", 2)
        );
    }

    #[test]
    fn node_types_are_sorted() {
        let mut registry = NodeRegistry::new();
        registry.register("world.set", Constant(0));
        registry.register("math.add", Constant(0));
        let keys: Vec<&str> = registry.node_types().into_iter().map(NodeType::as_str).collect();
        assert_eq!(keys, ["math.add", "world.set"]);
    }

    #[test]
    fn flow_index_separates_absent_from_malformed() {
        let node_type = NodeType::new("t.t");
        let parameters = IndexMap::new();
        let flow = json!({
            "negative": -1,
            "text": "x",
            "huge": 4294967296u64,
            "null": null,
            "ok": 2
        });
        let input = NodeInput {
            index: NodeIndex(0),
            node_type: &node_type,
            parameters: &parameters,
            flow: &flow,
        };
        assert_eq!(input.flow_index("missing"), Ok(None));
        assert_eq!(input.flow_index("ok"), Ok(Some(NodeIndex(2))));
        for key in ["negative", "text", "huge", "null"] {
            assert!(input.flow_index(key).is_err(), "{key} accepted");
        }
        assert_eq!(
            input.flow_index("huge").unwrap_err().message,
            "flow 'huge' is not a node index: 4294967296"
        );
    }

    #[test]
    fn flow_index_on_null_flow_is_absent() {
        let node_type = NodeType::new("t.t");
        let parameters = IndexMap::new();
        let input = NodeInput {
            index: NodeIndex(0),
            node_type: &node_type,
            parameters: &parameters,
            flow: &Value::Null,
        };
        assert_eq!(input.flow_index("next"), Ok(None));
    }
}
