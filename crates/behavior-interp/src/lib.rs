//! Execution engine for behavior graphs.
//!
//! The interpreter only knows how to look a node's behavior up, feed it
//! resolved inputs, and follow the successor it declares. What any node
//! computes is supplied by the embedder through the [`NodeRegistry`].

pub mod interpreter;

pub use interpreter::{
    BindingContext, EntityKind, Interpreter, InterpreterConfig, JsonDocument, NodeBehavior,
    NodeError, NodeInput, NodeOutput, NodeRegistry, RunState, RuntimeError, StateStore,
    TraceEntry,
};
