//! Data model for behavior graph documents.
//!
//! A behavior graph is an ordered list of [`Node`]s. Each node names a
//! behavior through its [`NodeType`], declares [`ParamValue`] parameters
//! (literals or references to earlier outputs), and carries opaque `flow`
//! data its behavior uses to pick a successor.

pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod param;

// Re-export commonly used types
pub use error::CoreError;
pub use graph::BehaviorGraph;
pub use id::NodeIndex;
pub use node::{Node, NodeType};
pub use param::{ParamValue, SocketRef};
pub use serde_json::Value;
