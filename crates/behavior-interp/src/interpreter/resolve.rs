//! Parameter resolution.
//!
//! Turns a node's declared parameters into concrete values: literals pass
//! through unchanged, references are replaced by the output recorded for
//! the referenced `(node, socket)` earlier in the same run.

use indexmap::IndexMap;

use behavior_core::{NodeIndex, ParamValue, Value};

use super::error::RuntimeError;
use super::store::StateStore;

/// Resolves every parameter of the node at `index`.
///
/// # Errors
///
/// Returns [`RuntimeError::UnresolvedReference`] for the first reference
/// whose socket has no recorded value. Nothing is substituted for it.
pub fn resolve_parameters(
    index: NodeIndex,
    parameters: &IndexMap<String, ParamValue>,
    store: &StateStore,
) -> Result<IndexMap<String, Value>, RuntimeError> {
    let mut resolved = IndexMap::with_capacity(parameters.len());

    for (name, param) in parameters {
        let value = match param {
            ParamValue::Literal(value) => value.clone(),
            ParamValue::Reference(socket_ref) => store
                .node_output(socket_ref.node, &socket_ref.socket)
                .cloned()
                .ok_or_else(|| RuntimeError::UnresolvedReference {
                    node: index,
                    parameter: name.clone(),
                    producer: socket_ref.node,
                    socket: socket_ref.socket.clone(),
                })?,
        };
        resolved.insert(name.clone(), value);
    }

    Ok(resolved)
}
