//! Node parameters: literal values or references to earlier node outputs.
//!
//! A parameter is decided to be a [`ParamValue::Literal`] or a
//! [`ParamValue::Reference`] once, when the document is parsed. The engine
//! never inspects value shapes at run time.
//!
//! # JSON form
//!
//! - A reference is an object carrying the `"$node"` key (a node index)
//!   and a `"socket"` key (an output socket name):
//!   `{"$node": 0, "socket": "out"}`. Other keys are ignored.
//! - Any other value, including objects without `"$node"`, is a literal
//!   and is passed through verbatim.
//! - A literal object carrying `"$node"` has no document form; serializing
//!   one fails with [`CoreError::AmbiguousLiteral`].

use std::fmt;

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::id::NodeIndex;

/// Key marking an object as a reference to another node's output.
pub const NODE_MARKER: &str = "$node";
/// Key naming the referenced output socket.
pub const SOCKET_KEY: &str = "socket";

/// Address of one output socket on one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketRef {
    /// The node whose output is read.
    pub node: NodeIndex,
    /// The output socket on that node.
    pub socket: String,
}

impl SocketRef {
    pub fn new(node: NodeIndex, socket: impl Into<String>) -> Self {
        SocketRef {
            node,
            socket: socket.into(),
        }
    }
}

impl fmt::Display for SocketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.socket)
    }
}

/// A declared node parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A value passed to the node unchanged.
    Literal(Value),
    /// A value read from an earlier node's output when the node runs.
    Reference(SocketRef),
}

impl ParamValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        ParamValue::Literal(value.into())
    }

    pub fn reference(node: NodeIndex, socket: impl Into<String>) -> Self {
        ParamValue::Reference(SocketRef::new(node, socket))
    }

    /// Returns the referenced socket, if this parameter is a reference.
    pub fn as_reference(&self) -> Option<&SocketRef> {
        match self {
            ParamValue::Reference(socket_ref) => Some(socket_ref),
            ParamValue::Literal(_) => None,
        }
    }

    /// Classifies a raw JSON parameter value.
    ///
    /// Only the presence of `"$node"` makes an object a reference. Such an
    /// object must then carry a valid index and socket name.
    pub fn from_json(value: Value) -> Result<ParamValue, String> {
        let map = match value {
            Value::Object(map) if map.contains_key(NODE_MARKER) => map,
            other => return Ok(ParamValue::Literal(other)),
        };

        let node = map
            .get(NODE_MARKER)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .map(NodeIndex)
            .ok_or_else(|| format!("reference '{NODE_MARKER}' must be a non-negative node index"))?;
        let socket = map
            .get(SOCKET_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("reference '{SOCKET_KEY}' must be a string"))?;

        Ok(ParamValue::Reference(SocketRef::new(node, socket)))
    }

    /// Converts back to the JSON document form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AmbiguousLiteral`] for a literal object carrying
    /// `"$node"`, which would be read back as a reference.
    pub fn to_json(&self) -> Result<Value, CoreError> {
        match self {
            ParamValue::Reference(socket_ref) => {
                let mut map = Map::new();
                map.insert(NODE_MARKER.into(), Value::from(socket_ref.node.0));
                map.insert(SOCKET_KEY.into(), Value::from(socket_ref.socket.clone()));
                Ok(Value::Object(map))
            }
            ParamValue::Literal(Value::Object(map)) if map.contains_key(NODE_MARKER) => {
                Err(CoreError::AmbiguousLiteral {
                    literal: Value::Object(map.clone()).to_string(),
                })
            }
            ParamValue::Literal(value) => Ok(value.clone()),
        }
    }
}

impl From<SocketRef> for ParamValue {
    fn from(socket_ref: SocketRef) -> Self {
        ParamValue::Reference(socket_ref)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ParamValue::from_json(value).map_err(D::Error::custom)
    }
}
