//! Per-run execution state.
//!
//! Values are keyed by `(entity kind, index, socket)` in one flat map, so
//! clearing the store between runs is a single `clear`. Only node outputs
//! (`EntityKind::NODE`) are written by the engine; other kinds share the
//! same store without a schema change.
//!
//! Reads look keys up by borrowed parts and never allocate.

use std::borrow::Cow;
use std::fmt;

use indexmap::{Equivalent, IndexMap};

use behavior_core::{NodeIndex, Value};

/// First key level of the state store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKind(Cow<'static, str>);

impl EntityKind {
    /// Outputs recorded for evaluated graph nodes.
    pub const NODE: EntityKind = EntityKind(Cow::Borrowed("$node"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        EntityKind(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key addressing one recorded value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub kind: EntityKind,
    pub index: NodeIndex,
    pub socket: String,
}

/// Borrowed form of [`StateKey`]. Hashes exactly like the owned key.
#[derive(Hash)]
struct KeyRef<'a> {
    kind: &'a EntityKind,
    index: NodeIndex,
    socket: &'a str,
}

impl Equivalent<StateKey> for KeyRef<'_> {
    fn equivalent(&self, key: &StateKey) -> bool {
        *self.kind == key.kind && self.index == key.index && self.socket == key.socket
    }
}

/// Flat keyed store of values recorded during one run, in first-write order.
#[derive(Debug, Default)]
pub struct StateStore {
    values: IndexMap<StateKey, Value>,
}

impl StateStore {
    pub fn new() -> Self {
        StateStore::default()
    }

    /// Records a value, replacing any earlier value under the same key.
    pub fn record(
        &mut self,
        kind: EntityKind,
        index: NodeIndex,
        socket: impl Into<String>,
        value: Value,
    ) {
        let key = StateKey {
            kind,
            index,
            socket: socket.into(),
        };
        self.values.insert(key, value);
    }

    /// Reads a recorded value. Never creates entries.
    pub fn read(&self, kind: &EntityKind, index: NodeIndex, socket: &str) -> Option<&Value> {
        self.values.get(&KeyRef {
            kind,
            index,
            socket,
        })
    }

    /// Shorthand for reading a node output.
    pub fn node_output(&self, index: NodeIndex, socket: &str) -> Option<&Value> {
        self.read(&EntityKind::NODE, index, socket)
    }

    /// Removes every recorded value.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over every recorded value in first-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &Value)> {
        self.values.iter()
    }

    /// All sockets recorded for one entity, sorted by socket name.
    pub fn sockets(&self, kind: &EntityKind, index: NodeIndex) -> Vec<(&str, &Value)> {
        let mut sockets: Vec<(&str, &Value)> = self
            .values
            .iter()
            .filter(|(key, _)| &key.kind == kind && key.index == index)
            .map(|(key, value)| (key.socket.as_str(), value))
            .collect();
        sockets.sort_by(|a, b| a.0.cmp(b.0));
        sockets
    }
}
