//! External binding context.
//!
//! A [`BindingContext`] is the only channel through which node behaviors
//! reach state outside the graph. It holds an optional getter and an
//! optional setter addressing host state by a path-like key, and lives as
//! long as the interpreter: unlike the per-run [`StateStore`], it is never
//! reset between runs.
//!
//! [`JsonDocument`] is a ready-made host for the common case of a JSON
//! object model addressed by JSON Pointer (RFC 6901).
//!
//! [`StateStore`]: super::store::StateStore

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use behavior_core::Value;

type Getter = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;
type Setter = Arc<dyn Fn(&str, Value) + Send + Sync>;

/// Optional accessors for host state, passed to every node evaluation.
#[derive(Clone, Default)]
pub struct BindingContext {
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl BindingContext {
    /// A context with neither accessor installed.
    pub fn new() -> Self {
        BindingContext::default()
    }

    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&str, Value) + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Binds both accessors to a shared JSON document.
    pub fn from_document(document: JsonDocument) -> Self {
        let reader = document.clone();
        BindingContext::new()
            .with_getter(move |path| reader.get(path))
            .with_setter(move |path, value| document.set(path, value))
    }

    /// Reads host state. Returns `None` when no getter is installed or the
    /// getter has nothing at `path`.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.getter.as_ref().and_then(|getter| getter(path))
    }

    /// Writes host state. Without a setter the write is dropped.
    pub fn set(&self, path: &str, value: Value) {
        match &self.setter {
            Some(setter) => setter(path, value),
            None => tracing::debug!(path, "no setter bound, dropping external write"),
        }
    }

    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// JSON Pointer document
// ---------------------------------------------------------------------------

/// A shared JSON document addressed by JSON Pointer.
///
/// Clones share the same underlying document, so a clone handed to a
/// [`BindingContext`] and one kept by the host observe the same writes.
#[derive(Debug, Clone, Default)]
pub struct JsonDocument {
    root: Arc<Mutex<Value>>,
}

impl JsonDocument {
    pub fn new(root: Value) -> Self {
        JsonDocument {
            root: Arc::new(Mutex::new(root)),
        }
    }

    /// Returns a copy of the value at `pointer`.
    pub fn get(&self, pointer: &str) -> Option<Value> {
        self.lock().pointer(pointer).cloned()
    }

    /// Writes `value` at `pointer`.
    ///
    /// Replaces an existing value; otherwise inserts the final token into an
    /// existing parent object, or appends to a parent array when the final
    /// token is `-`. Writes with no existing parent are dropped.
    pub fn set(&self, pointer: &str, value: Value) {
        let mut root = self.lock();

        if let Some(slot) = root.pointer_mut(pointer) {
            *slot = value;
            return;
        }

        let Some((parent_pointer, token)) = pointer.rsplit_once('/') else {
            tracing::warn!(pointer, "invalid JSON pointer, dropping external write");
            return;
        };
        let token = unescape_token(token);

        match root.pointer_mut(parent_pointer) {
            Some(Value::Object(map)) => {
                map.insert(token, value);
            }
            Some(Value::Array(items)) if token == "-" => items.push(value),
            _ => tracing::warn!(pointer, "no parent at JSON pointer, dropping external write"),
        }
    }

    /// Returns a copy of the whole document.
    pub fn snapshot(&self) -> Value {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        // Mutations are single assignments, so a poisoned document is still consistent.
        self.root.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_context_reads_nothing_and_drops_writes() {
        let ctx = BindingContext::new();
        assert!(!ctx.has_getter());
        assert!(!ctx.has_setter());
        assert_eq!(ctx.get("/anything"), None);
        ctx.set("/anything", json!(1));
    }

    #[test]
    fn closures_are_forwarded_verbatim() {
        let writes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&writes);
        let ctx = BindingContext::new()
            .with_getter(|path| Some(json!(path.len())))
            .with_setter(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(ctx.get("/abc"), Some(json!(4)));
        ctx.set("/x", json!(null));
        ctx.set("/y", json!(null));
        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cloned_contexts_share_accessors() {
        let doc = JsonDocument::new(json!({ "a": 1 }));
        let ctx = BindingContext::from_document(doc.clone());
        let other = ctx.clone();

        other.set("/a", json!(2));
        assert_eq!(ctx.get("/a"), Some(json!(2)));
        assert_eq!(doc.snapshot(), json!({ "a": 2 }));
    }

    #[test]
    fn document_get_follows_pointers() {
        let doc = JsonDocument::new(json!({
            "nodes": [{ "translation": [0.0, 1.0, 2.0] }],
            "a/b": { "m~n": true }
        }));
        assert_eq!(doc.get("/nodes/0/translation/1"), Some(json!(1.0)));
        assert_eq!(doc.get("/a~1b/m~0n"), Some(json!(true)));
        assert_eq!(doc.get("/nodes/3"), None);
        assert_eq!(doc.get(""), Some(doc.snapshot()));
    }

    #[test]
    fn document_set_replaces_and_inserts() {
        let doc = JsonDocument::new(json!({ "nodes": [{ "name": "a" }] }));

        doc.set("/nodes/0/name", json!("b"));
        doc.set("/nodes/0/visible", json!(false));
        doc.set("/nodes/-", json!({ "name": "c" }));
        doc.set("/extras~1x", json!(1));

        assert_eq!(
            doc.snapshot(),
            json!({
                "nodes": [{ "name": "b", "visible": false }, { "name": "c" }],
                "extras/x": 1
            })
        );
    }

    #[test]
    fn document_set_without_parent_is_dropped() {
        let doc = JsonDocument::new(json!({ "nodes": [] }));
        doc.set("/missing/child", json!(1));
        doc.set("/nodes/5", json!(1));
        doc.set("no-leading-slash", json!(1));
        assert_eq!(doc.snapshot(), json!({ "nodes": [] }));
    }

    #[test]
    fn root_pointer_replaces_document() {
        let doc = JsonDocument::new(json!({ "old": true }));
        doc.set("", json!({ "new": true }));
        assert_eq!(doc.snapshot(), json!({ "new": true }));
    }
}
