//! Behavior graph interpreter.
//!
//! Walks an ordered node sequence from an entry index. Each step looks the
//! node's type up in the [`NodeRegistry`], resolves its parameters against
//! outputs recorded earlier in the run, invokes the behavior, records the
//! outputs, and moves to whichever node the behavior named next.
//!
//! # Architecture
//!
//! - [`NodeRegistry`] maps type keys (`"math.add"`) to [`NodeBehavior`]s.
//! - [`resolve_parameters`] substitutes references with recorded outputs.
//! - [`StateStore`] holds `(entity, index, socket) -> value` for one run and
//!   is cleared at the start of every run.
//! - [`BindingContext`] carries the optional host getter/setter, which
//!   outlive individual runs.
//! - [`Interpreter`] runs the control loop and tracks [`RunState`].
//! - [`RuntimeError`] covers every way a run can abort.
//! - [`TraceEntry`] records each node evaluation when tracing is enabled.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = NodeRegistry::new();
//! registry.register_fn("math.const", |input, _| {
//!     Ok(NodeOutput::halt()
//!         .with("out", input.param("value").cloned().unwrap_or_default())
//!         .with_next(input.flow_index("next")?))
//! });
//! let mut interp = Interpreter::new(Arc::new(registry), BindingContext::new(), InterpreterConfig::default());
//! interp.run(NodeIndex(0), &graph.nodes)?;
//! ```

pub mod binding;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod state;
pub mod store;
pub mod trace;

pub use binding::{BindingContext, JsonDocument};
pub use error::RuntimeError;
pub use registry::{NodeBehavior, NodeError, NodeInput, NodeOutput, NodeRegistry};
pub use resolve::resolve_parameters;
pub use state::{Interpreter, InterpreterConfig, RunState};
pub use store::{EntityKind, StateKey, StateStore};
pub use trace::TraceEntry;
