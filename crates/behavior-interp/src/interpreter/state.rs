//! Interpreter state machine and the graph walk.
//!
//! The [`Interpreter`] evaluates one node at a time and follows the
//! successor each behavior names. The running state lives inside
//! [`Interpreter::run`] as the index of the current node; callers only
//! observe the outcome of the last run:
//!
//! - `Ready` before the first run.
//! - `Halted` once a behavior returns no successor.
//! - `Aborted` when any [`RuntimeError`] is raised.
//!
//! There is no cycle detection. A graph whose behaviors always name a
//! successor runs until [`InterpreterConfig::max_steps`] is hit, or forever
//! when no ceiling is configured.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use behavior_core::{BehaviorGraph, Node, NodeIndex};

use super::binding::BindingContext;
use super::error::RuntimeError;
use super::registry::{NodeInput, NodeRegistry};
use super::resolve::resolve_parameters;
use super::store::{EntityKind, StateStore};
use super::trace::TraceEntry;

/// Outcome of the interpreter's last run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    /// No run has started yet.
    Ready,
    /// The last run reached a node without a successor.
    Halted { last: NodeIndex, steps: usize },
    /// The last run stopped on an error.
    Aborted { error: RuntimeError },
}

/// Configuration for the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Whether to record execution traces.
    pub trace_enabled: bool,
    /// Ceiling on node evaluations per run. `None` (the default) leaves the
    /// walk unbounded.
    pub max_steps: Option<usize>,
}

/// The behavior graph interpreter.
///
/// Holds the shared node registry, the binding context, and the per-run
/// [`StateStore`]. `run` takes `&mut self`, so an instance serves one run
/// at a time; independent instances can run in parallel since all mutable
/// state is instance-local.
pub struct Interpreter {
    /// Node behaviors, shared read-only.
    registry: Arc<NodeRegistry>,
    /// Host accessors, kept across runs.
    context: BindingContext,
    /// Configuration.
    config: InterpreterConfig,
    /// Outputs recorded during the current (or last) run.
    store: StateStore,
    /// Execution trace (when enabled).
    trace: Option<Vec<TraceEntry>>,
    /// Outcome of the last run.
    state: RunState,
    /// Nodes evaluated in the current (or last) run.
    steps: usize,
}

impl Interpreter {
    /// Creates a new interpreter in the Ready state.
    pub fn new(
        registry: Arc<NodeRegistry>,
        context: BindingContext,
        config: InterpreterConfig,
    ) -> Self {
        let trace = if config.trace_enabled {
            Some(Vec::new())
        } else {
            None
        };

        Interpreter {
            registry,
            context,
            config,
            store: StateStore::new(),
            trace,
            state: RunState::Ready,
            steps: 0,
        }
    }

    /// Walks `nodes` from `entry` until a behavior names no successor.
    ///
    /// State recorded by any earlier run is cleared first. References must
    /// point at nodes already evaluated in this run.
    ///
    /// # Errors
    ///
    /// Any [`RuntimeError`] aborts the run immediately. Outputs recorded
    /// before the failure stay readable through [`store`](Self::store)
    /// until the next run starts.
    pub fn run(&mut self, entry: NodeIndex, nodes: &[Node]) -> Result<(), RuntimeError> {
        self.store.reset();
        self.steps = 0;
        if let Some(trace) = &mut self.trace {
            trace.clear();
        }

        tracing::debug!(entry = %entry, nodes = nodes.len(), "starting behavior run");

        match self.walk(entry, nodes) {
            Ok(last) => {
                tracing::debug!(last = %last, steps = self.steps, "behavior run halted");
                self.state = RunState::Halted {
                    last,
                    steps: self.steps,
                };
                Ok(())
            }
            Err(error) => {
                tracing::debug!(steps = self.steps, %error, "behavior run aborted");
                self.state = RunState::Aborted {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Runs a graph document from its own entry index.
    pub fn run_graph(&mut self, graph: &BehaviorGraph) -> Result<(), RuntimeError> {
        self.run(graph.entry, &graph.nodes)
    }

    /// Returns the outcome of the last run.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Returns the outputs recorded by the current (or last) run.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Returns the execution trace (if tracing was enabled).
    pub fn trace(&self) -> Option<&[TraceEntry]> {
        self.trace.as_deref()
    }

    /// Number of nodes evaluated by the current (or last) run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn context(&self) -> &BindingContext {
        &self.context
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Internal methods
    // -----------------------------------------------------------------------

    /// The control loop. Returns the index of the node that halted the run.
    fn walk(&mut self, entry: NodeIndex, nodes: &[Node]) -> Result<NodeIndex, RuntimeError> {
        let mut current = entry;
        let mut from = None;

        loop {
            let node = node_at(nodes, current, from)?;

            if let Some(limit) = self.config.max_steps {
                if self.steps >= limit {
                    return Err(RuntimeError::StepLimitExceeded {
                        limit,
                        node: current,
                    });
                }
            }

            let next = self.eval_node(current, node)?;
            self.steps += 1;

            match next {
                Some(next) => {
                    from = Some(current);
                    current = next;
                }
                None => return Ok(current),
            }
        }
    }

    /// Evaluates one node and records its outputs. Returns its successor.
    ///
    /// Lookup and resolution both happen before the behavior runs, so a
    /// node that fails either leaves the store untouched.
    fn eval_node(
        &mut self,
        index: NodeIndex,
        node: &Node,
    ) -> Result<Option<NodeIndex>, RuntimeError> {
        let behavior =
            self.registry
                .get(&node.node_type)
                .ok_or_else(|| RuntimeError::UnknownNodeType {
                    node: index,
                    node_type: node.node_type.clone(),
                })?;

        let parameters = resolve_parameters(index, &node.parameters, &self.store)?;

        let input = NodeInput {
            index,
            node_type: &node.node_type,
            parameters: &parameters,
            flow: &node.flow,
        };
        let output = behavior
            .evaluate(input, &self.context)
            .map_err(|err| RuntimeError::BehaviorFailed {
                node: index,
                node_type: node.node_type.clone(),
                message: err.message,
            })?;

        tracing::trace!(
            node = %index,
            node_type = %node.node_type,
            next = ?output.next_flow,
            "evaluated behavior node"
        );

        if let Some(trace) = &mut self.trace {
            trace.push(TraceEntry {
                node: index,
                node_type: node.node_type.clone(),
                parameters,
                outputs: output.result.clone(),
                next: output.next_flow,
            });
        }

        for (socket, value) in output.result {
            self.store.record(EntityKind::NODE, index, socket, value);
        }

        Ok(output.next_flow)
    }
}

/// Bounds-checked node lookup. `from` names the node that chose `index`.
fn node_at(
    nodes: &[Node],
    index: NodeIndex,
    from: Option<NodeIndex>,
) -> Result<&Node, RuntimeError> {
    nodes
        .get(index.as_usize())
        .ok_or(RuntimeError::InvalidGraphStructure {
            index,
            len: nodes.len(),
            from,
        })
}
