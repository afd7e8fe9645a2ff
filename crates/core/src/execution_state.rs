//! Execution-state snapshot model.
//!
//! Mirrors the hierarchical report returned by the job-orchestration engine:
//! `{ steps: [ { nodeStates: { <node>: { executionState, ... } } } ] }`.
//! Fields the engine sends that are not modelled here are kept in `extra`
//! so they survive a round trip to the client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATE_SUCCEEDED: &str = "SUCCEEDED";
pub const STATE_FAILED: &str = "FAILED";
pub const STATE_ABORTED: &str = "ABORTED";
pub const STATE_SKIPPED: &str = "SKIPPED";

/// Execution states after which a (step, node) unit does no more work.
pub const TERMINAL_STATES: &[&str] = &[STATE_SUCCEEDED, STATE_FAILED, STATE_ABORTED, STATE_SKIPPED];

/// Whether a raw execution state counts as finished.
///
/// Matching is case-insensitive and exact otherwise. Unknown and missing
/// states are in progress.
pub fn is_terminal_state(state: Option<&str>) -> bool {
    match state {
        Some(s) => TERMINAL_STATES.iter().any(|t| t.eq_ignore_ascii_case(s)),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One point-in-time report of a running or finished execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStateSnapshot {
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Overall completion percentage, set by the progress aggregator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_progress: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One ordered unit of the execution plan, fanned out across nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub node_states: BTreeMap<String, NodeState>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// State of a single step on a single node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    #[serde(default)]
    pub execution_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NodeState {
    /// Build a node state with only the execution state set.
    pub fn with_state(state: &str) -> Self {
        Self {
            execution_state: Some(state.to_string()),
            ..Self::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        is_terminal_state(self.execution_state.as_deref())
    }
}

impl ExecutionStateSnapshot {
    /// Iterate every `(node name, node state)` unit of work across all steps.
    pub fn units(&self) -> impl Iterator<Item = (&str, &NodeState)> {
        self.steps
            .iter()
            .flat_map(|step| step.node_states.iter().map(|(n, s)| (n.as_str(), s)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
