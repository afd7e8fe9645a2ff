//! Execution progress aggregation.
//!
//! Turns an [`ExecutionStateSnapshot`] into completion percentages for live
//! progress bars. Every `(step, node)` pair is one unit of work; a unit is
//! finished once its state is terminal (see
//! [`is_terminal_state`](crate::execution_state::is_terminal_state)).
//!
//! Degenerate input never errors: an absent or empty snapshot yields `0.0`
//! and an empty per-node map.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::execution_state::ExecutionStateSnapshot;

/// Outbound progress payload for a single execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub overall_progress_percent: f64,
    pub per_node: BTreeMap<String, f64>,
}

/// Finished / total tally for a set of work units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitTally {
    pub finished: usize,
    pub total: usize,
}

impl UnitTally {
    fn record(&mut self, finished: bool) {
        self.total += 1;
        if finished {
            self.finished += 1;
        }
    }

    /// Completion percentage, `0.0` when there is nothing to count.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.finished as f64 / self.total as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Overall completion percentage across every unit of work.
///
/// No rounding is applied; callers format for display.
pub fn compute_overall_progress(snapshot: Option<&ExecutionStateSnapshot>) -> f64 {
    let mut tally = UnitTally::default();
    if let Some(snapshot) = snapshot {
        for (_, state) in snapshot.units() {
            tally.record(state.is_finished());
        }
    }
    tally.percent()
}

/// Per-node tallies. A node's total is the number of steps it appears in.
pub fn tally_per_node(snapshot: &ExecutionStateSnapshot) -> BTreeMap<String, UnitTally> {
    let mut tallies: BTreeMap<String, UnitTally> = BTreeMap::new();
    for (node, state) in snapshot.units() {
        tallies
            .entry(node.to_string())
            .or_default()
            .record(state.is_finished());
    }
    tallies
}

/// Completion percentage for every node observed in any step.
pub fn compute_progress_per_node(
    snapshot: Option<&ExecutionStateSnapshot>,
) -> BTreeMap<String, f64> {
    match snapshot {
        Some(snapshot) => tally_per_node(snapshot)
            .into_iter()
            .map(|(node, tally)| (node, tally.percent()))
            .collect(),
        None => BTreeMap::new(),
    }
}

/// Return a copy of `snapshot` with every node state's `progress_percent`
/// set to that node's per-node percentage. The input is left untouched.
pub fn annotate_node_progress(snapshot: &ExecutionStateSnapshot) -> ExecutionStateSnapshot {
    let per_node = compute_progress_per_node(Some(snapshot));
    let mut annotated = snapshot.clone();
    for step in &mut annotated.steps {
        for (node, state) in &mut step.node_states {
            state.progress_percent = Some(per_node.get(node).copied().unwrap_or(0.0));
        }
    }
    annotated
}

/// Build the full annotated snapshot: per-node progress on every node state
/// plus `overall_progress`. An absent snapshot becomes an empty one at `0.0`.
pub fn compute_progress_detail(snapshot: Option<ExecutionStateSnapshot>) -> ExecutionStateSnapshot {
    let snapshot = snapshot.unwrap_or_default();
    let overall = compute_overall_progress(Some(&snapshot));
    let mut annotated = annotate_node_progress(&snapshot);
    annotated.overall_progress = Some(overall);
    annotated
}

/// Scalar and per-node progress in one payload.
pub fn summarize(snapshot: Option<&ExecutionStateSnapshot>) -> ProgressSummary {
    ProgressSummary {
        overall_progress_percent: compute_overall_progress(snapshot),
        per_node: compute_progress_per_node(snapshot),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
