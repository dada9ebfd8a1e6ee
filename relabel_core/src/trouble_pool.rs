//! The candidate pool of operator-flagged "trouble" trajectories.

use relabel_host::{HostContext, Severity, TrajectoryId};
use serde::{Deserialize, Serialize};

/// One flagged candidate: an identity plus the label it carried at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroubleEntry {
    pub id: TrajectoryId,
    pub label: String,
}

/// The working set of reference trajectories the voting resolver draws from.
///
/// Owned state, injected where needed - there is deliberately no process-wide
/// pool, so concurrent sessions and tests stay isolated. Each `load` replaces
/// the pool wholesale; pools are never merged incrementally.
#[derive(Debug, Default)]
pub struct TroublePool {
    entries: Vec<TroubleEntry>,
}

impl TroublePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pool with the labeled subset of the host's current
    /// selection and notifies the operator with the retained labels.
    ///
    /// Unlabeled trajectories are filtered out silently; so are selection
    /// entries the store can no longer resolve. An empty selection yields an
    /// empty pool and an empty summary list.
    pub fn load<H: HostContext>(&mut self, host: &mut H) {
        let mut entries = Vec::new();
        for id in host.selections() {
            if let Ok(Some(label)) = host.label(id) {
                entries.push(TroubleEntry { id, label });
            }
        }
        self.entries = entries;

        let summary: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
        let message = format!("Selected trajectories:\n{}", summary.join("\n"));
        host.add_message(&message, "", Severity::Info);
    }

    /// Clears the pool unconditionally.
    pub fn unload(&mut self) {
        self.entries.clear();
    }

    /// True when no candidates are loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of loaded candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The candidates, in the host's selection order.
    pub fn entries(&self) -> &[TroubleEntry] {
        &self.entries
    }
}
