//! Error types for the host boundary.

use crate::types::TrajectoryId;

/// Errors returned by host boundary queries.
///
/// These are explicit values, not caught exceptions: the engines branch on
/// the variant and decide whether the failure is fatal for the current
/// operation or merely aborts it.
// `Display`/`Error` are implemented by hand rather than derived: the
// `MergeRejected` variant carries a field named `source` that is a plain
// `TrajectoryId`, not a wrapped error, which thiserror's `#[derive(Error)]`
// would try to treat as the `Error::source()` chain.
#[derive(Debug, Clone)]
pub enum HostError {
    /// The trajectory id is not present in the store
    UnknownTrajectory(TrajectoryId),

    /// The store returned sample data of an unexpected shape or type
    ShapeMismatch {
        trajectory: TrajectoryId,
        detail: String,
    },

    /// The store refused to reassign the source's points to the target
    MergeRejected {
        source: TrajectoryId,
        target: TrajectoryId,
        detail: String,
    },
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::UnknownTrajectory(id) => write!(f, "unknown trajectory {id}"),
            HostError::ShapeMismatch { trajectory, detail } => {
                write!(f, "malformed sample data for trajectory {trajectory}: {detail}")
            }
            HostError::MergeRejected {
                source,
                target,
                detail,
            } => write!(f, "merge of {source} into {target} rejected: {detail}"),
        }
    }
}

impl std::error::Error for HostError {}

impl HostError {
    /// Creates a shape-mismatch error.
    pub fn shape(trajectory: TrajectoryId, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            trajectory,
            detail: detail.into(),
        }
    }
}
