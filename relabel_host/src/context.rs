//! Core capability trait for the host motion-capture application.

use crate::error::HostError;
use crate::types::{Severity, TrajectoryId};
use nalgebra::Point3;

/// The central interface for host interaction.
///
/// This trait abstracts the capture application so the repair engines can run
/// against both the real host and an in-memory store.
///
/// # Implementations
///
/// - **Production**: FFI bridge into the capture application
/// - **Tests / Simulation**: [`MemoryHost`](crate::MemoryHost)
///
/// # Sample conventions
///
/// A position is `Option<Point3<f64>>` per frame: `None` means the tracker
/// lost the marker at that frame. Absent samples are excluded from all
/// computation downstream, never treated as the origin.
pub trait HostContext {
    /// Returns the trajectory ids currently selected in the host UI,
    /// in selection order.
    fn selections(&self) -> Vec<TrajectoryId>;

    /// Returns the timeline's current frame index.
    fn current_frame(&self) -> usize;

    /// Returns the capture sample rate in Hz.
    ///
    /// Needed to convert per-frame differences into accelerations.
    fn sample_rate(&self) -> f64;

    /// Returns the trajectory's human-readable label, or `None` if unlabeled.
    fn label(&self, id: TrajectoryId) -> Result<Option<String>, HostError>;

    /// Returns the trajectory's position at one frame, or `None` if the
    /// sample is absent.
    fn sample_at(&self, id: TrajectoryId, frame: usize) -> Result<Option<Point3<f64>>, HostError>;

    /// Returns the trajectory's full ordered position history, with `None`
    /// for absent samples.
    fn history(&self, id: TrajectoryId) -> Result<Vec<Option<Point3<f64>>>, HostError>;

    /// Requests that all points of `source` be reassigned to `target`.
    ///
    /// This is the single external mutation the repair engines ever trigger.
    fn move_parts(&mut self, source: TrajectoryId, target: TrajectoryId) -> Result<(), HostError>;

    /// Displays a notification to the operator.
    ///
    /// Purely observational: nothing is ever consumed back from the sink.
    fn add_message(&mut self, message: &str, detail: &str, severity: Severity);
}
