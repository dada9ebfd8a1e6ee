//! In-memory host implementation for tests and simulation.

use crate::context::HostContext;
use crate::error::HostError;
use crate::palette::{Accelerator, Command, CommandPalette, MenuId};
use crate::types::{Severity, TrajectoryId};
use nalgebra::Point3;
use std::collections::HashMap;

/// A notification captured by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMessage {
    pub message: String,
    pub detail: String,
    pub severity: Severity,
}

/// A merge request captured by [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRequest {
    pub source: TrajectoryId,
    pub target: TrajectoryId,
}

struct StoredTrajectory {
    label: Option<String>,
    samples: Vec<Option<Point3<f64>>>,
    /// When set, bulk history fetches fail with a shape mismatch
    corrupted: bool,
}

/// In-memory trajectory store, UI state, and notification sink.
///
/// Every notification and merge request is recorded so tests can assert on
/// the exact operator-visible outcome of a command.
pub struct MemoryHost {
    trajectories: HashMap<TrajectoryId, StoredTrajectory>,
    selection: Vec<TrajectoryId>,
    current_frame: usize,
    sample_rate_hz: f64,
    next_seed: u64,
    /// All notifications, in emission order
    pub messages: Vec<RecordedMessage>,
    /// All merge requests, in emission order
    pub merges: Vec<MergeRequest>,
}

impl MemoryHost {
    /// Creates an empty host at the given capture rate.
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            trajectories: HashMap::new(),
            selection: Vec::new(),
            current_frame: 0,
            sample_rate_hz,
            next_seed: 0,
            messages: Vec::new(),
            merges: Vec::new(),
        }
    }

    /// Inserts a trajectory and returns its id.
    ///
    /// Ids are derived from an internal counter so captures built in the same
    /// order get the same ids regardless of process entropy.
    pub fn insert(
        &mut self,
        label: Option<&str>,
        samples: Vec<Option<Point3<f64>>>,
    ) -> TrajectoryId {
        let id = TrajectoryId::from_seed(self.next_seed);
        self.next_seed += 1;
        self.trajectories.insert(
            id,
            StoredTrajectory {
                label: label.map(str::to_string),
                samples,
                corrupted: false,
            },
        );
        id
    }

    /// Replaces the UI selection.
    pub fn select(&mut self, ids: &[TrajectoryId]) {
        self.selection = ids.to_vec();
    }

    /// Moves the timeline to the given frame.
    pub fn set_current_frame(&mut self, frame: usize) {
        self.current_frame = frame;
    }

    /// Marks a trajectory so that bulk history fetches fail with a
    /// [`HostError::ShapeMismatch`].
    pub fn corrupt(&mut self, id: TrajectoryId) {
        if let Some(stored) = self.trajectories.get_mut(&id) {
            stored.corrupted = true;
        }
    }

    /// Direct read access to a trajectory's samples, for assertions.
    pub fn samples(&self, id: TrajectoryId) -> Option<&[Option<Point3<f64>>]> {
        self.trajectories.get(&id).map(|t| t.samples.as_slice())
    }

    /// The most recent notification, if any.
    pub fn last_message(&self) -> Option<&RecordedMessage> {
        self.messages.last()
    }

    fn stored(&self, id: TrajectoryId) -> Result<&StoredTrajectory, HostError> {
        self.trajectories
            .get(&id)
            .ok_or(HostError::UnknownTrajectory(id))
    }
}

impl HostContext for MemoryHost {
    fn selections(&self) -> Vec<TrajectoryId> {
        self.selection.clone()
    }

    fn current_frame(&self) -> usize {
        self.current_frame
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate_hz
    }

    fn label(&self, id: TrajectoryId) -> Result<Option<String>, HostError> {
        Ok(self.stored(id)?.label.clone())
    }

    fn sample_at(&self, id: TrajectoryId, frame: usize) -> Result<Option<Point3<f64>>, HostError> {
        Ok(self.stored(id)?.samples.get(frame).copied().flatten())
    }

    fn history(&self, id: TrajectoryId) -> Result<Vec<Option<Point3<f64>>>, HostError> {
        let stored = self.stored(id)?;
        if stored.corrupted {
            return Err(HostError::shape(id, "sample block has inconsistent dimensions"));
        }
        Ok(stored.samples.clone())
    }

    fn move_parts(&mut self, source: TrajectoryId, target: TrajectoryId) -> Result<(), HostError> {
        // Both ends must exist before the source is drained
        if !self.trajectories.contains_key(&target) {
            return Err(HostError::UnknownTrajectory(target));
        }
        let src = self
            .trajectories
            .get_mut(&source)
            .ok_or(HostError::UnknownTrajectory(source))?;
        let moved: Vec<(usize, Point3<f64>)> = src
            .samples
            .iter()
            .enumerate()
            .filter_map(|(frame, s)| s.map(|p| (frame, p)))
            .collect();
        src.samples.iter_mut().for_each(|s| *s = None);

        let dst = self
            .trajectories
            .get_mut(&target)
            .ok_or(HostError::UnknownTrajectory(target))?;
        for (frame, position) in moved {
            if frame >= dst.samples.len() {
                dst.samples.resize(frame + 1, None);
            }
            // Reassigned points are authoritative at their frame
            dst.samples[frame] = Some(position);
        }

        self.merges.push(MergeRequest { source, target });
        Ok(())
    }

    fn add_message(&mut self, message: &str, detail: &str, severity: Severity) {
        self.messages.push(RecordedMessage {
            message: message.to_string(),
            detail: detail.to_string(),
            severity,
        });
    }
}

/// Recording command palette for tests and simulation.
#[derive(Debug, Default)]
pub struct MemoryPalette {
    pub commands: Vec<(String, Command)>,
    pub submenus: Vec<String>,
    pub items: Vec<(MenuId, String, String)>,
    pub accelerators: Vec<(Accelerator, String)>,
}

impl CommandPalette for MemoryPalette {
    fn add_command(&mut self, name: &str, command: Command) {
        self.commands.push((name.to_string(), command));
    }

    fn insert_submenu(&mut self, title: &str) -> MenuId {
        self.submenus.push(title.to_string());
        (self.submenus.len() - 1) as MenuId
    }

    fn add_menu_item(&mut self, menu: MenuId, label: &str, command_name: &str) {
        self.items
            .push((menu, label.to_string(), command_name.to_string()));
    }

    fn set_accelerator(&mut self, accelerator: Accelerator, command_name: &str) {
        self.accelerators.push((accelerator, command_name.to_string()));
    }
}
