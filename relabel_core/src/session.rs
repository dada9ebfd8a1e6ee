//! The operator command layer.
//!
//! [`FixSession`] owns the trouble pool and exposes the commands the host
//! palette registers. Every failure is converted into an operator
//! notification at this boundary; nothing propagates to the host as a fault,
//! and nothing is retried - the operator re-triggers after fixing the
//! selection or the data.

use crate::resolver::{self, FixError, Resolution};
use crate::spike;
use crate::trouble_pool::TroublePool;
use relabel_host::{Command, HostContext, Severity, TrajectoryId};

/// One operator's repair session: the candidate pool plus the command
/// handlers around it.
///
/// Sessions are plain owned values. Two sessions against the same host do
/// not interfere except through the host's own trajectory store.
#[derive(Debug, Default)]
pub struct FixSession {
    pool: TroublePool,
}

impl FixSession {
    /// Creates a session with an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the candidate pool.
    pub fn pool(&self) -> &TroublePool {
        &self.pool
    }

    /// Dispatches a palette command to its handler.
    pub fn run<H: HostContext>(&mut self, host: &mut H, command: Command) {
        match command {
            Command::LoadTroubleTrajectories => self.load_trouble_trajectories(host),
            Command::FixTroubleTrajectory => self.fix_trouble_trajectory(host),
            Command::UnloadTroubleTrajectories => self.unload_trouble_trajectories(),
        }
    }

    /// Flags the host's current selection as the candidate pool.
    pub fn load_trouble_trajectories<H: HostContext>(&mut self, host: &mut H) {
        self.pool.load(host);
    }

    /// Clears the candidate pool.
    pub fn unload_trouble_trajectories(&mut self) {
        self.pool.unload();
    }

    /// Resolves the selected problem trajectory against the pool at the
    /// timeline's current frame and merges it into the winner.
    ///
    /// Precondition violations abort with an error notification and no merge:
    /// the pool must be loaded and exactly one trajectory selected.
    pub fn fix_trouble_trajectory<H: HostContext>(&mut self, host: &mut H) {
        let selections = host.selections();
        if self.pool.is_empty() {
            host.add_message("No trouble trajectories loaded.", "", Severity::Error);
        } else if selections.len() > 1 {
            host.add_message("Multiple trajectories selected.", "", Severity::Error);
        } else if selections.is_empty() {
            host.add_message("No trajectories selected.", "", Severity::Error);
        } else {
            self.fix(host, selections[0]);
        }
    }

    fn fix<H: HostContext>(&mut self, host: &mut H, problem: TrajectoryId) {
        let reference_frame = host.current_frame();
        match resolver::resolve(host, &self.pool, problem, reference_frame) {
            Ok(resolution) => self.apply(host, problem, resolution),
            Err(error) => notify_error(host, &error),
        }
    }

    /// Requests the merge and announces the winning label.
    ///
    /// The label is checked before the merge: a winner that lost its label
    /// since loading is a store inconsistency, and aborting beats merging
    /// into a trajectory the operator can no longer name.
    fn apply<H: HostContext>(&mut self, host: &mut H, problem: TrajectoryId, resolution: Resolution) {
        let label = match host.label(resolution.winner) {
            Ok(Some(label)) => label,
            Ok(None) => {
                host.add_message(
                    "Winning trajectory has no label.",
                    &resolution.winner.to_string(),
                    Severity::Error,
                );
                return;
            }
            Err(error) => {
                host.add_message(&error.to_string(), &resolution.winner.to_string(), Severity::Error);
                return;
            }
        };

        if let Err(error) = host.move_parts(problem, resolution.winner) {
            host.add_message(&error.to_string(), "", Severity::Error);
            return;
        }

        host.add_message(&format!("Labeled as: {label}"), "", Severity::Info);
    }

    /// Reports acceleration spikes in every selected trajectory.
    ///
    /// Observational only: spike frames go to the notification sink, the
    /// trajectory data is left untouched.
    pub fn print_spikes<H: HostContext>(&mut self, host: &mut H) {
        let rate = host.sample_rate();
        for id in host.selections() {
            let name = match host.label(id) {
                Ok(Some(label)) => label,
                _ => id.to_string(),
            };
            match host.history(id) {
                Ok(history) => {
                    let spikes = spike::find_spikes(&history, rate);
                    let message = format!("{name}: {} spike(s)", spikes.len());
                    host.add_message(&message, &format!("{spikes:?}"), Severity::Info);
                }
                Err(error) => {
                    host.add_message(&error.to_string(), &name, Severity::Error);
                }
            }
        }
    }
}

/// Maps a resolution error onto the operator-facing notification, carrying
/// the underlying detail the way the failure surfaced it.
fn notify_error<H: HostContext>(host: &mut H, error: &FixError) {
    match error {
        FixError::NoReferenceSample { .. } => {
            host.add_message(&error.to_string(), "", Severity::Error);
        }
        FixError::Store { source, candidates } => {
            host.add_message(&source.to_string(), &format!("{candidates:?}"), Severity::Error);
        }
        FixError::NoVotes => {
            // Detail shows the (empty) most-common computation
            host.add_message(&error.to_string(), "[]", Severity::Error);
        }
    }
}
