//! Relabel Core - Trajectory Label Repair for Motion Capture
//!
//! When a tracker mislabels or loses a marker mid-recording, the operator
//! flags the plausible owners as "trouble" trajectories and asks the engine
//! which one a stray fragment belongs to. This library answers that question
//! with two cooperating components:
//!
//! 1. **Candidate Pool** ([`trouble_pool`]): the operator-flagged reference
//!    trajectories, loaded wholesale from the host selection
//! 2. **Proximity Voting Resolver** ([`resolver`]): ranks every recorded
//!    sample of every candidate by distance to the fragment's reference
//!    position and lets the K nearest samples vote on the owner
//!
//! The [`session`] module binds both to the three operator commands and
//! converts every failure into a notification, and [`spike`] provides the
//! median cut filter for acceleration outliers.

pub mod geom;
pub mod resolver;
pub mod session;
pub mod spike;
pub mod trouble_pool;

// Re-export key types for convenience
pub use resolver::{DistanceVote, FixError, Resolution, CLOSEST_SAMPLES};
pub use session::FixSession;
pub use trouble_pool::{TroubleEntry, TroublePool};
