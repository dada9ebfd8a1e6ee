//! Relabel Host Abstraction Layer
//!
//! This crate is the boundary between the label-repair engines and the host
//! motion-capture application. The engines never touch trajectory storage
//! directly; everything goes through the [`HostContext`] capability trait:
//! - Selection and timeline state (`selections()`, `current_frame()`)
//! - Trajectory data (`label()`, `sample_at()`, `history()`)
//! - The one external mutation the engines request (`move_parts()`)
//! - Operator-facing notifications (`add_message()`)
//!
//! # Implementations
//!
//! - **Production**: an FFI bridge into the capture application (out of scope
//!   for this workspace)
//! - **Tests / Simulation**: [`MemoryHost`] - an in-memory store that records
//!   every notification and merge request for inspection
//!
//! All operations are synchronous. The host application serializes operator
//! commands on its UI thread, so there is no concurrent invocation to guard
//! against.

mod context;
mod error;
mod memory;
mod palette;
mod types;

pub use context::HostContext;
pub use error::HostError;
pub use memory::{MemoryHost, MemoryPalette, MergeRequest, RecordedMessage};
pub use palette::{register_menu, Accelerator, Command, CommandPalette, MenuId, FIX_MENU_TITLE};
pub use types::{Severity, TrajectoryId};
