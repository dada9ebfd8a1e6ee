//! Relabel Scenario Harness
//!
//! Synthesizes motion-capture recordings with a known mislabel event, drives
//! the full load → fix → unload flow against the in-memory host, and checks
//! that the voting resolver reassigns the stray fragment to the marker it
//! was cut from.
//!
//! Everything is derived from a single 64-bit seed: marker paths, noise,
//! dropout gaps, injected spikes, and the choice of donor marker. Any
//! failing run is reproducible from its seed number.

mod report;
mod runner;
mod world;

pub use report::{ReportEntry, RunReport};
pub use runner::{ScenarioId, ScenarioResult, ScenarioRunner};
pub use world::{generate, SyntheticCapture, WorldConfig};
