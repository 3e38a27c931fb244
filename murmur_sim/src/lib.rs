//! Murmur scenario harness.
//!
//! Drives the `murmur_core` engine through named scenario presets,
//! judges each run against the invariants every scenario must hold,
//! and exports run artifacts as JSON. This crate realizes the request
//! and reporting boundaries of the core; the core itself owns no wire
//! format.

pub mod exporter;
pub mod runner;
pub mod scenarios;

pub use exporter::{RunExport, RunFrame};
pub use runner::{ScenarioArtifacts, ScenarioReport, ScenarioRunner};
pub use scenarios::ScenarioId;
