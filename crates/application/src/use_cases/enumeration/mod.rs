//! Concurrent resolution pipeline
//!
//! - `QueryPlan`: the ordered record types queried for each name
//! - `BoundedOrchestrator`: admission control and per-name resolution
//! - `QuiescenceDetector`: decides when the answer stream has drained
//! - `EnumerationRun`: wires the two together for one run

pub mod orchestrator;
pub mod query_plan;
pub mod quiescence;
pub mod run;

pub use orchestrator::{
    AdmissionMonitor, AdmissionOutcome, AdmissionSnapshot, BoundedOrchestrator,
    OrchestratorSettings,
};
pub use query_plan::QueryPlan;
pub use quiescence::{DrainReport, QuiescenceDetector, QuiescenceSettings, StopReason};
pub use run::{EnumerationRun, RunSummary};
