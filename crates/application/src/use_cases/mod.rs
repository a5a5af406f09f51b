pub mod enumeration;

pub use enumeration::{
    AdmissionMonitor, AdmissionOutcome, AdmissionSnapshot, BoundedOrchestrator, DrainReport,
    EnumerationRun, OrchestratorSettings, QueryPlan, QuiescenceDetector, QuiescenceSettings,
    RunSummary, StopReason,
};
