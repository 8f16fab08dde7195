pub mod engine;

pub use engine::{ReconError, ReconciliationEngine, ScanOutcome};
