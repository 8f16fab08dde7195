pub mod api;
pub mod config;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use models::{ExpectedItem, MasterCatalog, ReconciliationReport, ScanTally};
pub use service::{ReconError, ReconciliationEngine, ScanOutcome};
