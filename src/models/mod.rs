pub mod catalog;
pub mod report;
pub mod tally;

pub use catalog::{normalize, ExpectedItem, MasterCatalog};
pub use report::{ExcessEntry, ReconciliationReport};
pub use tally::ScanTally;
