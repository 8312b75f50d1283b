pub mod audit;
pub mod snapshot;

pub use audit::{AuditResult, ReconciliationEngine, Tolerances};
pub use snapshot::{BillOfLading, ExtractionData, Invoice, LineItem, PackingList, SnapshotError};
