//! Business logic layer
//!
//! Services run validation, conflict checks and merges inside a store
//! transaction, and own the startup CSV import.

pub mod conflicts;
pub mod import;
pub mod patients;

pub use import::{ImportError, ImportOutcome, PatientImporter};
pub use patients::PatientService;
