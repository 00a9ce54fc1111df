//! Patient record model
//!
//! Data types shared by the server and the bulk importer:
//! - [`Patient`]: the stored entity
//! - request payloads ([`PatientRequest`], [`PatientPatch`], [`FlagsPatch`]) and
//!   their validation rules
//! - [`PatientResponse`]: the wire representation
//! - [`merge`]: full replace / partial patch semantics
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod merge;
pub mod patient;
pub mod payload;

pub use error::ValidationFailure;
pub use merge::{apply_flags_patch, apply_full_replace, apply_partial_patch};
pub use patient::{Patient, PatientResponse};
pub use payload::{FlagsPatch, PatientPatch, PatientRequest};
