//! Patient persistence

pub mod memory;
pub mod store;
pub mod traits;

pub use memory::InMemoryPatientStore;
pub use store::PostgresPatientStore;
pub use traits::{PatientStore, PatientTransaction};
