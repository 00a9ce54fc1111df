//! Storage traits for patient records

use async_trait::async_trait;
use pacientes_models::Patient;

use crate::Result;

/// Read access to the patient table plus a way to open a write transaction.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Open a transaction. Dropping it without [`PatientTransaction::commit`] rolls back.
    async fn begin(&self) -> Result<Box<dyn PatientTransaction>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>>;

    /// All patients ordered by id.
    async fn find_all(&self) -> Result<Vec<Patient>>;

    async fn count_all(&self) -> Result<i64>;
}

/// A unit of work over the patient table.
///
/// Existence checks and the write that follows them run on the same
/// transaction, so a failed check leaves the table untouched.
#[async_trait]
pub trait PatientTransaction: Send {
    /// Fetch a patient and lock its row until the transaction ends.
    async fn find_by_id_for_update(&mut self, id: i64) -> Result<Option<Patient>>;

    async fn exists_by_id(&mut self, id: i64) -> Result<bool>;

    async fn exists_by_identity_number(&mut self, identity_number: &str) -> Result<bool>;

    /// Insert when `patient.id` is `None`, update by id otherwise.
    ///
    /// Returns the stored patient (with its id). A CPF already held by another
    /// row fails with [`crate::Error::AlreadyExists`].
    async fn save(&mut self, patient: Patient) -> Result<Patient>;

    /// Bulk insert of unsaved patients. Returns the number of rows written.
    async fn save_all(&mut self, patients: Vec<Patient>) -> Result<u64>;

    /// Returns `false` when no row had that id.
    async fn delete_by_id(&mut self, id: i64) -> Result<bool>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
