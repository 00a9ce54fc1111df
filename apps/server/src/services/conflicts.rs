//! Existence and CPF-uniqueness checks run before every write

use pacientes_models::Patient;

use crate::{
    db::PatientTransaction,
    error::{CPF_TAKEN, CPF_TAKEN_BY_OTHER},
    Error, Result,
};

/// Fails with `AlreadyExists` when any patient already holds `identity_number`.
pub async fn ensure_creatable(
    tx: &mut dyn PatientTransaction,
    identity_number: &str,
) -> Result<()> {
    if tx.exists_by_identity_number(identity_number).await? {
        return Err(Error::AlreadyExists(CPF_TAKEN.to_string()));
    }
    Ok(())
}

/// Loads patient `id` for an update that may change its CPF to `new_identity_number`.
///
/// Keeping the current CPF is always allowed; moving to a CPF held by another
/// patient fails with `AlreadyExists`.
pub async fn ensure_updatable(
    tx: &mut dyn PatientTransaction,
    id: i64,
    new_identity_number: &str,
) -> Result<Patient> {
    let current = ensure_exists(tx, id).await?;

    if current.identity_number != new_identity_number
        && tx.exists_by_identity_number(new_identity_number).await?
    {
        return Err(Error::AlreadyExists(CPF_TAKEN_BY_OTHER.to_string()));
    }

    Ok(current)
}

/// Loads patient `id` (row-locked) or fails with `NotFound`.
pub async fn ensure_exists(tx: &mut dyn PatientTransaction, id: i64) -> Result<Patient> {
    tx.find_by_id_for_update(id)
        .await?
        .ok_or_else(|| Error::patient_not_found(id))
}
