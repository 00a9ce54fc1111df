//! Patient service - business logic for patient operations

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use pacientes_models::{
    apply_flags_patch, apply_full_replace, apply_partial_patch, FlagsPatch, PatientPatch,
    PatientRequest, PatientResponse,
};

use crate::{
    db::PatientStore,
    services::conflicts::{ensure_creatable, ensure_exists, ensure_updatable},
    Error, Result,
};

pub struct PatientService {
    store: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<PatientResponse>> {
        let patients = self.store.find_all().await?;
        Ok(patients.into_iter().map(PatientResponse::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<PatientResponse> {
        self.store
            .find_by_id(id)
            .await?
            .map(PatientResponse::from)
            .ok_or_else(|| Error::patient_not_found(id))
    }

    pub async fn create(&self, request: PatientRequest) -> Result<PatientResponse> {
        let patient = request.validate_into_patient(today())?;

        let mut tx = self.store.begin().await?;
        ensure_creatable(tx.as_mut(), &patient.identity_number).await?;
        let saved = tx.save(patient).await?;
        tx.commit().await?;

        tracing::info!(patient_id = saved.id, "Patient created");
        Ok(PatientResponse::from(saved))
    }

    /// Full replace: every field is overwritten, the id is kept.
    pub async fn replace(&self, id: i64, request: PatientRequest) -> Result<PatientResponse> {
        let incoming = request.validate_into_patient(today())?;

        let mut tx = self.store.begin().await?;
        let existing = ensure_updatable(tx.as_mut(), id, &incoming.identity_number).await?;
        let saved = tx.save(apply_full_replace(&existing, incoming)).await?;
        tx.commit().await?;

        tracing::info!(patient_id = id, "Patient replaced");
        Ok(PatientResponse::from(saved))
    }

    /// Partial update. A patch that changes the CPF goes through the same
    /// uniqueness check as a full replace.
    pub async fn patch(&self, id: i64, patch: PatientPatch) -> Result<PatientResponse> {
        patch.validate_at(today())?;

        let mut tx = self.store.begin().await?;
        let existing = match patch.identity_number.as_deref() {
            Some(identity_number) => ensure_updatable(tx.as_mut(), id, identity_number).await?,
            None => ensure_exists(tx.as_mut(), id).await?,
        };
        let saved = tx.save(apply_partial_patch(existing, &patch)).await?;
        tx.commit().await?;

        tracing::info!(patient_id = id, "Patient patched");
        Ok(PatientResponse::from(saved))
    }

    pub async fn patch_flags(&self, id: i64, flags: FlagsPatch) -> Result<PatientResponse> {
        flags.validate_flags()?;

        let mut tx = self.store.begin().await?;
        let existing = ensure_exists(tx.as_mut(), id).await?;
        let saved = tx.save(apply_flags_patch(existing, &flags)).await?;
        tx.commit().await?;

        tracing::info!(patient_id = id, "Patient flags updated");
        Ok(PatientResponse::from(saved))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.store.begin().await?;
        if !tx.exists_by_id(id).await? || !tx.delete_by_id(id).await? {
            return Err(Error::patient_not_found(id));
        }
        tx.commit().await?;

        tracing::info!(patient_id = id, "Patient deleted");
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
