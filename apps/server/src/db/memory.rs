//! In-process `PatientStore` for tests and local runs
//!
//! A transaction holds the table lock for its whole lifetime and works on a
//! copy of the rows; commit writes the copy back, drop discards it. Writers are
//! therefore fully serialized, matching the row-lock behavior of the Postgres
//! store for single-id operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use pacientes_models::Patient;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    db::traits::{PatientStore, PatientTransaction},
    error::CPF_TAKEN,
    Error, Result,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: i64,
    rows: BTreeMap<i64, Patient>,
}

impl Tables {
    fn cpf_taken_by_other(&self, identity_number: &str, own_id: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|p| p.identity_number == identity_number && p.id != own_id)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPatientStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn begin(&self) -> Result<Box<dyn PatientTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>> {
        Ok(self.tables.lock().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Patient>> {
        Ok(self.tables.lock().await.rows.values().cloned().collect())
    }

    async fn count_all(&self) -> Result<i64> {
        Ok(self.tables.lock().await.rows.len() as i64)
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl PatientTransaction for InMemoryTransaction {
    async fn find_by_id_for_update(&mut self, id: i64) -> Result<Option<Patient>> {
        Ok(self.working.rows.get(&id).cloned())
    }

    async fn exists_by_id(&mut self, id: i64) -> Result<bool> {
        Ok(self.working.rows.contains_key(&id))
    }

    async fn exists_by_identity_number(&mut self, identity_number: &str) -> Result<bool> {
        Ok(self
            .working
            .rows
            .values()
            .any(|p| p.identity_number == identity_number))
    }

    async fn save(&mut self, patient: Patient) -> Result<Patient> {
        if self
            .working
            .cpf_taken_by_other(&patient.identity_number, patient.id)
        {
            return Err(Error::AlreadyExists(CPF_TAKEN.to_string()));
        }

        let stored = match patient.id {
            Some(id) => {
                if !self.working.rows.contains_key(&id) {
                    return Err(Error::patient_not_found(id));
                }
                patient
            }
            None => {
                self.working.last_id += 1;
                Patient {
                    id: Some(self.working.last_id),
                    ..patient
                }
            }
        };

        if let Some(id) = stored.id {
            self.working.rows.insert(id, stored.clone());
        }
        Ok(stored)
    }

    async fn save_all(&mut self, patients: Vec<Patient>) -> Result<u64> {
        let mut written = 0u64;
        for patient in patients {
            self.save(Patient { id: None, ..patient }).await?;
            written += 1;
        }
        Ok(written)
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<bool> {
        Ok(self.working.rows.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
