//! The patient entity and its wire representation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient record.
///
/// `id` is `None` until the store assigns one on insert and never changes
/// afterwards. The four clinical flags are tri-state: rows created through the
/// API always carry a value, rows from the bulk import may not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Option<i64>,
    /// CPF, 11 digits
    pub identity_number: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub mother_name: String,
    pub postal_code: String,
    pub street: String,
    pub street_number: String,
    /// May be empty
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub mobile_phone: String,
    pub guardian_phone: String,
    pub email: String,
    pub sex: String,
    /// Cartão SUS
    pub health_card_number: String,
    pub is_smoker: Option<bool>,
    pub is_drinker: Option<bool>,
    pub has_suspicious_lesion: Option<bool>,
    pub participates_in_smart_monitor: Option<bool>,
}

impl Patient {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Patient representation returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: Option<i64>,
    pub identity_number: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub mother_name: String,
    pub postal_code: String,
    pub street: String,
    pub street_number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub mobile_phone: String,
    pub guardian_phone: String,
    pub email: String,
    pub sex: String,
    pub health_card_number: String,
    pub is_smoker: Option<bool>,
    pub is_drinker: Option<bool>,
    pub has_suspicious_lesion: Option<bool>,
    pub participates_in_smart_monitor: Option<bool>,
}

impl From<&Patient> for PatientResponse {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            identity_number: patient.identity_number.clone(),
            full_name: patient.full_name.clone(),
            birth_date: patient.birth_date,
            mother_name: patient.mother_name.clone(),
            postal_code: patient.postal_code.clone(),
            street: patient.street.clone(),
            street_number: patient.street_number.clone(),
            complement: patient.complement.clone(),
            neighborhood: patient.neighborhood.clone(),
            city: patient.city.clone(),
            state: patient.state.clone(),
            mobile_phone: patient.mobile_phone.clone(),
            guardian_phone: patient.guardian_phone.clone(),
            email: patient.email.clone(),
            sex: patient.sex.clone(),
            health_card_number: patient.health_card_number.clone(),
            is_smoker: patient.is_smoker,
            is_drinker: patient.is_drinker,
            has_suspicious_lesion: patient.has_suspicious_lesion,
            participates_in_smart_monitor: patient.participates_in_smart_monitor,
        }
    }
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self::from(&patient)
    }
}
