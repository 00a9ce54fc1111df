//! Request payloads and their validation rules
//!
//! Every field is optional at the serde level so that a missing field surfaces
//! as a per-field validation message instead of a deserialization error.
//! The `validate_*` methods run the declarative rules and the date check, then
//! convert the payload into a [`Patient`].

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::{Patient, ValidationFailure};

static DIGITS_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]*$").unwrap());
static NOT_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S").unwrap());

const BIRTH_DATE_PAST: &str = "Data de nascimento deve ser no passado";

/// Full patient payload, used by create (`POST`) and full replace (`PUT`).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    #[validate(
        required(message = "CPF não pode ser nulo ou vazio"),
        length(equal = 11, message = "CPF deve ter 11 dígitos"),
        regex(path = *DIGITS_ONLY, message = "CPF deve conter apenas números")
    )]
    pub identity_number: Option<String>,

    #[validate(
        required(message = "Nome não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Nome não pode ser nulo ou vazio")
    )]
    pub full_name: Option<String>,

    #[validate(required(message = "Data de nascimento não pode ser nula"))]
    pub birth_date: Option<NaiveDate>,

    #[validate(
        required(message = "Nome da mãe não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Nome da mãe não pode ser nulo ou vazio")
    )]
    pub mother_name: Option<String>,

    #[validate(
        required(message = "CEP não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "CEP não pode ser nulo ou vazio")
    )]
    pub postal_code: Option<String>,

    #[validate(
        required(message = "Endereço não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Endereço não pode ser nulo ou vazio")
    )]
    pub street: Option<String>,

    #[validate(
        required(message = "Número do endereço não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Número do endereço não pode ser nulo ou vazio")
    )]
    pub street_number: Option<String>,

    /// Empty string is accepted, absence is not.
    #[validate(required(message = "Complemento não pode ser nulo"))]
    pub complement: Option<String>,

    #[validate(
        required(message = "Bairro não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Bairro não pode ser nulo ou vazio")
    )]
    pub neighborhood: Option<String>,

    #[validate(
        required(message = "Cidade não pode ser nula ou vazia"),
        regex(path = *NOT_BLANK, message = "Cidade não pode ser nula ou vazia")
    )]
    pub city: Option<String>,

    #[validate(
        required(message = "Estado não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Estado não pode ser nulo ou vazio")
    )]
    pub state: Option<String>,

    #[validate(
        required(message = "Telefone celular não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Telefone celular não pode ser nulo ou vazio")
    )]
    pub mobile_phone: Option<String>,

    #[validate(
        required(message = "Telefone do responsável não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Telefone do responsável não pode ser nulo ou vazio")
    )]
    pub guardian_phone: Option<String>,

    #[validate(
        required(message = "Email não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Email não pode ser nulo ou vazio"),
        email(message = "Formato de email inválido")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Sexo não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Sexo não pode ser nulo ou vazio")
    )]
    pub sex: Option<String>,

    #[validate(
        required(message = "Número do Cartão SUS não pode ser nulo ou vazio"),
        regex(path = *NOT_BLANK, message = "Número do Cartão SUS não pode ser nulo ou vazio")
    )]
    pub health_card_number: Option<String>,

    #[validate(required(message = "O campo 'isSmoker' não pode ser nulo"))]
    pub is_smoker: Option<bool>,

    #[validate(required(message = "O campo 'isDrinker' não pode ser nulo"))]
    pub is_drinker: Option<bool>,

    #[validate(required(message = "O campo 'hasSuspiciousLesion' não pode ser nulo"))]
    pub has_suspicious_lesion: Option<bool>,

    #[validate(required(message = "O campo 'participatesInSmartMonitor' não pode ser nulo"))]
    pub participates_in_smart_monitor: Option<bool>,
}

impl PatientRequest {
    /// Validate the payload against `today` and build an unsaved [`Patient`].
    pub fn validate_into_patient(self, today: NaiveDate) -> Result<Patient, ValidationFailure> {
        let mut failure = collect(self.validate());
        check_birth_date(&mut failure, self.birth_date, today);
        failure.into_result()?;

        Ok(Patient {
            id: None,
            identity_number: self.identity_number.unwrap_or_default(),
            full_name: self.full_name.unwrap_or_default(),
            birth_date: self.birth_date.unwrap_or_default(),
            mother_name: self.mother_name.unwrap_or_default(),
            postal_code: self.postal_code.unwrap_or_default(),
            street: self.street.unwrap_or_default(),
            street_number: self.street_number.unwrap_or_default(),
            complement: self.complement.unwrap_or_default(),
            neighborhood: self.neighborhood.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            mobile_phone: self.mobile_phone.unwrap_or_default(),
            guardian_phone: self.guardian_phone.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            sex: self.sex.unwrap_or_default(),
            health_card_number: self.health_card_number.unwrap_or_default(),
            is_smoker: self.is_smoker,
            is_drinker: self.is_drinker,
            has_suspicious_lesion: self.has_suspicious_lesion,
            participates_in_smart_monitor: self.participates_in_smart_monitor,
        })
    }
}

/// Partial update payload (`PATCH`).
///
/// Absent and `null` fields mean "leave unchanged". Present fields follow the
/// same format rules as [`PatientRequest`]; `complement` may be `""` to clear it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    #[validate(
        length(equal = 11, message = "CPF deve ter 11 dígitos"),
        regex(path = *DIGITS_ONLY, message = "CPF deve conter apenas números")
    )]
    pub identity_number: Option<String>,

    #[validate(regex(path = *NOT_BLANK, message = "Nome não pode ser nulo ou vazio"))]
    pub full_name: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[validate(regex(path = *NOT_BLANK, message = "Nome da mãe não pode ser nulo ou vazio"))]
    pub mother_name: Option<String>,

    #[validate(regex(path = *NOT_BLANK, message = "CEP não pode ser nulo ou vazio"))]
    pub postal_code: Option<String>,

    #[validate(regex(path = *NOT_BLANK, message = "Endereço não pode ser nulo ou vazio"))]
    pub street: Option<String>,

    #[validate(regex(
        path = *NOT_BLANK,
        message = "Número do endereço não pode ser nulo ou vazio"
    ))]
    pub street_number: Option<String>,

    pub complement: Option<String>,

    #[validate(regex(path = *NOT_BLANK, message = "Bairro não pode ser nulo ou vazio"))]
    pub neighborhood: Option<String>,

    #[validate(regex(path = *NOT_BLANK, message = "Cidade não pode ser nula ou vazia"))]
    pub city: Option<String>,

    #[validate(regex(path = *NOT_BLANK, message = "Estado não pode ser nulo ou vazio"))]
    pub state: Option<String>,

    #[validate(regex(
        path = *NOT_BLANK,
        message = "Telefone celular não pode ser nulo ou vazio"
    ))]
    pub mobile_phone: Option<String>,

    #[validate(regex(
        path = *NOT_BLANK,
        message = "Telefone do responsável não pode ser nulo ou vazio"
    ))]
    pub guardian_phone: Option<String>,

    #[validate(
        regex(path = *NOT_BLANK, message = "Email não pode ser nulo ou vazio"),
        email(message = "Formato de email inválido")
    )]
    pub email: Option<String>,

    #[validate(regex(path = *NOT_BLANK, message = "Sexo não pode ser nulo ou vazio"))]
    pub sex: Option<String>,

    #[validate(regex(
        path = *NOT_BLANK,
        message = "Número do Cartão SUS não pode ser nulo ou vazio"
    ))]
    pub health_card_number: Option<String>,

    pub is_smoker: Option<bool>,
    pub is_drinker: Option<bool>,
    pub has_suspicious_lesion: Option<bool>,
    pub participates_in_smart_monitor: Option<bool>,
}

impl PatientPatch {
    pub fn validate_at(&self, today: NaiveDate) -> Result<(), ValidationFailure> {
        let mut failure = collect(self.validate());
        check_birth_date(&mut failure, self.birth_date, today);
        failure.into_result()
    }
}

/// Flags-only update payload. All four flags are required.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FlagsPatch {
    #[validate(required(message = "O campo 'isSmoker' não pode ser nulo"))]
    pub is_smoker: Option<bool>,

    #[validate(required(message = "O campo 'isDrinker' não pode ser nulo"))]
    pub is_drinker: Option<bool>,

    #[validate(required(message = "O campo 'hasSuspiciousLesion' não pode ser nulo"))]
    pub has_suspicious_lesion: Option<bool>,

    #[validate(required(message = "O campo 'participatesInSmartMonitor' não pode ser nulo"))]
    pub participates_in_smart_monitor: Option<bool>,
}

impl FlagsPatch {
    pub fn validate_flags(&self) -> Result<(), ValidationFailure> {
        collect(self.validate()).into_result()
    }
}

fn collect(result: Result<(), validator::ValidationErrors>) -> ValidationFailure {
    match result {
        Ok(()) => ValidationFailure::new(),
        Err(errors) => ValidationFailure::from(errors),
    }
}

/// Presence is a declarative rule; this only checks that a given date is past.
fn check_birth_date(
    failure: &mut ValidationFailure,
    birth_date: Option<NaiveDate>,
    today: NaiveDate,
) {
    if birth_date.is_some_and(|date| date >= today) {
        failure.add("birthDate", BIRTH_DATE_PAST);
    }
}
