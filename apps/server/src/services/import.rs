//! One-shot CSV bootstrap import
//!
//! Runs at startup, before the listener is bound. The import only happens
//! when the patient table is empty; all rows go in through a single
//! transaction, so a bad row leaves the table empty.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use pacientes_models::Patient;
use serde::Deserialize;

use crate::{config::ImportConfig, db::PatientStore};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: invalid data_nascimento '{value}'")]
    InvalidBirthDate { line: u64, value: String },

    #[error("line {line}: CPF {identity_number} appears more than once in the file")]
    DuplicateIdentityNumber { line: u64, identity_number: String },

    #[error("store error: {0}")]
    Store(#[from] crate::Error),

    #[error("import task failed: {0}")]
    Task(String),
}

/// How a startup import ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The table already had rows; nothing was read.
    Skipped { existing: i64 },
    Done { imported: u64 },
    /// Nothing was committed. The server keeps running.
    Failed { reason: String },
}

/// One data row of the import file, keyed by the file's header names.
#[derive(Debug, Deserialize)]
struct CsvPatientRow {
    #[serde(rename = "cpf")]
    identity_number: String,
    #[serde(rename = "nome")]
    full_name: String,
    #[serde(rename = "nome_mae")]
    mother_name: String,
    #[serde(rename = "data_nascimento")]
    birth_date: String,
    #[serde(rename = "cep")]
    postal_code: String,
    #[serde(rename = "endereco")]
    street: String,
    #[serde(rename = "num_endereco")]
    street_number: String,
    #[serde(rename = "complemento")]
    complement: String,
    #[serde(rename = "bairro")]
    neighborhood: String,
    #[serde(rename = "cidade")]
    city: String,
    #[serde(rename = "estado")]
    state: String,
    #[serde(rename = "telefone_celular")]
    mobile_phone: String,
    #[serde(rename = "telefone_responsavel")]
    guardian_phone: String,
    email: String,
    #[serde(rename = "sexo")]
    sex: String,
    #[serde(rename = "num_cartao_sus")]
    health_card_number: String,
    #[serde(rename = "eh_tabagista")]
    is_smoker: String,
    #[serde(rename = "eh_etilista")]
    is_drinker: String,
    #[serde(rename = "tem_lesao_suspeita")]
    has_suspicious_lesion: String,
    #[serde(rename = "participa_smart_monitor")]
    participates_in_smart_monitor: String,
}

impl CsvPatientRow {
    fn into_patient(self, line: u64) -> Result<Patient, ImportError> {
        let birth_date = parse_birth_date(&self.birth_date).ok_or(ImportError::InvalidBirthDate {
            line,
            value: self.birth_date.clone(),
        })?;

        Ok(Patient {
            id: None,
            identity_number: self.identity_number,
            full_name: self.full_name,
            birth_date,
            mother_name: self.mother_name,
            postal_code: self.postal_code,
            street: self.street,
            street_number: self.street_number,
            complement: self.complement,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            mobile_phone: self.mobile_phone,
            guardian_phone: self.guardian_phone,
            email: self.email,
            sex: self.sex,
            health_card_number: self.health_card_number,
            is_smoker: parse_ternary_bool(&self.is_smoker),
            is_drinker: parse_ternary_bool(&self.is_drinker),
            has_suspicious_lesion: parse_ternary_bool(&self.has_suspicious_lesion),
            participates_in_smart_monitor: parse_ternary_bool(&self.participates_in_smart_monitor),
        })
    }
}

/// Blank or `null` (any case) is unknown; `true` (any case) is true; anything else is false.
pub fn parse_ternary_bool(value: &str) -> Option<bool> {
    if value.trim().is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(value.eq_ignore_ascii_case("true"))
}

/// `YYYY-MM-DD` from the first ten characters; a trailing time of day is ignored.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let date = value.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Parse every row of a headered CSV stream into unsaved patients.
///
/// Fails on the first unreadable row, bad birth date or repeated CPF.
pub fn read_patients<R: Read>(reader: R) -> Result<Vec<Patient>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| ImportError::Csv { line: 1, source })?
        .clone();

    let mut patients = Vec::new();
    let mut seen = HashSet::new();

    for (index, record) in csv_reader.records().enumerate() {
        let fallback_line = index as u64 + 2;
        let record = record.map_err(|source| ImportError::Csv {
            line: fallback_line,
            source,
        })?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        let row: CsvPatientRow = record
            .deserialize(Some(&headers))
            .map_err(|source| ImportError::Csv { line, source })?;
        let patient = row.into_patient(line)?;

        if !seen.insert(patient.identity_number.clone()) {
            return Err(ImportError::DuplicateIdentityNumber {
                line,
                identity_number: patient.identity_number,
            });
        }
        patients.push(patient);
    }

    Ok(patients)
}

pub fn read_patients_file(path: &Path) -> Result<Vec<Patient>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_patients(BufReader::new(file))
}

pub struct PatientImporter {
    store: Arc<dyn PatientStore>,
    csv_path: PathBuf,
}

impl PatientImporter {
    pub fn new(store: Arc<dyn PatientStore>, config: &ImportConfig) -> Self {
        Self {
            store,
            csv_path: config.csv_path.clone(),
        }
    }

    /// Run the import once. Failures are logged and reported, never propagated.
    pub async fn run(&self) -> ImportOutcome {
        match self.try_run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %self.csv_path.display(),
                    "Patient CSV import failed, no rows were imported"
                );
                ImportOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_run(&self) -> Result<ImportOutcome, ImportError> {
        let existing = self.store.count_all().await?;
        if existing > 0 {
            tracing::info!(
                existing,
                "Patient table already has data, skipping CSV import"
            );
            return Ok(ImportOutcome::Skipped { existing });
        }

        tracing::info!(
            path = %self.csv_path.display(),
            "Patient table is empty, importing from CSV"
        );

        let path = self.csv_path.clone();
        let patients = tokio::task::spawn_blocking(move || read_patients_file(&path))
            .await
            .map_err(|e| ImportError::Task(e.to_string()))??;

        let mut tx = self.store.begin().await?;
        let imported = tx.save_all(patients).await?;
        tx.commit().await?;

        tracing::info!(imported, "Patient CSV import finished");
        Ok(ImportOutcome::Done { imported })
    }
}
