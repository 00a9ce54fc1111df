//! PostgreSQL-backed `PatientStore` implementation

use async_trait::async_trait;
use pacientes_models::Patient;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row, Transaction};

use crate::{
    db::traits::{PatientStore, PatientTransaction},
    error::CPF_TAKEN,
    Error, Result,
};

const PATIENT_COLUMNS: &str = "id, cpf, nome, data_nascimento, nome_mae, cep, endereco, \
     num_endereco, complemento, bairro, cidade, estado, telefone_celular, \
     telefone_responsavel, email, sexo, num_cartao_sus, eh_tabagista, eh_etilista, \
     tem_lesao_suspeita, participa_smart_monitor";

// 20 bound columns per row; keeps each statement well under the 65535 bind limit.
const INSERT_CHUNK_SIZE: usize = 1000;

/// PostgreSQL-backed PatientStore implementation
#[derive(Clone)]
pub struct PostgresPatientStore {
    pub(crate) pool: PgPool,
}

impl PostgresPatientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PostgresPatientStore {
    async fn begin(&self) -> Result<Box<dyn PatientTransaction>> {
        let tx = self.pool.begin().await.map_err(Error::Database)?;
        Ok(Box::new(PgPatientTransaction { tx }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM pacientes WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| patient_from_row(&r)))
    }

    async fn find_all(&self) -> Result<Vec<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM pacientes ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(patient_from_row).collect())
    }

    async fn count_all(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pacientes")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(count)
    }
}

/// Open transaction on the pool. Rolled back on drop unless committed.
pub struct PgPatientTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PatientTransaction for PgPatientTransaction {
    async fn find_by_id_for_update(&mut self, id: i64) -> Result<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM pacientes WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| patient_from_row(&r)))
    }

    async fn exists_by_id(&mut self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pacientes WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn exists_by_identity_number(&mut self, identity_number: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pacientes WHERE cpf = $1)")
                .bind(identity_number)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn save(&mut self, patient: Patient) -> Result<Patient> {
        match patient.id {
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO pacientes (cpf, nome, data_nascimento, nome_mae, cep, endereco,
                         num_endereco, complemento, bairro, cidade, estado, telefone_celular,
                         telefone_responsavel, email, sexo, num_cartao_sus, eh_tabagista,
                         eh_etilista, tem_lesao_suspeita, participa_smart_monitor)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                         $16, $17, $18, $19, $20)
                     RETURNING id",
                )
                .bind(&patient.identity_number)
                .bind(&patient.full_name)
                .bind(patient.birth_date)
                .bind(&patient.mother_name)
                .bind(&patient.postal_code)
                .bind(&patient.street)
                .bind(&patient.street_number)
                .bind(&patient.complement)
                .bind(&patient.neighborhood)
                .bind(&patient.city)
                .bind(&patient.state)
                .bind(&patient.mobile_phone)
                .bind(&patient.guardian_phone)
                .bind(&patient.email)
                .bind(&patient.sex)
                .bind(&patient.health_card_number)
                .bind(patient.is_smoker)
                .bind(patient.is_drinker)
                .bind(patient.has_suspicious_lesion)
                .bind(patient.participates_in_smart_monitor)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(map_write_error)?;

                Ok(Patient {
                    id: Some(id),
                    ..patient
                })
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE pacientes SET cpf = $2, nome = $3, data_nascimento = $4,
                         nome_mae = $5, cep = $6, endereco = $7, num_endereco = $8,
                         complemento = $9, bairro = $10, cidade = $11, estado = $12,
                         telefone_celular = $13, telefone_responsavel = $14, email = $15,
                         sexo = $16, num_cartao_sus = $17, eh_tabagista = $18,
                         eh_etilista = $19, tem_lesao_suspeita = $20,
                         participa_smart_monitor = $21
                     WHERE id = $1",
                )
                .bind(id)
                .bind(&patient.identity_number)
                .bind(&patient.full_name)
                .bind(patient.birth_date)
                .bind(&patient.mother_name)
                .bind(&patient.postal_code)
                .bind(&patient.street)
                .bind(&patient.street_number)
                .bind(&patient.complement)
                .bind(&patient.neighborhood)
                .bind(&patient.city)
                .bind(&patient.state)
                .bind(&patient.mobile_phone)
                .bind(&patient.guardian_phone)
                .bind(&patient.email)
                .bind(&patient.sex)
                .bind(&patient.health_card_number)
                .bind(patient.is_smoker)
                .bind(patient.is_drinker)
                .bind(patient.has_suspicious_lesion)
                .bind(patient.participates_in_smart_monitor)
                .execute(&mut *self.tx)
                .await
                .map_err(map_write_error)?;

                if result.rows_affected() == 0 {
                    return Err(Error::patient_not_found(id));
                }
                Ok(patient)
            }
        }
    }

    async fn save_all(&mut self, patients: Vec<Patient>) -> Result<u64> {
        debug_assert!(patients.iter().all(|p| !p.is_persisted()));
        let mut written = 0u64;

        for chunk in patients.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO pacientes (cpf, nome, data_nascimento, nome_mae, cep, endereco, \
                 num_endereco, complemento, bairro, cidade, estado, telefone_celular, \
                 telefone_responsavel, email, sexo, num_cartao_sus, eh_tabagista, eh_etilista, \
                 tem_lesao_suspeita, participa_smart_monitor) ",
            );
            builder.push_values(chunk, |mut row, p| {
                row.push_bind(p.identity_number.clone())
                    .push_bind(p.full_name.clone())
                    .push_bind(p.birth_date)
                    .push_bind(p.mother_name.clone())
                    .push_bind(p.postal_code.clone())
                    .push_bind(p.street.clone())
                    .push_bind(p.street_number.clone())
                    .push_bind(p.complement.clone())
                    .push_bind(p.neighborhood.clone())
                    .push_bind(p.city.clone())
                    .push_bind(p.state.clone())
                    .push_bind(p.mobile_phone.clone())
                    .push_bind(p.guardian_phone.clone())
                    .push_bind(p.email.clone())
                    .push_bind(p.sex.clone())
                    .push_bind(p.health_card_number.clone())
                    .push_bind(p.is_smoker)
                    .push_bind(p.is_drinker)
                    .push_bind(p.has_suspicious_lesion)
                    .push_bind(p.participates_in_smart_monitor);
            });

            let result = builder
                .build()
                .execute(&mut *self.tx)
                .await
                .map_err(map_write_error)?;
            written += result.rows_affected();
        }

        Ok(written)
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pacientes WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(Error::Database)
    }
}

/// The `pacientes_cpf_key` constraint backs the explicit CPF check; surface it the same way.
fn map_write_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists(CPF_TAKEN.to_string())
        }
        _ => Error::Database(err),
    }
}

fn patient_from_row(r: &PgRow) -> Patient {
    Patient {
        id: Some(r.get("id")),
        identity_number: r.get("cpf"),
        full_name: r.get("nome"),
        birth_date: r.get("data_nascimento"),
        mother_name: r.get("nome_mae"),
        postal_code: r.get("cep"),
        street: r.get("endereco"),
        street_number: r.get("num_endereco"),
        complement: r.get("complemento"),
        neighborhood: r.get("bairro"),
        city: r.get("cidade"),
        state: r.get("estado"),
        mobile_phone: r.get("telefone_celular"),
        guardian_phone: r.get("telefone_responsavel"),
        email: r.get("email"),
        sex: r.get("sexo"),
        health_card_number: r.get("num_cartao_sus"),
        is_smoker: r.get("eh_tabagista"),
        is_drinker: r.get("eh_etilista"),
        has_suspicious_lesion: r.get("tem_lesao_suspeita"),
        participates_in_smart_monitor: r.get("participa_smart_monitor"),
    }
}
