//! # Resident Repository
//!
//! Community members reserving coupons (`associado`), keyed by CPF digits.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::rows::ResidentRow;
use cupons_core::{NewResident, Resident};

const RESIDENT_COLUMNS: &str = r#"
    cpf_associado, auth_user_id, nom_associado, dtn_associado, end_associado,
    bai_associado, cep_associado, cid_associado, uf_associado, cel_associado,
    email_associado
"#;

#[derive(Debug, Clone)]
pub struct ResidentRepository {
    pool: SqlitePool,
}

impl ResidentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ResidentRepository { pool }
    }

    pub async fn exists(&self, cpf: &str) -> DbResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM associado WHERE cpf_associado = ?1")
                .bind(cpf)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    pub async fn get_by_cpf(&self, cpf: &str) -> DbResult<Option<Resident>> {
        let sql = format!("SELECT {RESIDENT_COLUMNS} FROM associado WHERE cpf_associado = ?1");
        let row = sqlx::query_as::<_, ResidentRow>(&sql)
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Resident::from))
    }

    pub async fn get_by_auth_user(&self, auth_user_id: &str) -> DbResult<Option<Resident>> {
        let sql = format!("SELECT {RESIDENT_COLUMNS} FROM associado WHERE auth_user_id = ?1");
        let row = sqlx::query_as::<_, ResidentRow>(&sql)
            .bind(auth_user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Resident::from))
    }

    /// Inserts a validated resident linked to `auth_user_id`.
    ///
    /// Fails with `UniqueViolation` if the CPF is already registered.
    pub async fn insert(&self, resident: &NewResident, auth_user_id: &str) -> DbResult<Resident> {
        debug!(cpf = %resident.cpf.digits(), "Inserting resident");

        let sql = format!(
            r#"
            INSERT INTO associado ({RESIDENT_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            RETURNING {RESIDENT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ResidentRow>(&sql)
            .bind(resident.cpf.digits())
            .bind(auth_user_id)
            .bind(&resident.name)
            .bind(resident.birth_date)
            .bind(&resident.address)
            .bind(&resident.district)
            .bind(&resident.postal_code)
            .bind(&resident.city)
            .bind(&resident.state)
            .bind(&resident.mobile)
            .bind(&resident.email)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }
}
