//! # Merchant Repository
//!
//! Businesses publishing coupons (`comercio`), keyed by CNPJ digits.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::rows::MerchantRow;
use cupons_core::{Merchant, NewMerchant};

const MERCHANT_COLUMNS: &str = r#"
    cnpj_comercio, auth_user_id, id_categoria, raz_social_comercio,
    nom_fantasia_comercio, end_comercio, bai_comercio, cep_comercio,
    cid_comercio, uf_comercio, con_comercio, email_comercio
"#;

#[derive(Debug, Clone)]
pub struct MerchantRepository {
    pool: SqlitePool,
}

impl MerchantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MerchantRepository { pool }
    }

    /// Whether a merchant with these CNPJ digits exists.
    pub async fn exists(&self, cnpj: &str) -> DbResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM comercio WHERE cnpj_comercio = ?1")
                .bind(cnpj)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    pub async fn get_by_cnpj(&self, cnpj: &str) -> DbResult<Option<Merchant>> {
        let sql = format!("SELECT {MERCHANT_COLUMNS} FROM comercio WHERE cnpj_comercio = ?1");
        let row = sqlx::query_as::<_, MerchantRow>(&sql)
            .bind(cnpj)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Merchant::from))
    }

    /// The merchant profile owned by a login identity.
    pub async fn get_by_auth_user(&self, auth_user_id: &str) -> DbResult<Option<Merchant>> {
        let sql = format!("SELECT {MERCHANT_COLUMNS} FROM comercio WHERE auth_user_id = ?1");
        let row = sqlx::query_as::<_, MerchantRow>(&sql)
            .bind(auth_user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Merchant::from))
    }

    /// Inserts a validated merchant linked to `auth_user_id`.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the CNPJ is already registered
    /// - `ForeignKeyViolation` if the category does not exist
    pub async fn insert(&self, merchant: &NewMerchant, auth_user_id: &str) -> DbResult<Merchant> {
        debug!(cnpj = %merchant.cnpj.digits(), "Inserting merchant");

        let sql = format!(
            r#"
            INSERT INTO comercio ({MERCHANT_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            RETURNING {MERCHANT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, MerchantRow>(&sql)
            .bind(merchant.cnpj.digits())
            .bind(auth_user_id)
            .bind(merchant.category_id)
            .bind(&merchant.legal_name)
            .bind(&merchant.trade_name)
            .bind(&merchant.address)
            .bind(&merchant.district)
            .bind(&merchant.postal_code)
            .bind(&merchant.city)
            .bind(&merchant.state)
            .bind(&merchant.phone)
            .bind(&merchant.email)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }
}
