//! # Coupon Repository
//!
//! Database operations for coupons (`cupom`).
//!
//! ## Listings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cupom c                                                               │
//! │    JOIN comercio m        ON m.cnpj_comercio = c.cnpj_comercio         │
//! │    LEFT JOIN categoria    ON id = COALESCE(c.id_categoria,             │
//! │                                            m.id_categoria)             │
//! │    + (SELECT COUNT(*) FROM cupom_associado ...) AS total_reservas      │
//! │                                                                         │
//! │  ──► CouponDetailsRow ──► CouponWithDetails                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A coupon without its own category is listed under its merchant's.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::rows::{CouponDetailsRow, CouponRow};
use cupons_core::{Coupon, CouponWithDetails};

/// Columns of [`CouponDetailsRow`], for queries that join from `cupom c`
/// and `comercio m` and `categoria cat`.
pub(crate) const COUPON_DETAILS_COLUMNS: &str = r#"
    c.num_cupom             AS num_cupom,
    c.id_categoria          AS id_categoria_cupom,
    c.tit_cupom             AS tit_cupom,
    c.des_cupom             AS des_cupom,
    c.per_desc_cupom        AS per_desc_cupom,
    c.dta_emissao_cupom     AS dta_emissao_cupom,
    c.dta_inicio_cupom      AS dta_inicio_cupom,
    c.dta_termino_cupom     AS dta_termino_cupom,
    c.ativo_cupom           AS ativo_cupom,
    c.qtd_total_cupom       AS qtd_total_cupom,
    m.cnpj_comercio         AS cnpj_comercio,
    m.auth_user_id          AS auth_user_id,
    m.id_categoria          AS id_categoria,
    m.raz_social_comercio   AS raz_social_comercio,
    m.nom_fantasia_comercio AS nom_fantasia_comercio,
    m.end_comercio          AS end_comercio,
    m.bai_comercio          AS bai_comercio,
    m.cep_comercio          AS cep_comercio,
    m.cid_comercio          AS cid_comercio,
    m.uf_comercio           AS uf_comercio,
    m.con_comercio          AS con_comercio,
    m.email_comercio        AS email_comercio,
    cat.id_categoria        AS categoria_id,
    cat.nom_categoria       AS categoria_nome,
    (SELECT COUNT(*) FROM cupom_associado cnt WHERE cnt.num_cupom = c.num_cupom) AS total_reservas
"#;

/// Joins for [`COUPON_DETAILS_COLUMNS`].
pub(crate) const COUPON_DETAILS_JOINS: &str = r#"
    JOIN comercio m ON m.cnpj_comercio = c.cnpj_comercio
    LEFT JOIN categoria cat ON cat.id_categoria = COALESCE(c.id_categoria, m.id_categoria)
"#;

const COUPON_COLUMNS: &str = r#"
    num_cupom, cnpj_comercio, id_categoria, tit_cupom, des_cupom, per_desc_cupom,
    dta_emissao_cupom, dta_inicio_cupom, dta_termino_cupom, ativo_cupom, qtd_total_cupom
"#;

/// Optional listing filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponFilter {
    /// CNPJ digits of the publishing merchant.
    pub merchant_id: Option<String>,
    /// Category, matched against the coupon's category or, when it has
    /// none, its merchant's.
    pub category_id: Option<i64>,
}

impl CouponFilter {
    pub fn merchant(cnpj: impl Into<String>) -> Self {
        CouponFilter {
            merchant_id: Some(cnpj.into()),
            category_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Lists coupons with details, newest emission first.
    pub async fn list(&self, filter: &CouponFilter) -> DbResult<Vec<CouponWithDetails>> {
        debug!(
            merchant_id = ?filter.merchant_id,
            category_id = ?filter.category_id,
            "Listing coupons"
        );

        let sql = format!(
            r#"
            SELECT {COUPON_DETAILS_COLUMNS}
            FROM cupom c
            {COUPON_DETAILS_JOINS}
            WHERE (?1 IS NULL OR c.cnpj_comercio = ?1)
              AND (?2 IS NULL OR COALESCE(c.id_categoria, m.id_categoria) = ?2)
            ORDER BY c.dta_emissao_cupom DESC, c.num_cupom
            "#
        );

        let rows = sqlx::query_as::<_, CouponDetailsRow>(&sql)
            .bind(&filter.merchant_id)
            .bind(filter.category_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed coupons");
        Ok(rows.into_iter().map(CouponWithDetails::from).collect())
    }

    pub async fn get(&self, code: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM cupom WHERE num_cupom = ?1");
        let row = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Coupon::from))
    }

    pub async fn get_with_details(&self, code: &str) -> DbResult<Option<CouponWithDetails>> {
        let sql = format!(
            r#"
            SELECT {COUPON_DETAILS_COLUMNS}
            FROM cupom c
            {COUPON_DETAILS_JOINS}
            WHERE c.num_cupom = ?1
            "#
        );

        let row = sqlx::query_as::<_, CouponDetailsRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CouponWithDetails::from))
    }

    /// Inserts a coupon.
    ///
    /// Fails with `UniqueViolation` on a code collision; callers generate a
    /// new code and retry.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(code = %coupon.id, merchant_id = %coupon.merchant_id, "Inserting coupon");

        let sql = format!(
            r#"
            INSERT INTO cupom ({COUPON_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#
        );

        sqlx::query(&sql)
            .bind(&coupon.id)
            .bind(&coupon.merchant_id)
            .bind(coupon.category_id)
            .bind(&coupon.title)
            .bind(&coupon.description)
            .bind(coupon.discount.to_stored_fraction())
            .bind(coupon.issued_on)
            .bind(coupon.start_date)
            .bind(coupon.end_date)
            .bind(coupon.active)
            .bind(coupon.total_quantity)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Writes the editable fields of `coupon`.
    ///
    /// Code, owner and emission date never change.
    pub async fn update(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(code = %coupon.id, "Updating coupon");

        let result = sqlx::query(
            r#"
            UPDATE cupom SET
                id_categoria = ?2,
                tit_cupom = ?3,
                des_cupom = ?4,
                per_desc_cupom = ?5,
                dta_inicio_cupom = ?6,
                dta_termino_cupom = ?7,
                ativo_cupom = ?8,
                qtd_total_cupom = ?9
            WHERE num_cupom = ?1
            "#,
        )
        .bind(&coupon.id)
        .bind(coupon.category_id)
        .bind(&coupon.title)
        .bind(&coupon.description)
        .bind(coupon.discount.to_stored_fraction())
        .bind(coupon.start_date)
        .bind(coupon.end_date)
        .bind(coupon.active)
        .bind(coupon.total_quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", &coupon.id));
        }

        Ok(())
    }

    /// Activates or deactivates a coupon.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        debug!(code = %code, active, "Setting coupon status");

        let result = sqlx::query("UPDATE cupom SET ativo_cupom = ?2 WHERE num_cupom = ?1")
            .bind(code)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", code));
        }

        Ok(())
    }

    /// Deletes a coupon and, by cascade, its reservations.
    pub async fn delete(&self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Deleting coupon");

        let result = sqlx::query("DELETE FROM cupom WHERE num_cupom = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", code));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, d, CNPJ, CPF, OTHER_CNPJ};
    use cupons_core::DiscountPercent;

    #[tokio::test]
    async fn test_insert_and_get_round_trips_discount() {
        let db = fixtures::db().await;
        fixtures::merchant(&db, CNPJ).await;

        let coupon = fixtures::coupon("ABCDEF123456", CNPJ, d(2024, 1, 1));
        db.coupons().insert(&coupon).await.unwrap();

        let stored = db.coupons().get("ABCDEF123456").await.unwrap().unwrap();
        assert_eq!(stored, coupon);
        assert_eq!(stored.discount.value(), 15);

        let fraction: f64 = sqlx::query_scalar("SELECT per_desc_cupom FROM cupom")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert!((fraction - 0.15).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_code_collision_is_unique_violation() {
        let db = fixtures::db().await;
        fixtures::merchant(&db, CNPJ).await;

        let coupon = fixtures::coupon("ABCDEF123456", CNPJ, d(2024, 1, 1));
        db.coupons().insert(&coupon).await.unwrap();
        let err = db.coupons().insert(&coupon).await.unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_details_fall_back_to_merchant_category() {
        let db = fixtures::db().await;
        let merchant = fixtures::merchant(&db, CNPJ).await;
        let health = fixtures::category(&db, "Saúde").await;

        db.coupons()
            .insert(&fixtures::coupon("AAAAAAAAAAAA", CNPJ, d(2024, 1, 1)))
            .await
            .unwrap();
        let mut own = fixtures::coupon("BBBBBBBBBBBB", CNPJ, d(2024, 2, 1));
        own.category_id = Some(health);
        db.coupons().insert(&own).await.unwrap();

        let inherited = db.coupons().get_with_details("AAAAAAAAAAAA").await.unwrap().unwrap();
        assert_eq!(inherited.category.unwrap().id, merchant.category_id);
        assert_eq!(inherited.coupon.category_id, None);
        assert_eq!(inherited.merchant, merchant);

        let explicit = db.coupons().get_with_details("BBBBBBBBBBBB").await.unwrap().unwrap();
        assert_eq!(explicit.category.unwrap().name, "Saúde");

        let filtered = db
            .coupons()
            .list(&CouponFilter {
                merchant_id: None,
                category_id: Some(health),
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].coupon.id, "BBBBBBBBBBBB");
    }

    #[tokio::test]
    async fn test_list_orders_and_filters() {
        let db = fixtures::db().await;
        fixtures::merchant(&db, CNPJ).await;
        fixtures::merchant(&db, OTHER_CNPJ).await;

        db.coupons()
            .insert(&fixtures::coupon("OLD000000000", CNPJ, d(2024, 1, 1)))
            .await
            .unwrap();
        db.coupons()
            .insert(&fixtures::coupon("NEW000000000", CNPJ, d(2024, 3, 1)))
            .await
            .unwrap();
        db.coupons()
            .insert(&fixtures::coupon("OTHER0000000", OTHER_CNPJ, d(2024, 2, 1)))
            .await
            .unwrap();

        let all = db.coupons().list(&CouponFilter::default()).await.unwrap();
        let codes: Vec<_> = all.iter().map(|c| c.coupon.id.as_str()).collect();
        assert_eq!(codes, ["NEW000000000", "OTHER0000000", "OLD000000000"]);

        let mine = db.coupons().list(&CouponFilter::merchant(CNPJ)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|c| c.coupon.merchant_id == CNPJ));
    }

    #[tokio::test]
    async fn test_reservation_count_in_details() {
        let db = fixtures::db().await;
        fixtures::merchant(&db, CNPJ).await;
        fixtures::resident(&db, CPF).await;
        db.coupons()
            .insert(&fixtures::coupon("ABCDEF123456", CNPJ, d(2024, 1, 1)))
            .await
            .unwrap();

        db.reservations()
            .insert("ABCDEF123456", CPF, d(2024, 6, 1))
            .await
            .unwrap();

        let details = db.coupons().get_with_details("ABCDEF123456").await.unwrap().unwrap();
        assert_eq!(details.reservations.count, 1);
    }

    #[tokio::test]
    async fn test_update_status_and_delete() {
        let db = fixtures::db().await;
        fixtures::merchant(&db, CNPJ).await;
        fixtures::resident(&db, CPF).await;

        let mut coupon = fixtures::coupon("ABCDEF123456", CNPJ, d(2024, 1, 1));
        db.coupons().insert(&coupon).await.unwrap();

        coupon.title = "Pizza grátis".into();
        coupon.discount = DiscountPercent::new(100).unwrap();
        coupon.total_quantity = Some(5);
        db.coupons().update(&coupon).await.unwrap();
        assert_eq!(db.coupons().get(&coupon.id).await.unwrap(), Some(coupon.clone()));

        db.coupons().set_active(&coupon.id, false).await.unwrap();
        assert!(!db.coupons().get(&coupon.id).await.unwrap().unwrap().active);

        db.reservations()
            .insert(&coupon.id, CPF, d(2024, 6, 1))
            .await
            .unwrap();
        db.coupons().delete(&coupon.id).await.unwrap();
        assert_eq!(db.coupons().get(&coupon.id).await.unwrap(), None);
        assert_eq!(db.reservations().count_for_coupon(&coupon.id).await.unwrap(), 0);

        assert!(matches!(
            db.coupons().delete(&coupon.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.coupons().set_active("NOPE00000000", true).await.is_err());
    }
}
