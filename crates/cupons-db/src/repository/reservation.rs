//! # Reservation Repository
//!
//! A resident's hold on a coupon (`cupom_associado`).
//!
//! ## Lifecycle
//! ```text
//! insert ──► (dta_uso NULL) ──mark_used──► (dta_uso = today)
//!   │                                          │
//!   │ UNIQUE (num_cupom, cpf_associado)        │ second mark_used: no-op, false
//!   │ capacity checked in the same statement   │
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::coupon::{COUPON_DETAILS_COLUMNS, COUPON_DETAILS_JOINS};
use crate::rows::{ReservationRow, ReservationWithCouponRow, ReservationWithResidentRow};
use cupons_core::{Reservation, ReservationWithCoupon, ReservationWithResident};

const RESERVATION_COLUMNS: &str = r#"
    id_cupom_associado, num_cupom, cpf_associado, dta_cupom_associado, dta_uso_cupom_associado
"#;

#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// A resident's reservations with coupon details, newest first.
    pub async fn list_by_resident(&self, cpf: &str) -> DbResult<Vec<ReservationWithCoupon>> {
        debug!(cpf = %cpf, "Listing reservations by resident");

        let sql = format!(
            r#"
            SELECT
                r.id_cupom_associado      AS id_cupom_associado,
                r.cpf_associado           AS cpf_associado,
                r.dta_cupom_associado     AS dta_cupom_associado,
                r.dta_uso_cupom_associado AS dta_uso_cupom_associado,
                {COUPON_DETAILS_COLUMNS}
            FROM cupom_associado r
            JOIN cupom c ON c.num_cupom = r.num_cupom
            {COUPON_DETAILS_JOINS}
            WHERE r.cpf_associado = ?1
            ORDER BY r.dta_cupom_associado DESC, r.id_cupom_associado DESC
            "#
        );

        let rows = sqlx::query_as::<_, ReservationWithCouponRow>(&sql)
            .bind(cpf)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReservationWithCoupon::from).collect())
    }

    /// A coupon's reservations with the reserving residents, newest first.
    pub async fn list_by_coupon(&self, code: &str) -> DbResult<Vec<ReservationWithResident>> {
        debug!(code = %code, "Listing reservations by coupon");

        let rows = sqlx::query_as::<_, ReservationWithResidentRow>(
            r#"
            SELECT
                r.id_cupom_associado, r.num_cupom, r.dta_cupom_associado,
                r.dta_uso_cupom_associado,
                a.cpf_associado, a.auth_user_id, a.nom_associado, a.dtn_associado,
                a.end_associado, a.bai_associado, a.cep_associado, a.cid_associado,
                a.uf_associado, a.cel_associado, a.email_associado
            FROM cupom_associado r
            JOIN associado a ON a.cpf_associado = r.cpf_associado
            WHERE r.num_cupom = ?1
            ORDER BY r.dta_cupom_associado DESC, r.id_cupom_associado DESC
            "#,
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReservationWithResident::from).collect())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Reservation>> {
        let sql =
            format!("SELECT {RESERVATION_COLUMNS} FROM cupom_associado WHERE id_cupom_associado = ?1");
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Reservation::from))
    }

    /// Reserves `code` for `cpf` on `reserved_on`.
    ///
    /// Returns `None` when the coupon's `qtd_total_cupom` is already
    /// reached. The count and the insert run as one statement, so two
    /// residents cannot both take the last unit.
    ///
    /// ## Errors
    /// - `UniqueViolation` if this resident already holds the coupon
    /// - `ForeignKeyViolation` if the coupon or resident does not exist
    pub async fn insert(
        &self,
        code: &str,
        cpf: &str,
        reserved_on: NaiveDate,
    ) -> DbResult<Option<Reservation>> {
        debug!(code = %code, cpf = %cpf, "Inserting reservation");

        let sql = format!(
            r#"
            INSERT INTO cupom_associado (num_cupom, cpf_associado, dta_cupom_associado)
            SELECT ?1, ?2, ?3
            WHERE COALESCE(
                (SELECT qtd_total_cupom FROM cupom WHERE num_cupom = ?1)
                    > (SELECT COUNT(*) FROM cupom_associado WHERE num_cupom = ?1),
                1
            )
            RETURNING {RESERVATION_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(code)
            .bind(cpf)
            .bind(reserved_on)
            .fetch_optional(&self.pool)
            .await?;

        if row.is_none() {
            debug!(code = %code, "Coupon has no units left");
        }

        Ok(row.map(Reservation::from))
    }

    /// Stamps the redemption date.
    ///
    /// Returns `false` if the reservation does not exist or was already used.
    pub async fn mark_used(&self, id: i64, used_on: NaiveDate) -> DbResult<bool> {
        debug!(id, "Marking reservation used");

        let result = sqlx::query(
            r#"
            UPDATE cupom_associado
            SET dta_uso_cupom_associado = ?2
            WHERE id_cupom_associado = ?1 AND dta_uso_cupom_associado IS NULL
            "#,
        )
        .bind(id)
        .bind(used_on)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `cpf` already reserved `code`.
    pub async fn exists(&self, code: &str, cpf: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM cupom_associado WHERE num_cupom = ?1 AND cpf_associado = ?2",
        )
        .bind(code)
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    pub async fn count_for_coupon(&self, code: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cupom_associado WHERE num_cupom = ?1")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::fixtures::{self, d, CNPJ, CPF, OTHER_CPF};
    use crate::Database;

    const CODE: &str = "ABCDEF123456";

    async fn setup(total: Option<i64>) -> Database {
        let db = fixtures::db().await;
        fixtures::merchant(&db, CNPJ).await;
        fixtures::resident(&db, CPF).await;
        fixtures::resident(&db, OTHER_CPF).await;

        let mut coupon = fixtures::coupon(CODE, CNPJ, d(2024, 1, 1));
        coupon.total_quantity = total;
        db.coupons().insert(&coupon).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup(None).await;
        let repo = db.reservations();

        let reservation = repo.insert(CODE, CPF, d(2024, 6, 1)).await.unwrap().unwrap();
        assert_eq!(reservation.coupon_id, CODE);
        assert_eq!(reservation.resident_id, CPF);
        assert!(!reservation.used);

        assert_eq!(repo.get(reservation.id).await.unwrap(), Some(reservation));
        assert!(repo.exists(CODE, CPF).await.unwrap());
        assert!(!repo.exists(CODE, OTHER_CPF).await.unwrap());
        assert_eq!(repo.count_for_coupon(CODE).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_reservation_by_same_resident() {
        let db = setup(None).await;
        let repo = db.reservations();

        repo.insert(CODE, CPF, d(2024, 6, 1)).await.unwrap();
        let err = repo.insert(CODE, CPF, d(2024, 6, 2)).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let db = setup(Some(1)).await;
        let repo = db.reservations();

        assert!(repo.insert(CODE, CPF, d(2024, 6, 1)).await.unwrap().is_some());
        assert!(repo.insert(CODE, OTHER_CPF, d(2024, 6, 1)).await.unwrap().is_none());
        assert_eq!(repo.count_for_coupon(CODE).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_used_once() {
        let db = setup(None).await;
        let repo = db.reservations();

        let reservation = repo.insert(CODE, CPF, d(2024, 6, 1)).await.unwrap().unwrap();
        assert!(repo.mark_used(reservation.id, d(2024, 6, 3)).await.unwrap());
        assert!(!repo.mark_used(reservation.id, d(2024, 6, 4)).await.unwrap());
        assert!(!repo.mark_used(9999, d(2024, 6, 4)).await.unwrap());

        let stored = repo.get(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.used_on, Some(d(2024, 6, 3)));
        assert!(stored.used);
    }

    #[tokio::test]
    async fn test_listings() {
        let db = setup(None).await;
        let repo = db.reservations();

        repo.insert(CODE, CPF, d(2024, 6, 1)).await.unwrap();
        repo.insert(CODE, OTHER_CPF, d(2024, 6, 5)).await.unwrap();

        let by_coupon = repo.list_by_coupon(CODE).await.unwrap();
        let cpfs: Vec<_> = by_coupon.iter().map(|r| r.resident.cpf.as_str()).collect();
        assert_eq!(cpfs, [OTHER_CPF, CPF]);
        assert_eq!(by_coupon[1].resident.name, "Maria Silva");

        let mine = repo.list_by_resident(CPF).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].reservation.coupon_id, CODE);
        assert_eq!(mine[0].coupon.coupon.title, "Pizza em dobro");
        assert_eq!(mine[0].coupon.merchant.cnpj, CNPJ);
        assert_eq!(mine[0].coupon.reservations.count, 2);
    }
}
