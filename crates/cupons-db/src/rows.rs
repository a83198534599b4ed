//! # Legacy Rows
//!
//! Row structs named after the stored columns, and their conversion into
//! the application types of `cupons_core`. Nothing outside this module
//! knows a legacy column name's meaning.
//!
//! ```text
//! ┌──────────────────────────────┐         ┌──────────────────────────────┐
//! │ CouponRow                    │  From   │ Coupon                       │
//! │  num_cupom                   │ ──────► │  id                          │
//! │  cnpj_comercio               │         │  merchant_id                 │
//! │  per_desc_cupom  (0.15)      │         │  discount        (15)        │
//! │  dta_termino_cupom           │         │  end_date                    │
//! └──────────────────────────────┘         └──────────────────────────────┘
//! ```
//!
//! Joined rows (`CouponDetailsRow`, ...) read aliased columns; the SELECT
//! lists that produce them live in the repositories next to their queries.

use chrono::NaiveDate;
use sqlx::FromRow;

use cupons_core::{
    Category, Coupon, CouponWithDetails, DiscountPercent, Merchant, Reservation,
    ReservationCount, ReservationWithCoupon, ReservationWithResident, Resident,
};

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id_categoria: i64,
    pub nom_categoria: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id_categoria,
            name: row.nom_categoria,
        }
    }
}

// =============================================================================
// Merchant / Resident
// =============================================================================

/// A `comercio` row.
#[derive(Debug, Clone, FromRow)]
pub struct MerchantRow {
    pub cnpj_comercio: String,
    pub auth_user_id: String,
    pub id_categoria: i64,
    pub raz_social_comercio: String,
    pub nom_fantasia_comercio: String,
    pub end_comercio: Option<String>,
    pub bai_comercio: Option<String>,
    pub cep_comercio: Option<String>,
    pub cid_comercio: Option<String>,
    pub uf_comercio: Option<String>,
    pub con_comercio: Option<String>,
    pub email_comercio: String,
}

impl From<MerchantRow> for Merchant {
    fn from(row: MerchantRow) -> Self {
        Merchant {
            id: row.cnpj_comercio.clone(),
            auth_user_id: row.auth_user_id,
            cnpj: row.cnpj_comercio,
            legal_name: row.raz_social_comercio,
            trade_name: row.nom_fantasia_comercio,
            category_id: row.id_categoria,
            address: row.end_comercio,
            district: row.bai_comercio,
            postal_code: row.cep_comercio,
            city: row.cid_comercio,
            state: row.uf_comercio,
            phone: row.con_comercio,
            email: row.email_comercio,
            // accounts cannot be deactivated yet
            active: true,
        }
    }
}

/// An `associado` row.
#[derive(Debug, Clone, FromRow)]
pub struct ResidentRow {
    pub cpf_associado: String,
    pub auth_user_id: String,
    pub nom_associado: String,
    pub dtn_associado: Option<NaiveDate>,
    pub end_associado: Option<String>,
    pub bai_associado: Option<String>,
    pub cep_associado: Option<String>,
    pub cid_associado: Option<String>,
    pub uf_associado: Option<String>,
    pub cel_associado: Option<String>,
    pub email_associado: String,
}

impl From<ResidentRow> for Resident {
    fn from(row: ResidentRow) -> Self {
        Resident {
            id: row.cpf_associado.clone(),
            auth_user_id: row.auth_user_id,
            cpf: row.cpf_associado,
            name: row.nom_associado,
            birth_date: row.dtn_associado,
            address: row.end_associado,
            district: row.bai_associado,
            postal_code: row.cep_associado,
            city: row.cid_associado,
            state: row.uf_associado,
            mobile: row.cel_associado,
            email: row.email_associado,
            active: true,
        }
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A `cupom` row.
#[derive(Debug, Clone, FromRow)]
pub struct CouponRow {
    pub num_cupom: String,
    pub cnpj_comercio: String,
    pub id_categoria: Option<i64>,
    pub tit_cupom: String,
    pub des_cupom: Option<String>,
    pub per_desc_cupom: f64,
    pub dta_emissao_cupom: NaiveDate,
    pub dta_inicio_cupom: NaiveDate,
    pub dta_termino_cupom: NaiveDate,
    pub ativo_cupom: bool,
    pub qtd_total_cupom: Option<i64>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Coupon {
            id: row.num_cupom,
            merchant_id: row.cnpj_comercio,
            category_id: row.id_categoria,
            title: row.tit_cupom,
            description: row.des_cupom,
            discount: DiscountPercent::from_stored_fraction(row.per_desc_cupom),
            start_date: row.dta_inicio_cupom,
            end_date: row.dta_termino_cupom,
            issued_on: row.dta_emissao_cupom,
            active: row.ativo_cupom,
            total_quantity: row.qtd_total_cupom,
        }
    }
}

/// A coupon joined with its merchant, resolved category and reservation
/// count.
///
/// The merchant's columns keep their names; the coupon's own category is
/// read as `id_categoria_cupom` so it does not shadow the merchant's.
#[derive(Debug, Clone, FromRow)]
pub struct CouponDetailsRow {
    pub num_cupom: String,
    pub id_categoria_cupom: Option<i64>,
    pub tit_cupom: String,
    pub des_cupom: Option<String>,
    pub per_desc_cupom: f64,
    pub dta_emissao_cupom: NaiveDate,
    pub dta_inicio_cupom: NaiveDate,
    pub dta_termino_cupom: NaiveDate,
    pub ativo_cupom: bool,
    pub qtd_total_cupom: Option<i64>,
    #[sqlx(flatten)]
    pub merchant: MerchantRow,
    pub categoria_id: Option<i64>,
    pub categoria_nome: Option<String>,
    pub total_reservas: i64,
}

impl From<CouponDetailsRow> for CouponWithDetails {
    fn from(row: CouponDetailsRow) -> Self {
        let coupon = Coupon::from(CouponRow {
            num_cupom: row.num_cupom,
            cnpj_comercio: row.merchant.cnpj_comercio.clone(),
            id_categoria: row.id_categoria_cupom,
            tit_cupom: row.tit_cupom,
            des_cupom: row.des_cupom,
            per_desc_cupom: row.per_desc_cupom,
            dta_emissao_cupom: row.dta_emissao_cupom,
            dta_inicio_cupom: row.dta_inicio_cupom,
            dta_termino_cupom: row.dta_termino_cupom,
            ativo_cupom: row.ativo_cupom,
            qtd_total_cupom: row.qtd_total_cupom,
        });

        let category = match (row.categoria_id, row.categoria_nome) {
            (Some(id), Some(name)) => Some(Category { id, name }),
            _ => None,
        };

        CouponWithDetails {
            coupon,
            merchant: row.merchant.into(),
            category,
            reservations: ReservationCount {
                count: row.total_reservas,
            },
        }
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A `cupom_associado` row.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub id_cupom_associado: i64,
    pub num_cupom: String,
    pub cpf_associado: String,
    pub dta_cupom_associado: NaiveDate,
    pub dta_uso_cupom_associado: Option<NaiveDate>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation::new(
            row.id_cupom_associado,
            row.num_cupom,
            row.cpf_associado,
            row.dta_cupom_associado,
            row.dta_uso_cupom_associado,
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ReservationWithCouponRow {
    #[sqlx(flatten)]
    pub reservation: ReservationRow,
    #[sqlx(flatten)]
    pub coupon: CouponDetailsRow,
}

impl From<ReservationWithCouponRow> for ReservationWithCoupon {
    fn from(row: ReservationWithCouponRow) -> Self {
        ReservationWithCoupon {
            reservation: row.reservation.into(),
            coupon: row.coupon.into(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ReservationWithResidentRow {
    #[sqlx(flatten)]
    pub reservation: ReservationRow,
    #[sqlx(flatten)]
    pub resident: ResidentRow,
}

impl From<ReservationWithResidentRow> for ReservationWithResident {
    fn from(row: ReservationWithResidentRow) -> Self {
        ReservationWithResident {
            reservation: row.reservation.into(),
            resident: row.resident.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn merchant_row() -> MerchantRow {
        MerchantRow {
            cnpj_comercio: "11222333000181".into(),
            auth_user_id: "u1".into(),
            id_categoria: 3,
            raz_social_comercio: "Pizzaria Ltda".into(),
            nom_fantasia_comercio: "Pizza Boa".into(),
            end_comercio: None,
            bai_comercio: None,
            cep_comercio: None,
            cid_comercio: None,
            uf_comercio: Some("SP".into()),
            con_comercio: Some("1133334444".into()),
            email_comercio: "contato@pizzaboa.com".into(),
        }
    }

    #[test]
    fn test_coupon_row_converts_fraction() {
        let coupon = Coupon::from(CouponRow {
            num_cupom: "ABCDEF123456".into(),
            cnpj_comercio: "11222333000181".into(),
            id_categoria: None,
            tit_cupom: "Pizza".into(),
            des_cupom: None,
            per_desc_cupom: 0.15,
            dta_emissao_cupom: d(1, 1),
            dta_inicio_cupom: d(1, 2),
            dta_termino_cupom: d(1, 31),
            ativo_cupom: true,
            qtd_total_cupom: Some(10),
        });

        assert_eq!(coupon.discount.value(), 15);
        assert_eq!(coupon.start_date, d(1, 2));
        assert_eq!(coupon.issued_on, d(1, 1));
    }

    #[test]
    fn test_merchant_row_maps_phone_and_id() {
        let merchant = Merchant::from(merchant_row());
        assert_eq!(merchant.id, merchant.cnpj);
        assert_eq!(merchant.phone.as_deref(), Some("1133334444"));
        assert_eq!(merchant.category_id, 3);
        assert!(merchant.active);
    }

    #[test]
    fn test_details_row_without_category() {
        let details = CouponWithDetails::from(CouponDetailsRow {
            num_cupom: "ABCDEF123456".into(),
            id_categoria_cupom: None,
            tit_cupom: "Pizza".into(),
            des_cupom: None,
            per_desc_cupom: 0.5,
            dta_emissao_cupom: d(1, 1),
            dta_inicio_cupom: d(1, 1),
            dta_termino_cupom: d(1, 31),
            ativo_cupom: false,
            qtd_total_cupom: None,
            merchant: merchant_row(),
            categoria_id: None,
            categoria_nome: None,
            total_reservas: 4,
        });

        assert_eq!(details.coupon.merchant_id, "11222333000181");
        assert_eq!(details.coupon.discount.value(), 50);
        assert!(!details.coupon.active);
        assert!(details.category.is_none());
        assert_eq!(details.reservations.count, 4);
    }

    #[test]
    fn test_reservation_row_sets_used() {
        let reservation = Reservation::from(ReservationRow {
            id_cupom_associado: 1,
            num_cupom: "ABCDEF123456".into(),
            cpf_associado: "11144477735".into(),
            dta_cupom_associado: d(6, 1),
            dta_uso_cupom_associado: Some(d(6, 2)),
        });
        assert!(reservation.used);
    }
}
