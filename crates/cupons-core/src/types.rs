//! # Domain Types
//!
//! Application-facing records and request bodies.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Merchant     │   │     Coupon      │   │   Reservation   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  cnpj (key)     │◄──│  code (key)     │◄──│  id (serial)    │       │
//! │  │  nome_fantasia  │   │  comercio_id    │   │  cupom_id       │       │
//! │  │  categoria_id   │   │  window         │   │  associado_id ──┼──┐    │
//! │  └─────────────────┘   │  discount %     │   │  data_uso?      │  │    │
//! │                        └─────────────────┘   └─────────────────┘  │    │
//! │  ┌─────────────────┐   ┌─────────────────┐                        │    │
//! │  │    Category     │   │    Resident     │◄───────────────────────┘    │
//! │  │  id, nome       │   │  cpf (key)      │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Records keep the field names the web frontend already consumes
//! (`nome_fantasia`, `percentual_desconto`, ...). Request bodies use the
//! frontend's camelCase form names (`razaoSocial`, `dataInicio`, ...).
//! Rust field names are English; serde renames bridge the two.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::DiscountPercent;
use crate::document::{DocumentKind, DocumentNumber};
use crate::window::DateWindow;

// =============================================================================
// Category
// =============================================================================

/// A merchant category ("Alimentação", "Saúde", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

// =============================================================================
// Accounts
// =============================================================================

/// Which side of the platform an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum UserKind {
    /// A business publishing coupons (`comercio` table).
    #[serde(rename = "comerciante")]
    Merchant,
    /// A community member reserving coupons (`associado` table).
    #[serde(rename = "morador")]
    Resident,
}

impl UserKind {
    /// The document an account of this kind is keyed by.
    pub const fn document_kind(&self) -> DocumentKind {
        match self {
            UserKind::Merchant => DocumentKind::Cnpj,
            UserKind::Resident => DocumentKind::Cpf,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            UserKind::Merchant => "comerciante",
            UserKind::Resident => "morador",
        }
    }
}

/// A merchant's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Merchant {
    /// Same as `cnpj`; the CNPJ is the primary key.
    pub id: String,
    pub auth_user_id: String,
    pub cnpj: String,
    #[serde(rename = "razao_social")]
    pub legal_name: String,
    #[serde(rename = "nome_fantasia")]
    pub trade_name: String,
    #[serde(rename = "categoria_id")]
    pub category_id: i64,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "bairro")]
    pub district: Option<String>,
    #[serde(rename = "cep")]
    pub postal_code: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "uf")]
    pub state: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub email: String,
    #[serde(rename = "ativo")]
    pub active: bool,
}

/// A resident's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Resident {
    /// Same as `cpf`; the CPF is the primary key.
    pub id: String,
    pub auth_user_id: String,
    pub cpf: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data_nascimento")]
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "bairro")]
    pub district: Option<String>,
    #[serde(rename = "cep")]
    pub postal_code: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "uf")]
    pub state: Option<String>,
    #[serde(rename = "celular")]
    pub mobile: Option<String>,
    pub email: String,
    #[serde(rename = "ativo")]
    pub active: bool,
}

/// Profile returned by login and `/api/perfil`.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum Profile {
    Merchant(Merchant),
    Resident(Resident),
}

impl Profile {
    pub fn kind(&self) -> UserKind {
        match self {
            Profile::Merchant(_) => UserKind::Merchant,
            Profile::Resident(_) => UserKind::Resident,
        }
    }

    /// CNPJ or CPF digits.
    pub fn document(&self) -> &str {
        match self {
            Profile::Merchant(m) => &m.cnpj,
            Profile::Resident(r) => &r.cpf,
        }
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// A discount coupon published by a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    /// The 12-character coupon code.
    pub id: String,
    #[serde(rename = "comercio_id")]
    pub merchant_id: String,
    #[serde(rename = "categoria_id")]
    pub category_id: Option<i64>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "percentual_desconto")]
    pub discount: DiscountPercent,
    #[serde(rename = "data_inicio")]
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[serde(rename = "data_fim")]
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    #[serde(rename = "data_emissao")]
    #[ts(as = "String")]
    pub issued_on: NaiveDate,
    #[serde(rename = "ativo")]
    pub active: bool,
    /// Maximum number of reservations, if limited.
    #[serde(rename = "quantidade_total")]
    pub total_quantity: Option<i64>,
}

impl Coupon {
    /// The coupon's validity window.
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }
}

/// Reservation counter embedded in coupon listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationCount {
    pub count: i64,
}

/// A coupon joined with its merchant, category and reservation count.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CouponWithDetails {
    #[serde(flatten)]
    pub coupon: Coupon,
    #[serde(rename = "comercio")]
    pub merchant: Merchant,
    #[serde(rename = "categoria")]
    pub category: Option<Category>,
    #[serde(rename = "reservas")]
    pub reservations: ReservationCount,
}

// =============================================================================
// Reservations
// =============================================================================

/// A resident's hold on a coupon (`cupom_associado`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reservation {
    pub id: i64,
    #[serde(rename = "cupom_id")]
    pub coupon_id: String,
    #[serde(rename = "associado_id")]
    pub resident_id: String,
    #[serde(rename = "data_reserva")]
    #[ts(as = "String")]
    pub reserved_on: NaiveDate,
    #[serde(rename = "data_uso")]
    #[ts(as = "Option<String>")]
    pub used_on: Option<NaiveDate>,
    /// Mirrors `used_on.is_some()`.
    #[serde(rename = "usado")]
    pub used: bool,
}

impl Reservation {
    pub fn new(
        id: i64,
        coupon_id: String,
        resident_id: String,
        reserved_on: NaiveDate,
        used_on: Option<NaiveDate>,
    ) -> Self {
        Reservation {
            id,
            coupon_id,
            resident_id,
            reserved_on,
            used: used_on.is_some(),
            used_on,
        }
    }
}

/// A resident's reservation with the reserved coupon.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ReservationWithCoupon {
    #[serde(flatten)]
    pub reservation: Reservation,
    #[serde(rename = "cupom")]
    pub coupon: CouponWithDetails,
}

/// A coupon's reservation with the reserving resident.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ReservationWithResident {
    #[serde(flatten)]
    pub reservation: Reservation,
    #[serde(rename = "associado")]
    pub resident: Resident,
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Merchant sign-up form.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct MerchantRegistration {
    pub cnpj: String,
    #[serde(rename = "razaoSocial")]
    pub legal_name: String,
    #[serde(rename = "nomeFantasia")]
    pub trade_name: String,
    #[serde(rename = "categoriaId")]
    pub category_id: Option<i64>,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "bairro")]
    pub district: Option<String>,
    #[serde(rename = "cep")]
    pub postal_code: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "uf")]
    pub state: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Resident sign-up form.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ResidentRegistration {
    pub cpf: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "dataNascimento")]
    pub birth_date: Option<String>,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "bairro")]
    pub district: Option<String>,
    #[serde(rename = "cep")]
    pub postal_code: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "uf")]
    pub state: Option<String>,
    #[serde(rename = "celular")]
    pub mobile: Option<String>,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Login form: document, password and which side the user claims to be.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(rename = "documento")]
    pub document: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "tipo")]
    pub kind: Option<UserKind>,
}

/// Coupon creation form.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CouponForm {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "categoriaId")]
    pub category_id: Option<i64>,
    #[serde(rename = "percentualDesconto")]
    pub discount: i64,
    #[serde(rename = "dataInicio")]
    pub start_date: String,
    #[serde(rename = "dataFim")]
    pub end_date: String,
    #[serde(rename = "quantidadeTotal")]
    pub total_quantity: Option<i64>,
}

/// Partial coupon update; absent fields are left untouched.
///
/// `categoriaId` and `quantidadeTotal` tell an explicit `null` (clear the
/// value) apart from a missing key: `Some(None)` against `None`.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CouponUpdate {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "categoriaId", deserialize_with = "nullable")]
    pub category_id: Option<Option<i64>>,
    #[serde(rename = "percentualDesconto")]
    pub discount: Option<i64>,
    #[serde(rename = "dataInicio")]
    pub start_date: Option<String>,
    #[serde(rename = "dataFim")]
    pub end_date: Option<String>,
    #[serde(rename = "quantidadeTotal", deserialize_with = "nullable")]
    pub total_quantity: Option<Option<i64>>,
}

/// Maps a present key to `Some`, so a `null` value becomes `Some(None)`.
/// Missing keys fall back to the field default.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Validated Inputs
// =============================================================================
// Produced by `validation`, consumed by the repositories.

/// A merchant ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMerchant {
    pub cnpj: DocumentNumber,
    pub legal_name: String,
    pub trade_name: String,
    pub category_id: i64,
    pub address: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub email: String,
}

/// A resident ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResident {
    pub cpf: DocumentNumber,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub mobile: Option<String>,
    pub email: String,
}

/// A validated coupon form, still missing its code and owner.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponDraft {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub discount: DiscountPercent,
    pub window: DateWindow,
    pub total_quantity: Option<i64>,
}

impl CouponDraft {
    /// Completes the draft into an active coupon.
    pub fn into_coupon(self, code: String, merchant_id: String, issued_on: NaiveDate) -> Coupon {
        Coupon {
            id: code,
            merchant_id,
            category_id: self.category_id,
            title: self.title,
            description: self.description,
            discount: self.discount,
            start_date: self.window.start,
            end_date: self.window.end,
            issued_on,
            active: true,
            total_quantity: self.total_quantity,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_coupon() -> Coupon {
        Coupon {
            id: "ABCDEF123456".to_string(),
            merchant_id: "11222333000181".to_string(),
            category_id: Some(1),
            title: "Pizza em dobro".to_string(),
            description: None,
            discount: DiscountPercent::new(15).unwrap(),
            start_date: d(2024, 1, 1),
            end_date: d(2024, 12, 31),
            issued_on: d(2024, 1, 1),
            active: true,
            total_quantity: None,
        }
    }

    #[test]
    fn test_coupon_serializes_with_wire_names() {
        let json = serde_json::to_value(sample_coupon()).unwrap();
        assert_eq!(json["id"], "ABCDEF123456");
        assert_eq!(json["comercio_id"], "11222333000181");
        assert_eq!(json["percentual_desconto"], 15);
        assert_eq!(json["data_inicio"], "2024-01-01");
        assert_eq!(json["ativo"], true);
    }

    #[test]
    fn test_coupon_update_tells_null_from_missing() {
        let update: CouponUpdate = serde_json::from_str(r#"{"titulo": "Novo"}"#).unwrap();
        assert_eq!(update.total_quantity, None);
        assert_eq!(update.category_id, None);

        let update: CouponUpdate =
            serde_json::from_str(r#"{"quantidadeTotal": null, "categoriaId": 2}"#).unwrap();
        assert_eq!(update.total_quantity, Some(None));
        assert_eq!(update.category_id, Some(Some(2)));
    }

    #[test]
    fn test_reservation_used_flag_follows_date() {
        let open = Reservation::new(1, "C".into(), "R".into(), d(2024, 6, 1), None);
        assert!(!open.used);

        let used = Reservation::new(2, "C".into(), "R".into(), d(2024, 6, 1), Some(d(2024, 6, 2)));
        assert!(used.used);

        let json = serde_json::to_value(&used).unwrap();
        assert_eq!(json["usado"], true);
        assert_eq!(json["data_uso"], "2024-06-02");
    }

    #[test]
    fn test_user_kind_wire_names() {
        let kind: UserKind = serde_json::from_str("\"comerciante\"").unwrap();
        assert_eq!(kind, UserKind::Merchant);
        assert_eq!(kind.document_kind(), DocumentKind::Cnpj);
        assert_eq!(
            serde_json::to_string(&UserKind::Resident).unwrap(),
            "\"morador\""
        );
    }

    #[test]
    fn test_registration_reads_form_names() {
        let body = r#"{
            "cnpj": "11.222.333/0001-81",
            "razaoSocial": "Pizzaria Ltda",
            "nomeFantasia": "Pizza Boa",
            "categoriaId": 2,
            "email": "contato@pizzaboa.com",
            "senha": "segredo"
        }"#;
        let form: MerchantRegistration = serde_json::from_str(body).unwrap();
        assert_eq!(form.legal_name, "Pizzaria Ltda");
        assert_eq!(form.category_id, Some(2));
        assert_eq!(form.address, None);
    }

    #[test]
    fn test_coupon_with_details_flattens_coupon() {
        let details = CouponWithDetails {
            coupon: sample_coupon(),
            merchant: Merchant {
                id: "11222333000181".into(),
                auth_user_id: "u1".into(),
                cnpj: "11222333000181".into(),
                legal_name: "Pizzaria Ltda".into(),
                trade_name: "Pizza Boa".into(),
                category_id: 1,
                address: None,
                district: None,
                postal_code: None,
                city: None,
                state: None,
                phone: None,
                email: "contato@pizzaboa.com".into(),
                active: true,
            },
            category: Some(Category {
                id: 1,
                name: "Alimentação".into(),
            }),
            reservations: ReservationCount { count: 3 },
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["titulo"], "Pizza em dobro");
        assert_eq!(json["comercio"]["nome_fantasia"], "Pizza Boa");
        assert_eq!(json["categoria"]["nome"], "Alimentação");
        assert_eq!(json["reservas"]["count"], 3);
    }
}
