//! # Domain Types
//!
//! Core domain types used throughout the optical shop backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Client       │   │      Sale       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  client_id      │◄──│  sale_id        │       │
//! │  │  name, phone    │   │  service_order# │   │  amount_cents   │       │
//! │  │  right_eye      │   │  items[]        │   │  payment_method │       │
//! │  │  left_eye       │   │  total / paid / │   │  payment_date   │       │
//! │  └─────────────────┘   │  pending        │   └─────────────────┘       │
//! │          ▲             └─────────────────┘                              │
//! │          │                                                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Appointment    │   │   SaleStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  client_id      │   │  pending        │   │  cash, card     │       │
//! │  │  date (ms)      │   │  partial, paid  │   │  pix, transfer  │       │
//! │  └─────────────────┘   │  cancelled      │   │  installment    │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID where one exists: `service_order_number` on sales, printed
//!   on the paper order handed to the customer
//!
//! Sales and appointments reference clients by id only. A deleted client
//! leaves them in place with their `client_name` snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Sale Status
// =============================================================================

/// The balance status of a sale.
///
/// ## State Machine
/// ```text
///            payment (0 < paid < total)
///  pending ─────────────────────────────► partial
///     │                                      │
///     │ payment (paid ≥ total)               │ payment (paid ≥ total)
///     ▼                                      ▼
///   paid ◄───────────────────────────────────┘
///
///  Any state ──(manual update)──► cancelled ──(next payment op)──► re-derived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Nothing paid yet.
    Pending,
    /// Some amount paid, balance outstanding.
    Partial,
    /// Fully paid.
    Paid,
    /// Manually cancelled by the shop.
    Cancelled,
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 4] = [
        SaleStatus::Pending,
        SaleStatus::Partial,
        SaleStatus::Paid,
        SaleStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Partial => "partial",
            SaleStatus::Paid => "paid",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SaleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: SaleStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Pix,
    /// Store credit split in 2 to 12 installments.
    Installment,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Installment => "installment",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// Prescription values for one eye.
///
/// Kept as free text: optometrists write "+1,25", "-0.75", "plano" and the
/// shop prints them back exactly as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct EyePrescription {
    /// Spherical power (ESF).
    pub spherical: Option<String>,
    /// Cylindrical power (CIL).
    pub cylindrical: Option<String>,
    /// Cylinder axis in degrees.
    pub axis: Option<String>,
    /// Near addition (ADIÇÃO).
    pub addition: Option<String>,
    /// Naso-pupillary distance.
    pub dnp: Option<String>,
    /// Optical center height.
    pub co: Option<String>,
}

impl EyePrescription {
    pub fn is_empty(&self) -> bool {
        self.spherical.is_none()
            && self.cylindrical.is_none()
            && self.axis.is_none()
            && self.addition.is_none()
            && self.dnp.is_none()
            && self.co.is_none()
    }
}

/// A shop customer with their latest prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    /// Brazilian individual taxpayer id, stored as typed.
    pub cpf: Option<String>,
    pub address: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub right_eye: EyePrescription,
    pub left_eye: EyePrescription,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Search predicate used by the client list.
    ///
    /// `query_lower` must already be lowercased. Name and email compare
    /// case-insensitively; phone is a plain substring match against the
    /// raw query so "9888" finds "(11) 98888-7777".
    pub fn matches(&self, query_lower: &str, query_raw: &str) -> bool {
        if self.name.to_lowercase().contains(query_lower) {
            return true;
        }
        if self
            .email
            .as_deref()
            .is_some_and(|email| email.to_lowercase().contains(query_lower))
        {
            return true;
        }
        self.phone.contains(query_raw)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a service order. Free text: optical orders mix lenses,
/// treatments and services that are not catalog products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// `quantity × unit_price_cents`.
    pub total_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A service order and its running balance.
///
/// ## Balance Invariant
/// `paid_amount_cents + pending_amount_cents == total_cents` after every
/// ledger mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Human-facing order number, unique, first is 701.
    pub service_order_number: i64,
    pub client_id: String,
    /// Client name at the time the order was opened.
    pub client_name: String,
    pub items: Vec<SaleItem>,
    pub frame_value_cents: Option<i64>,
    pub lens_value_cents: Option<i64>,
    pub subtotal_cents: i64,
    pub discount_cents: Option<i64>,
    pub total_cents: i64,
    pub paid_amount_cents: i64,
    pub pending_amount_cents: i64,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    pub installments: Option<i64>,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Incremented on every mutation.
    pub version: i64,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_amount_cents)
    }

    #[inline]
    pub fn pending(&self) -> Money {
        Money::from_cents(self.pending_amount_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards a sale. Immutable; only deletion reverses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Response of `addPayment`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAdded {
    pub success: bool,
    pub payment_id: String,
    pub sale: Sale,
}

// =============================================================================
// Aggregates
// =============================================================================

/// Dashboard totals across every sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    /// Sum of `total_cents`.
    pub total_sales: i64,
    pub total_count: i64,
    /// Sum of `paid_amount_cents`.
    pub total_paid: i64,
    /// Sum of `pending_amount_cents`.
    pub total_pending: i64,
    /// Number of sales with status `paid`.
    pub paid_count: i64,
}

// =============================================================================
// Appointment
// =============================================================================

/// A booked slot in the appointment book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    /// Client name at booking time.
    pub client_name: String,
    /// Exact slot start, transported as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One row of the daily agenda grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AgendaSlot {
    /// Shop-local wall clock label, "HH:MM".
    pub time: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub start: DateTime<Utc>,
    pub appointment: Option<Appointment>,
}

// =============================================================================
// Profile
// =============================================================================

/// Company profile printed on receipts. There is at most one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub fantasy_name: Option<String>,
    /// Brazilian company registration number.
    pub cnpj: Option<String>,
    pub contact_phone: Option<String>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Receipt
// =============================================================================

/// Everything the receipt renderer needs for one sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    pub sale: Sale,
    /// `None` when the client was deleted after the sale.
    pub client: Option<Client>,
    /// `None` until the shop saves its profile.
    pub profile: Option<Profile>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn client(name: &str, email: Option<&str>, phone: &str) -> Client {
        let now = Utc::now();
        Client {
            id: "c1".to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: phone.to_string(),
            cpf: None,
            address: None,
            birth_date: None,
            right_eye: EyePrescription::default(),
            left_eye: EyePrescription::default(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn test_sale_status_parse() {
        assert_eq!("partial".parse::<SaleStatus>().unwrap(), SaleStatus::Partial);
        assert_eq!(" cancelled ".parse::<SaleStatus>().unwrap(), SaleStatus::Cancelled);
        assert!("completed".parse::<SaleStatus>().is_err());
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&SaleStatus::Paid).unwrap(), "\"paid\"");
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Installment).unwrap(),
            "\"installment\""
        );
        let method: PaymentMethod = serde_json::from_str("\"pix\"").unwrap();
        assert_eq!(method, PaymentMethod::Pix);
    }

    #[test]
    fn test_client_matches() {
        let c = client("Maria Oliveira", Some("Maria@Example.com"), "(11) 98888-7777");

        assert!(c.matches("oliv", "oliv"));
        assert!(c.matches("maria@ex", "MARIA@EX"));
        assert!(c.matches("98888", "98888"));
        assert!(!c.matches("joão", "João"));

        let no_email = client("Pedro", None, "1234");
        assert!(!no_email.matches("example", "example"));
    }

    #[test]
    fn test_eye_prescription_empty() {
        assert!(EyePrescription::default().is_empty());
        let eye = EyePrescription {
            axis: Some("90".to_string()),
            ..Default::default()
        };
        assert!(!eye.is_empty());
    }

    #[test]
    fn test_appointment_date_is_epoch_millis() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 12, 30, 0).unwrap();
        let appt = Appointment {
            id: "a1".to_string(),
            client_id: "c1".to_string(),
            client_name: "Ana".to_string(),
            date: at,
            notes: None,
            created_at: at,
        };

        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(json["date"], serde_json::json!(at.timestamp_millis()));
        assert_eq!(json["clientName"], "Ana");
    }

    #[test]
    fn test_sales_totals_camel_case() {
        let json = serde_json::to_value(SalesTotals::default()).unwrap();
        for key in ["totalSales", "totalCount", "totalPaid", "totalPending", "paidCount"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
