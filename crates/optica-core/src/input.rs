//! # Operation Inputs
//!
//! One explicit input struct per mutation. Each one deserializes straight
//! from the camelCase request body and carries its own `normalize` (trim,
//! empty strings become absent) and `validate` (field rules) steps.
//!
//! ```text
//! request JSON ──► NewSale ──normalize()──► validate()? ──► ledger / repository
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{EyePrescription, PaymentMethod, SaleStatus};
use crate::validation::{
    optional_text, optional_text_max, required_text, validate_installments,
    validate_non_negative_cents, validate_payment_amount, validate_quantity, validate_uuid,
    ValidationResult, MAX_NOTES, MAX_SHORT_TEXT,
};
use crate::MAX_SALE_ITEMS;

/// Lets a patch tell "field absent" (`None`) apart from "field set to
/// null" (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Client
// =============================================================================

/// Editable fields of a client, used for both create and full update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub right_eye: EyePrescription,
    #[serde(default)]
    pub left_eye: EyePrescription,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientInput {
    pub fn normalize(self) -> Self {
        ClientInput {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: optional_text(self.email),
            cpf: optional_text(self.cpf),
            address: optional_text(self.address),
            birth_date: self.birth_date,
            right_eye: normalize_eye(self.right_eye),
            left_eye: normalize_eye(self.left_eye),
            notes: optional_text(self.notes),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        required_text("name", &self.name, MAX_SHORT_TEXT)?;
        required_text("phone", &self.phone, 30)?;
        optional_text_max("email", self.email.clone(), MAX_SHORT_TEXT)?;
        optional_text_max("address", self.address.clone(), MAX_SHORT_TEXT)?;
        optional_text_max("notes", self.notes.clone(), MAX_NOTES)?;
        Ok(())
    }
}

fn normalize_eye(eye: EyePrescription) -> EyePrescription {
    EyePrescription {
        spherical: optional_text(eye.spherical),
        cylindrical: optional_text(eye.cylindrical),
        axis: optional_text(eye.axis),
        addition: optional_text(eye.addition),
        dnp: optional_text(eye.dnp),
        co: optional_text(eye.co),
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One requested line of a new service order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Caller-computed line total; must match `quantity × unitPriceCents`.
    #[serde(default)]
    pub total_cents: Option<i64>,
}

impl NewSaleItem {
    pub fn validate(&self) -> ValidationResult<()> {
        required_text("description", &self.description, MAX_SHORT_TEXT)?;
        validate_quantity(self.quantity)?;
        validate_non_negative_cents("unitPrice", self.unit_price_cents)?;
        Ok(())
    }
}

/// A new service order as submitted by the sale form.
///
/// Derived amounts (`subtotalCents`, `totalCents`, `pendingAmountCents`,
/// `status`) are optional. When present they are checked against the
/// server's own derivation, never trusted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub client_id: String,
    pub client_name: String,
    pub items: Vec<NewSaleItem>,
    #[serde(default)]
    pub frame_value_cents: Option<i64>,
    #[serde(default)]
    pub lens_value_cents: Option<i64>,
    #[serde(default)]
    pub discount_cents: Option<i64>,
    #[serde(default)]
    pub subtotal_cents: Option<i64>,
    #[serde(default)]
    pub total_cents: Option<i64>,
    #[serde(default)]
    pub paid_amount_cents: i64,
    #[serde(default)]
    pub pending_amount_cents: Option<i64>,
    #[serde(default)]
    pub status: Option<SaleStatus>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub installments: Option<i64>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Explicit number for orders transcribed from paper; assigned by the
    /// server when absent.
    #[serde(default)]
    pub service_order_number: Option<i64>,
}

impl NewSale {
    pub fn normalize(mut self) -> Self {
        self.client_id = self.client_id.trim().to_string();
        self.client_name = self.client_name.trim().to_string();
        for item in &mut self.items {
            item.description = item.description.trim().to_string();
        }
        self.notes = optional_text(self.notes);
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("clientId", &self.client_id)?;
        required_text("clientName", &self.client_name, MAX_SHORT_TEXT)?;

        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            });
        }
        if self.items.len() > MAX_SALE_ITEMS {
            return Err(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_SALE_ITEMS as i64,
            });
        }
        for item in &self.items {
            item.validate()?;
        }

        if let Some(frame) = self.frame_value_cents {
            validate_non_negative_cents("frameValue", frame)?;
        }
        if let Some(lens) = self.lens_value_cents {
            validate_non_negative_cents("lensValue", lens)?;
        }
        if let Some(discount) = self.discount_cents {
            validate_non_negative_cents("discount", discount)?;
        }
        validate_non_negative_cents("paidAmount", self.paid_amount_cents)?;

        validate_installments(self.payment_method, self.installments)?;

        if let Some(number) = self.service_order_number {
            if number <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "serviceOrderNumber".to_string(),
                });
            }
        }

        optional_text_max("notes", self.notes.clone(), MAX_NOTES)?;
        Ok(())
    }
}

/// Partial update of a sale.
///
/// `status` is a manual override. `installments` and `deliveryDate` accept
/// an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalePatch {
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub paid_amount_cents: Option<i64>,
    #[serde(default)]
    pub pending_amount_cents: Option<i64>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, deserialize_with = "double_option")]
    pub installments: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(as = "Option<Option<String>>")]
    pub delivery_date: Option<Option<NaiveDate>>,
    /// An empty string clears the notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl SalePatch {
    pub fn touches_balance(&self) -> bool {
        self.paid_amount_cents.is_some() || self.pending_amount_cents.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && !self.touches_balance()
            && self.payment_method.is_none()
            && self.installments.is_none()
            && self.delivery_date.is_none()
            && self.notes.is_none()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(paid) = self.paid_amount_cents {
            validate_non_negative_cents("paidAmount", paid)?;
        }
        if let Some(pending) = self.pending_amount_cents {
            validate_non_negative_cents("pendingAmount", pending)?;
        }
        optional_text_max("notes", self.notes.clone(), MAX_NOTES)?;
        Ok(())
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment against an existing sale. The sale id comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn normalize(mut self) -> Self {
        self.notes = optional_text(self.notes);
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_payment_amount(self.amount_cents)?;
        optional_text_max("notes", self.notes.clone(), MAX_NOTES)?;
        Ok(())
    }
}

// =============================================================================
// Appointment
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub client_id: String,
    /// Slot start as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn normalize(mut self) -> Self {
        self.client_id = self.client_id.trim().to_string();
        self.notes = optional_text(self.notes);
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("clientId", &self.client_id)?;
        optional_text_max("notes", self.notes.clone(), MAX_NOTES)?;
        Ok(())
    }
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[serde(default)]
    pub fantasy_name: Option<String>,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl ProfileInput {
    pub fn normalize(self) -> Self {
        ProfileInput {
            fantasy_name: optional_text(self.fantasy_name),
            cnpj: optional_text(self.cnpj),
            contact_phone: optional_text(self.contact_phone),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        optional_text_max("fantasyName", self.fantasy_name.clone(), MAX_SHORT_TEXT)?;
        optional_text_max("cnpj", self.cnpj.clone(), 30)?;
        optional_text_max("contactPhone", self.contact_phone.clone(), 30)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn new_sale() -> NewSale {
        NewSale {
            client_id: CLIENT_ID.to_string(),
            client_name: "Ana Souza".to_string(),
            items: vec![NewSaleItem {
                description: "Lente multifocal".to_string(),
                quantity: 1,
                unit_price_cents: 10_000,
                total_cents: None,
            }],
            frame_value_cents: None,
            lens_value_cents: None,
            discount_cents: None,
            subtotal_cents: None,
            total_cents: None,
            paid_amount_cents: 0,
            pending_amount_cents: None,
            status: None,
            payment_method: PaymentMethod::Pix,
            installments: None,
            delivery_date: None,
            notes: None,
            service_order_number: None,
        }
    }

    #[test]
    fn test_client_input_normalize_trims_and_drops_empty() {
        let input = ClientInput {
            name: "  Ana Souza ".to_string(),
            phone: " 11 99999-0000 ".to_string(),
            email: Some("   ".to_string()),
            right_eye: EyePrescription {
                spherical: Some(" -1,25 ".to_string()),
                axis: Some("".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
        .normalize();

        assert_eq!(input.name, "Ana Souza");
        assert_eq!(input.phone, "11 99999-0000");
        assert_eq!(input.email, None);
        assert_eq!(input.right_eye.spherical.as_deref(), Some("-1,25"));
        assert_eq!(input.right_eye.axis, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_client_input_requires_name_and_phone() {
        let missing_name = ClientInput {
            phone: "1234".to_string(),
            ..Default::default()
        };
        assert!(missing_name.validate().is_err());

        let missing_phone = ClientInput {
            name: "Ana".to_string(),
            ..Default::default()
        };
        assert!(missing_phone.validate().is_err());
    }

    #[test]
    fn test_new_sale_validation() {
        assert!(new_sale().validate().is_ok());

        let mut no_items = new_sale();
        no_items.items.clear();
        assert!(no_items.validate().is_err());

        let mut negative_discount = new_sale();
        negative_discount.discount_cents = Some(-1);
        assert!(negative_discount.validate().is_err());

        let mut bad_installments = new_sale();
        bad_installments.installments = Some(3);
        assert!(bad_installments.validate().is_err());

        let mut installment = new_sale();
        installment.payment_method = PaymentMethod::Installment;
        installment.installments = Some(10);
        assert!(installment.validate().is_ok());

        let mut blank_name = new_sale();
        blank_name.client_name = "   ".to_string();
        assert!(blank_name.normalize().validate().is_err());
    }

    #[test]
    fn test_new_sale_deserializes_camel_case() {
        let json = serde_json::json!({
            "clientId": CLIENT_ID,
            "clientName": "Ana",
            "items": [{ "description": "Armação", "quantity": 1, "unitPriceCents": 25000 }],
            "paymentMethod": "cash"
        });
        let sale: NewSale = serde_json::from_value(json).unwrap();
        assert_eq!(sale.paid_amount_cents, 0);
        assert_eq!(sale.items[0].unit_price_cents, 25_000);
        assert_eq!(sale.service_order_number, None);
    }

    #[test]
    fn test_sale_patch_distinguishes_null_from_absent() {
        let absent: SalePatch = serde_json::from_str("{}").unwrap();
        assert!(absent.is_empty());
        assert_eq!(absent.delivery_date, None);

        let cleared: SalePatch = serde_json::from_str(r#"{"deliveryDate": null}"#).unwrap();
        assert_eq!(cleared.delivery_date, Some(None));

        let set: SalePatch =
            serde_json::from_str(r#"{"deliveryDate": "2026-05-10", "paidAmountCents": 100}"#)
                .unwrap();
        assert_eq!(
            set.delivery_date,
            Some(NaiveDate::from_ymd_opt(2026, 5, 10))
        );
        assert!(set.touches_balance());
    }

    #[test]
    fn test_sale_patch_rejects_negative_balance_fields() {
        let ok: SalePatch =
            serde_json::from_str(r#"{"paidAmountCents": 0, "pendingAmountCents": 100}"#).unwrap();
        assert!(ok.validate().is_ok());

        let negative_paid: SalePatch =
            serde_json::from_value(serde_json::json!({ "paidAmountCents": i64::MIN })).unwrap();
        assert!(matches!(
            negative_paid.validate(),
            Err(ValidationError::Negative { .. })
        ));

        let negative_pending: SalePatch =
            serde_json::from_value(serde_json::json!({ "pendingAmountCents": -1 })).unwrap();
        assert!(negative_pending.validate().is_err());
    }

    #[test]
    fn test_new_appointment_date_from_millis() {
        let json = serde_json::json!({ "clientId": CLIENT_ID, "date": 1_772_454_600_000i64 });
        let appt: NewAppointment = serde_json::from_value(json).unwrap();
        assert_eq!(appt.date.timestamp_millis(), 1_772_454_600_000);
    }

    #[test]
    fn test_profile_input_normalize() {
        let input = ProfileInput {
            fantasy_name: Some("  Ótica Visão ".to_string()),
            cnpj: Some("".to_string()),
            contact_phone: None,
        }
        .normalize();
        assert_eq!(input.fantasy_name.as_deref(), Some("Ótica Visão"));
        assert_eq!(input.cnpj, None);
    }
}
