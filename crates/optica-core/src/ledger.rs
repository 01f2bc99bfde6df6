//! # Ledger Module
//!
//! Order totals, running balances and status derivation for sales.
//!
//! ## The Balance Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal = Σ(item.qty × item.unit_price) + frame + lens                │
//! │  total    = subtotal − discount                      (must be > 0)      │
//! │  pending  = total − paid                                                │
//! │                                                                         │
//! │  INVARIANT: paid + pending == total                                     │
//! │                                                                         │
//! │  status = paid     if pending ≤ 0                                       │
//! │         = partial  if paid > 0                                          │
//! │         = pending  otherwise                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure. The database layer reads the stored sale
//! inside a transaction, asks this module for the next state and writes it.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::input::{NewSale, NewSaleItem, SalePatch};
use crate::money::Money;
use crate::types::{PaymentMethod, Sale, SaleItem, SaleStatus};
use crate::validation::{optional_text, validate_installments};

// =============================================================================
// Status Derivation
// =============================================================================

/// The three-way status rule.
///
/// ## Example
/// ```rust
/// use optica_core::ledger::derive_status;
/// use optica_core::{Money, SaleStatus};
///
/// let total = Money::from_cents(10_000);
/// assert_eq!(derive_status(Money::zero(), total), SaleStatus::Pending);
/// assert_eq!(derive_status(Money::from_cents(6_000), total), SaleStatus::Partial);
/// assert_eq!(derive_status(total, total), SaleStatus::Paid);
/// ```
pub fn derive_status(paid: Money, total: Money) -> SaleStatus {
    let pending = total - paid;
    if !pending.is_positive() {
        SaleStatus::Paid
    } else if paid.is_positive() {
        SaleStatus::Partial
    } else {
        SaleStatus::Pending
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Server-side derivation of every amount on a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTotals {
    pub items: Vec<SaleItem>,
    pub subtotal: Money,
    pub discount: Option<Money>,
    pub total: Money,
}

fn overflow(field: &str) -> CoreError {
    CoreError::Validation(ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    })
}

/// Computes line totals, subtotal and total.
///
/// A caller-supplied line total that disagrees with
/// `quantity × unit_price` is rejected rather than silently replaced.
pub fn compute_totals(
    items: &[NewSaleItem],
    frame_value: Option<Money>,
    lens_value: Option<Money>,
    discount: Option<Money>,
) -> CoreResult<OrderTotals> {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = Money::zero();

    for (index, item) in items.iter().enumerate() {
        let line_total = Money::from_cents(item.unit_price_cents)
            .checked_mul_quantity(item.quantity)
            .ok_or_else(|| overflow("items"))?;

        if let Some(supplied) = item.total_cents {
            if supplied != line_total.cents() {
                return Err(CoreError::AmountMismatch {
                    field: format!("items[{index}].totalCents"),
                    expected_cents: line_total.cents(),
                    supplied_cents: supplied,
                });
            }
        }

        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| overflow("subtotal"))?;

        lines.push(SaleItem {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            total_cents: line_total.cents(),
        });
    }

    for extra in [frame_value, lens_value].into_iter().flatten() {
        subtotal = subtotal
            .checked_add(extra)
            .ok_or_else(|| overflow("subtotal"))?;
    }

    let total = subtotal - discount.unwrap_or_default();

    Ok(OrderTotals {
        items: lines,
        subtotal,
        discount,
        total,
    })
}

// =============================================================================
// Balance
// =============================================================================

/// The running balance of one sale.
///
/// ## User Workflow
/// ```text
/// Balance::opening(100, 0)        → 0 / 100   pending
///   .apply_payment(60)            → 60 / 40   partial
///   .apply_payment(40)            → 100 / 0   paid
///   .revert_payment(40)           → 60 / 40   partial
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub total: Money,
    pub paid: Money,
    pub pending: Money,
    pub status: SaleStatus,
}

impl Balance {
    /// Balance of a new order with an up-front payment.
    ///
    /// ## Errors
    /// - `NonPositiveTotal` when `total <= 0`
    /// - `PaidOutOfRange` when `paid` is outside `[0, total]`
    pub fn opening(total: Money, paid: Money) -> CoreResult<Self> {
        if !total.is_positive() {
            return Err(CoreError::NonPositiveTotal {
                total_cents: total.cents(),
            });
        }
        if paid.is_negative() || paid > total {
            return Err(CoreError::PaidOutOfRange {
                paid_cents: paid.cents(),
                total_cents: total.cents(),
            });
        }
        Ok(Self::settle(total, paid))
    }

    /// The balance as stored on a sale row, status included.
    pub fn of(sale: &Sale) -> Self {
        Balance {
            total: sale.total(),
            paid: sale.paid(),
            pending: sale.pending(),
            status: sale.status,
        }
    }

    /// Recomputes pending and status from `total` and `paid`.
    fn settle(total: Money, paid: Money) -> Self {
        Balance {
            total,
            paid,
            pending: total - paid,
            status: derive_status(paid, total),
        }
    }

    /// Applies a payment.
    ///
    /// ## Errors
    /// `InvalidPaymentAmount` when the amount is not positive or exceeds
    /// the pending balance. A cancelled sale is re-derived like any other.
    pub fn apply_payment(&self, amount: Money) -> CoreResult<Self> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "amount must be greater than zero".to_string(),
            });
        }
        if amount > self.pending {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!(
                    "{} exceeds the pending balance of {}",
                    amount, self.pending
                ),
            });
        }
        Ok(Self::settle(self.total, self.paid + amount))
    }

    /// Reverses a previously applied payment. Paid never drops below zero.
    pub fn revert_payment(&self, amount: Money) -> Self {
        Self::settle(self.total, (self.paid - amount).floor_zero())
    }

    /// Applies a manual correction of paid and/or pending.
    ///
    /// When only one side is given the other is derived from the total.
    ///
    /// ## Errors
    /// - `BalanceMismatch` when both are given and do not add up, or when
    ///   the amounts overflow
    /// - `PaidOutOfRange` when the resulting paid is outside `[0, total]`
    pub fn patch(&self, paid: Option<Money>, pending: Option<Money>) -> CoreResult<Self> {
        let paid = match (paid, pending) {
            (None, None) => return Ok(*self),
            (Some(paid), Some(pending)) => {
                if paid.checked_add(pending) != Some(self.total) {
                    return Err(CoreError::BalanceMismatch {
                        total_cents: self.total.cents(),
                        paid_cents: paid.cents(),
                        pending_cents: pending.cents(),
                    });
                }
                paid
            }
            (Some(paid), None) => paid,
            (None, Some(pending)) => {
                self.total
                    .checked_sub(pending)
                    .ok_or(CoreError::BalanceMismatch {
                        total_cents: self.total.cents(),
                        paid_cents: self.paid.cents(),
                        pending_cents: pending.cents(),
                    })?
            }
        };

        if paid.is_negative() || paid > self.total {
            return Err(CoreError::PaidOutOfRange {
                paid_cents: paid.cents(),
                total_cents: self.total.cents(),
            });
        }

        Ok(Self::settle(self.total, paid))
    }

    /// `paid + pending == total`.
    pub fn is_consistent(&self) -> bool {
        self.paid + self.pending == self.total
    }
}

// =============================================================================
// Sale Creation
// =============================================================================

/// A new order after every amount has been derived and checked.
#[derive(Debug, Clone)]
pub struct PreparedSale {
    pub totals: OrderTotals,
    pub balance: Balance,
}

/// Validates a new order and derives its totals and opening balance.
///
/// ## Flow
/// ```text
/// NewSale ──validate()──► compute_totals ──► compare caller amounts
///                                                   │
///                                                   ▼
///                         Balance::opening ──► compare caller status
/// ```
pub fn prepare_sale(input: &NewSale) -> CoreResult<PreparedSale> {
    input.validate()?;

    let totals = compute_totals(
        &input.items,
        input.frame_value_cents.map(Money::from_cents),
        input.lens_value_cents.map(Money::from_cents),
        input.discount_cents.map(Money::from_cents),
    )?;

    check_supplied("subtotalCents", totals.subtotal, input.subtotal_cents)?;
    check_supplied("totalCents", totals.total, input.total_cents)?;

    let balance = Balance::opening(totals.total, Money::from_cents(input.paid_amount_cents))?;

    check_supplied("pendingAmountCents", balance.pending, input.pending_amount_cents)?;

    if let Some(status) = input.status {
        if status != balance.status {
            return Err(CoreError::StatusMismatch {
                expected: balance.status.to_string(),
                supplied: status.to_string(),
            });
        }
    }

    Ok(PreparedSale { totals, balance })
}

fn check_supplied(field: &str, expected: Money, supplied: Option<i64>) -> CoreResult<()> {
    match supplied {
        Some(cents) if cents != expected.cents() => Err(CoreError::AmountMismatch {
            field: field.to_string(),
            expected_cents: expected.cents(),
            supplied_cents: cents,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Sale Update
// =============================================================================

/// Applies a patch to a stored sale and returns the next state.
///
/// Balance fields are re-validated against the stored total. When the patch
/// touches the balance without an explicit status, the status is
/// re-derived; an explicit status always wins. Switching away from
/// `installment` clears the installment count unless the patch sets one.
pub fn apply_patch(sale: &Sale, patch: &SalePatch, now: DateTime<Utc>) -> CoreResult<Sale> {
    patch.validate()?;

    let mut next = sale.clone();

    if patch.touches_balance() {
        let balance = Balance::of(sale).patch(
            patch.paid_amount_cents.map(Money::from_cents),
            patch.pending_amount_cents.map(Money::from_cents),
        )?;
        next.paid_amount_cents = balance.paid.cents();
        next.pending_amount_cents = balance.pending.cents();
        next.status = balance.status;
    }

    if let Some(status) = patch.status {
        next.status = status;
    }

    if let Some(method) = patch.payment_method {
        next.payment_method = method;
        if method != PaymentMethod::Installment && patch.installments.is_none() {
            next.installments = None;
        }
    }
    if let Some(installments) = patch.installments {
        next.installments = installments;
    }
    validate_installments(next.payment_method, next.installments)?;

    if let Some(delivery_date) = patch.delivery_date {
        next.delivery_date = delivery_date;
    }
    if let Some(notes) = &patch.notes {
        next.notes = optional_text(Some(notes.clone()));
    }

    next.updated_at = now;
    next.version = sale.version + 1;

    Ok(next)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    fn item(description: &str, quantity: i64, unit_price_cents: i64) -> NewSaleItem {
        NewSaleItem {
            description: description.to_string(),
            quantity,
            unit_price_cents,
            total_cents: None,
        }
    }

    fn new_sale(items: Vec<NewSaleItem>) -> NewSale {
        NewSale {
            client_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            client_name: "Ana Souza".to_string(),
            items,
            frame_value_cents: None,
            lens_value_cents: None,
            discount_cents: None,
            subtotal_cents: None,
            total_cents: None,
            paid_amount_cents: 0,
            pending_amount_cents: None,
            status: None,
            payment_method: PaymentMethod::Cash,
            installments: None,
            delivery_date: None,
            notes: None,
            service_order_number: None,
        }
    }

    fn stored_sale(total: i64, paid: i64) -> Sale {
        let now = Utc::now();
        Sale {
            id: "s1".to_string(),
            service_order_number: 701,
            client_id: "c1".to_string(),
            client_name: "Ana".to_string(),
            items: vec![],
            frame_value_cents: None,
            lens_value_cents: None,
            subtotal_cents: total,
            discount_cents: None,
            total_cents: total,
            paid_amount_cents: paid,
            pending_amount_cents: total - paid,
            status: derive_status(m(paid), m(total)),
            payment_method: PaymentMethod::Cash,
            installments: None,
            delivery_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    #[test]
    fn test_derive_status() {
        assert_eq!(derive_status(m(0), m(100)), SaleStatus::Pending);
        assert_eq!(derive_status(m(1), m(100)), SaleStatus::Partial);
        assert_eq!(derive_status(m(100), m(100)), SaleStatus::Paid);
        assert_eq!(derive_status(m(120), m(100)), SaleStatus::Paid);
    }

    #[test]
    fn test_compute_totals() {
        let totals = compute_totals(
            &[item("Lente antirreflexo", 2, 22_500), item("Limpeza", 1, 1_000)],
            Some(m(30_000)),
            Some(m(5_000)),
            Some(m(1_500)),
        )
        .unwrap();

        assert_eq!(totals.items[0].total_cents, 45_000);
        assert_eq!(totals.subtotal.cents(), 45_000 + 1_000 + 30_000 + 5_000);
        assert_eq!(totals.total.cents(), 81_000 - 1_500);
    }

    #[test]
    fn test_compute_totals_rejects_wrong_line_total() {
        let mut line = item("Armação", 3, 1_000);
        line.total_cents = Some(2_999);

        let err = compute_totals(&[line], None, None, None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::AmountMismatch {
                expected_cents: 3_000,
                supplied_cents: 2_999,
                ..
            }
        ));
    }

    #[test]
    fn test_compute_totals_overflow() {
        let err = compute_totals(&[item("x", 2, i64::MAX)], None, None, None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_opening_balance() {
        let b = Balance::opening(m(10_000), m(0)).unwrap();
        assert_eq!(b.status, SaleStatus::Pending);
        assert_eq!(b.pending.cents(), 10_000);

        let b = Balance::opening(m(10_000), m(2_500)).unwrap();
        assert_eq!(b.status, SaleStatus::Partial);

        let b = Balance::opening(m(10_000), m(10_000)).unwrap();
        assert_eq!(b.status, SaleStatus::Paid);
        assert!(b.pending.is_zero());

        assert!(matches!(
            Balance::opening(m(0), m(0)),
            Err(CoreError::NonPositiveTotal { .. })
        ));
        assert!(matches!(
            Balance::opening(m(100), m(101)),
            Err(CoreError::PaidOutOfRange { .. })
        ));
        assert!(matches!(
            Balance::opening(m(100), m(-1)),
            Err(CoreError::PaidOutOfRange { .. })
        ));
    }

    #[test]
    fn test_payment_scenario() {
        let opened = Balance::opening(m(10_000), m(0)).unwrap();
        assert_eq!(opened.status, SaleStatus::Pending);

        let first = opened.apply_payment(m(6_000)).unwrap();
        assert_eq!((first.paid.cents(), first.pending.cents()), (6_000, 4_000));
        assert_eq!(first.status, SaleStatus::Partial);

        let second = first.apply_payment(m(4_000)).unwrap();
        assert_eq!((second.paid.cents(), second.pending.cents()), (10_000, 0));
        assert_eq!(second.status, SaleStatus::Paid);

        let reverted = second.revert_payment(m(4_000));
        assert_eq!(reverted, first);
    }

    #[test]
    fn test_apply_then_revert_restores_balance() {
        let totals = [1, 99, 10_000, 123_456];
        for total in totals {
            for paid in [0, total / 3, total - 1] {
                let start = Balance::opening(m(total), m(paid)).unwrap();
                let pending = start.pending.cents();
                for amount in [1, pending / 2, pending] {
                    if amount <= 0 {
                        continue;
                    }
                    let after = start.apply_payment(m(amount)).unwrap();
                    assert!(after.is_consistent());
                    assert_eq!(after.revert_payment(m(amount)), start);
                }
            }
        }
    }

    #[test]
    fn test_apply_payment_rejects_bad_amounts() {
        let b = Balance::opening(m(10_000), m(6_000)).unwrap();
        assert!(matches!(
            b.apply_payment(m(0)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
        assert!(matches!(
            b.apply_payment(m(-10)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
        assert!(matches!(
            b.apply_payment(m(4_001)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_revert_floors_at_zero() {
        let b = Balance::opening(m(10_000), m(1_000)).unwrap();
        let reverted = b.revert_payment(m(5_000));
        assert!(reverted.paid.is_zero());
        assert_eq!(reverted.pending.cents(), 10_000);
        assert_eq!(reverted.status, SaleStatus::Pending);
        assert!(reverted.is_consistent());
    }

    #[test]
    fn test_payment_on_cancelled_sale_rederives() {
        let mut sale = stored_sale(10_000, 2_000);
        sale.status = SaleStatus::Cancelled;

        let after = Balance::of(&sale).apply_payment(m(1_000)).unwrap();
        assert_eq!(after.status, SaleStatus::Partial);
    }

    #[test]
    fn test_balance_patch() {
        let b = Balance::opening(m(10_000), m(0)).unwrap();

        let both = b.patch(Some(m(6_000)), Some(m(4_000))).unwrap();
        assert_eq!(both.status, SaleStatus::Partial);

        let paid_only = b.patch(Some(m(10_000)), None).unwrap();
        assert!(paid_only.pending.is_zero());
        assert_eq!(paid_only.status, SaleStatus::Paid);

        let pending_only = b.patch(None, Some(m(2_500))).unwrap();
        assert_eq!(pending_only.paid.cents(), 7_500);

        assert!(matches!(
            b.patch(Some(m(5_000)), Some(m(1_000))),
            Err(CoreError::BalanceMismatch { .. })
        ));
        assert!(matches!(
            b.patch(Some(m(10_001)), None),
            Err(CoreError::PaidOutOfRange { .. })
        ));
        assert!(matches!(
            b.patch(None, Some(m(-1))),
            Err(CoreError::PaidOutOfRange { .. })
        ));
        assert_eq!(b.patch(None, None).unwrap(), b);
    }

    #[test]
    fn test_balance_patch_extreme_amounts() {
        let b = Balance::opening(m(10_000), m(0)).unwrap();

        assert!(matches!(
            b.patch(Some(m(i64::MAX)), Some(m(1))),
            Err(CoreError::BalanceMismatch { .. })
        ));
        assert!(matches!(
            b.patch(Some(m(i64::MIN)), Some(m(i64::MIN))),
            Err(CoreError::BalanceMismatch { .. })
        ));
        assert!(matches!(
            b.patch(None, Some(m(i64::MIN))),
            Err(CoreError::BalanceMismatch { .. })
        ));
        assert!(matches!(
            b.patch(None, Some(m(i64::MAX))),
            Err(CoreError::PaidOutOfRange { .. })
        ));
        assert!(matches!(
            b.patch(Some(m(i64::MAX)), None),
            Err(CoreError::PaidOutOfRange { .. })
        ));
    }

    #[test]
    fn test_prepare_sale() {
        let mut input = new_sale(vec![item("Lente", 1, 8_000)]);
        input.frame_value_cents = Some(2_000);
        input.paid_amount_cents = 3_000;
        input.total_cents = Some(10_000);
        input.status = Some(SaleStatus::Partial);

        let prepared = prepare_sale(&input).unwrap();
        assert_eq!(prepared.totals.total.cents(), 10_000);
        assert_eq!(prepared.balance.pending.cents(), 7_000);
        assert_eq!(prepared.balance.status, SaleStatus::Partial);
    }

    #[test]
    fn test_prepare_sale_rejects_inconsistent_input() {
        let mut wrong_total = new_sale(vec![item("Lente", 1, 8_000)]);
        wrong_total.total_cents = Some(9_000);
        assert!(matches!(
            prepare_sale(&wrong_total),
            Err(CoreError::AmountMismatch { .. })
        ));

        let mut zero_total = new_sale(vec![item("Brinde", 1, 0)]);
        zero_total.discount_cents = Some(0);
        assert!(matches!(
            prepare_sale(&zero_total),
            Err(CoreError::NonPositiveTotal { .. })
        ));

        let mut discount_too_big = new_sale(vec![item("Lente", 1, 1_000)]);
        discount_too_big.discount_cents = Some(2_000);
        assert!(matches!(
            prepare_sale(&discount_too_big),
            Err(CoreError::NonPositiveTotal { total_cents: -1_000 })
        ));

        let mut overpaid = new_sale(vec![item("Lente", 1, 1_000)]);
        overpaid.paid_amount_cents = 1_001;
        assert!(matches!(
            prepare_sale(&overpaid),
            Err(CoreError::PaidOutOfRange { .. })
        ));

        let mut wrong_status = new_sale(vec![item("Lente", 1, 1_000)]);
        wrong_status.status = Some(SaleStatus::Paid);
        assert!(matches!(
            prepare_sale(&wrong_status),
            Err(CoreError::StatusMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_patch_balance_and_override() {
        let sale = stored_sale(10_000, 0);
        let now = Utc::now();

        let patch = SalePatch {
            paid_amount_cents: Some(4_000),
            ..Default::default()
        };
        let next = apply_patch(&sale, &patch, now).unwrap();
        assert_eq!(next.pending_amount_cents, 6_000);
        assert_eq!(next.status, SaleStatus::Partial);
        assert_eq!(next.version, 2);

        let cancel = SalePatch {
            status: Some(SaleStatus::Cancelled),
            ..Default::default()
        };
        let next = apply_patch(&sale, &cancel, now).unwrap();
        assert_eq!(next.status, SaleStatus::Cancelled);
        assert_eq!(next.paid_amount_cents, 0);

        let mismatch = SalePatch {
            paid_amount_cents: Some(5_000),
            pending_amount_cents: Some(1_000),
            ..Default::default()
        };
        assert!(apply_patch(&sale, &mismatch, now).is_err());
    }

    #[test]
    fn test_apply_patch_installments() {
        let mut sale = stored_sale(10_000, 0);
        sale.payment_method = PaymentMethod::Installment;
        sale.installments = Some(6);
        let now = Utc::now();

        let to_pix = SalePatch {
            payment_method: Some(PaymentMethod::Pix),
            ..Default::default()
        };
        let next = apply_patch(&sale, &to_pix, now).unwrap();
        assert_eq!(next.installments, None);

        let bad = SalePatch {
            installments: Some(Some(20)),
            ..Default::default()
        };
        assert!(apply_patch(&sale, &bad, now).is_err());

        let clear_notes = SalePatch {
            notes: Some("   ".to_string()),
            ..Default::default()
        };
        sale.notes = Some("entregar sexta".to_string());
        assert_eq!(apply_patch(&sale, &clear_notes, now).unwrap().notes, None);
    }
}
