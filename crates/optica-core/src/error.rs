//! # Error Types
//!
//! Domain-specific error types for optica-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  optica-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  optica-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Server errors (in app)                                                │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts, numbers)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. The server maps each
/// one to either a validation failure or a conflict.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Payment amount is invalid for the sale it targets.
    ///
    /// ## When This Occurs
    /// - Amount is zero or negative
    /// - Amount exceeds the sale's pending balance
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Order total is zero or negative after discount.
    #[error("Sale total must be greater than zero (got {total_cents} cents)")]
    NonPositiveTotal { total_cents: i64 },

    /// Paid amount outside `[0, total]`.
    #[error("Paid amount {paid_cents} must be between 0 and the sale total {total_cents}")]
    PaidOutOfRange { paid_cents: i64, total_cents: i64 },

    /// `paid + pending != total` after a patch.
    ///
    /// ## User Workflow
    /// ```text
    /// PATCH /api/sales/{id} { paidAmountCents: 5000, pendingAmountCents: 1000 }
    ///      │
    ///      ▼
    /// total = 10000, 5000 + 1000 ≠ 10000
    ///      │
    ///      ▼
    /// BalanceMismatch → 400, sale untouched
    /// ```
    #[error("Paid ({paid_cents}) plus pending ({pending_cents}) must equal the total ({total_cents})")]
    BalanceMismatch {
        total_cents: i64,
        paid_cents: i64,
        pending_cents: i64,
    },

    /// A caller-computed amount disagrees with the server's derivation.
    #[error("{field} does not match the computed value: expected {expected_cents}, got {supplied_cents}")]
    AmountMismatch {
        field: String,
        expected_cents: i64,
        supplied_cents: i64,
    },

    /// A caller-supplied initial status disagrees with the derived one.
    #[error("Status '{supplied}' does not match the paid amount (expected '{expected}')")]
    StatusMismatch { expected: String, supplied: String },

    /// Another sale already carries this service order number.
    #[error("Service order number {0} is already in use")]
    DuplicateServiceOrder(i64),

    /// Another appointment is booked at exactly this time.
    #[error("The slot at {at} is already booked")]
    SlotTaken { at: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for errors caused by a competing record rather than by
    /// the request itself.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CoreError::DuplicateServiceOrder(_) | CoreError::SlotTaken { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
