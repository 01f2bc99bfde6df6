//! # optica-core: Pure Business Logic for the Optical Shop
//!
//! This crate is the **heart** of the backend. It contains the domain types
//! and every business rule as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Óptica Gestão Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend (out of scope)                  │   │
//! │  │   Clients ──► Sale Form ──► Payments ──► Agenda ──► Receipt     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ optica-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │ validation│  │   │
//! │  │   │  Client   │  │   Money   │  │  Balance  │  │   rules   │  │   │
//! │  │   │   Sale    │  │           │  │  Totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    optica-db (Database Layer)                   │   │
//! │  │         SQLite queries, migrations, repositories, transactions  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Sale, Payment, Appointment, Profile)
//! - [`money`] - Money type with integer arithmetic (centavos, no floats)
//! - [`input`] - One input struct per mutation, with normalize/validate
//! - [`ledger`] - Order totals, running balances and status derivation
//! - [`schedule`] - Shop-local calendar days and agenda slots
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use optica_core::ledger::Balance;
//! use optica_core::money::Money;
//! use optica_core::SaleStatus;
//!
//! let opening = Balance::opening(Money::from_cents(10_000), Money::zero()).unwrap();
//! assert_eq!(opening.status, SaleStatus::Pending);
//!
//! let after = opening.apply_payment(Money::from_cents(6_000)).unwrap();
//! assert_eq!(after.pending.cents(), 4_000);
//! assert_eq!(after.status, SaleStatus::Partial);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod input;
pub mod ledger;
pub mod money;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use input::*;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Service order number handed out when the ledger is empty.
///
/// The shop's paper order pads ended at 700 when the system went live.
pub const FIRST_SERVICE_ORDER_NUMBER: i64 = 701;

/// Maximum line items on a single service order.
pub const MAX_SALE_ITEMS: usize = 50;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Allowed number of installments for `PaymentMethod::Installment`.
pub const MIN_INSTALLMENTS: i64 = 2;
pub const MAX_INSTALLMENTS: i64 = 12;
