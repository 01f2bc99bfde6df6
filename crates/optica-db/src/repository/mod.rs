//! # Repository Module
//!
//! One repository per aggregate. Each holds a clone of the pool and is
//! handed out by [`Database`](crate::Database).
//!
//! ```text
//! db.sales().add_payment(id, payment)
//!      │
//!      ▼
//! SaleRepository ──► optica-core ledger rules ──► SQL in one transaction
//! ```
//!
//! ## Available Repositories
//!
//! - [`client::ClientRepository`] - Clients with prescriptions, search
//! - [`sale::SaleRepository`] - Sales, items, payments, totals, receipts
//! - [`appointment::AppointmentRepository`] - Appointment book and agenda
//! - [`profile::ProfileRepository`] - Company profile singleton

pub mod appointment;
pub mod client;
pub mod profile;
pub mod sale;
