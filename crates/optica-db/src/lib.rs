//! # optica-db: Database Layer for the Optical Shop
//!
//! SQLite storage for clients, sales, payments, appointments and the
//! company profile, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Request Data Flow                                │
//! │                                                                         │
//! │  axum handler (POST /api/sales/{id}/payments)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     optica-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ClientRepo     │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │    │ ...          │  │   │
//! │  │   │               │    │ AppointmentRepo│    │              │  │   │
//! │  │   │               │    │ ProfileRepo    │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (optica.db)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business rules live in `optica-core`; repositories call them while
//! holding a transaction, so a rejected operation leaves nothing behind.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use optica_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("optica.db")).await?;
//!
//! let sale = db.sales().create(new_sale).await?;
//! let added = db.sales().add_payment(&sale.id, payment).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::appointment::AppointmentRepository;
pub use repository::client::ClientRepository;
pub use repository::profile::ProfileRepository;
pub use repository::sale::SaleRepository;
