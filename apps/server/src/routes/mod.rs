//! # HTTP Routes
//!
//! ```text
//! /health
//! /api/clients            GET list · POST create
//! /api/clients/search     GET ?q=
//! /api/clients/{id}       GET · PUT · DELETE
//! /api/clients/{id}/sales GET
//! /api/clients/{id}/appointments GET
//! /api/sales              GET ?status= · POST create
//! /api/sales/search       GET ?q=
//! /api/sales/next-service-order-number
//! /api/sales/stats
//! /api/sales/recent       GET ?limit=
//! /api/sales/{id}         GET · PATCH · DELETE
//! /api/sales/{id}/payments GET · POST
//! /api/sales/{id}/receipt GET
//! /api/sales/{id}/receipt-data GET (public, CORS *)
//! /api/payments/{id}      DELETE
//! /api/appointments       GET ?date= · POST
//! /api/appointments/slots GET ?date=
//! /api/appointments/{id}  GET · DELETE
//! /api/profile            GET · PUT
//! ```

pub mod appointments;
pub mod clients;
pub mod health;
pub mod profile;
pub mod receipt;
pub mod sales;

use axum::routing::{delete, get};
use axum::Router;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/clients", get(clients::list).post(clients::create))
        .route("/clients/search", get(clients::search))
        .route(
            "/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::remove),
        )
        .route("/clients/{id}/sales", get(clients::sales))
        .route("/clients/{id}/appointments", get(clients::appointments))
        .route("/sales", get(sales::list).post(sales::create))
        .route("/sales/search", get(sales::search))
        .route(
            "/sales/next-service-order-number",
            get(sales::next_service_order_number),
        )
        .route("/sales/stats", get(sales::stats))
        .route("/sales/recent", get(sales::recent))
        .route(
            "/sales/{id}",
            get(sales::get).patch(sales::update).delete(sales::remove),
        )
        .route(
            "/sales/{id}/payments",
            get(sales::payments).post(sales::add_payment),
        )
        .route("/sales/{id}/receipt", get(receipt::receipt))
        .route("/sales/{id}/receipt-data", get(receipt::receipt_data))
        .route("/payments/{id}", delete(sales::delete_payment))
        .route(
            "/appointments",
            get(appointments::list_by_day).post(appointments::create),
        )
        .route("/appointments/slots", get(appointments::slots))
        .route(
            "/appointments/{id}",
            get(appointments::get).delete(appointments::cancel),
        )
        .route("/profile", get(profile::get).put(profile::save));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .with_state(state)
}
