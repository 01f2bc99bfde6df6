//! # Sale Repository
//!
//! Database operations for service orders, their items and payments.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → Sale { number: 701.., status: derived from paid }    │
//! │         (sale row + item rows in one transaction)                       │
//! │                                                                         │
//! │  2. PAYMENTS                                                            │
//! │     └── add_payment()    → paid += amount, pending = total − paid       │
//! │     └── delete_payment() → paid −= amount (floored at 0)                │
//! │                                                                         │
//! │  3. (OPTIONAL) MANUAL CORRECTION                                        │
//! │     └── update() → status override, balance fix, delivery date, notes   │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                   │
//! │     └── delete() → payments, items, sale in one transaction             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Ordering
//! Every ledger mutation opens its transaction with a write to the sale row.
//! SQLite hands out its single write lock on the first write, so the
//! balance read that follows can't be interleaved with another payment on
//! the same sale.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::client::ClientRepository;
use crate::repository::profile::ProfileRepository;
use optica_core::ledger::{apply_patch, prepare_sale, Balance, PreparedSale};
use optica_core::validation::validate_search_query;
use optica_core::{
    CoreError, Money, NewPayment, NewSale, Payment, PaymentAdded, PaymentMethod, ReceiptData,
    Sale, SaleItem, SalePatch, SaleStatus, SalesTotals, FIRST_SERVICE_ORDER_NUMBER,
};

/// Automatic numbering retries this many times on a uniqueness collision.
const MAX_NUMBERING_ATTEMPTS: u32 = 3;

const SERVICE_ORDER_UNIQUE: &str = "sales.service_order_number";

const SALE_COLUMNS: &str = r#"
    id, service_order_number, client_id, client_name,
    frame_value_cents, lens_value_cents, subtotal_cents, discount_cents, total_cents,
    paid_amount_cents, pending_amount_cents, status, payment_method, installments,
    delivery_date, notes, created_at, updated_at, version
"#;

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    service_order_number: i64,
    client_id: String,
    client_name: String,
    frame_value_cents: Option<i64>,
    lens_value_cents: Option<i64>,
    subtotal_cents: i64,
    discount_cents: Option<i64>,
    total_cents: i64,
    paid_amount_cents: i64,
    pending_amount_cents: i64,
    status: SaleStatus,
    payment_method: PaymentMethod,
    installments: Option<i64>,
    delivery_date: Option<NaiveDate>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl SaleRow {
    fn balance(&self) -> Balance {
        Balance {
            total: Money::from_cents(self.total_cents),
            paid: Money::from_cents(self.paid_amount_cents),
            pending: Money::from_cents(self.pending_amount_cents),
            status: self.status,
        }
    }

    fn into_sale(self, items: Vec<SaleItem>) -> Sale {
        Sale {
            id: self.id,
            service_order_number: self.service_order_number,
            client_id: self.client_id,
            client_name: self.client_name,
            items,
            frame_value_cents: self.frame_value_cents,
            lens_value_cents: self.lens_value_cents,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            paid_amount_cents: self.paid_amount_cents,
            pending_amount_cents: self.pending_amount_cents,
            status: self.status,
            payment_method: self.payment_method,
            installments: self.installments,
            delivery_date: self.delivery_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    sale_id: String,
    description: String,
    quantity: i64,
    unit_price_cents: i64,
    total_cents: i64,
}

// =============================================================================
// Connection-level helpers
// =============================================================================
//
// These take a bare connection so the same code runs on a pooled connection
// or inside a transaction.

async fn fetch_sale_row(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<SaleRow>> {
    let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
    let row = sqlx::query_as::<_, SaleRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Loads the items of many sales at once, grouped by sale id.
async fn fetch_items(
    conn: &mut SqliteConnection,
    sale_ids: &[&str],
) -> DbResult<HashMap<String, Vec<SaleItem>>> {
    let mut grouped: HashMap<String, Vec<SaleItem>> = HashMap::new();

    // Stay well below SQLite's bound-parameter limit
    for chunk in sale_ids.chunks(500) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT sale_id, description, quantity, unit_price_cents, total_cents \
             FROM sale_items WHERE sale_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY sale_id, position");

        let rows: Vec<SaleItemRow> = builder
            .build_query_as()
            .fetch_all(&mut *conn)
            .await?;

        for row in rows {
            grouped.entry(row.sale_id).or_default().push(SaleItem {
                description: row.description,
                quantity: row.quantity,
                unit_price_cents: row.unit_price_cents,
                total_cents: row.total_cents,
            });
        }
    }

    Ok(grouped)
}

/// Attaches items to sale rows, keeping row order.
async fn hydrate(conn: &mut SqliteConnection, rows: Vec<SaleRow>) -> DbResult<Vec<Sale>> {
    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    let mut items = fetch_items(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let sale_items = items.remove(&row.id).unwrap_or_default();
            row.into_sale(sale_items)
        })
        .collect())
}

/// Takes the write lock on a sale row before reading its balance.
async fn touch_sale(conn: &mut SqliteConnection, id: &str, now: DateTime<Utc>) -> DbResult<()> {
    let result = sqlx::query("UPDATE sales SET updated_at = ?2 WHERE id = ?1")
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", id));
    }
    Ok(())
}

async fn write_balance(
    conn: &mut SqliteConnection,
    id: &str,
    balance: &Balance,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE sales SET
            paid_amount_cents = ?2,
            pending_amount_cents = ?3,
            status = ?4,
            updated_at = ?5,
            version = version + 1
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(balance.paid.cents())
    .bind(balance.pending.cents())
    .bind(balance.status)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
///
/// ## Usage
/// ```rust,ignore
/// let sale = db.sales().create(new_sale).await?;
/// let added = db.sales().add_payment(&sale.id, payment).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Creates a service order.
    ///
    /// ## What This Does
    /// 1. Derives totals and the opening balance (rejects bad amounts)
    /// 2. Inserts the sale, numbering it inside the INSERT when no number
    ///    was given
    /// 3. Inserts the items
    /// 4. Verifies the client exists
    ///
    /// Steps 2-4 share one transaction.
    ///
    /// ## Errors
    /// - `Domain(Validation | AmountMismatch | NonPositiveTotal | …)`
    /// - `Domain(DuplicateServiceOrder)` for a caller-supplied number in use
    /// - `NotFound` when the client doesn't exist
    pub async fn create(&self, input: NewSale) -> DbResult<Sale> {
        let input = input.normalize();
        let prepared = prepare_sale(&input)?;

        let mut attempt = 1;
        loop {
            match self.insert_sale(&input, &prepared).await {
                Err(err) if err.is_unique_violation_on(SERVICE_ORDER_UNIQUE) => {
                    if let Some(number) = input.service_order_number {
                        return Err(CoreError::DuplicateServiceOrder(number).into());
                    }
                    if attempt >= MAX_NUMBERING_ATTEMPTS {
                        return Err(err);
                    }
                    warn!(attempt, "Service order number collision, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn insert_sale(&self, input: &NewSale, prepared: &PreparedSale) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let totals = &prepared.totals;
        let balance = &prepared.balance;

        let mut tx = self.pool.begin().await?;

        let number: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sales (
                id, service_order_number, client_id, client_name,
                frame_value_cents, lens_value_cents, subtotal_cents, discount_cents, total_cents,
                paid_amount_cents, pending_amount_cents, status, payment_method, installments,
                delivery_date, notes, created_at, updated_at, version
            ) VALUES (
                ?1,
                COALESCE(?2, (SELECT MAX(service_order_number) + 1 FROM sales), ?3),
                ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?18, 1
            )
            RETURNING service_order_number
            "#,
        )
        .bind(&id)
        .bind(input.service_order_number)
        .bind(FIRST_SERVICE_ORDER_NUMBER)
        .bind(&input.client_id)
        .bind(&input.client_name)
        .bind(input.frame_value_cents)
        .bind(input.lens_value_cents)
        .bind(totals.subtotal.cents())
        .bind(totals.discount.map(|d| d.cents()))
        .bind(totals.total.cents())
        .bind(balance.paid.cents())
        .bind(balance.pending.cents())
        .bind(balance.status)
        .bind(input.payment_method)
        .bind(input.installments)
        .bind(input.delivery_date)
        .bind(&input.notes)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in totals.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, description, quantity, unit_price_cents, total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_cents)
            .execute(&mut *tx)
            .await?;
        }

        let client_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1)")
                .bind(&input.client_id)
                .fetch_one(&mut *tx)
                .await?;
        if !client_exists {
            return Err(DbError::not_found("Client", &input.client_id));
        }

        tx.commit().await?;

        info!(
            id = %id,
            service_order_number = number,
            total_cents = totals.total.cents(),
            paid_cents = balance.paid.cents(),
            status = %balance.status,
            "Sale created"
        );

        Ok(Sale {
            id,
            service_order_number: number,
            client_id: input.client_id.clone(),
            client_name: input.client_name.clone(),
            items: totals.items.clone(),
            frame_value_cents: input.frame_value_cents,
            lens_value_cents: input.lens_value_cents,
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.map(|d| d.cents()),
            total_cents: totals.total.cents(),
            paid_amount_cents: balance.paid.cents(),
            pending_amount_cents: balance.pending.cents(),
            status: balance.status,
            payment_method: input.payment_method,
            installments: input.installments,
            delivery_date: input.delivery_date,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Records a payment and moves the sale's balance.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale #701: total R$ 100,00, paid R$ 0,00
    ///      │
    ///      ▼
    /// add_payment(R$ 60,00, pix) ← THIS FUNCTION
    ///      │
    ///      ├── amount ≤ 0 or > pending? → InvalidPaymentAmount, nothing written
    ///      │
    ///      ▼
    /// payment row + sale { paid: 60, pending: 40, status: partial }
    /// ```
    pub async fn add_payment(&self, sale_id: &str, input: NewPayment) -> DbResult<PaymentAdded> {
        let input = input.normalize();
        input.validate()?;

        let now = Utc::now();
        let payment_id = Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;
        touch_sale(&mut tx, sale_id, now).await?;

        let row = fetch_sale_row(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        let next = row
            .balance()
            .apply_payment(Money::from_cents(input.amount_cents))?;

        sqlx::query(
            r#"
            INSERT INTO payments (id, sale_id, amount_cents, payment_method, payment_date, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment_id)
        .bind(sale_id)
        .bind(input.amount_cents)
        .bind(input.payment_method)
        .bind(now)
        .bind(&input.notes)
        .execute(&mut *tx)
        .await?;

        write_balance(&mut tx, sale_id, &next, now).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            payment_id = %payment_id,
            amount_cents = input.amount_cents,
            method = %input.payment_method,
            paid_cents = next.paid.cents(),
            pending_cents = next.pending.cents(),
            status = %next.status,
            "Payment recorded"
        );

        let sale = self
            .get(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        Ok(PaymentAdded {
            success: true,
            payment_id,
            sale,
        })
    }

    /// Deletes a payment and reverses its effect on the sale.
    ///
    /// ## Returns
    /// The sale after the reversal.
    ///
    /// ## Errors
    /// `NotFound` when the payment, or the sale it belongs to, is missing.
    pub async fn delete_payment(&self, payment_id: &str) -> DbResult<Sale> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query(
            "UPDATE sales SET updated_at = ?2 WHERE id = (SELECT sale_id FROM payments WHERE id = ?1)",
        )
        .bind(payment_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", payment_id));
        }

        let payment: Payment = sqlx::query_as(
            "SELECT id, sale_id, amount_cents, payment_method, payment_date, notes FROM payments WHERE id = ?1",
        )
        .bind(payment_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = fetch_sale_row(&mut tx, &payment.sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", &payment.sale_id))?;
        let next = row.balance().revert_payment(payment.amount());

        write_balance(&mut tx, &payment.sale_id, &next, now).await?;

        sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            payment_id = %payment_id,
            sale_id = %payment.sale_id,
            amount_cents = payment.amount_cents,
            paid_cents = next.paid.cents(),
            status = %next.status,
            "Payment deleted"
        );

        self.get(&payment.sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", &payment.sale_id))
    }

    /// Deletes a sale with its payments and items in one transaction.
    pub async fn delete(&self, sale_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let payments = sqlx::query("DELETE FROM payments WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }

        tx.commit().await?;

        info!(sale_id = %sale_id, payments_removed = payments, "Sale deleted");
        Ok(())
    }

    /// Applies a manual patch (status override, balance correction,
    /// payment terms, delivery date, notes).
    pub async fn update(&self, sale_id: &str, patch: SalePatch) -> DbResult<Sale> {
        if patch.is_empty() {
            return self
                .get(sale_id)
                .await?
                .ok_or_else(|| DbError::not_found("Sale", sale_id));
        }

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        touch_sale(&mut tx, sale_id, now).await?;

        let row = fetch_sale_row(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        let current = hydrate(&mut tx, vec![row])
            .await?
            .pop()
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        let next = apply_patch(&current, &patch, now)?;

        sqlx::query(
            r#"
            UPDATE sales SET
                paid_amount_cents = ?2,
                pending_amount_cents = ?3,
                status = ?4,
                payment_method = ?5,
                installments = ?6,
                delivery_date = ?7,
                notes = ?8,
                updated_at = ?9,
                version = ?10
            WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .bind(next.paid_amount_cents)
        .bind(next.pending_amount_cents)
        .bind(next.status)
        .bind(next.payment_method)
        .bind(next.installments)
        .bind(next.delivery_date)
        .bind(&next.notes)
        .bind(next.updated_at)
        .bind(next.version)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            status = %next.status,
            paid_cents = next.paid_amount_cents,
            pending_cents = next.pending_amount_cents,
            version = next.version,
            "Sale updated"
        );

        Ok(next)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Gets a sale by ID, items included.
    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        let Some(row) = fetch_sale_row(&mut conn, id).await? else {
            return Ok(None);
        };
        Ok(hydrate(&mut conn, vec![row]).await?.pop())
    }

    async fn fetch_many(&self, filter: &str, bind: Option<String>) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales {filter}");
        let mut conn = self.pool.acquire().await?;

        let mut query = sqlx::query_as::<_, SaleRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&mut *conn).await?;

        hydrate(&mut conn, rows).await
    }

    /// Lists sales by service order number, newest first, optionally
    /// filtered by status.
    pub async fn list(&self, status: Option<SaleStatus>) -> DbResult<Vec<Sale>> {
        debug!(status = ?status, "Listing sales");
        match status {
            Some(status) => {
                self.fetch_many(
                    "WHERE status = ?1 ORDER BY service_order_number DESC",
                    Some(status.to_string()),
                )
                .await
            }
            None => {
                self.fetch_many("ORDER BY service_order_number DESC", None)
                    .await
            }
        }
    }

    /// Searches by client name (case-insensitive substring) or exact
    /// service order number.
    ///
    /// ## Example
    /// ```text
    /// "ana"  → every sale whose client_name contains "ana" / "Ana" / "ANA"
    /// "701"  → sale #701, plus any client whose name contains "701"
    /// ""     → full list
    /// ```
    pub async fn search(&self, query: &str) -> DbResult<Vec<Sale>> {
        let query = validate_search_query(query)?;
        let all = self.list(None).await?;

        if query.is_empty() {
            return Ok(all);
        }

        let lowered = query.to_lowercase();
        let number = query.parse::<i64>().ok();

        Ok(all
            .into_iter()
            .filter(|sale| {
                Some(sale.service_order_number) == number
                    || sale.client_name.to_lowercase().contains(&lowered)
            })
            .collect())
    }

    /// Lists a client's sales, newest order first.
    pub async fn by_client(&self, client_id: &str) -> DbResult<Vec<Sale>> {
        self.fetch_many(
            "WHERE client_id = ?1 ORDER BY service_order_number DESC",
            Some(client_id.to_string()),
        )
        .await
    }

    /// The newest non-cancelled sales, for the dashboard.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let filter = format!(
            "WHERE status != 'cancelled' ORDER BY created_at DESC, rowid DESC LIMIT {}",
            limit.min(100)
        );
        self.fetch_many(&filter, None).await
    }

    /// A sale's payments, oldest first.
    pub async fn payments(&self, sale_id: &str) -> DbResult<Vec<Payment>> {
        let payments: Vec<Payment> = sqlx::query_as(
            r#"
            SELECT id, sale_id, amount_cents, payment_method, payment_date, notes
            FROM payments
            WHERE sale_id = ?1
            ORDER BY payment_date, rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// The number the next auto-numbered sale will most likely get.
    ///
    /// Advisory only: creation assigns its number inside the INSERT.
    pub async fn next_service_order_number(&self) -> DbResult<i64> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(service_order_number) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(max.map_or(FIRST_SERVICE_ORDER_NUMBER, |n| n + 1))
    }

    /// Aggregate totals across every sale.
    pub async fn totals(&self) -> DbResult<SalesTotals> {
        let (total_sales, total_count, total_paid, total_pending, paid_count): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total_cents), 0),
                COUNT(*),
                COALESCE(SUM(paid_amount_cents), 0),
                COALESCE(SUM(pending_amount_cents), 0),
                COALESCE(SUM(CASE WHEN status = 'paid' THEN 1 ELSE 0 END), 0)
            FROM sales
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesTotals {
            total_sales,
            total_count,
            total_paid,
            total_pending,
            paid_count,
        })
    }

    /// Everything the receipt needs: the sale, its client and the shop
    /// profile.
    ///
    /// ## Returns
    /// * `Ok(Some(..))` - `client` / `profile` may still be `None`
    /// * `Ok(None)` - Sale not found
    pub async fn receipt(&self, sale_id: &str) -> DbResult<Option<ReceiptData>> {
        let Some(sale) = self.get(sale_id).await? else {
            return Ok(None);
        };

        let client = ClientRepository::new(self.pool.clone())
            .get(&sale.client_id)
            .await?;
        let profile = ProfileRepository::new(self.pool.clone()).get().await?;

        if client.is_none() {
            debug!(sale_id = %sale_id, client_id = %sale.client_id, "Receipt for a deleted client");
        }

        Ok(Some(ReceiptData {
            sale,
            client,
            profile,
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================
