//! # Client Repository
//!
//! Database operations for clients and their prescriptions.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client { right_eye: EyePrescription, left_eye: EyePrescription }       │
//! │       │                                                                 │
//! │       ▼  flattened into one row                                         │
//! │  clients.od_spherical … od_co   (right eye, "oculus dexter")            │
//! │  clients.oe_spherical … oe_co   (left eye, "olho esquerdo")             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Search
//! The client list of a single shop is small, so search is a linear scan
//! over every row using [`Client::matches`]. Empty queries return nothing.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use optica_core::validation::validate_search_query;
use optica_core::{Client, ClientInput, EyePrescription};

const CLIENT_COLUMNS: &str = r#"
    id, name, email, phone, cpf, address, birth_date,
    od_spherical, od_cylindrical, od_axis, od_addition, od_dnp, od_co,
    oe_spherical, oe_cylindrical, oe_axis, oe_addition, oe_dnp, oe_co,
    notes, created_at, updated_at
"#;

/// Flat row as stored in `clients`.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: String,
    name: String,
    email: Option<String>,
    phone: String,
    cpf: Option<String>,
    address: Option<String>,
    birth_date: Option<NaiveDate>,
    od_spherical: Option<String>,
    od_cylindrical: Option<String>,
    od_axis: Option<String>,
    od_addition: Option<String>,
    od_dnp: Option<String>,
    od_co: Option<String>,
    oe_spherical: Option<String>,
    oe_cylindrical: Option<String>,
    oe_axis: Option<String>,
    oe_addition: Option<String>,
    oe_dnp: Option<String>,
    oe_co: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            cpf: row.cpf,
            address: row.address,
            birth_date: row.birth_date,
            right_eye: EyePrescription {
                spherical: row.od_spherical,
                cylindrical: row.od_cylindrical,
                axis: row.od_axis,
                addition: row.od_addition,
                dnp: row.od_dnp,
                co: row.od_co,
            },
            left_eye: EyePrescription {
                spherical: row.oe_spherical,
                cylindrical: row.oe_cylindrical,
                axis: row.oe_axis,
                addition: row.oe_addition,
                dnp: row.oe_dnp,
                co: row.oe_co,
            },
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for client database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.clients();
///
/// let client = repo.create(input).await?;
/// let matches = repo.search("maria").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Creates a client.
    ///
    /// ## Errors
    /// `Domain(Validation)` when name or phone is empty after trimming.
    pub async fn create(&self, input: ClientInput) -> DbResult<Client> {
        let input = input.normalize();
        input.validate()?;

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            cpf: input.cpf,
            address: input.address,
            birth_date: input.birth_date,
            right_eye: input.right_eye,
            left_eye: input.left_eye,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, email, phone, cpf, address, birth_date,
                od_spherical, od_cylindrical, od_axis, od_addition, od_dnp, od_co,
                oe_spherical, oe_cylindrical, oe_axis, oe_addition, oe_dnp, oe_co,
                notes, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19,
                ?20, ?21, ?22
            )
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.cpf)
        .bind(&client.address)
        .bind(client.birth_date)
        .bind(&client.right_eye.spherical)
        .bind(&client.right_eye.cylindrical)
        .bind(&client.right_eye.axis)
        .bind(&client.right_eye.addition)
        .bind(&client.right_eye.dnp)
        .bind(&client.right_eye.co)
        .bind(&client.left_eye.spherical)
        .bind(&client.left_eye.cylindrical)
        .bind(&client.left_eye.axis)
        .bind(&client.left_eye.addition)
        .bind(&client.left_eye.dnp)
        .bind(&client.left_eye.co)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %client.id, name = %client.name, "Client created");
        Ok(client)
    }

    /// Replaces every editable field of a client.
    ///
    /// ## Returns
    /// The updated client, or `NotFound`.
    pub async fn update(&self, id: &str, input: ClientInput) -> DbResult<Client> {
        let input = input.normalize();
        input.validate()?;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?2, email = ?3, phone = ?4, cpf = ?5, address = ?6, birth_date = ?7,
                od_spherical = ?8, od_cylindrical = ?9, od_axis = ?10,
                od_addition = ?11, od_dnp = ?12, od_co = ?13,
                oe_spherical = ?14, oe_cylindrical = ?15, oe_axis = ?16,
                oe_addition = ?17, oe_dnp = ?18, oe_co = ?19,
                notes = ?20, updated_at = ?21
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.cpf)
        .bind(&input.address)
        .bind(input.birth_date)
        .bind(&input.right_eye.spherical)
        .bind(&input.right_eye.cylindrical)
        .bind(&input.right_eye.axis)
        .bind(&input.right_eye.addition)
        .bind(&input.right_eye.dnp)
        .bind(&input.right_eye.co)
        .bind(&input.left_eye.spherical)
        .bind(&input.left_eye.cylindrical)
        .bind(&input.left_eye.axis)
        .bind(&input.left_eye.addition)
        .bind(&input.left_eye.dnp)
        .bind(&input.left_eye.co)
        .bind(&input.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        info!(id = %id, "Client updated");

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Deletes a client.
    ///
    /// Sales and appointments that reference the client are left alone and
    /// keep their name snapshot.
    pub async fn remove(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        info!(id = %id, "Client removed");
        Ok(())
    }

    /// Gets a client by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Client))` - Client found
    /// * `Ok(None)` - Client not found
    pub async fn get(&self, id: &str) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1");
        let row: Option<ClientRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Client::from))
    }

    /// Lists every client, newest first.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at DESC, rowid DESC");
        let rows: Vec<ClientRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Searches clients by name, email or phone.
    ///
    /// ## How It Works
    /// ```text
    /// "Mar"  ──► lowercase "mar" ──► name / email contains (case-insensitive)
    ///        └─► raw "Mar"       ──► phone contains
    /// ```
    ///
    /// An empty query returns an empty list, not the whole table.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Client>> {
        let query = validate_search_query(query)?;

        if query.is_empty() {
            return Ok(Vec::new());
        }

        debug!(query = %query, "Searching clients");

        let lowered = query.to_lowercase();
        let matches: Vec<Client> = self
            .list()
            .await?
            .into_iter()
            .filter(|client| client.matches(&lowered, &query))
            .collect();

        debug!(count = matches.len(), "Client search returned");
        Ok(matches)
    }
}

// =============================================================================
// Tests
// =============================================================================
