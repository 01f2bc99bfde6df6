//! # Profile Repository
//!
//! The shop's company profile. The table holds at most one row, pinned to
//! `id = 1`, so saving is a single upsert.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use optica_core::{Profile, ProfileInput};

const PROFILE_ID: i64 = 1;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    fantasy_name: Option<String>,
    cnpj: Option<String>,
    contact_phone: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            fantasy_name: row.fantasy_name,
            cnpj: row.cnpj,
            contact_phone: row.contact_phone,
            updated_at: Some(row.updated_at),
        }
    }
}

/// Repository for the company profile.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// The saved profile, or `None` before the first save.
    pub async fn get(&self) -> DbResult<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT fantasy_name, cnpj, contact_phone, updated_at FROM profile WHERE id = ?1",
        )
        .bind(PROFILE_ID)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Creates the profile or replaces every field of the existing one.
    ///
    /// Absent fields are stored as NULL, so the form always sends the full
    /// profile.
    pub async fn save(&self, input: ProfileInput) -> DbResult<Profile> {
        let input = input.normalize();
        input.validate()?;

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO profile (id, fantasy_name, cnpj, contact_phone, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                fantasy_name = excluded.fantasy_name,
                cnpj = excluded.cnpj,
                contact_phone = excluded.contact_phone,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(PROFILE_ID)
        .bind(&input.fantasy_name)
        .bind(&input.cnpj)
        .bind(&input.contact_phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(fantasy_name = ?input.fantasy_name, "Profile saved");

        Ok(Profile {
            fantasy_name: input.fantasy_name,
            cnpj: input.cnpj,
            contact_phone: input.contact_phone,
            updated_at: Some(now),
        })
    }
}
