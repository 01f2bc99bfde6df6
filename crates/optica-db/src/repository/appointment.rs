//! # Appointment Repository
//!
//! The appointment book. Every appointment occupies one exact instant and
//! no two may share it; a UNIQUE index on `appointments.date` backs the
//! rule so concurrent bookings can't both win.
//!
//! ## Booking Flow
//! ```text
//! create(NewAppointment { clientId, date })
//!      │
//!      ├── client missing?      → NotFound
//!      ├── instant already used → SlotTaken (409)
//!      ▼
//! INSERT ──► UNIQUE race lost → SlotTaken (409)
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use optica_core::schedule::{build_agenda, day_bounds};
use optica_core::{AgendaSlot, Appointment, CoreError, NewAppointment};

const DATE_UNIQUE: &str = "appointments.date";

#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: String,
    client_id: String,
    client_name: String,
    date: i64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let date = DateTime::<Utc>::from_timestamp_millis(row.date).ok_or_else(|| {
            DbError::corrupt("appointments", format!("date {} out of range", row.date))
        })?;

        Ok(Appointment {
            id: row.id,
            client_id: row.client_id,
            client_name: row.client_name,
            date,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

fn slot_taken(at: DateTime<Utc>) -> DbError {
    CoreError::SlotTaken {
        at: at.to_rfc3339(),
    }
    .into()
}

/// Repository for appointment database operations.
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    pool: SqlitePool,
}

impl AppointmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AppointmentRepository { pool }
    }

    /// Books an appointment for an existing client.
    ///
    /// The client's current name is copied onto the appointment.
    pub async fn create(&self, input: NewAppointment) -> DbResult<Appointment> {
        let input = input.normalize();
        input.validate()?;

        let client_name: Option<String> =
            sqlx::query_scalar("SELECT name FROM clients WHERE id = ?1")
                .bind(&input.client_id)
                .fetch_optional(&self.pool)
                .await?;
        let client_name = client_name.ok_or_else(|| DbError::not_found("Client", &input.client_id))?;

        let millis = input.date.timestamp_millis();

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM appointments WHERE date = ?1)")
                .bind(millis)
                .fetch_one(&self.pool)
                .await?;
        if taken {
            return Err(slot_taken(input.date));
        }

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            client_id: input.client_id,
            client_name,
            date: input.date,
            notes: input.notes,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO appointments (id, client_id, client_name, date, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&appointment.id)
        .bind(&appointment.client_id)
        .bind(&appointment.client_name)
        .bind(millis)
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            err if err.is_unique_violation_on(DATE_UNIQUE) => slot_taken(appointment.date),
            err => err,
        })?;

        info!(
            id = %appointment.id,
            client_id = %appointment.client_id,
            date = %appointment.date,
            "Appointment booked"
        );

        Ok(appointment)
    }

    /// Cancels (deletes) an appointment, freeing its slot.
    pub async fn cancel(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Appointment", id));
        }

        info!(id = %id, "Appointment cancelled");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Appointment>> {
        let row: Option<AppointmentRow> = sqlx::query_as(
            "SELECT id, client_id, client_name, date, notes, created_at FROM appointments WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Appointment::try_from).transpose()
    }

    /// Appointments within one shop-local day, earliest first.
    pub async fn list_by_day(
        &self,
        day: NaiveDate,
        offset: FixedOffset,
    ) -> DbResult<Vec<Appointment>> {
        let (start, end) = day_bounds(day, offset)?;
        debug!(%day, %start, %end, "Listing appointments");

        let rows: Vec<AppointmentRow> = sqlx::query_as(
            r#"
            SELECT id, client_id, client_name, date, notes, created_at
            FROM appointments
            WHERE date >= ?1 AND date < ?2
            ORDER BY date
            "#,
        )
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Appointment::try_from).collect()
    }

    /// The day's slot grid with each booked slot filled in.
    pub async fn agenda(&self, day: NaiveDate, offset: FixedOffset) -> DbResult<Vec<AgendaSlot>> {
        let appointments = self.list_by_day(day, offset).await?;
        Ok(build_agenda(day, offset, &appointments))
    }

    /// Appointments of one client, most recent first.
    pub async fn by_client(&self, client_id: &str) -> DbResult<Vec<Appointment>> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(
            r#"
            SELECT id, client_id, client_name, date, notes, created_at
            FROM appointments
            WHERE client_id = ?1
            ORDER BY date DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Appointment::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use optica_core::schedule::utc_offset;
    use optica_core::{Client, ClientInput, CoreError, NewAppointment};

    async fn setup() -> (Database, Client) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = db
            .clients()
            .create(ClientInput {
                name: "Ana Souza".to_string(),
                phone: "11 99999-0000".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        (db, client)
    }

    fn booking(client: &Client, date: DateTime<Utc>) -> NewAppointment {
        NewAppointment {
            client_id: client.id.clone(),
            date,
            notes: Some("Exame de vista".to_string()),
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        // 2026-03-02 local (−03:00) wall clock
        Utc.with_ymd_and_hms(2026, 3, 2, hour + 3, minute, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[tokio::test]
    async fn test_slot_conflict() {
        let (db, ana) = setup().await;
        let appointments = db.appointments();

        let first = appointments.create(booking(&ana, at(9, 0))).await.unwrap();
        assert_eq!(first.client_name, "Ana Souza");

        let err = appointments
            .create(booking(&ana, at(9, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SlotTaken { .. })));

        // Ten minutes later is a different slot
        appointments.create(booking(&ana, at(9, 10))).await.unwrap();

        appointments.cancel(&first.id).await.unwrap();
        appointments.create(booking(&ana, at(9, 0))).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_requires_client() {
        let (db, ana) = setup().await;
        db.clients().remove(&ana.id).await.unwrap();

        let err = db
            .appointments()
            .create(booking(&ana, at(10, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancel_missing() {
        let (db, _) = setup().await;
        assert!(matches!(
            db.appointments().cancel("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_by_day_respects_local_bounds() {
        let (db, ana) = setup().await;
        let appointments = db.appointments();
        let offset = utc_offset(-180).unwrap();

        appointments.create(booking(&ana, at(17, 50))).await.unwrap();
        appointments.create(booking(&ana, at(8, 0))).await.unwrap();
        // 23:30 local on the 2nd is already the 3rd in UTC
        let late = Utc.with_ymd_and_hms(2026, 3, 3, 2, 30, 0).unwrap();
        appointments.create(booking(&ana, late)).await.unwrap();
        // 00:00 local on the 3rd belongs to the next day
        let next_day = Utc.with_ymd_and_hms(2026, 3, 3, 3, 0, 0).unwrap();
        appointments.create(booking(&ana, next_day)).await.unwrap();

        let listed = appointments.list_by_day(day(), offset).await.unwrap();
        let dates: Vec<DateTime<Utc>> = listed.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![at(8, 0), at(17, 50), late]);

        let next = day().succ_opt().unwrap();
        assert_eq!(appointments.list_by_day(next, offset).await.unwrap().len(), 1);
        assert_eq!(appointments.by_client(&ana.id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_agenda_grid() {
        let (db, ana) = setup().await;
        let appointments = db.appointments();
        let offset = utc_offset(-180).unwrap();

        let booked = appointments.create(booking(&ana, at(14, 30))).await.unwrap();

        let agenda = appointments.agenda(day(), offset).await.unwrap();
        assert_eq!(agenda.len(), 60);
        assert_eq!(agenda[0].time, "08:00");
        assert_eq!(agenda[59].time, "17:50");

        let filled: Vec<_> = agenda.iter().filter(|s| s.appointment.is_some()).collect();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].time, "14:30");
        assert_eq!(filled[0].appointment.as_ref().map(|a| &a.id), Some(&booked.id));

        assert_eq!(appointments.get(&booked.id).await.unwrap(), Some(booked));
    }
}
