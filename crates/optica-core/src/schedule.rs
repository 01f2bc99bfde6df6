//! # Schedule Module
//!
//! Shop-local calendar days and the agenda grid.
//!
//! Appointments are stored as UTC instants. "Today" is the shop's wall-clock
//! day, so every day query goes through a fixed UTC offset taken from
//! configuration (São Paulo is −03:00).
//!
//! ```text
//! local day 2026-03-02 at −03:00
//!   start = 2026-03-02T03:00:00Z   (inclusive)
//!   end   = 2026-03-03T03:00:00Z   (exclusive)
//!
//! slots: 08:00, 08:10, … 17:50  (60 slots of 10 minutes)
//! ```

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::ValidationError;
use crate::types::{AgendaSlot, Appointment};
use crate::validation::ValidationResult;

/// Length of one agenda slot.
pub const SLOT_MINUTES: i64 = 10;

/// First slot of the day, shop-local.
pub const OPENING_HOUR: u32 = 8;

/// The last slot starts ten minutes before this hour.
pub const CLOSING_HOUR: u32 = 18;

/// Agenda queries outside these years are rejected.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// Builds the shop's fixed offset from minutes east of UTC.
///
/// ## Example
/// ```rust
/// use optica_core::schedule::utc_offset;
///
/// let sao_paulo = utc_offset(-180).unwrap();
/// assert_eq!(sao_paulo.local_minus_utc(), -3 * 3600);
/// assert!(utc_offset(24 * 60).is_err());
/// ```
pub fn utc_offset(minutes: i32) -> ValidationResult<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ValidationError::OutOfRange {
            field: "utcOffsetMinutes".to_string(),
            min: -(23 * 60 + 59),
            max: 23 * 60 + 59,
        })
}

/// The shop-local calendar day containing `at`.
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// UTC bounds `[start, end)` of a shop-local calendar day.
///
/// ## Errors
/// `OutOfRange` when the day lies outside [`MIN_YEAR`, `MAX_YEAR`].
pub fn day_bounds(
    day: NaiveDate,
    offset: FixedOffset,
) -> ValidationResult<(DateTime<Utc>, DateTime<Utc>)> {
    check_year(day)?;
    let start = local_instant(day, NaiveTime::MIN, offset);
    let end = start
        .checked_add_signed(Duration::days(1))
        .ok_or_else(year_out_of_range)?;
    Ok((start, end))
}

fn check_year(day: NaiveDate) -> ValidationResult<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&day.year()) {
        Ok(())
    } else {
        Err(year_out_of_range())
    }
}

fn year_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "date".to_string(),
        min: i64::from(MIN_YEAR),
        max: i64::from(MAX_YEAR),
    }
}

fn local_instant(day: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    // A fixed offset has no gaps or folds, so the mapping is always single.
    offset
        .from_local_datetime(&day.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&day.and_time(time)))
}

/// Parses the `date` query parameter of the agenda endpoints.
///
/// Accepts either a calendar day (`2026-03-02`) or epoch milliseconds of any
/// instant within the wanted day.
pub fn parse_day(raw: &str, offset: FixedOffset) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();

    let day = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => day,
        Err(_) => raw
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|at| local_day(at, offset))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: "expected YYYY-MM-DD or epoch milliseconds".to_string(),
            })?,
    };

    check_year(day)?;
    Ok(day)
}

/// Start instants of every slot of a shop-local day, with their labels.
pub fn slot_starts(day: NaiveDate, offset: FixedOffset) -> Vec<(String, DateTime<Utc>)> {
    let slots_per_day = i64::from(CLOSING_HOUR - OPENING_HOUR) * 60 / SLOT_MINUTES;
    let opening = NaiveTime::from_hms_opt(OPENING_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);

    (0..slots_per_day)
        .map(|i| {
            let time = opening + Duration::minutes(i * SLOT_MINUTES);
            (time.format("%H:%M").to_string(), local_instant(day, time, offset))
        })
        .collect()
}

/// Lays the day's appointments onto the slot grid.
///
/// Appointments that do not start exactly on a slot boundary (booked from
/// outside the grid) are not shown in the grid; `listByDay` still returns
/// them.
pub fn build_agenda(
    day: NaiveDate,
    offset: FixedOffset,
    appointments: &[Appointment],
) -> Vec<AgendaSlot> {
    slot_starts(day, offset)
        .into_iter()
        .map(|(time, start)| AgendaSlot {
            appointment: appointments.iter().find(|a| a.date == start).cloned(),
            time,
            start,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
