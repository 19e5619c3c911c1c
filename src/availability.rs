use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::BookingError;
use crate::models::{Slot, SlotStatus};
use crate::store::{EntityStore, StoreError};

/// First and last bookable hour of a working day. Every barber gets one
/// hourly slot per hour in this inclusive range.
pub const DAY_START_HOUR: u32 = 8;
pub const DAY_END_HOUR: u32 = 17;

/// A free slot annotated with the barber it belongs to, for the flattened
/// cross-barber availability listing.
#[derive(Debug, Clone, Serialize)]
pub struct FreeSlot {
    pub barber_id: String,
    pub barber_name: String,
    pub date: NaiveDate,
    pub time: String,
}

pub fn daily_slots(date: NaiveDate) -> Vec<Slot> {
    (DAY_START_HOUR..=DAY_END_HOUR)
        .map(|hour| Slot {
            date,
            time: format!("{hour:02}:00"),
            status: SlotStatus::Free,
        })
        .collect()
}

/// Extends one barber's calendar to cover `horizon_days` starting at `from`.
/// Dates already present are left untouched (the store-side push is
/// conditional on the date being absent), so this is safe to run on every
/// process start and on a timer. Returns the number of days appended.
pub async fn extend_calendar(
    store: &dyn EntityStore,
    barber_id: &str,
    from: NaiveDate,
    horizon_days: u32,
) -> Result<u32, StoreError> {
    let mut appended = 0;
    for offset in 0..horizon_days {
        let date = from + Duration::days(i64::from(offset));
        if store.append_slots(barber_id, date, &daily_slots(date)).await? {
            appended += 1;
        }
    }
    Ok(appended)
}

pub async fn extend_all(
    store: &dyn EntityStore,
    from: NaiveDate,
    horizon_days: u32,
) -> Result<u32, StoreError> {
    let mut appended = 0;
    for barber in store.list_barbers().await? {
        appended += extend_calendar(store, &barber.id, from, horizon_days).await?;
    }
    Ok(appended)
}

pub async fn list_free(
    store: &dyn EntityStore,
    barber_id: Option<&str>,
) -> Result<Vec<FreeSlot>, BookingError> {
    let barbers = match barber_id {
        Some(id) => vec![store
            .get_barber(id)
            .await?
            .ok_or(BookingError::NotFound("barber"))?],
        None => store.list_barbers().await?,
    };

    let mut free = Vec::new();
    for barber in barbers {
        for slot in &barber.slots {
            if slot.status == SlotStatus::Free {
                free.push(FreeSlot {
                    barber_id: barber.id.clone(),
                    barber_name: barber.name.clone(),
                    date: slot.date,
                    time: slot.time.clone(),
                });
            }
        }
    }
    Ok(free)
}

/// Claims a free slot for a new reservation (free -> held). The conditional
/// store write is the only protection against two concurrent bookings of the
/// same slot, so the losing request sees `SlotUnavailable` here.
pub async fn reserve(
    store: &dyn EntityStore,
    barber_id: &str,
    date: NaiveDate,
    time: &str,
) -> Result<(), BookingError> {
    if store
        .set_slot_status(barber_id, date, time, SlotStatus::Free, SlotStatus::Held)
        .await?
    {
        Ok(())
    } else {
        Err(BookingError::SlotUnavailable)
    }
}

/// Held -> booked, when the reservation is confirmed.
pub async fn confirm(
    store: &dyn EntityStore,
    barber_id: &str,
    date: NaiveDate,
    time: &str,
) -> Result<bool, StoreError> {
    store
        .set_slot_status(barber_id, date, time, SlotStatus::Held, SlotStatus::Booked)
        .await
}

/// Returns a slot to the free pool after a cancellation, whichever non-free
/// state it is in.
pub async fn release(
    store: &dyn EntityStore,
    barber_id: &str,
    date: NaiveDate,
    time: &str,
) -> Result<bool, StoreError> {
    if store
        .set_slot_status(barber_id, date, time, SlotStatus::Held, SlotStatus::Free)
        .await?
    {
        return Ok(true);
    }
    store
        .set_slot_status(barber_id, date, time, SlotStatus::Booked, SlotStatus::Free)
        .await
}

/// Manual block by the barber: takes a free slot out of circulation without
/// a reservation attached.
pub async fn block(
    store: &dyn EntityStore,
    barber_id: &str,
    date: NaiveDate,
    time: &str,
) -> Result<(), BookingError> {
    if store
        .set_slot_status(barber_id, date, time, SlotStatus::Free, SlotStatus::Booked)
        .await?
    {
        Ok(())
    } else {
        Err(BookingError::SlotUnavailable)
    }
}
