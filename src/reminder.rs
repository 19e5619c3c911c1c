use chrono::{Duration, Local, NaiveDate};

use crate::models::Reservation;
use crate::state::AppState;
use crate::store::{EntityStore, StoreError};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReminderStats {
    pub sent: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// One scheduler tick: remind clients about tomorrow's reservations.
pub async fn tick(state: &AppState) -> Result<ReminderStats, StoreError> {
    let tomorrow = Local::now().date_naive() + Duration::days(1);
    send_due_reminders(state, tomorrow).await
}

/// Sends at most one reminder per reservation on the given date.
///
/// The contact email comes from a live lookup of the client row, falling
/// back to the snapshot carried by the reservation. Each item is isolated:
/// an unreachable contact or a failed send is counted and skipped, never
/// propagated, and the reminder flag is only set after a successful send.
pub async fn send_due_reminders(
    state: &AppState,
    date: NaiveDate,
) -> Result<ReminderStats, StoreError> {
    let due = state.store.due_reminders(date).await?;
    let mut stats = ReminderStats::default();

    for reservation in due {
        let (name, email) = match resolve_contact(state, &reservation).await {
            Some(contact) => contact,
            None => {
                log::warn!(
                    "reservation {} has no reachable contact; skipping",
                    reservation.id
                );
                stats.skipped += 1;
                continue;
            }
        };

        let subject = "Reminder: your appointment at Valiant Barbershop";
        let body = format!(
            "Hello {name},\n\n\
             This is a reminder of your upcoming appointment:\n\n\
             Date: {date}\n\
             Time: {time}\n\
             Service: {service}\n\n\
             See you soon!",
            date = reservation.date,
            time = reservation.time,
            service = reservation.service_name,
        );

        match state.mailer.send(&email, subject, &body).await {
            Ok(()) => {
                // Conditional on the flag still being unset, so overlapping
                // ticks cannot count (or send) the same reservation twice.
                if state.store.mark_reminder_sent(&reservation.id).await? {
                    stats.sent += 1;
                }
            }
            Err(err) => {
                log::warn!("reminder for reservation {} failed: {err}", reservation.id);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

async fn resolve_contact(state: &AppState, reservation: &Reservation) -> Option<(String, String)> {
    match state.clients.find_by_id(&reservation.client_id).await {
        Ok(Some(client)) => return Some((client.name, client.email)),
        Ok(None) => {}
        Err(err) => log::warn!(
            "client lookup for reservation {} failed, using snapshot: {err}",
            reservation.id
        ),
    }

    let snapshot = &reservation.contact;
    if snapshot.email.is_empty() {
        None
    } else {
        Some((snapshot.name.clone(), snapshot.email.clone()))
    }
}
