use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::availability;
use crate::error::BookingError;
use crate::models::{
    new_id, ClientStatus, ContactInfo, ContactSnapshot, Reservation, ReservationStatus,
};
use crate::reconcile;
use crate::state::AppState;
use crate::store::EntityStore;

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub barber_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub contact: ContactInfo,
}

/// Books a slot: resolve the client, claim the slot, insert the reservation.
///
/// The three steps are one logical unit with deliberate asymmetry on
/// failure: a client created before the slot claim fails is kept (clients
/// without bookings are fine), while a reservation-insert failure releases
/// the just-claimed slot so the calendar and the reservations collection
/// cannot diverge.
pub async fn create(state: &AppState, req: BookingRequest) -> Result<Reservation, BookingError> {
    let barber = state
        .store
        .get_barber(&req.barber_id)
        .await?
        .ok_or(BookingError::NotFound("barber"))?;
    let service = state
        .store
        .get_service(&req.service_id)
        .await?
        .ok_or(BookingError::NotFound("service"))?;

    let client = reconcile::resolve_or_create(&state.clients, &req.contact).await?;

    availability::reserve(state.store.as_ref(), &barber.id, req.date, &req.time).await?;

    let reservation = Reservation {
        id: new_id(),
        client_id: client.id.clone(),
        barber_id: barber.id.clone(),
        service_id: service.id.clone(),
        service_name: service.name.clone(),
        date: req.date,
        time: req.time.clone(),
        status: ReservationStatus::Pending,
        reminder_sent: false,
        contact: ContactSnapshot {
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
        },
        created_at: Utc::now().to_rfc3339(),
    };

    if let Err(err) = state.store.insert_reservation(&reservation).await {
        let released =
            availability::release(state.store.as_ref(), &barber.id, req.date, &req.time).await;
        if let Err(release_err) = released {
            log::error!(
                "failed to release slot {} {} for barber {} after insert failure: {release_err}",
                req.date,
                req.time,
                barber.id
            );
        }
        return Err(err.into());
    }

    if let Err(err) = state.clients.set_status(&client.id, ClientStatus::Booked).await {
        log::warn!("could not update client {} lifecycle: {err}", client.id);
    }

    log::info!(
        "reservation {} created for {} with barber {} on {} {}",
        reservation.id,
        reservation.contact.name,
        barber.name,
        reservation.date,
        reservation.time
    );
    Ok(reservation)
}

/// Moves a reservation through the state machine and keeps the slot and the
/// relational client lifecycle in step. The status write is conditional on
/// the status we validated against, so a concurrent transition loses cleanly.
pub async fn transition(
    state: &AppState,
    id: &str,
    new_status: ReservationStatus,
) -> Result<Reservation, BookingError> {
    let reservation = state
        .store
        .get_reservation(id)
        .await?
        .ok_or(BookingError::NotFound("reservation"))?;

    if !reservation.status.can_transition(new_status) {
        return Err(BookingError::IllegalTransition {
            from: reservation.status,
            to: new_status,
        });
    }

    let updated = state
        .store
        .set_reservation_status(id, reservation.status, new_status)
        .await?;
    if !updated {
        // Someone else transitioned it first; re-read and report against the
        // current state.
        let current = state
            .store
            .get_reservation(id)
            .await?
            .ok_or(BookingError::NotFound("reservation"))?;
        return Err(BookingError::IllegalTransition {
            from: current.status,
            to: new_status,
        });
    }

    match new_status {
        ReservationStatus::Confirmed => {
            availability::confirm(
                state.store.as_ref(),
                &reservation.barber_id,
                reservation.date,
                &reservation.time,
            )
            .await?;
        }
        ReservationStatus::Completed => {
            update_client_lifecycle(state, &reservation, ClientStatus::Served).await;
        }
        ReservationStatus::Cancelled => {
            availability::release(
                state.store.as_ref(),
                &reservation.barber_id,
                reservation.date,
                &reservation.time,
            )
            .await?;
            update_client_lifecycle(state, &reservation, ClientStatus::NoShow).await;
        }
        ReservationStatus::Pending => {}
    }

    Ok(Reservation {
        status: new_status,
        ..reservation
    })
}

pub async fn cancel(state: &AppState, id: &str) -> Result<Reservation, BookingError> {
    transition(state, id, ReservationStatus::Cancelled).await
}

/// The client row may have been deleted independently of the reservation;
/// the transition still stands on the document-store snapshot alone.
async fn update_client_lifecycle(state: &AppState, reservation: &Reservation, status: ClientStatus) {
    match state.clients.set_status(&reservation.client_id, status).await {
        Ok(true) => {}
        Ok(false) => log::info!(
            "client {} no longer exists; reservation {} keeps its snapshot",
            reservation.client_id,
            reservation.id
        ),
        Err(err) => log::warn!(
            "could not update client {} lifecycle: {err}",
            reservation.client_id
        ),
    }
}

pub async fn pending(state: &AppState) -> Result<Vec<Reservation>, BookingError> {
    Ok(state
        .store
        .reservations_by_status(ReservationStatus::Pending)
        .await?)
}

/// Upcoming work for one barber: pending and confirmed, ordered by date/time.
pub async fn by_barber_agenda(
    state: &AppState,
    barber_id: &str,
) -> Result<Vec<Reservation>, BookingError> {
    Ok(state
        .store
        .barber_reservations(
            barber_id,
            &[ReservationStatus::Pending, ReservationStatus::Confirmed],
        )
        .await?)
}

pub async fn by_barber_history(
    state: &AppState,
    barber_id: &str,
) -> Result<Vec<Reservation>, BookingError> {
    Ok(state
        .store
        .barber_reservations(barber_id, &[ReservationStatus::Completed])
        .await?)
}
