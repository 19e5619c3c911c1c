use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::availability;
use crate::error::BookingError;
use crate::models::{ContactInfo, Reservation, ReservationStatus};
use crate::reconcile;
use crate::reservations::{self, BookingRequest};
use crate::state::AppState;
use crate::store::EntityStore;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health)))
        .service(web::resource("/clients").route(web::get().to(list_clients)).route(web::post().to(register_client)))
        .service(web::resource("/barbers").route(web::get().to(list_barbers)))
        .service(web::resource("/services").route(web::get().to(list_services)))
        .service(web::resource("/products").route(web::get().to(list_products)))
        .service(web::resource("/availability/free").route(web::get().to(free_slots)))
        .service(web::resource("/barbers/{id}/availability").route(web::get().to(barber_availability)))
        .service(web::resource("/barbers/{id}/agenda").route(web::get().to(barber_agenda)))
        .service(web::resource("/barbers/{id}/history").route(web::get().to(barber_history)))
        .service(
            web::resource("/reservations")
                .route(web::get().to(list_reservations))
                .route(web::post().to(create_reservation)),
        )
        .service(
            web::resource("/reservations/{id}")
                .route(web::put().to(transition_reservation))
                .route(web::delete().to(cancel_reservation)),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "service online" }))
}

async fn list_clients(state: web::Data<AppState>) -> Result<HttpResponse> {
    let clients = state.clients.list().await.map_err(BookingError::from)?;
    Ok(HttpResponse::Ok().json(clients))
}

async fn register_client(
    state: web::Data<AppState>,
    body: web::Json<ContactInfo>,
) -> Result<HttpResponse> {
    let client = reconcile::resolve_or_create(&state.clients, &body).await?;
    Ok(HttpResponse::Created().json(json!({ "message": "client registered", "id": client.id })))
}

/// Listing view that leaves the barber's credentials out of the response.
#[derive(Serialize)]
struct BarberView {
    id: String,
    name: String,
    specialty: String,
}

async fn list_barbers(state: web::Data<AppState>) -> Result<HttpResponse> {
    let barbers = state.store.list_barbers().await.map_err(BookingError::from)?;
    let views: Vec<BarberView> = barbers
        .into_iter()
        .map(|b| BarberView {
            id: b.id,
            name: b.name,
            specialty: b.specialty,
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse> {
    let services = state.store.list_services().await.map_err(BookingError::from)?;
    Ok(HttpResponse::Ok().json(services))
}

async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse> {
    let products = state.store.list_products().await.map_err(BookingError::from)?;
    Ok(HttpResponse::Ok().json(products))
}

#[derive(Deserialize)]
struct FreeSlotsQuery {
    barber_id: Option<String>,
}

async fn free_slots(
    state: web::Data<AppState>,
    query: web::Query<FreeSlotsQuery>,
) -> Result<HttpResponse> {
    let slots = availability::list_free(state.store.as_ref(), query.barber_id.as_deref()).await?;
    Ok(HttpResponse::Ok().json(slots))
}

async fn barber_availability(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let barber_id = path.into_inner();
    let slots = availability::list_free(state.store.as_ref(), Some(&barber_id)).await?;
    Ok(HttpResponse::Ok().json(slots))
}

async fn barber_agenda(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let agenda = reservations::by_barber_agenda(&state, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(agenda))
}

async fn barber_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let history = reservations::by_barber_history(&state, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(history))
}

#[derive(Deserialize)]
struct ReservationQuery {
    status: Option<String>,
}

async fn list_reservations(
    state: web::Data<AppState>,
    query: web::Query<ReservationQuery>,
) -> Result<HttpResponse> {
    let status = match query.status.as_deref() {
        None => ReservationStatus::Pending,
        Some(value) => value
            .parse()
            .map_err(BookingError::InvalidInput)?,
    };
    let rows: Vec<Reservation> = state
        .store
        .reservations_by_status(status)
        .await
        .map_err(BookingError::from)?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn create_reservation(
    state: web::Data<AppState>,
    body: web::Json<BookingRequest>,
) -> Result<HttpResponse> {
    let mut request = body.into_inner();
    request.time = super::normalize_time(&request.time)?;
    let reservation = reservations::create(&state, request).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "reservation created",
        "id": reservation.id,
    })))
}

#[derive(Deserialize)]
struct TransitionBody {
    status: ReservationStatus,
}

async fn transition_reservation(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TransitionBody>,
) -> Result<HttpResponse> {
    let reservation = reservations::transition(&state, &path.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("reservation {}", reservation.status),
        "id": reservation.id,
    })))
}

async fn cancel_reservation(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let reservation = reservations::cancel(&state, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "reservation cancelled",
        "id": reservation.id,
    })))
}
