use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::ReservationStatus;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("slot is not available")]
    SlotUnavailable,
    #[error("illegal status transition from {from} to {to}")]
    IllegalTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },
    #[error("name, email and phone are required for a first booking")]
    MissingContactInfo,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid username or password")]
    Unauthorized,
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl ResponseError for BookingError {
    fn status_code(&self) -> StatusCode {
        match self {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::SlotUnavailable => StatusCode::CONFLICT,
            BookingError::IllegalTransition { .. } => StatusCode::BAD_REQUEST,
            BookingError::MissingContactInfo => StatusCode::BAD_REQUEST,
            BookingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BookingError::Unauthorized => StatusCode::UNAUTHORIZED,
            BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let BookingError::Store(err) = self {
            log::error!("store failure: {err}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}
