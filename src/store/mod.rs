#[cfg(test)]
mod memory;
mod mongo;

#[cfg(test)]
pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Barber, Owner, Product, Reservation, ReservationStatus, Service, Slot, SlotStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("document encoding error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),
    #[error("client store error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("duplicate key: {0}")]
    Duplicate(String),
}

/// Uniform access to the operational document collections. Every mutation
/// that guards an invariant (slot status, reservation status, the reminder
/// flag) is a conditional write: it succeeds only when the stored value
/// still matches the expectation, and reports whether anything changed.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // barbers
    async fn list_barbers(&self) -> Result<Vec<Barber>, StoreError>;
    async fn get_barber(&self, id: &str) -> Result<Option<Barber>, StoreError>;
    async fn insert_barber(&self, barber: &Barber) -> Result<(), StoreError>;
    async fn delete_barber(&self, id: &str) -> Result<bool, StoreError>;

    /// Appends the given slots to a barber's calendar, but only when the
    /// calendar holds no slot for that date yet. Returns false when the date
    /// was already present (or the barber does not exist).
    async fn append_slots(
        &self,
        barber_id: &str,
        date: NaiveDate,
        slots: &[Slot],
    ) -> Result<bool, StoreError>;

    /// Flips the status of exactly the slot matching (date, time), provided
    /// it currently has the expected status. Returns false when no such
    /// element matched.
    async fn set_slot_status(
        &self,
        barber_id: &str,
        date: NaiveDate,
        time: &str,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<bool, StoreError>;

    // catalog
    async fn list_services(&self) -> Result<Vec<Service>, StoreError>;
    async fn get_service(&self, id: &str) -> Result<Option<Service>, StoreError>;
    async fn insert_service(&self, service: &Service) -> Result<(), StoreError>;
    async fn delete_service(&self, id: &str) -> Result<bool, StoreError>;
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn delete_product(&self, id: &str) -> Result<bool, StoreError>;

    // owners
    async fn find_owner(&self, username: &str) -> Result<Option<Owner>, StoreError>;
    async fn insert_owner(&self, owner: &Owner) -> Result<(), StoreError>;

    // reservations
    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), StoreError>;
    async fn get_reservation(&self, id: &str) -> Result<Option<Reservation>, StoreError>;
    async fn reservations_by_status(
        &self,
        status: ReservationStatus,
    ) -> Result<Vec<Reservation>, StoreError>;

    /// Reservations for one barber in any of the given statuses, ordered by
    /// (date, time).
    async fn barber_reservations(
        &self,
        barber_id: &str,
        statuses: &[ReservationStatus],
    ) -> Result<Vec<Reservation>, StoreError>;

    /// Active (pending or confirmed) reservations on the given date whose
    /// reminder flag is still unset.
    async fn due_reminders(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError>;

    /// Conditional status write: only applies when the stored status still
    /// equals `expected`.
    async fn set_reservation_status(
        &self,
        id: &str,
        expected: ReservationStatus,
        new: ReservationStatus,
    ) -> Result<bool, StoreError>;

    /// One-way flag set, conditional on the flag still being unset so that
    /// overlapping reminder ticks cannot double-send.
    async fn mark_reminder_sent(&self, id: &str) -> Result<bool, StoreError>;
}
