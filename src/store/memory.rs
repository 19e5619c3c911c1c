use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{
    Barber, Owner, Product, Reservation, ReservationStatus, Service, Slot, SlotStatus,
};

use super::{EntityStore, StoreError};

/// In-memory document store with the same conditional-write semantics as the
/// Mongo adapter. One mutex over all collections stands in for per-document
/// atomic updates.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    barbers: Vec<Barber>,
    services: Vec<Service>,
    products: Vec<Product>,
    owners: Vec<Owner>,
    reservations: Vec<Reservation>,
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_barbers(&self) -> Result<Vec<Barber>, StoreError> {
        Ok(self.inner.lock().unwrap().barbers.clone())
    }

    async fn get_barber(&self, id: &str) -> Result<Option<Barber>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.barbers.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_barber(&self, barber: &Barber) -> Result<(), StoreError> {
        self.inner.lock().unwrap().barbers.push(barber.clone());
        Ok(())
    }

    async fn delete_barber(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.barbers.len();
        inner.barbers.retain(|b| b.id != id);
        Ok(inner.barbers.len() < before)
    }

    async fn append_slots(
        &self,
        barber_id: &str,
        date: NaiveDate,
        slots: &[Slot],
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(barber) = inner.barbers.iter_mut().find(|b| b.id == barber_id) else {
            return Ok(false);
        };
        if barber.slots.iter().any(|s| s.date == date) {
            return Ok(false);
        }
        barber.slots.extend_from_slice(slots);
        Ok(true)
    }

    async fn set_slot_status(
        &self,
        barber_id: &str,
        date: NaiveDate,
        time: &str,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(barber) = inner.barbers.iter_mut().find(|b| b.id == barber_id) else {
            return Ok(false);
        };
        let Some(slot) = barber
            .slots
            .iter_mut()
            .find(|s| s.date == date && s.time == time && s.status == expected)
        else {
            return Ok(false);
        };
        slot.status = new;
        Ok(true)
    }

    async fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        Ok(self.inner.lock().unwrap().services.clone())
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.services.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_service(&self, service: &Service) -> Result<(), StoreError> {
        self.inner.lock().unwrap().services.push(service.clone());
        Ok(())
    }

    async fn delete_service(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.services.len();
        inner.services.retain(|s| s.id != id);
        Ok(inner.services.len() < before)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.inner.lock().unwrap().products.clone())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.inner.lock().unwrap().products.push(product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() < before)
    }

    async fn find_owner(&self, username: &str) -> Result<Option<Owner>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.owners.iter().find(|o| o.username == username).cloned())
    }

    async fn insert_owner(&self, owner: &Owner) -> Result<(), StoreError> {
        self.inner.lock().unwrap().owners.push(owner.clone());
        Ok(())
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .reservations
            .push(reservation.clone());
        Ok(())
    }

    async fn get_reservation(&self, id: &str) -> Result<Option<Reservation>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn reservations_by_status(
        &self,
        status: ReservationStatus,
    ) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reservations
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn barber_reservations(
        &self,
        barber_id: &str,
        statuses: &[ReservationStatus],
    ) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Reservation> = inner
            .reservations
            .iter()
            .filter(|r| r.barber_id == barber_id && statuses.contains(&r.status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.date, a.time.as_str()).cmp(&(b.date, b.time.as_str())));
        Ok(rows)
    }

    async fn due_reminders(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reservations
            .iter()
            .filter(|r| {
                r.date == date
                    && !r.reminder_sent
                    && matches!(
                        r.status,
                        ReservationStatus::Pending | ReservationStatus::Confirmed
                    )
            })
            .cloned()
            .collect())
    }

    async fn set_reservation_status(
        &self,
        id: &str,
        expected: ReservationStatus,
        new: ReservationStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(reservation) = inner
            .reservations
            .iter_mut()
            .find(|r| r.id == id && r.status == expected)
        else {
            return Ok(false);
        };
        reservation.status = new;
        Ok(true)
    }

    async fn mark_reminder_sent(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(reservation) = inner
            .reservations
            .iter_mut()
            .find(|r| r.id == id && !r.reminder_sent)
        else {
            return Ok(false);
        };
        reservation.reminder_sent = true;
        Ok(true)
    }
}
