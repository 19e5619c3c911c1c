use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::{Client, Collection};

use crate::models::{
    Barber, Owner, Product, Reservation, ReservationStatus, Service, Slot, SlotStatus,
};

use super::{EntityStore, StoreError};

pub struct MongoStore {
    barbers: Collection<Barber>,
    services: Collection<Service>,
    products: Collection<Product>,
    owners: Collection<Owner>,
    reservations: Collection<Reservation>,
}

impl MongoStore {
    pub async fn connect(url: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;
        let db = client.database(db_name);
        Ok(Self {
            barbers: db.collection("barbers"),
            services: db.collection("services"),
            products: db.collection("products"),
            owners: db.collection("owners"),
            reservations: db.collection("reservations"),
        })
    }
}

fn status_list(statuses: &[ReservationStatus]) -> Vec<&'static str> {
    statuses.iter().map(|s| s.as_str()).collect()
}

#[async_trait]
impl EntityStore for MongoStore {
    async fn list_barbers(&self) -> Result<Vec<Barber>, StoreError> {
        Ok(self.barbers.find(doc! {}).await?.try_collect().await?)
    }

    async fn get_barber(&self, id: &str) -> Result<Option<Barber>, StoreError> {
        Ok(self.barbers.find_one(doc! { "id": id }).await?)
    }

    async fn insert_barber(&self, barber: &Barber) -> Result<(), StoreError> {
        self.barbers.insert_one(barber).await?;
        Ok(())
    }

    async fn delete_barber(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.barbers.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count == 1)
    }

    async fn append_slots(
        &self,
        barber_id: &str,
        date: NaiveDate,
        slots: &[Slot],
    ) -> Result<bool, StoreError> {
        // The date guard in the filter makes repeated generation runs
        // idempotent: the push only matches a calendar without that date.
        let filter = doc! {
            "id": barber_id,
            "slots.date": { "$ne": date.to_string() },
        };
        let update = doc! { "$push": { "slots": { "$each": to_bson(slots)? } } };
        let result = self.barbers.update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }

    async fn set_slot_status(
        &self,
        barber_id: &str,
        date: NaiveDate,
        time: &str,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<bool, StoreError> {
        // $elemMatch plus the positional operator mutate exactly the one
        // element that matched, and only if its status is still `expected`.
        let filter = doc! {
            "id": barber_id,
            "slots": { "$elemMatch": {
                "date": date.to_string(),
                "time": time,
                "status": expected.as_str(),
            } },
        };
        let update = doc! { "$set": { "slots.$.status": new.as_str() } };
        let result = self.barbers.update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }

    async fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        Ok(self.services.find(doc! {}).await?.try_collect().await?)
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, StoreError> {
        Ok(self.services.find_one(doc! { "id": id }).await?)
    }

    async fn insert_service(&self, service: &Service) -> Result<(), StoreError> {
        self.services.insert_one(service).await?;
        Ok(())
    }

    async fn delete_service(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.services.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count == 1)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.find(doc! {}).await?.try_collect().await?)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.products.insert_one(product).await?;
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.products.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count == 1)
    }

    async fn find_owner(&self, username: &str) -> Result<Option<Owner>, StoreError> {
        Ok(self.owners.find_one(doc! { "username": username }).await?)
    }

    async fn insert_owner(&self, owner: &Owner) -> Result<(), StoreError> {
        self.owners.insert_one(owner).await?;
        Ok(())
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), StoreError> {
        self.reservations.insert_one(reservation).await?;
        Ok(())
    }

    async fn get_reservation(&self, id: &str) -> Result<Option<Reservation>, StoreError> {
        Ok(self.reservations.find_one(doc! { "id": id }).await?)
    }

    async fn reservations_by_status(
        &self,
        status: ReservationStatus,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .reservations
            .find(doc! { "status": status.as_str() })
            .await?
            .try_collect()
            .await?)
    }

    async fn barber_reservations(
        &self,
        barber_id: &str,
        statuses: &[ReservationStatus],
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .reservations
            .find(doc! {
                "barber_id": barber_id,
                "status": { "$in": status_list(statuses) },
            })
            .sort(doc! { "date": 1, "time": 1 })
            .await?
            .try_collect()
            .await?)
    }

    async fn due_reminders(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .reservations
            .find(doc! {
                "date": date.to_string(),
                "status": { "$in": ["pending", "confirmed"] },
                "reminder_sent": false,
            })
            .await?
            .try_collect()
            .await?)
    }

    async fn set_reservation_status(
        &self,
        id: &str,
        expected: ReservationStatus,
        new: ReservationStatus,
    ) -> Result<bool, StoreError> {
        let filter = doc! { "id": id, "status": expected.as_str() };
        let update = doc! { "$set": { "status": new.as_str() } };
        let result = self.reservations.update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }

    async fn mark_reminder_sent(&self, id: &str) -> Result<bool, StoreError> {
        let filter = doc! { "id": id, "reminder_sent": false };
        let update = doc! { "$set": { "reminder_sent": true } };
        let result = self.reservations.update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }
}
