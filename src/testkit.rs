use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;

use crate::availability;
use crate::clients::ClientStore;
use crate::mailer::{MailError, Mailer};
use crate::models::{new_id, Barber, ContactInfo, Service, SlotStatus};
use crate::reservations::BookingRequest;
use crate::state::AppState;
use crate::store::{EntityStore, MemoryStore};

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub async fn client_store() -> ClientStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::db::run_migrations(&pool).await.unwrap();
    ClientStore::new(pool)
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail transport fake that records every send and can be told to fail for
/// specific recipients.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.to.clone()).collect()
    }

    pub fn fail_for(&self, to: &str) {
        self.failing.lock().unwrap().insert(to.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.failing.lock().unwrap().contains(to) {
            return Err(MailError::NotConfigured);
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// A fully wired in-memory application: one barber with a seeded calendar
/// around 2024-06-10, one service, an empty client table, a recording
/// mailer.
pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub barber_id: String,
    pub service_id: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());

        let barber = Barber {
            id: new_id(),
            name: "Marco".to_string(),
            username: "marco".to_string(),
            password: "secret".to_string(),
            specialty: "fades".to_string(),
            slots: Vec::new(),
        };
        store.insert_barber(&barber).await.unwrap();
        availability::extend_calendar(store.as_ref(), &barber.id, date("2024-06-10"), 7)
            .await
            .unwrap();

        let service = Service {
            id: new_id(),
            name: "Signature Cut".to_string(),
            price: 25.0,
            duration_minutes: 45,
            owner_id: None,
        };
        store.insert_service(&service).await.unwrap();

        let state = AppState {
            store: store.clone(),
            clients: client_store().await,
            mailer: mailer.clone(),
            horizon_days: 7,
        };

        Self {
            state,
            mailer,
            barber_id: barber.id,
            service_id: service.id,
        }
    }

    pub async fn slot_status(&self, day: &str, time: &str) -> SlotStatus {
        let barber = self
            .state
            .store
            .get_barber(&self.barber_id)
            .await
            .unwrap()
            .unwrap();
        barber
            .slots
            .iter()
            .find(|s| s.date == date(day) && s.time == time)
            .unwrap()
            .status
    }
}

pub fn booking(app: &TestApp, day: &str, time: &str, email: &str) -> BookingRequest {
    BookingRequest {
        barber_id: app.barber_id.clone(),
        service_id: app.service_id.clone(),
        date: date(day),
        time: time.to_string(),
        contact: ContactInfo {
            name: Some(format!("Client {email}")),
            email: Some(email.to_string()),
            phone: Some("555-0100".to_string()),
            address: None,
        },
    }
}
