use std::sync::Arc;

use crate::clients::ClientStore;
use crate::mailer::Mailer;
use crate::store::EntityStore;

/// Shared application context, passed down instead of module-level store
/// handles so tests can substitute in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub clients: ClientStore,
    pub mailer: Arc<dyn Mailer>,
    /// How far ahead every barber's calendar is kept extended, in days.
    pub horizon_days: u32,
}
