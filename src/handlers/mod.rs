pub mod common;
pub mod products;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<crate::services::products::ProductService>,
}

impl AppServices {
    /// Build the services container backing the HTTP layer
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let products = Arc::new(crate::services::products::ProductService::new(
            db_pool,
            event_sender,
        ));

        Self { products }
    }
}
