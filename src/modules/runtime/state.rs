//! Shared runtime application state (HTTP handlers)

use portfolio_core::RequestValidator;
use std::sync::Arc;

use crate::connectors::StoreManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreManager>,
    pub validator: Arc<RequestValidator>,
}

impl AppState {
    pub fn new(store: Arc<StoreManager>) -> Self {
        Self {
            store,
            validator: Arc::new(RequestValidator::new()),
        }
    }
}
