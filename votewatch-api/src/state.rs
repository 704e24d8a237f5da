//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use crate::service::VotesService;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VotesService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<VotesService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<VotesService>, service);
crate::impl_from_ref!(Instant, start_time);
