use std::sync::Arc;

use rrp_service::RatingPool;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<RatingPool>,
}

impl AppState {
    pub fn new(pool: RatingPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}
