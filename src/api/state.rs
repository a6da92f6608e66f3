use std::sync::Arc;

use crate::services::{ItemPool, RecommendationEngine, UserStore};

/// Shared application state
///
/// Built once by the composition root. The pool handle is the same one the
/// engine and the startup initializer hold.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub pool: Arc<ItemPool>,
    pub users: Arc<UserStore>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, pool: Arc<ItemPool>) -> Self {
        Self {
            engine: Arc::new(engine),
            pool,
            users: Arc::new(UserStore::new()),
        }
    }
}
