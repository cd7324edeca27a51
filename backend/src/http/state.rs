//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::ArticleUsecase;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Article usecase backing every `/articles` route
    pub articles: Arc<dyn ArticleUsecase>,
}

impl AppState {
    /// Create a new application state with the given usecase.
    pub fn new(articles: Arc<dyn ArticleUsecase>) -> Self {
        Self { articles }
    }
}
