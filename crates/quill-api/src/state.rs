use std::sync::Arc;

use quill_core::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
}

impl AppState {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }
}
