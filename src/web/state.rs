// src/web/state.rs
// Web server state management

use std::sync::Arc;

use crate::orchestrator::Arena;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub arena: Arc<Arena>,
}

impl AppState {
    pub fn new(arena: Arc<Arena>) -> Self {
        Self { arena }
    }
}
