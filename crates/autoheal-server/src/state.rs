use autoheal_core::dispatch::Dispatcher;
use std::sync::Arc;

/// Shared application state passed to all route handlers. The dispatcher
/// (and the registry inside it) is read-only for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}
