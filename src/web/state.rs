//! # Web Application State
//!
//! Shared handles cloned into every request.

use std::sync::Arc;

use crate::config::ConfigManager;
use crate::dispatch::Dispatcher;
use crate::hearings::VersionGuard;
use crate::messaging::InMemoryMessageQueue;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<ConfigManager>,
    pub dispatcher: Arc<Dispatcher>,
    pub guard: Arc<VersionGuard>,
    /// Local queue fed by `POST /hearings/messages`
    pub hearing_queue: Arc<InMemoryMessageQueue>,
}

impl AppState {
    pub fn new(
        config: Arc<ConfigManager>,
        dispatcher: Arc<Dispatcher>,
        guard: Arc<VersionGuard>,
        hearing_queue: Arc<InMemoryMessageQueue>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            guard,
            hearing_queue,
        }
    }
}
