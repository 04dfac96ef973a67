//! # System Bootstrap
//!
//! Wires configuration, the handler registry, the dispatcher, the version
//! guard and the hearing ingestor into one [`TribunalSystem`], the same way
//! for the server binary, embedding applications and integration tests.

use axum::Router;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ConfigManager;
use crate::dispatch::Dispatcher;
use crate::error::{Result, TribunalError};
use crate::handlers;
use crate::hearings::{HearingStatusReconciler, MessageIngestor, VersionGuard};
use crate::logging::log_registry_operation;
use crate::messaging::{InMemoryMessageQueue, MessageSource};
use crate::registry::{HandlerRegistry, HandlerRegistryBuilder, RegistryError};
use crate::store::{CaseStore, InMemoryCaseStore};
use crate::web::{self, AppState};

pub const HEARING_QUEUE_NAME: &str = "hearing-updates";

/// Fully wired, not yet running system
pub struct TribunalSystem {
    pub config_manager: Arc<ConfigManager>,
    pub dispatcher: Arc<Dispatcher>,
    pub guard: Arc<VersionGuard>,
    pub store: Arc<dyn CaseStore>,
    pub hearing_queue: Arc<InMemoryMessageQueue>,
    pub ingestor: Arc<MessageIngestor>,
}

impl std::fmt::Debug for TribunalSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TribunalSystem")
            .field("environment", &self.config_manager.environment())
            .field("handlers", &self.dispatcher.registry().len())
            .finish_non_exhaustive()
    }
}

impl TribunalSystem {
    /// Bootstrap with the built-in handlers and an in-memory case store
    pub fn bootstrap(config_manager: Arc<ConfigManager>) -> Result<Self> {
        Self::bootstrap_with(config_manager, Arc::new(InMemoryCaseStore::new()), |_| Ok(()))
    }

    /// Bootstrap against a caller-supplied store, registering extra handlers
    /// after the built-in ones
    pub fn bootstrap_with<F>(
        config_manager: Arc<ConfigManager>,
        store: Arc<dyn CaseStore>,
        register_extra: F,
    ) -> Result<Self>
    where
        F: FnOnce(&mut HandlerRegistryBuilder) -> std::result::Result<(), RegistryError>,
    {
        let config = config_manager.config();

        let mut builder = HandlerRegistry::builder();
        handlers::register_builtin(&mut builder, &config.features)?;
        register_extra(&mut builder)?;
        let registry = Arc::new(builder.build());

        let stats = registry.stats();
        log_registry_operation(
            "bootstrap",
            None,
            None,
            "frozen",
            Some(&format!("{} handlers", stats.total_handlers)),
        );

        let guard = Arc::new(VersionGuard::new());
        let hearing_queue = Arc::new(InMemoryMessageQueue::new(
            HEARING_QUEUE_NAME,
            config.hearings.max_deliveries,
        ));
        let ingestor = Arc::new(MessageIngestor::new(
            HearingStatusReconciler::new(Arc::clone(&guard)),
            Arc::clone(&store),
            config.hearings.clone(),
        ));

        info!(
            environment = %config_manager.environment(),
            handlers = stats.total_handlers,
            service_code = %config.hearings.service_code,
            "Tribunal system bootstrapped"
        );

        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(registry)),
            config_manager,
            guard,
            store,
            hearing_queue,
            ingestor,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(
            Arc::clone(&self.config_manager),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.guard),
            Arc::clone(&self.hearing_queue),
        )
    }

    pub fn router(&self) -> Router {
        web::create_router(self.app_state())
    }

    /// Start consuming the local hearing queue
    pub fn start_ingestor(&self) -> IngestorHandle {
        let source: Arc<dyn MessageSource> = self.hearing_queue.clone();
        self.start_ingestor_from(source)
    }

    /// Start consuming an arbitrary message source
    pub fn start_ingestor_from(&self, source: Arc<dyn MessageSource>) -> IngestorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(Arc::clone(&self.ingestor).run(source, shutdown_rx));
        IngestorHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Running ingestor; dropping it without [`shutdown`](Self::shutdown) leaves the task running
#[derive(Debug)]
pub struct IngestorHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl IngestorHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal shutdown and wait for in-flight messages to settle
    pub async fn shutdown(mut self) -> Result<()> {
        let Some(task) = self.task.take() else {
            warn!("Hearing ingestor already stopped");
            return Ok(());
        };
        // Receiver gone means the loop already exited.
        let _ = self.shutdown.send(true);
        task.await
            .map_err(|e| TribunalError::Lifecycle(format!("ingestor task failed: {e}")))?;
        info!("Hearing ingestor shut down");
        Ok(())
    }
}
