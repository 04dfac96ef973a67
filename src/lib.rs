#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tribunal Core
//!
//! Event-processing core of a tribunal case-management backend.
//!
//! ## Overview
//!
//! Two components carry the system's ordering and failure guarantees:
//!
//! - a **callback dispatch engine** that receives case-lifecycle callbacks from
//!   the case-data platform and runs the matching business handlers in a
//!   deterministic order, threading case data from one handler to the next
//! - a **hearing-status reconciler** that merges asynchronous, out-of-order,
//!   at-least-once hearing updates into case state behind a per-hearing
//!   version guard
//!
//! ## Module Organization
//!
//! - [`callback`] - Phase, context and result types for one callback
//! - [`registry`] - Handler contract and the frozen handler table
//! - [`dispatch`] - Ordered, panic-contained handler execution
//! - [`handlers`] - Built-in listing and adjournment handlers
//! - [`hearings`] - Version guard, reconciler and message ingestor
//! - [`store`] / [`messaging`] - Case store and queue boundaries
//! - [`web`] - Axum HTTP surface
//! - [`config`] / [`logging`] / [`error`] - Ambient infrastructure
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tribunal_core::bootstrap::TribunalSystem;
//! use tribunal_core::config::ConfigManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let system = TribunalSystem::bootstrap(ConfigManager::load()?)?;
//! let ingestor = system.start_ingestor();
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, system.router()).await?;
//! ingestor.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod callback;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod hearings;
pub mod logging;
pub mod messaging;
pub mod registry;
pub mod store;
pub mod web;

pub use bootstrap::{IngestorHandle, TribunalSystem};
pub use callback::{CallbackContext, CallbackPhase, CaseData, EventKind, HandlerResult};
pub use config::{ConfigManager, FeatureFlags, TribunalConfig};
pub use dispatch::{DispatchError, Dispatcher};
pub use error::{Result, TribunalError};
pub use hearings::{
    Admission, HearingState, HearingStatusReconciler, HearingUpdateMessage, MessageIngestor,
    Reconciliation, VersionGuard,
};
pub use registry::{CallbackHandler, DispatchPriority, HandlerRegistry};
