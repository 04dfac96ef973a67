//! # Built-in Callback Handlers
//!
//! Listing and adjournment rules shipped with the service. Further handlers
//! are registered by embedding applications through the same
//! [`HandlerRegistryBuilder`].

pub mod hearing_route;
pub mod issue_adjournment;
pub mod ready_to_list;

pub use hearing_route::HearingRouteHandler;
pub use issue_adjournment::IssueAdjournmentNoticeHandler;
pub use ready_to_list::ReadyToListHandler;

use crate::config::FeatureFlags;
use crate::registry::{HandlerRegistryBuilder, RegistryError};

/// Register the built-in handlers, configured by `features`
pub fn register_builtin(
    builder: &mut HandlerRegistryBuilder,
    features: &FeatureFlags,
) -> Result<(), RegistryError> {
    builder
        .register(HearingRouteHandler::new(features.effective_default_route()))?
        .register(ReadyToListHandler)?
        .register(IssueAdjournmentNoticeHandler::new(features))?;
    Ok(())
}
