//! Assigns a hearing route to cases being made ready to list.

use serde_json::Value;

use crate::callback::{case_data, CallbackContext, CallbackPhase, CaseData, EventKind, HandlerResult};
use crate::constants::{events, fields};
use crate::registry::{CallbackHandler, DispatchPriority, HandlerError};

const ROUTE_PATH: [&str; 2] = [fields::SCHEDULING_AND_LISTING, fields::HEARING_ROUTE];

/// Fills `schedulingAndListingFields.hearingRoute` when the caseworker left it empty.
///
/// Runs first so later listing rules see the effective route.
#[derive(Debug, Clone)]
pub struct HearingRouteHandler {
    default_route: String,
}

impl HearingRouteHandler {
    pub const NAME: &'static str = "hearing_route";

    pub fn new(default_route: impl Into<String>) -> Self {
        Self {
            default_route: default_route.into(),
        }
    }
}

impl CallbackHandler for HearingRouteHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> DispatchPriority {
        DispatchPriority::Earliest
    }

    fn can_handle(&self, phase: CallbackPhase, event_kind: &EventKind, snapshot: &CaseData) -> bool {
        phase == CallbackPhase::AboutToSubmit
            && *event_kind == events::READY_TO_LIST
            && case_data::str_at(snapshot, &ROUTE_PATH).is_none()
    }

    fn handle(&self, context: &CallbackContext) -> Result<HandlerResult, HandlerError> {
        let mut data = context.current().clone();
        if case_data::str_at(&data, &ROUTE_PATH).is_none() {
            case_data::set_path(&mut data, &ROUTE_PATH, Value::String(self.default_route.clone()));
        }
        Ok(HandlerResult::new(data))
    }
}
