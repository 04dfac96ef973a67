use crate::callback::{case_data, CallbackContext, CallbackPhase, CaseData, EventKind, HandlerResult};
use crate::constants::{events, fields, hearing_routes, messages};
use crate::registry::{CallbackHandler, HandlerError};

/// Validates the hearing route before a case is sent for listing
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadyToListHandler;

impl ReadyToListHandler {
    pub const NAME: &'static str = "ready_to_list";
}

impl CallbackHandler for ReadyToListHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn can_handle(&self, phase: CallbackPhase, event_kind: &EventKind, _snapshot: &CaseData) -> bool {
        phase == CallbackPhase::AboutToSubmit && *event_kind == events::READY_TO_LIST
    }

    fn handle(&self, context: &CallbackContext) -> Result<HandlerResult, HandlerError> {
        let data = context.current();
        let route = case_data::str_at(data, &[fields::SCHEDULING_AND_LISTING, fields::HEARING_ROUTE]);
        let mut result = HandlerResult::new(data.clone());

        match route {
            None => result.add_error(messages::MISSING_HEARING_ROUTE),
            Some(hearing_routes::GAPS) if !context.ignore_warnings() => {
                result.add_warning(messages::GAPS_CASE_WARNING)
            }
            Some(_) => {}
        }
        Ok(result)
    }
}
