//! Issues a drafted adjournment notice.
//!
//! The event is always claimed. The adjournment feature flag only controls
//! whether the draft's transient fields are cleared once issued.

use crate::callback::{case_data, CallbackContext, CallbackPhase, CaseData, EventKind, HandlerResult};
use crate::config::FeatureFlags;
use crate::constants::{dwp_states, events, fields, messages};
use crate::registry::{CallbackHandler, HandlerError};

const PREVIEW_PATH: [&str; 2] = [fields::ADJOURNMENT, fields::ADJOURNMENT_PREVIEW_DOCUMENT];
const SIGNED_IN_USER_PATH: [&str; 2] = [fields::ADJOURNMENT, fields::ADJOURNMENT_SIGNED_IN_USER];

#[derive(Debug, Clone, Copy)]
pub struct IssueAdjournmentNoticeHandler {
    adjournment_enabled: bool,
}

impl IssueAdjournmentNoticeHandler {
    pub const NAME: &'static str = "issue_adjournment_notice";

    pub fn new(features: &FeatureFlags) -> Self {
        Self {
            adjournment_enabled: features.adjournment_enabled,
        }
    }
}

impl Default for IssueAdjournmentNoticeHandler {
    fn default() -> Self {
        Self::new(&FeatureFlags::default())
    }
}

impl CallbackHandler for IssueAdjournmentNoticeHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn can_handle(&self, phase: CallbackPhase, event_kind: &EventKind, _snapshot: &CaseData) -> bool {
        phase == CallbackPhase::AboutToSubmit && *event_kind == events::ISSUE_ADJOURNMENT_NOTICE
    }

    fn handle(&self, context: &CallbackContext) -> Result<HandlerResult, HandlerError> {
        let mut data = context.current().clone();

        if case_data::get_path(&data, &PREVIEW_PATH).map_or(true, |doc| doc.is_null()) {
            return Ok(HandlerResult::new(data).with_error(messages::MISSING_ADJOURNMENT_DRAFT));
        }

        case_data::set_path(
            &mut data,
            &[fields::DWP_STATE],
            serde_json::Value::String(dwp_states::ADJOURNMENT_NOTICE_ISSUED.to_string()),
        );
        if self.adjournment_enabled {
            case_data::remove_path(&mut data, &PREVIEW_PATH);
            case_data::remove_path(&mut data, &SIGNED_IN_USER_PATH);
        }

        Ok(HandlerResult::new(data))
    }
}
