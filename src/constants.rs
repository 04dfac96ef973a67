//! # System Constants
//!
//! Wire-level names shared between the callback surface, the built-in
//! handlers and the hearing reconciler. Case-data field names follow the
//! camelCase vocabulary of the case-data platform.

/// Callback endpoint paths, one per lifecycle phase
pub mod endpoints {
    pub const ABOUT_TO_START: &str = "/ccdAboutToStart";
    pub const MID_EVENT: &str = "/ccdMidEvent";
    pub const ABOUT_TO_SUBMIT: &str = "/ccdAboutToSubmit";
    pub const SUBMITTED: &str = "/ccdSubmittedEvent";

    pub const HEALTH: &str = "/health";
    pub const HEARING_MESSAGES: &str = "/hearings/messages";
}

/// Inbound HTTP header names
pub mod headers {
    pub const SERVICE_AUTHORIZATION: &str = "ServiceAuthorization";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const DEPLOYMENT_ID: &str = "hmctsDeploymentId";
}

/// Message property names carried alongside hearing-update bodies
pub mod message_properties {
    pub const DEPLOYMENT_ID: &str = "hmctsDeploymentId";
}

/// Case event identifiers used by handlers and reconciliation mutations
pub mod events {
    pub const READY_TO_LIST: &str = "readyToList";
    pub const ISSUE_ADJOURNMENT_NOTICE: &str = "issueAdjournmentNotice";

    pub const HEARING_BOOKED: &str = "hearingBooked";
    pub const UPDATE_CASE_ONLY: &str = "updateCaseOnly";
    pub const DORMANT: &str = "dormant";
    pub const LISTING_ERROR: &str = "listingError";
}

/// Case-data field names
pub mod fields {
    pub const HEARINGS: &str = "hearings";
    pub const DWP_STATE: &str = "dwpState";
    pub const WORK_BASKET: &str = "workBasketFields";
    pub const WORK_BASKET_HEARING_DATE: &str = "hearingDate";
    pub const WORK_BASKET_HEARING_DATE_ISSUED: &str = "hearingDateIssued";
    pub const WORK_BASKET_HEARING_EPIMS_ID: &str = "hearingEpimsId";

    pub const SCHEDULING_AND_LISTING: &str = "schedulingAndListingFields";
    pub const HEARING_ROUTE: &str = "hearingRoute";
    pub const IGNORE_CALLBACK_WARNINGS: &str = "ignoreCallbackWarnings";

    pub const ADJOURNMENT: &str = "adjournment";
    pub const ADJOURNMENT_PREVIEW_DOCUMENT: &str = "previewDocument";
    pub const ADJOURNMENT_SIGNED_IN_USER: &str = "signedInUser";
}

/// Values written into `dwpState`
pub mod dwp_states {
    pub const HEARING_DATE_ISSUED: &str = "hearingDateIssued";
    pub const ADJOURNMENT_NOTICE_ISSUED: &str = "adjournmentNoticeIssued";
}

/// Case states the reconciler may move a case into
pub mod case_states {
    pub const DORMANT_APPEAL: &str = "dormantAppealState";
    pub const LISTING_ERROR: &str = "listingError";
}

/// Hearing routes understood by the listing handlers
pub mod hearing_routes {
    pub const LIST_ASSIST: &str = "listAssist";
    pub const GAPS: &str = "gaps";
}

/// Warning and error codes surfaced to caseworkers
pub mod messages {
    pub const GAPS_CASE_WARNING: &str = "GAPS_CASE_WARNING";
    pub const MISSING_HEARING_ROUTE: &str = "Hearing route must be set before the case can be listed";
    pub const MISSING_ADJOURNMENT_DRAFT: &str =
        "There is no Draft Adjournment Notice on the case so adjournment cannot be issued";
}

/// Cancellation reason codes that send a case dormant
pub const DORMANT_CANCELLATION_REASONS: &[&str] = &["withdraw", "struck", "lapsed"];

/// Format used for the work-basket `hearingDateIssued` field
pub const HEARING_DATE_ISSUED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats for listing fields written to a hearing entry, all in UK local time
pub const HEARING_START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
pub const HEARING_DATE_FORMAT: &str = "%Y-%m-%d";
pub const HEARING_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Case-data value meaning "yes" in platform flags
pub const YES: &str = "Yes";

pub const DEFAULT_SERVICE_CODE: &str = "BBA3";
