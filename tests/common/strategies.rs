use proptest::prelude::*;

use tribunal_core::hearings::{CancellationReason, HmcStatus, ListingStatus};

pub fn hmc_status_strategy() -> impl Strategy<Value = HmcStatus> {
    prop_oneof![
        Just(HmcStatus::HearingRequested),
        Just(HmcStatus::AwaitingListing),
        Just(HmcStatus::Listed),
        Just(HmcStatus::UpdateRequested),
        Just(HmcStatus::UpdateSubmitted),
        Just(HmcStatus::Exception),
        Just(HmcStatus::CancellationRequested),
        Just(HmcStatus::CancellationSubmitted),
        Just(HmcStatus::Cancelled),
        Just(HmcStatus::AwaitingActuals),
        Just(HmcStatus::Completed),
        Just(HmcStatus::Adjourned),
        Just(HmcStatus::Closed),
    ]
}

pub fn listing_status_strategy() -> impl Strategy<Value = Option<ListingStatus>> {
    prop::option::of(prop_oneof![
        Just(ListingStatus::Draft),
        Just(ListingStatus::Provisional),
        Just(ListingStatus::Fixed),
        Just(ListingStatus::Cancelled),
    ])
}

pub fn cancellation_reasons_strategy() -> impl Strategy<Value = Vec<CancellationReason>> {
    prop::collection::vec(
        prop_oneof![
            Just("withdraw"),
            Just("struck"),
            Just("lapsed"),
            Just("notatt"),
            Just("listerr"),
        ]
        .prop_map(CancellationReason::new),
        0..3,
    )
}

/// (version, status, listing status, reasons) deliveries in arbitrary order, repeats allowed
pub fn delivery_sequence_strategy(
) -> impl Strategy<Value = Vec<(u64, HmcStatus, Option<ListingStatus>, Vec<CancellationReason>)>> {
    prop::collection::vec(
        (
            1u64..12,
            hmc_status_strategy(),
            listing_status_strategy(),
            cancellation_reasons_strategy(),
        ),
        1..16,
    )
}
