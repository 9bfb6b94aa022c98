use crate::workflows::matching::domain::{ActorId, DependentId, RequestStatus};
use crate::workflows::matching::guard::{
    has_blocking_matching_request, has_blocking_profile_request,
};

use super::common::{at, matching_request, profile_request};

#[test]
fn pending_request_for_same_triple_blocks() {
    let existing = vec![matching_request(
        "mr-1",
        "guard-100",
        "prov-001",
        "dep-100",
        RequestStatus::Pending,
        at(9),
    )];

    assert!(has_blocking_matching_request(
        &existing,
        &ActorId("prov-001".to_string()),
        &DependentId("dep-100".to_string()),
    ));
}

#[test]
fn terminal_requests_never_block_resubmission() {
    let existing = vec![
        matching_request(
            "mr-1",
            "guard-100",
            "prov-001",
            "dep-100",
            RequestStatus::Rejected,
            at(9),
        ),
        matching_request(
            "mr-2",
            "guard-100",
            "prov-001",
            "dep-100",
            RequestStatus::Approved,
            at(10),
        ),
    ];

    assert!(!has_blocking_matching_request(
        &existing,
        &ActorId("prov-001".to_string()),
        &DependentId("dep-100".to_string()),
    ));
}

#[test]
fn pending_request_for_a_different_dependent_does_not_block() {
    let existing = vec![matching_request(
        "mr-1",
        "guard-100",
        "prov-001",
        "dep-200",
        RequestStatus::Pending,
        at(9),
    )];

    assert!(!has_blocking_matching_request(
        &existing,
        &ActorId("prov-001".to_string()),
        &DependentId("dep-100".to_string()),
    ));
}

#[test]
fn any_pending_profile_request_blocks() {
    let pending = vec![profile_request("pr-1", "prov-001", RequestStatus::Pending, at(9))];
    assert!(has_blocking_profile_request(&pending));

    let settled = vec![
        profile_request("pr-1", "prov-001", RequestStatus::Approved, at(9)),
        profile_request("pr-2", "prov-001", RequestStatus::Rejected, at(10)),
    ];
    assert!(!has_blocking_profile_request(&settled));
}
