//! Duplicate checks evaluated before a new reviewable request is created.

use super::domain::{ActorId, DependentId, MatchingRequest, ProfileUpdateRequest, RequestStatus};

/// True when an equivalent matching request for the same
/// (guardian, provider, dependent) triple is still pending. Terminal requests
/// never block; re-submission after a rejection goes through a brand-new
/// request.
pub fn has_blocking_matching_request(
    existing: &[MatchingRequest],
    provider_id: &ActorId,
    dependent_id: &DependentId,
) -> bool {
    existing.iter().any(|request| {
        request.status == RequestStatus::Pending
            && request.provider_id == *provider_id
            && request.dependent_id == *dependent_id
    })
}

/// True when the provider already has a pending profile update request. A
/// provider holds at most one pending request at a time.
pub fn has_blocking_profile_request(existing: &[ProfileUpdateRequest]) -> bool {
    existing
        .iter()
        .any(|request| request.status == RequestStatus::Pending)
}
