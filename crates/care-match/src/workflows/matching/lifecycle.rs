//! Shared Pending → Approved/Rejected lifecycle behind both request variants.
//!
//! A transition attempt on an already-terminal request settles as a no-op
//! success rather than an error, so a redundant review click stays
//! idempotent (see DESIGN.md for the rationale).

use chrono::{DateTime, Utc};

use super::domain::{
    ActorId, MatchingRequest, ProfileUpdateRequest, RejectReason, RequestStatus, Role,
};

/// Decision an authorized reviewer applies to a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject(Option<RejectReason>),
}

impl ReviewDecision {
    pub fn target_status(&self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject(_) => RequestStatus::Rejected,
        }
    }
}

/// Result of a legal transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status moved to the decision's target; side effects (binding,
    /// field commit) must be applied atomically with the status write.
    Applied(RequestStatus),
    /// The request was already terminal; nothing changes and no side effects
    /// or notifications fire.
    AlreadySettled,
}

/// Actor is not a legal reviewer for this request variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionForbidden;

/// Gate a matching-request transition. The addressed provider may approve or
/// reject; the originating guardian may only reject (cancel) their own
/// request. Anyone else is forbidden regardless of the request's state.
pub fn review_matching_request(
    actor_id: &ActorId,
    role: Role,
    request: &MatchingRequest,
    decision: &ReviewDecision,
) -> Result<TransitionOutcome, TransitionForbidden> {
    let permitted = match role {
        Role::Provider => request.provider_id == *actor_id,
        Role::Guardian => {
            request.guardian_id == *actor_id && matches!(decision, ReviewDecision::Reject(_))
        }
        Role::Staff | Role::Admin => false,
    };
    if !permitted {
        return Err(TransitionForbidden);
    }

    if request.status.is_terminal() {
        return Ok(TransitionOutcome::AlreadySettled);
    }
    Ok(TransitionOutcome::Applied(decision.target_status()))
}

/// Gate a profile-update-request transition; staff only.
pub fn review_profile_request(
    role: Role,
    request: &ProfileUpdateRequest,
    decision: &ReviewDecision,
) -> Result<TransitionOutcome, TransitionForbidden> {
    if role != Role::Staff {
        return Err(TransitionForbidden);
    }

    if request.status.is_terminal() {
        return Ok(TransitionOutcome::AlreadySettled);
    }
    Ok(TransitionOutcome::Applied(decision.target_status()))
}

/// Lifecycle view shared by both request variants, used by the
/// current-request precedence rule.
pub trait Reviewable {
    fn status(&self) -> RequestStatus;
    fn created_at(&self) -> DateTime<Utc>;
}

impl Reviewable for MatchingRequest {
    fn status(&self) -> RequestStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Reviewable for ProfileUpdateRequest {
    fn status(&self) -> RequestStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Pick "the current request" out of an actor's history: a pending request
/// always wins, regardless of timestamps; otherwise the most recently
/// created terminal request is surfaced.
pub fn current_request<T: Reviewable>(requests: &[T]) -> Option<&T> {
    if let Some(pending) = requests
        .iter()
        .find(|request| request.status() == RequestStatus::Pending)
    {
        return Some(pending);
    }

    requests
        .iter()
        .filter(|request| request.status().is_terminal())
        .max_by_key(|request| request.created_at())
}
