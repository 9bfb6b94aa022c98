//! Provider matching and approval workflow: normalized provider search,
//! two reviewable-request lifecycles (guardian ↔ provider matching, provider
//! → staff profile updates), and post-commit notification fan-out.

pub(crate) mod auth;
pub mod domain;
pub(crate) mod guard;
pub(crate) mod lifecycle;
pub mod notify;
pub mod pagination;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, ActorId, CareBinding, DependentId, DependentProfile, EntityRef, FieldKey,
    MatchingRequest, MatchingRequestView, MessageKey, NotificationEvent, NotificationTemplate,
    ProfileUpdateRequest, ProfileUpdateRequestView, ProposedProfileChanges, ProviderListing,
    ProviderListingView, Recipient, RejectReason, RequestId, RequestStatus, Role,
};
pub use lifecycle::{current_request, ReviewDecision, Reviewable, TransitionOutcome};
pub use notify::{
    NotificationDispatcher, NotificationQueue, QueueError, RealtimeChannel, RealtimeError,
};
pub use pagination::{paginate, Page, PageRequest, RequestSort};
pub use repository::{
    Localizer, MatchingRequestRepository, ProfileUpdateRequestRepository, ProviderDirectory,
    RepositoryError, StaticLocalizer,
};
pub use router::{actor_from_headers, matching_router, Envelope};
pub use search::ProviderFilter;
pub use service::{
    MatchingService, NewMatchingRequest, ProfileRequestListQuery, ProviderSearchQuery,
    RequestListQuery, ServiceError,
};
