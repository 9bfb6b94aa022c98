//! Entities, enums, and view mappings shared by the matching workflow.
//!
//! Every user-facing string goes through a [`MessageKey`](crate::workflows::matching::domain::MessageKey)
//! resolved by the localization port; role names, statuses, and message keys
//! are closed enums rather than free strings so illegal states cannot be
//! constructed at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for any authenticated actor (guardian, provider, staff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Identifier wrapper for dependent profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependentId(pub String);

/// Identifier wrapper for reviewable requests of either variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Primary role carried by an actor's token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guardian,
    Provider,
    Staff,
    Admin,
}

impl Role {
    /// Parse a claim value into a role. Unknown values yield `None`; the
    /// boundary treats that caller as unauthenticated.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "guardian" => Some(Self::Guardian),
            "provider" => Some(Self::Provider),
            "staff" => Some(Self::Staff),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Guardian => "guardian",
            Self::Provider => "provider",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

/// Identity resolved from already-verified token claims, passed explicitly
/// into every operation. No ambient "current user" exists anywhere in the
/// workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId(id.into()),
            role,
        }
    }
}

/// Published provider listing searched by guardians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderListing {
    pub provider_id: ActorId,
    pub full_name: String,
    pub address: String,
    /// Aggregate review score; 0.0 means "not yet reviewed".
    pub review_score: f32,
    /// Youngest age the provider serves, in years.
    pub start_age: u8,
    /// Oldest age the provider serves, in years.
    pub end_age: u8,
    pub bio: Option<String>,
}

/// Dependent profile owned by a guardian and referenced by matching requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentProfile {
    pub id: DependentId,
    pub guardian_id: ActorId,
    pub display_name: String,
    pub birth_date: chrono::NaiveDate,
}

/// Shared lifecycle states for both reviewable request variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Parse a status filter value. Unknown values yield `None`, which list
    /// operations treat as "no status filter".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Reason a provider attaches when rejecting a matching request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    ScheduleConflict,
    CapacityFull,
    OutOfServiceArea,
    Other,
}

/// Guardian-initiated request to match a dependent with a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingRequest {
    pub id: RequestId,
    pub guardian_id: ActorId,
    pub provider_id: ActorId,
    pub dependent_id: DependentId,
    pub status: RequestStatus,
    pub reject_reason: Option<RejectReason>,
    pub created_at: DateTime<Utc>,
}

/// Field changes a provider proposes for their own listing. Only the `Some`
/// fields are committed when staff approve the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposedProfileChanges {
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub start_age: Option<u8>,
    pub end_age: Option<u8>,
    pub bio: Option<String>,
}

impl ProposedProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.address.is_none()
            && self.start_age.is_none()
            && self.end_age.is_none()
            && self.bio.is_none()
    }

    /// Commit the proposed values onto a listing, leaving untouched fields as
    /// they were.
    pub fn apply_to(&self, listing: &mut ProviderListing) {
        if let Some(full_name) = &self.full_name {
            listing.full_name = full_name.clone();
        }
        if let Some(address) = &self.address {
            listing.address = address.clone();
        }
        if let Some(start_age) = self.start_age {
            listing.start_age = start_age;
        }
        if let Some(end_age) = self.end_age {
            listing.end_age = end_age;
        }
        if let Some(bio) = &self.bio {
            listing.bio = Some(bio.clone());
        }
    }
}

/// Provider-initiated request to change their published listing, reviewed by
/// staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub id: RequestId,
    pub provider_id: ActorId,
    pub proposed: ProposedProfileChanges,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Binding materialized when a matching request is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareBinding {
    pub guardian_id: ActorId,
    pub provider_id: ActorId,
    pub dependent_id: DependentId,
}

/// Field referenced by validation and duplicate error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    MatchingRequest,
    ProfileUpdateRequest,
    Provider,
    Dependent,
    AgeRange,
    PageNumber,
}

impl FieldKey {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MatchingRequest => "matching request",
            Self::ProfileUpdateRequest => "profile update request",
            Self::Provider => "provider",
            Self::Dependent => "dependent",
            Self::AgeRange => "age range",
            Self::PageNumber => "page number",
        }
    }
}

/// Semantic message keys handed to the localization port. The core never
/// emits literal user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Unauthorized,
    Forbidden,
    NotFound,
    BadRequest(FieldKey),
    DataDuplicated(FieldKey),
    InternalServerError,
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Recipient {
    User(ActorId),
    /// Shared staff review desk; fan-out to individual reviewers happens on
    /// the consumer side of the queue.
    StaffDesk,
}

/// Template key the notification consumer renders into a localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    MatchingRequestCreated,
    MatchingRequestApproved,
    MatchingRequestRejected,
    MatchingRequestCancelled,
    ProfileUpdateSubmitted,
    ProfileUpdateApproved,
    ProfileUpdateRejected,
}

/// Reference to the entity that triggered a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "entity", content = "id")]
pub enum EntityRef {
    MatchingRequest(RequestId),
    ProfileUpdateRequest(RequestId),
}

/// Ephemeral event emitted after a committed creation or transition. Not
/// persisted by this core; handed to the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient: Recipient,
    pub template: NotificationTemplate,
    pub entity: EntityRef,
}

/// Sanitized listing representation for search responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderListingView {
    pub provider_id: ActorId,
    pub full_name: String,
    pub address: String,
    pub review_score: f32,
    pub start_age: u8,
    pub end_age: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProviderListingView {
    pub fn from_listing(listing: &ProviderListing) -> Self {
        Self {
            provider_id: listing.provider_id.clone(),
            full_name: listing.full_name.clone(),
            address: listing.address.clone(),
            review_score: listing.review_score,
            start_age: listing.start_age,
            end_age: listing.end_age,
            bio: listing.bio.clone(),
        }
    }
}

/// Matching request representation for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchingRequestView {
    pub id: RequestId,
    pub guardian_id: ActorId,
    pub provider_id: ActorId,
    pub dependent_id: DependentId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<RejectReason>,
    pub created_at: DateTime<Utc>,
}

impl MatchingRequestView {
    pub fn from_request(request: &MatchingRequest) -> Self {
        Self {
            id: request.id.clone(),
            guardian_id: request.guardian_id.clone(),
            provider_id: request.provider_id.clone(),
            dependent_id: request.dependent_id.clone(),
            status: request.status.label(),
            reject_reason: request.reject_reason,
            created_at: request.created_at,
        }
    }
}

/// Profile update request representation for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdateRequestView {
    pub id: RequestId,
    pub provider_id: ActorId,
    pub proposed: ProposedProfileChanges,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

impl ProfileUpdateRequestView {
    pub fn from_request(request: &ProfileUpdateRequest) -> Self {
        Self {
            id: request.id.clone(),
            provider_id: request.provider_id.clone(),
            proposed: request.proposed.clone(),
            status: request.status.label(),
            created_at: request.created_at,
        }
    }
}
