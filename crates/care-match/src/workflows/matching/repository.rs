//! Persistence and localization ports.
//!
//! Storage abstractions so the service module can be exercised in isolation;
//! adapters live with the binary (`services/api`) and in the test suites.

use super::domain::{
    ActorId, CareBinding, DependentId, DependentProfile, MatchingRequest, MessageKey,
    ProfileUpdateRequest, ProviderListing, RequestId,
};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Provider listings, dependent profiles, and approved-care bindings. Grouped
/// as one directory port because all three are reference data for the two
/// request workflows.
pub trait ProviderDirectory: Send + Sync {
    fn listing_for(&self, provider_id: &ActorId)
        -> Result<Option<ProviderListing>, RepositoryError>;
    fn update_listing(&self, listing: ProviderListing) -> Result<(), RepositoryError>;
    /// Full listing set; the in-memory adapter evaluates search predicates
    /// over this, a database adapter would push the filter down instead.
    fn listings(&self) -> Result<Vec<ProviderListing>, RepositoryError>;
    fn dependent(&self, id: &DependentId) -> Result<Option<DependentProfile>, RepositoryError>;
    fn create_binding(&self, binding: CareBinding) -> Result<(), RepositoryError>;
}

/// Matching-request store.
pub trait MatchingRequestRepository: Send + Sync {
    fn create(&self, request: MatchingRequest) -> Result<MatchingRequest, RepositoryError>;
    fn update(&self, request: MatchingRequest) -> Result<(), RepositoryError>;
    fn get(&self, id: &RequestId) -> Result<Option<MatchingRequest>, RepositoryError>;
    fn for_guardian(&self, guardian_id: &ActorId)
        -> Result<Vec<MatchingRequest>, RepositoryError>;
    fn for_provider(&self, provider_id: &ActorId)
        -> Result<Vec<MatchingRequest>, RepositoryError>;
    /// History for one (guardian, provider, dependent) triple, used by the
    /// duplicate guard.
    fn for_triple(
        &self,
        guardian_id: &ActorId,
        provider_id: &ActorId,
        dependent_id: &DependentId,
    ) -> Result<Vec<MatchingRequest>, RepositoryError>;
}

/// Profile-update-request store.
pub trait ProfileUpdateRequestRepository: Send + Sync {
    fn create(&self, request: ProfileUpdateRequest)
        -> Result<ProfileUpdateRequest, RepositoryError>;
    fn update(&self, request: ProfileUpdateRequest) -> Result<(), RepositoryError>;
    fn get(&self, id: &RequestId) -> Result<Option<ProfileUpdateRequest>, RepositoryError>;
    fn for_provider(
        &self,
        provider_id: &ActorId,
    ) -> Result<Vec<ProfileUpdateRequest>, RepositoryError>;
    fn all(&self) -> Result<Vec<ProfileUpdateRequest>, RepositoryError>;
}

/// Localized string lookup for user-facing messages. The core passes
/// semantic keys, never literal text.
pub trait Localizer: Send + Sync {
    fn resolve(&self, key: &MessageKey) -> String;
}

/// English fallback table used when no localization backend is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticLocalizer;

impl Localizer for StaticLocalizer {
    fn resolve(&self, key: &MessageKey) -> String {
        match key {
            MessageKey::Unauthorized => "sign in to continue".to_string(),
            MessageKey::Forbidden => "you are not allowed to perform this action".to_string(),
            MessageKey::NotFound => "the requested record was not found".to_string(),
            MessageKey::BadRequest(field) => format!("invalid {}", field.label()),
            MessageKey::DataDuplicated(field) => {
                format!("a pending {} already exists", field.label())
            }
            MessageKey::InternalServerError => {
                "something went wrong, please try again later".to_string()
            }
        }
    }
}
