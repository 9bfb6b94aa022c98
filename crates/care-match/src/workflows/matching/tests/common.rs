//! Shared fixtures and in-memory port implementations for the matching
//! workflow tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::config::MatchingConfig;
use crate::workflows::matching::domain::{
    Actor, ActorId, CareBinding, DependentId, DependentProfile, MatchingRequest,
    ProfileUpdateRequest, ProviderListing, Recipient, RequestId, RequestStatus, Role,
};
use crate::workflows::matching::notify::{
    NotificationDispatcher, NotificationQueue, QueueError, RealtimeChannel, RealtimeError,
};
use crate::workflows::matching::repository::{
    MatchingRequestRepository, ProfileUpdateRequestRepository, ProviderDirectory,
    RepositoryError, StaticLocalizer,
};
use crate::workflows::matching::service::MatchingService;

pub(super) fn guardian() -> Actor {
    Actor::new("guard-100", Role::Guardian)
}

pub(super) fn provider() -> Actor {
    Actor::new("prov-001", Role::Provider)
}

pub(super) fn staff() -> Actor {
    Actor::new("staff-1", Role::Staff)
}

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn listing(
    provider_id: &str,
    full_name: &str,
    address: &str,
    review_score: f32,
    start_age: u8,
    end_age: u8,
) -> ProviderListing {
    ProviderListing {
        provider_id: ActorId(provider_id.to_string()),
        full_name: full_name.to_string(),
        address: address.to_string(),
        review_score,
        start_age,
        end_age,
        bio: None,
    }
}

pub(super) fn dependent(id: &str, guardian_id: &str) -> DependentProfile {
    DependentProfile {
        id: DependentId(id.to_string()),
        guardian_id: ActorId(guardian_id.to_string()),
        display_name: "Sam".to_string(),
        birth_date: NaiveDate::from_ymd_opt(2022, 4, 9).expect("valid date"),
    }
}

pub(super) fn matching_request(
    id: &str,
    guardian_id: &str,
    provider_id: &str,
    dependent_id: &str,
    status: RequestStatus,
    created_at: DateTime<Utc>,
) -> MatchingRequest {
    MatchingRequest {
        id: RequestId(id.to_string()),
        guardian_id: ActorId(guardian_id.to_string()),
        provider_id: ActorId(provider_id.to_string()),
        dependent_id: DependentId(dependent_id.to_string()),
        status,
        reject_reason: None,
        created_at,
    }
}

pub(super) fn profile_request(
    id: &str,
    provider_id: &str,
    status: RequestStatus,
    created_at: DateTime<Utc>,
) -> ProfileUpdateRequest {
    ProfileUpdateRequest {
        id: RequestId(id.to_string()),
        provider_id: ActorId(provider_id.to_string()),
        proposed: crate::workflows::matching::domain::ProposedProfileChanges {
            address: Some("1 New Street".to_string()),
            ..Default::default()
        },
        status,
        created_at,
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    listings: Mutex<Vec<ProviderListing>>,
    dependents: Mutex<HashMap<DependentId, DependentProfile>>,
    bindings: Mutex<Vec<CareBinding>>,
    pub(super) fail_bindings: bool,
}

impl MemoryDirectory {
    pub(super) fn with_listing(self, listing: ProviderListing) -> Self {
        self.listings.lock().expect("mutex poisoned").push(listing);
        self
    }

    pub(super) fn with_dependent(self, dependent: DependentProfile) -> Self {
        self.dependents
            .lock()
            .expect("mutex poisoned")
            .insert(dependent.id.clone(), dependent);
        self
    }

    pub(super) fn bindings(&self) -> Vec<CareBinding> {
        self.bindings.lock().expect("mutex poisoned").clone()
    }

    pub(super) fn listing_snapshot(&self, provider_id: &str) -> Option<ProviderListing> {
        self.listings
            .lock()
            .expect("mutex poisoned")
            .iter()
            .find(|listing| listing.provider_id.0 == provider_id)
            .cloned()
    }
}

impl ProviderDirectory for MemoryDirectory {
    fn listing_for(
        &self,
        provider_id: &ActorId,
    ) -> Result<Option<ProviderListing>, RepositoryError> {
        Ok(self
            .listings
            .lock()
            .expect("mutex poisoned")
            .iter()
            .find(|listing| listing.provider_id == *provider_id)
            .cloned())
    }

    fn update_listing(&self, listing: ProviderListing) -> Result<(), RepositoryError> {
        let mut guard = self.listings.lock().expect("mutex poisoned");
        match guard
            .iter_mut()
            .find(|existing| existing.provider_id == listing.provider_id)
        {
            Some(existing) => {
                *existing = listing;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn listings(&self) -> Result<Vec<ProviderListing>, RepositoryError> {
        Ok(self.listings.lock().expect("mutex poisoned").clone())
    }

    fn dependent(&self, id: &DependentId) -> Result<Option<DependentProfile>, RepositoryError> {
        Ok(self
            .dependents
            .lock()
            .expect("mutex poisoned")
            .get(id)
            .cloned())
    }

    fn create_binding(&self, binding: CareBinding) -> Result<(), RepositoryError> {
        if self.fail_bindings {
            return Err(RepositoryError::Unavailable("binding store down".to_string()));
        }
        self.bindings.lock().expect("mutex poisoned").push(binding);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryMatchingRepo {
    records: Mutex<Vec<MatchingRequest>>,
}

impl MemoryMatchingRepo {
    pub(super) fn with_request(self, request: MatchingRequest) -> Self {
        self.records.lock().expect("mutex poisoned").push(request);
        self
    }

    pub(super) fn count(&self) -> usize {
        self.records.lock().expect("mutex poisoned").len()
    }

    pub(super) fn snapshot(&self, id: &str) -> Option<MatchingRequest> {
        self.records
            .lock()
            .expect("mutex poisoned")
            .iter()
            .find(|request| request.id.0 == id)
            .cloned()
    }
}

impl MatchingRequestRepository for MemoryMatchingRepo {
    fn create(&self, request: MatchingRequest) -> Result<MatchingRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("mutex poisoned");
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn update(&self, request: MatchingRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == request.id) {
            Some(existing) => {
                *existing = request;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn get(&self, id: &RequestId) -> Result<Option<MatchingRequest>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("mutex poisoned")
            .iter()
            .find(|request| request.id == *id)
            .cloned())
    }

    fn for_guardian(&self, guardian_id: &ActorId) -> Result<Vec<MatchingRequest>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|request| request.guardian_id == *guardian_id)
            .cloned()
            .collect())
    }

    fn for_provider(&self, provider_id: &ActorId) -> Result<Vec<MatchingRequest>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|request| request.provider_id == *provider_id)
            .cloned()
            .collect())
    }

    fn for_triple(
        &self,
        guardian_id: &ActorId,
        provider_id: &ActorId,
        dependent_id: &DependentId,
    ) -> Result<Vec<MatchingRequest>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|request| {
                request.guardian_id == *guardian_id
                    && request.provider_id == *provider_id
                    && request.dependent_id == *dependent_id
            })
            .cloned()
            .collect())
    }
}

/// Matching repository whose every call fails, for error-mapping tests.
pub(super) struct UnavailableMatchingRepo;

impl MatchingRequestRepository for UnavailableMatchingRepo {
    fn create(&self, _request: MatchingRequest) -> Result<MatchingRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn update(&self, _request: MatchingRequest) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn get(&self, _id: &RequestId) -> Result<Option<MatchingRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn for_guardian(
        &self,
        _guardian_id: &ActorId,
    ) -> Result<Vec<MatchingRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn for_provider(
        &self,
        _provider_id: &ActorId,
    ) -> Result<Vec<MatchingRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn for_triple(
        &self,
        _guardian_id: &ActorId,
        _provider_id: &ActorId,
        _dependent_id: &DependentId,
    ) -> Result<Vec<MatchingRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryProfileRepo {
    records: Mutex<Vec<ProfileUpdateRequest>>,
}

impl MemoryProfileRepo {
    pub(super) fn with_request(self, request: ProfileUpdateRequest) -> Self {
        self.records.lock().expect("mutex poisoned").push(request);
        self
    }

    pub(super) fn count(&self) -> usize {
        self.records.lock().expect("mutex poisoned").len()
    }
}

impl ProfileUpdateRequestRepository for MemoryProfileRepo {
    fn create(
        &self,
        request: ProfileUpdateRequest,
    ) -> Result<ProfileUpdateRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("mutex poisoned");
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn update(&self, request: ProfileUpdateRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == request.id) {
            Some(existing) => {
                *existing = request;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn get(&self, id: &RequestId) -> Result<Option<ProfileUpdateRequest>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("mutex poisoned")
            .iter()
            .find(|request| request.id == *id)
            .cloned())
    }

    fn for_provider(
        &self,
        provider_id: &ActorId,
    ) -> Result<Vec<ProfileUpdateRequest>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|request| request.provider_id == *provider_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<ProfileUpdateRequest>, RepositoryError> {
        Ok(self.records.lock().expect("mutex poisoned").clone())
    }
}

#[derive(Default)]
pub(super) struct MemoryRealtime {
    pub(super) fail: bool,
    sent: Mutex<Vec<(Recipient, serde_json::Value)>>,
}

impl MemoryRealtime {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn sent(&self) -> Vec<(Recipient, serde_json::Value)> {
        self.sent.lock().expect("mutex poisoned").clone()
    }
}

impl RealtimeChannel for MemoryRealtime {
    fn send_to_user(
        &self,
        recipient: &Recipient,
        payload: &serde_json::Value,
    ) -> Result<(), RealtimeError> {
        if self.fail {
            return Err(RealtimeError::NotConnected);
        }
        self.sent
            .lock()
            .expect("mutex poisoned")
            .push((recipient.clone(), payload.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryQueue {
    pub(super) fail: bool,
    payloads: Mutex<Vec<serde_json::Value>>,
}

impl MemoryQueue {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn payloads(&self) -> Vec<serde_json::Value> {
        self.payloads.lock().expect("mutex poisoned").clone()
    }
}

impl NotificationQueue for MemoryQueue {
    fn enqueue(&self, payload: serde_json::Value) -> Result<(), QueueError> {
        if self.fail {
            return Err(QueueError::Transport("queue down".to_string()));
        }
        self.payloads
            .lock()
            .expect("mutex poisoned")
            .push(payload);
        Ok(())
    }
}

pub(super) struct Harness {
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) matching: Arc<MemoryMatchingRepo>,
    pub(super) profiles: Arc<MemoryProfileRepo>,
    pub(super) realtime: Arc<MemoryRealtime>,
    pub(super) queue: Arc<MemoryQueue>,
    pub(super) service:
        MatchingService<MemoryDirectory, MemoryMatchingRepo, MemoryProfileRepo>,
}

/// Service wired to fresh in-memory ports, seeded with one provider and one
/// dependent belonging to the fixture guardian.
pub(super) fn harness() -> Harness {
    harness_with(
        MemoryDirectory::default()
            .with_listing(listing(
                "prov-001",
                "Morningside Care Collective",
                "401 W 118th St, New York",
                4.6,
                3,
                5,
            ))
            .with_dependent(dependent("dep-100", "guard-100")),
        MemoryMatchingRepo::default(),
        MemoryProfileRepo::default(),
    )
}

pub(super) fn harness_with(
    directory: MemoryDirectory,
    matching: MemoryMatchingRepo,
    profiles: MemoryProfileRepo,
) -> Harness {
    let directory = Arc::new(directory);
    let matching = Arc::new(matching);
    let profiles = Arc::new(profiles);
    let realtime = Arc::new(MemoryRealtime::default());
    let queue = Arc::new(MemoryQueue::default());

    let dispatcher = NotificationDispatcher::new(realtime.clone(), queue.clone());
    let service = MatchingService::new(
        directory.clone(),
        matching.clone(),
        profiles.clone(),
        dispatcher,
        Arc::new(StaticLocalizer),
        MatchingConfig::default(),
    );

    Harness {
        directory,
        matching,
        profiles,
        realtime,
        queue,
        service,
    }
}
