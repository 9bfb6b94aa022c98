//! In-memory adapters for the library's ports, plus shared HTTP state.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use care_match::workflows::matching::{
    ActorId, CareBinding, DependentId, DependentProfile, MatchingRequest,
    MatchingRequestRepository, NotificationQueue, ProfileUpdateRequest,
    ProfileUpdateRequestRepository, ProviderDirectory, ProviderListing, QueueError,
    RealtimeChannel, RealtimeError, Recipient, RepositoryError, RequestId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Provider listings, dependents, and approved bindings behind a mutex.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDirectory {
    listings: Arc<Mutex<Vec<ProviderListing>>>,
    dependents: Arc<Mutex<HashMap<DependentId, DependentProfile>>>,
    bindings: Arc<Mutex<Vec<CareBinding>>>,
}

impl InMemoryDirectory {
    pub(crate) fn seed_listing(&self, listing: ProviderListing) {
        self.listings
            .lock()
            .expect("directory mutex poisoned")
            .push(listing);
    }

    pub(crate) fn seed_dependent(&self, dependent: DependentProfile) {
        self.dependents
            .lock()
            .expect("directory mutex poisoned")
            .insert(dependent.id.clone(), dependent);
    }

    pub(crate) fn bindings(&self) -> Vec<CareBinding> {
        self.bindings
            .lock()
            .expect("directory mutex poisoned")
            .clone()
    }
}

impl ProviderDirectory for InMemoryDirectory {
    fn listing_for(
        &self,
        provider_id: &ActorId,
    ) -> Result<Option<ProviderListing>, RepositoryError> {
        let guard = self.listings.lock().expect("directory mutex poisoned");
        Ok(guard
            .iter()
            .find(|listing| listing.provider_id == *provider_id)
            .cloned())
    }

    fn update_listing(&self, listing: ProviderListing) -> Result<(), RepositoryError> {
        let mut guard = self.listings.lock().expect("directory mutex poisoned");
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
        Ok(self
            .listings
            .lock()
            .expect("directory mutex poisoned")
            .clone())
    }

    fn dependent(&self, id: &DependentId) -> Result<Option<DependentProfile>, RepositoryError> {
        let guard = self.dependents.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn create_binding(&self, binding: CareBinding) -> Result<(), RepositoryError> {
        self.bindings
            .lock()
            .expect("directory mutex poisoned")
            .push(binding);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMatchingRequests {
    records: Arc<Mutex<Vec<MatchingRequest>>>,
}

impl MatchingRequestRepository for InMemoryMatchingRequests {
    fn create(&self, request: MatchingRequest) -> Result<MatchingRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn update(&self, request: MatchingRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == request.id) {
            Some(existing) => {
                *existing = request;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn get(&self, id: &RequestId) -> Result<Option<MatchingRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.iter().find(|request| request.id == *id).cloned())
    }

    fn for_guardian(&self, guardian_id: &ActorId) -> Result<Vec<MatchingRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
            .iter()
            .filter(|request| request.guardian_id == *guardian_id)
            .cloned()
            .collect())
    }

    fn for_provider(&self, provider_id: &ActorId) -> Result<Vec<MatchingRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
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
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRequests {
    records: Arc<Mutex<Vec<ProfileUpdateRequest>>>,
}

impl ProfileUpdateRequestRepository for InMemoryProfileRequests {
    fn create(
        &self,
        request: ProfileUpdateRequest,
    ) -> Result<ProfileUpdateRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn update(&self, request: ProfileUpdateRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == request.id) {
            Some(existing) => {
                *existing = request;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn get(&self, id: &RequestId) -> Result<Option<ProfileUpdateRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.iter().find(|request| request.id == *id).cloned())
    }

    fn for_provider(
        &self,
        provider_id: &ActorId,
    ) -> Result<Vec<ProfileUpdateRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
            .iter()
            .filter(|request| request.provider_id == *provider_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<ProfileUpdateRequest>, RepositoryError> {
        Ok(self.records.lock().expect("request mutex poisoned").clone())
    }
}

/// Stand-in for a websocket hub: logs the push instead of delivering it.
#[derive(Default, Clone)]
pub(crate) struct TracingRealtimeChannel;

impl RealtimeChannel for TracingRealtimeChannel {
    fn send_to_user(
        &self,
        recipient: &Recipient,
        payload: &serde_json::Value,
    ) -> Result<(), RealtimeError> {
        info!(?recipient, %payload, "realtime notification");
        Ok(())
    }
}

/// Queue adapter that records payloads in memory; the demo prints them and
/// tests assert on them.
#[derive(Default, Clone)]
pub(crate) struct MemoryQueue {
    payloads: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MemoryQueue {
    pub(crate) fn payloads(&self) -> Vec<serde_json::Value> {
        self.payloads.lock().expect("queue mutex poisoned").clone()
    }
}

impl NotificationQueue for MemoryQueue {
    fn enqueue(&self, payload: serde_json::Value) -> Result<(), QueueError> {
        self.payloads
            .lock()
            .expect("queue mutex poisoned")
            .push(payload);
        Ok(())
    }
}

/// Seed a handful of listings and one dependent so the service answers
/// searches out of the box in non-production environments.
pub(crate) fn seed_sample_data(directory: &InMemoryDirectory) {
    directory.seed_listing(ProviderListing {
        provider_id: ActorId("prov-001".to_string()),
        full_name: "Morningside Care Collective".to_string(),
        address: "401 W 118th St, New York".to_string(),
        review_score: 4.6,
        start_age: 3,
        end_age: 5,
        bio: Some("Small-group daytime care near Morningside Park.".to_string()),
    });
    directory.seed_listing(ProviderListing {
        provider_id: ActorId("prov-002".to_string()),
        full_name: "Harbor Kids".to_string(),
        address: "12 Pier Ave, Hoboken".to_string(),
        review_score: 4.1,
        start_age: 1,
        end_age: 8,
        bio: None,
    });
    directory.seed_listing(ProviderListing {
        provider_id: ActorId("prov-003".to_string()),
        full_name: "Lakeside Tutors".to_string(),
        address: "88 Shoreline Dr, Chicago".to_string(),
        review_score: 0.0,
        start_age: 6,
        end_age: 12,
        bio: None,
    });
    directory.seed_dependent(DependentProfile {
        id: DependentId("dep-100".to_string()),
        guardian_id: ActorId("guard-100".to_string()),
        display_name: "Sam".to_string(),
        birth_date: NaiveDate::from_ymd_opt(2022, 4, 9).expect("valid date"),
    });
    info!("seeded sample directory data");
}
