//! Service composing the authorization gate, search filter, duplicate guard,
//! lifecycle rules, repositories, and the notification dispatcher.
//!
//! Every operation runs the same control flow: gate first, then either
//! filter + paginate (reads) or guard + lifecycle + persist + dispatch
//! (writes). Notification dispatch happens strictly after the persistence
//! write and its failure never surfaces to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::config::MatchingConfig;

use super::auth::{authorize, AccessDecision};
use super::domain::{
    Actor, ActorId, CareBinding, DependentId, EntityRef, FieldKey, MatchingRequest,
    MatchingRequestView, MessageKey, NotificationEvent, NotificationTemplate,
    ProfileUpdateRequest, ProfileUpdateRequestView, ProposedProfileChanges, ProviderListingView,
    Recipient, RequestId, RequestStatus, Role,
};
use super::guard::{has_blocking_matching_request, has_blocking_profile_request};
use super::lifecycle::{
    current_request, review_matching_request, review_profile_request, ReviewDecision,
    TransitionOutcome,
};
use super::notify::NotificationDispatcher;
use super::pagination::{
    order_matching_requests, order_profile_requests, paginate, Page, PageRequest, RequestSort,
};
use super::repository::{
    Localizer, MatchingRequestRepository, ProfileUpdateRequestRepository, ProviderDirectory,
    RepositoryError,
};
use super::search::ProviderFilter;

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("caller identity could not be resolved")]
    Unauthenticated,
    #[error("caller role does not permit this operation")]
    Forbidden,
    #[error("validation failed for {}", .0.label())]
    Validation(FieldKey),
    #[error("a pending {} already exists", .0.label())]
    Duplicate(FieldKey),
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Semantic key for the localized message shown to the caller. Repository
    /// failures collapse to a generic internal error; detail stays in logs.
    pub fn message_key(&self) -> MessageKey {
        match self {
            Self::Unauthenticated => MessageKey::Unauthorized,
            Self::Forbidden => MessageKey::Forbidden,
            Self::Validation(field) => MessageKey::BadRequest(*field),
            Self::Duplicate(field) => MessageKey::DataDuplicated(*field),
            Self::NotFound => MessageKey::NotFound,
            Self::Repository(_) => MessageKey::InternalServerError,
        }
    }
}

/// Inputs for a guardian's new matching request.
#[derive(Debug, Clone)]
pub struct NewMatchingRequest {
    pub provider_id: ActorId,
    pub dependent_id: DependentId,
}

/// Raw provider-search parameters; normalization happens in [`ProviderFilter`].
#[derive(Debug, Clone)]
pub struct ProviderSearchQuery {
    pub term: String,
    pub address_term: String,
    pub min_review_score: f32,
    pub age_from: Option<i32>,
    pub age_to: Option<i32>,
    pub page: PageRequest,
}

/// Parameters shared by the request list operations.
#[derive(Debug, Clone)]
pub struct RequestListQuery {
    pub status: Option<RequestStatus>,
    pub sort: RequestSort,
    pub descending: bool,
    pub page: PageRequest,
}

/// Staff listing of profile update requests, with an optional free-text
/// search over the submitting provider.
#[derive(Debug, Clone)]
pub struct ProfileRequestListQuery {
    pub search: String,
    pub status: Option<RequestStatus>,
    pub sort: RequestSort,
    pub descending: bool,
    pub page: PageRequest,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id(prefix: &str) -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("{prefix}-{id:06}"))
}

/// Facade implementing the matching and approval operations.
pub struct MatchingService<D, M, P> {
    directory: Arc<D>,
    matching: Arc<M>,
    profile_requests: Arc<P>,
    dispatcher: NotificationDispatcher,
    localizer: Arc<dyn Localizer>,
    config: MatchingConfig,
}

impl<D, M, P> MatchingService<D, M, P>
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    pub fn new(
        directory: Arc<D>,
        matching: Arc<M>,
        profile_requests: Arc<P>,
        dispatcher: NotificationDispatcher,
        localizer: Arc<dyn Localizer>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            directory,
            matching,
            profile_requests,
            dispatcher,
            localizer,
            config,
        }
    }

    /// Resolve a message key through the localization port.
    pub fn message(&self, key: &MessageKey) -> String {
        self.localizer.resolve(key)
    }

    fn gate(&self, actor: Option<&Actor>, required: &[Role]) -> Result<Actor, ServiceError> {
        match authorize(actor, required) {
            AccessDecision::Allowed { id, role } => Ok(Actor { id, role }),
            AccessDecision::Unauthenticated => Err(ServiceError::Unauthenticated),
            AccessDecision::Forbidden => Err(ServiceError::Forbidden),
        }
    }

    /// Search provider listings. Open to any authenticated actor.
    pub fn search_providers(
        &self,
        actor: Option<&Actor>,
        query: &ProviderSearchQuery,
    ) -> Result<Page<ProviderListingView>, ServiceError> {
        self.gate(actor, &[])?;

        let filter = ProviderFilter::build(
            &query.term,
            &query.address_term,
            query.min_review_score,
            query.age_from,
            query.age_to,
        );

        let mut listings = self.directory.listings()?;
        if !filter.is_unfiltered() {
            listings.retain(|listing| filter.matches(listing));
        }

        let page = paginate(listings, &query.page, self.config.provider_page_size);
        Ok(page.map(|listing| ProviderListingView::from_listing(&listing)))
    }

    /// Guardian requests a provider for one of their dependents.
    pub fn create_matching_request(
        &self,
        actor: Option<&Actor>,
        input: &NewMatchingRequest,
    ) -> Result<MatchingRequestView, ServiceError> {
        let guardian = self.gate(actor, &[Role::Guardian])?;

        let dependent = self
            .directory
            .dependent(&input.dependent_id)?
            .ok_or(ServiceError::Validation(FieldKey::Dependent))?;
        if dependent.guardian_id != guardian.id {
            return Err(ServiceError::Validation(FieldKey::Dependent));
        }

        if self.directory.listing_for(&input.provider_id)?.is_none() {
            return Err(ServiceError::Validation(FieldKey::Provider));
        }

        let existing =
            self.matching
                .for_triple(&guardian.id, &input.provider_id, &input.dependent_id)?;
        if has_blocking_matching_request(&existing, &input.provider_id, &input.dependent_id) {
            return Err(ServiceError::Duplicate(FieldKey::MatchingRequest));
        }

        let request = MatchingRequest {
            id: next_request_id("mr"),
            guardian_id: guardian.id,
            provider_id: input.provider_id.clone(),
            dependent_id: input.dependent_id.clone(),
            status: RequestStatus::Pending,
            reject_reason: None,
            created_at: Utc::now(),
        };
        let stored = self.matching.create(request)?;

        self.dispatcher.dispatch(NotificationEvent {
            recipient: Recipient::User(stored.provider_id.clone()),
            template: NotificationTemplate::MatchingRequestCreated,
            entity: EntityRef::MatchingRequest(stored.id.clone()),
        });

        Ok(MatchingRequestView::from_request(&stored))
    }

    /// Provider accepts/rejects a matching request addressed to them, or the
    /// originating guardian cancels it (a reject by the owner).
    pub fn review_matching_request(
        &self,
        actor: Option<&Actor>,
        request_id: &RequestId,
        decision: &ReviewDecision,
    ) -> Result<MatchingRequestView, ServiceError> {
        let reviewer = self.gate(actor, &[Role::Provider, Role::Guardian])?;

        let mut request = self.matching.get(request_id)?.ok_or(ServiceError::NotFound)?;

        let outcome = review_matching_request(&reviewer.id, reviewer.role, &request, decision)
            .map_err(|_| ServiceError::Forbidden)?;

        let new_status = match outcome {
            TransitionOutcome::AlreadySettled => {
                return Ok(MatchingRequestView::from_request(&request));
            }
            TransitionOutcome::Applied(status) => status,
        };

        // Approval materializes the binding before the status write; if the
        // binding cannot be created the transition is aborted. The two writes
        // are not transactional: a failed status write leaves the binding in
        // place against a still-pending request, and the retried approval adds
        // a second one. Acceptable until a transactional store backs the
        // directory port.
        if new_status == RequestStatus::Approved {
            self.directory.create_binding(CareBinding {
                guardian_id: request.guardian_id.clone(),
                provider_id: request.provider_id.clone(),
                dependent_id: request.dependent_id.clone(),
            })?;
        }

        request.status = new_status;
        if let ReviewDecision::Reject(reason) = decision {
            request.reject_reason = *reason;
        }
        self.matching.update(request.clone())?;

        let (recipient, template) = match reviewer.role {
            Role::Guardian => (
                Recipient::User(request.provider_id.clone()),
                NotificationTemplate::MatchingRequestCancelled,
            ),
            _ => (
                Recipient::User(request.guardian_id.clone()),
                match new_status {
                    RequestStatus::Approved => NotificationTemplate::MatchingRequestApproved,
                    _ => NotificationTemplate::MatchingRequestRejected,
                },
            ),
        };
        self.dispatcher.dispatch(NotificationEvent {
            recipient,
            template,
            entity: EntityRef::MatchingRequest(request.id.clone()),
        });

        Ok(MatchingRequestView::from_request(&request))
    }

    /// List the caller's matching requests: a guardian sees the ones they
    /// created, a provider the ones addressed to them.
    pub fn list_my_matching_requests(
        &self,
        actor: Option<&Actor>,
        query: &RequestListQuery,
    ) -> Result<Page<MatchingRequestView>, ServiceError> {
        let caller = self.gate(actor, &[Role::Guardian, Role::Provider])?;

        let mut requests = match caller.role {
            Role::Guardian => self.matching.for_guardian(&caller.id)?,
            _ => self.matching.for_provider(&caller.id)?,
        };
        if let Some(status) = query.status {
            requests.retain(|request| request.status == status);
        }
        order_matching_requests(&mut requests, query.sort, query.descending);

        let page = paginate(requests, &query.page, self.config.request_page_size);
        Ok(page.map(|request| MatchingRequestView::from_request(&request)))
    }

    /// Provider submits proposed changes to their published listing.
    pub fn create_profile_update_request(
        &self,
        actor: Option<&Actor>,
        proposed: ProposedProfileChanges,
    ) -> Result<ProfileUpdateRequestView, ServiceError> {
        let provider = self.gate(actor, &[Role::Provider])?;

        if proposed.is_empty() {
            return Err(ServiceError::Validation(FieldKey::ProfileUpdateRequest));
        }
        if self.directory.listing_for(&provider.id)?.is_none() {
            return Err(ServiceError::Validation(FieldKey::Provider));
        }

        let existing = self.profile_requests.for_provider(&provider.id)?;
        if has_blocking_profile_request(&existing) {
            return Err(ServiceError::Duplicate(FieldKey::ProfileUpdateRequest));
        }

        let request = ProfileUpdateRequest {
            id: next_request_id("pr"),
            provider_id: provider.id,
            proposed,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        let stored = self.profile_requests.create(request)?;

        self.dispatcher.dispatch(NotificationEvent {
            recipient: Recipient::StaffDesk,
            template: NotificationTemplate::ProfileUpdateSubmitted,
            entity: EntityRef::ProfileUpdateRequest(stored.id.clone()),
        });

        Ok(ProfileUpdateRequestView::from_request(&stored))
    }

    /// Staff approves or rejects a provider's profile update request.
    pub fn review_profile_update_request(
        &self,
        actor: Option<&Actor>,
        request_id: &RequestId,
        decision: &ReviewDecision,
    ) -> Result<ProfileUpdateRequestView, ServiceError> {
        let reviewer = self.gate(actor, &[Role::Staff])?;

        let mut request = self
            .profile_requests
            .get(request_id)?
            .ok_or(ServiceError::NotFound)?;

        let outcome = review_profile_request(reviewer.role, &request, decision)
            .map_err(|_| ServiceError::Forbidden)?;

        let new_status = match outcome {
            TransitionOutcome::AlreadySettled => {
                return Ok(ProfileUpdateRequestView::from_request(&request));
            }
            TransitionOutcome::Applied(status) => status,
        };

        // Approval commits the proposed fields onto the listing before the
        // status write; if the commit fails the transition is aborted. As with
        // matching approval, a failed status write after the commit leaves the
        // listing updated while the request stays pending; re-reviewing
        // re-applies the same fields, which is idempotent here.
        if new_status == RequestStatus::Approved {
            let mut listing = self
                .directory
                .listing_for(&request.provider_id)?
                .ok_or(RepositoryError::NotFound)
                .map_err(ServiceError::Repository)?;
            request.proposed.apply_to(&mut listing);
            self.directory.update_listing(listing)?;
        }

        request.status = new_status;
        self.profile_requests.update(request.clone())?;

        self.dispatcher.dispatch(NotificationEvent {
            recipient: Recipient::User(request.provider_id.clone()),
            template: match new_status {
                RequestStatus::Approved => NotificationTemplate::ProfileUpdateApproved,
                _ => NotificationTemplate::ProfileUpdateRejected,
            },
            entity: EntityRef::ProfileUpdateRequest(request.id.clone()),
        });

        Ok(ProfileUpdateRequestView::from_request(&request))
    }

    /// Staff list all profile update requests (optionally searched by the
    /// submitting provider's name); a provider lists their own history.
    pub fn list_profile_update_requests(
        &self,
        actor: Option<&Actor>,
        query: &ProfileRequestListQuery,
    ) -> Result<Page<ProfileUpdateRequestView>, ServiceError> {
        let caller = self.gate(actor, &[Role::Staff, Role::Provider])?;

        let mut requests = match caller.role {
            Role::Provider => self.profile_requests.for_provider(&caller.id)?,
            _ => self.profile_requests.all()?,
        };

        let term = query.search.trim().to_lowercase();
        if caller.role != Role::Provider && !term.is_empty() {
            let mut retained = Vec::with_capacity(requests.len());
            for request in requests {
                if self.provider_matches_term(&request.provider_id, &term)? {
                    retained.push(request);
                }
            }
            requests = retained;
        }

        if let Some(status) = query.status {
            requests.retain(|request| request.status == status);
        }
        order_profile_requests(&mut requests, query.sort, query.descending);

        let page = paginate(requests, &query.page, self.config.request_page_size);
        Ok(page.map(|request| ProfileUpdateRequestView::from_request(&request)))
    }

    /// The provider's "current request": pending first, else the most
    /// recently created terminal request.
    pub fn my_current_profile_request_status(
        &self,
        actor: Option<&Actor>,
    ) -> Result<ProfileUpdateRequestView, ServiceError> {
        let provider = self.gate(actor, &[Role::Provider])?;

        let requests = self.profile_requests.for_provider(&provider.id)?;
        let current = current_request(&requests).ok_or(ServiceError::NotFound)?;
        Ok(ProfileUpdateRequestView::from_request(current))
    }

    fn provider_matches_term(
        &self,
        provider_id: &ActorId,
        term: &str,
    ) -> Result<bool, ServiceError> {
        if provider_id.0.to_lowercase().contains(term) {
            return Ok(true);
        }
        let listing = self.directory.listing_for(provider_id)?;
        Ok(listing
            .map(|listing| listing.full_name.to_lowercase().contains(term))
            .unwrap_or(false))
    }
}
