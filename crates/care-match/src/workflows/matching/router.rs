//! HTTP boundary: route wiring, actor resolution, and the uniform response
//! envelope. Token verification happens upstream; this layer trusts the
//! forwarded claim headers and only marshals them into an [`Actor`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{
    Actor, ActorId, DependentId, FieldKey, ProposedProfileChanges, RejectReason, RequestId,
    RequestStatus, Role,
};
use super::lifecycle::ReviewDecision;
use super::pagination::{Page, PageRequest, RequestSort};
use super::repository::{
    MatchingRequestRepository, ProfileUpdateRequestRepository, ProviderDirectory,
};
use super::service::{
    MatchingService, NewMatchingRequest, ProfileRequestListQuery, ProviderSearchQuery,
    RequestListQuery, ServiceError,
};

/// Claim headers the edge proxy forwards after verifying the caller's token.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Uniform response envelope carried by every operation.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub succeeded: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(status: StatusCode, result: T) -> Response {
        let envelope = Self {
            succeeded: true,
            status_code: status.as_u16(),
            result: Some(result),
            messages: None,
            page_number: None,
            page_size: None,
            total: None,
        };
        (status, axum::Json(envelope)).into_response()
    }

    pub fn ok_paged(page: Page<T>) -> Response {
        let envelope = Envelope {
            succeeded: true,
            status_code: StatusCode::OK.as_u16(),
            result: Some(page.items),
            messages: None,
            page_number: Some(page.page_number),
            page_size: Some(page.page_size),
            total: Some(page.total),
        };
        (StatusCode::OK, axum::Json(envelope)).into_response()
    }
}

impl Envelope<serde_json::Value> {
    pub fn fail(status: StatusCode, message: String) -> Response {
        let envelope = Self {
            succeeded: false,
            status_code: status.as_u16(),
            result: None,
            messages: Some(vec![message]),
            page_number: None,
            page_size: None,
            total: None,
        };
        (status, axum::Json(envelope)).into_response()
    }
}

/// Resolve the caller from forwarded claim headers. Missing or unparseable
/// claims yield `None`; the gate then answers Unauthenticated.
pub fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let id = headers.get(ACTOR_ID_HEADER)?.to_str().ok()?.trim();
    if id.is_empty() {
        return None;
    }
    let role = Role::parse(headers.get(ACTOR_ROLE_HEADER)?.to_str().ok()?)?;
    Some(Actor {
        id: ActorId(id.to_string()),
        role,
    })
}

fn page_request(page_number: i64, page_size: Option<usize>) -> Result<PageRequest, ServiceError> {
    if page_number < 1 {
        return Err(ServiceError::Validation(FieldKey::PageNumber));
    }
    Ok(PageRequest {
        page_number: page_number as usize,
        page_size,
    })
}

fn default_page_number() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    term: String,
    #[serde(default)]
    address_term: String,
    #[serde(default)]
    min_review_score: f32,
    age_from: Option<i32>,
    age_to: Option<i32>,
    #[serde(default = "default_page_number")]
    page_number: i64,
    page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    status: Option<String>,
    sort: Option<String>,
    order: Option<String>,
    #[serde(default)]
    search: String,
    #[serde(default = "default_page_number")]
    page_number: i64,
    page_size: Option<usize>,
}

impl ListParams {
    fn status_filter(&self) -> Option<RequestStatus> {
        self.status.as_deref().and_then(RequestStatus::parse)
    }

    fn sort_key(&self) -> RequestSort {
        self.sort
            .as_deref()
            .map(RequestSort::parse)
            .unwrap_or_default()
    }

    fn descending(&self) -> bool {
        self.order
            .as_deref()
            .is_some_and(|order| order.eq_ignore_ascii_case("desc"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateMatchingBody {
    provider_id: String,
    dependent_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DecisionDto {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewBody {
    decision: DecisionDto,
    reject_reason: Option<RejectReason>,
}

impl ReviewBody {
    fn into_decision(self) -> ReviewDecision {
        match self.decision {
            DecisionDto::Approve => ReviewDecision::Approve,
            DecisionDto::Reject => ReviewDecision::Reject(self.reject_reason),
        }
    }
}

/// Router builder exposing the matching workflow endpoints.
pub fn matching_router<D, M, P>(service: Arc<MatchingService<D, M, P>>) -> Router
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    Router::new()
        .route("/api/v1/providers/search", get(search_providers::<D, M, P>))
        .route(
            "/api/v1/matching-requests",
            post(create_matching_request::<D, M, P>).get(list_matching_requests::<D, M, P>),
        )
        .route(
            "/api/v1/matching-requests/:request_id/review",
            post(review_matching_request::<D, M, P>),
        )
        .route(
            "/api/v1/profile-requests",
            post(create_profile_request::<D, M, P>).get(list_profile_requests::<D, M, P>),
        )
        .route(
            "/api/v1/profile-requests/current",
            get(current_profile_request::<D, M, P>),
        )
        .route(
            "/api/v1/profile-requests/:request_id/review",
            post(review_profile_request::<D, M, P>),
        )
        .with_state(service)
}

pub(crate) async fn search_providers<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    let page = match page_request(params.page_number, params.page_size) {
        Ok(page) => page,
        Err(error) => return service_error(&service, error),
    };

    let query = ProviderSearchQuery {
        term: params.term,
        address_term: params.address_term,
        min_review_score: params.min_review_score,
        age_from: params.age_from,
        age_to: params.age_to,
        page,
    };

    match service.search_providers(actor.as_ref(), &query) {
        Ok(page) => Envelope::ok_paged(page),
        Err(error) => service_error(&service, error),
    }
}

pub(crate) async fn create_matching_request<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<CreateMatchingBody>,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    let input = NewMatchingRequest {
        provider_id: ActorId(body.provider_id),
        dependent_id: DependentId(body.dependent_id),
    };

    match service.create_matching_request(actor.as_ref(), &input) {
        Ok(view) => Envelope::ok(StatusCode::CREATED, view),
        Err(error) => service_error(&service, error),
    }
}

pub(crate) async fn review_matching_request<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<ReviewBody>,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    let decision = body.into_decision();

    match service.review_matching_request(actor.as_ref(), &RequestId(request_id), &decision) {
        Ok(view) => Envelope::ok(StatusCode::OK, view),
        Err(error) => service_error(&service, error),
    }
}

pub(crate) async fn list_matching_requests<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    let page = match page_request(params.page_number, params.page_size) {
        Ok(page) => page,
        Err(error) => return service_error(&service, error),
    };

    let query = RequestListQuery {
        status: params.status_filter(),
        sort: params.sort_key(),
        descending: params.descending(),
        page,
    };

    match service.list_my_matching_requests(actor.as_ref(), &query) {
        Ok(page) => Envelope::ok_paged(page),
        Err(error) => service_error(&service, error),
    }
}

pub(crate) async fn create_profile_request<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
    axum::Json(proposed): axum::Json<ProposedProfileChanges>,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);

    match service.create_profile_update_request(actor.as_ref(), proposed) {
        Ok(view) => Envelope::ok(StatusCode::CREATED, view),
        Err(error) => service_error(&service, error),
    }
}

pub(crate) async fn review_profile_request<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<ReviewBody>,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    let decision = body.into_decision();

    match service.review_profile_update_request(actor.as_ref(), &RequestId(request_id), &decision)
    {
        Ok(view) => Envelope::ok(StatusCode::OK, view),
        Err(error) => service_error(&service, error),
    }
}

pub(crate) async fn list_profile_requests<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    let page = match page_request(params.page_number, params.page_size) {
        Ok(page) => page,
        Err(error) => return service_error(&service, error),
    };

    let query = ProfileRequestListQuery {
        search: params.search.clone(),
        status: params.status_filter(),
        sort: params.sort_key(),
        descending: params.descending(),
        page,
    };

    match service.list_profile_update_requests(actor.as_ref(), &query) {
        Ok(page) => Envelope::ok_paged(page),
        Err(error) => service_error(&service, error),
    }
}

pub(crate) async fn current_profile_request<D, M, P>(
    State(service): State<Arc<MatchingService<D, M, P>>>,
    headers: HeaderMap,
) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let actor = actor_from_headers(&headers);

    match service.my_current_profile_request_status(actor.as_ref()) {
        Ok(view) => Envelope::ok(StatusCode::OK, view),
        Err(error) => service_error(&service, error),
    }
}

fn service_error<D, M, P>(service: &MatchingService<D, M, P>, error: ServiceError) -> Response
where
    D: ProviderDirectory + 'static,
    M: MatchingRequestRepository + 'static,
    P: ProfileUpdateRequestRepository + 'static,
{
    let status = match &error {
        ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::Forbidden => StatusCode::FORBIDDEN,
        ServiceError::Validation(_) | ServiceError::Duplicate(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if let ServiceError::Repository(inner) = &error {
        tracing::error!(error = %inner, "collaborator failure surfaced as internal error");
    }
    Envelope::fail(status, service.message(&error.message_key()))
}
