//! CLI demo walking the full matching and profile-review scenario against
//! in-memory adapters, printing each actor's view along the way.

use std::sync::Arc;

use clap::Args;

use care_match::config::MatchingConfig;
use care_match::error::AppError;
use care_match::workflows::matching::{
    Actor, DependentId, MatchingService, NewMatchingRequest, NotificationDispatcher, PageRequest,
    ProfileRequestListQuery, ProposedProfileChanges, ProviderSearchQuery, RequestSort,
    ReviewDecision, Role, ServiceError, StaticLocalizer,
};

use crate::infra::{
    seed_sample_data, InMemoryDirectory, InMemoryMatchingRequests, InMemoryProfileRequests,
    MemoryQueue, TracingRealtimeChannel,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the queued notification payloads at the end of the run
    #[arg(long)]
    pub(crate) show_notifications: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let directory = Arc::new(InMemoryDirectory::default());
    seed_sample_data(&directory);

    let queue = Arc::new(MemoryQueue::default());
    let dispatcher =
        NotificationDispatcher::blocking(Arc::new(TracingRealtimeChannel), queue.clone());
    let service = MatchingService::new(
        directory.clone(),
        Arc::new(InMemoryMatchingRequests::default()),
        Arc::new(InMemoryProfileRequests::default()),
        dispatcher,
        Arc::new(StaticLocalizer),
        MatchingConfig::default(),
    );

    let guardian = Actor::new("guard-100", Role::Guardian);
    let provider = Actor::new("prov-001", Role::Provider);
    let staff = Actor::new("staff-1", Role::Staff);

    println!("CareMatch demo\n");

    println!("1. Guardian searches for New York providers serving ages 3-5");
    let search = ProviderSearchQuery {
        term: String::new(),
        address_term: "New York".to_string(),
        min_review_score: 0.0,
        age_from: Some(3),
        age_to: Some(5),
        page: PageRequest::first(),
    };
    let page = service.search_providers(Some(&guardian), &search)?;
    println!(
        "   {} of {} listings on page {}",
        page.items.len(),
        page.total,
        page.page_number
    );
    for listing in &page.items {
        println!("   - {} ({})", listing.full_name, listing.address);
    }

    println!("\n2. Guardian requests prov-001 for dependent dep-100");
    let input = NewMatchingRequest {
        provider_id: provider.id.clone(),
        dependent_id: DependentId("dep-100".to_string()),
    };
    let request = service.create_matching_request(Some(&guardian), &input)?;
    println!("   created {} ({})", request.id.0, request.status);

    println!("\n3. A second identical request is blocked while one is pending");
    match service.create_matching_request(Some(&guardian), &input) {
        Err(error @ ServiceError::Duplicate(_)) => {
            println!("   rejected: {}", service.message(&error.message_key()));
        }
        other => println!("   unexpected outcome: {other:?}"),
    }

    println!("\n4. Provider approves the request");
    let approved =
        service.review_matching_request(Some(&provider), &request.id, &ReviewDecision::Approve)?;
    println!(
        "   {} is now {}; {} binding(s) materialized",
        approved.id.0,
        approved.status,
        directory.bindings().len()
    );

    println!("\n5. Provider submits a profile update for staff review");
    let proposed = ProposedProfileChanges {
        address: Some("420 W 119th St, New York".to_string()),
        end_age: Some(6),
        ..ProposedProfileChanges::default()
    };
    let profile_request = service.create_profile_update_request(Some(&provider), proposed)?;
    println!(
        "   created {} ({})",
        profile_request.id.0, profile_request.status
    );

    println!("\n6. Staff lists pending profile requests and approves");
    let list = service.list_profile_update_requests(
        Some(&staff),
        &ProfileRequestListQuery {
            search: String::new(),
            status: None,
            sort: RequestSort::CreatedAt,
            descending: true,
            page: PageRequest::first(),
        },
    )?;
    println!("   {} request(s) in the review queue", list.total);
    let reviewed = service.review_profile_update_request(
        Some(&staff),
        &profile_request.id,
        &ReviewDecision::Approve,
    )?;
    println!("   {} is now {}", reviewed.id.0, reviewed.status);

    println!("\n7. Provider checks their current request status");
    let current = service.my_current_profile_request_status(Some(&provider))?;
    println!("   current request {} ({})", current.id.0, current.status);

    if args.show_notifications {
        println!("\nQueued notification payloads:");
        for payload in queue.payloads() {
            println!("   {payload}");
        }
    } else {
        println!(
            "\n{} notification(s) queued for out-of-band delivery",
            queue.payloads().len()
        );
    }

    Ok(())
}
