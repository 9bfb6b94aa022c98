use crate::cli::ServeArgs;
use crate::infra::{
    seed_sample_data, AppState, InMemoryDirectory, InMemoryMatchingRequests,
    InMemoryProfileRequests, MemoryQueue, TracingRealtimeChannel,
};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use care_match::config::{AppConfig, AppEnvironment};
use care_match::error::AppError;
use care_match::telemetry;
use care_match::workflows::matching::{
    MatchingService, NotificationDispatcher, StaticLocalizer,
};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(InMemoryDirectory::default());
    if config.environment != AppEnvironment::Production {
        seed_sample_data(&directory);
    }

    let dispatcher = NotificationDispatcher::new(
        Arc::new(TracingRealtimeChannel),
        Arc::new(MemoryQueue::default()),
    );
    let service = Arc::new(MatchingService::new(
        directory,
        Arc::new(InMemoryMatchingRequests::default()),
        Arc::new(InMemoryProfileRequests::default()),
        dispatcher,
        Arc::new(StaticLocalizer),
        config.matching,
    ));

    let app = with_matching_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "care-match service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
