use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCandidateRepository, LoggingDispatcher};
use crate::routes::with_candidate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hireflow::config::AppConfig;
use hireflow::error::AppError;
use hireflow::telemetry;
use hireflow::workflows::candidates::CandidateWorkflowService;
use hireflow::workflows::roster::CandidateRosterImporter;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let repository = Arc::new(InMemoryCandidateRepository::default());
    let dispatcher = Arc::new(LoggingDispatcher::default());
    let service = Arc::new(CandidateWorkflowService::new(
        repository,
        dispatcher,
        config.pipeline,
    ));

    if let Some(path) = args.roster.take() {
        let profiles = CandidateRosterImporter::from_path(&path)?;
        let seeded = CandidateRosterImporter::seed(service.as_ref(), profiles)?;
        info!(count = seeded.len(), roster = %path.display(), "seeded candidates from roster");
    }

    let app = with_candidate_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "candidate workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
