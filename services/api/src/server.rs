use crate::cli::ServeArgs;
use crate::infra::{AppState, TracingNotifier};
use crate::routes::with_approval_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use society_approvals::config::AppConfig;
use society_approvals::error::AppError;
use society_approvals::telemetry;
use society_approvals::workflows::approvals::{
    ApprovalWorkflowService, InMemoryAuditLog, InMemoryRegistry,
};
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

    let approval_service = Arc::new(ApprovalWorkflowService::new(
        Arc::new(InMemoryRegistry::default()),
        Arc::new(TracingNotifier),
        Arc::new(InMemoryAuditLog::default()),
        config.workflow.clone(),
    ));

    let app = with_approval_routes(approval_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        event_permission_flow = ?config.workflow.event_permission_flow,
        "society approval service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
