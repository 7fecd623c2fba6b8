use crate::cli::ServeArgs;
use crate::infra::{sandbox_entity, AppState, InMemoryAuditLog, InMemoryMappingStore, InMemoryPayrollApi};
use crate::routes::{with_sync_routes, SyncState};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use payroll_sync::config::AppConfig;
use payroll_sync::error::AppError;
use payroll_sync::telemetry;
use payroll_sync::workflows::mapping::MappingService;
use payroll_sync::workflows::pipeline::SyncPipeline;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    match config.payroll.base_url.as_deref() {
        Some(base_url) => info!(
            base_url,
            client_id = config.payroll.client_id.as_deref().unwrap_or("-"),
            timeout_secs = config.payroll.request_timeout.as_secs(),
            "payroll endpoint configured; submissions are served by the in-memory sandbox"
        ),
        None => warn!("PAYROLL_BASE_URL not set; submissions are served by the in-memory sandbox"),
    }

    let entities = vec![sandbox_entity()];
    let store = Arc::new(InMemoryMappingStore::with_entities(entities.clone()));
    let payroll = Arc::new(InMemoryPayrollApi::for_entities(&entities));
    let audit = Arc::new(InMemoryAuditLog::default());

    let sync = Arc::new(SyncState {
        pipeline: SyncPipeline::new(
            store.clone(),
            payroll.clone(),
            audit,
            config.audit.detail_limit,
        ),
        payroll,
    });
    let mappings = Arc::new(MappingService::new(store));

    let app = with_sync_routes(mappings, sync)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "payroll sync service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
