use crate::infra::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use payroll_sync::error::AppError;
use payroll_sync::workflows::mapping::{mapping_router, MappingService, MappingStore};
use payroll_sync::workflows::pipeline::{SyncPipeline, SyncReport, SyncRequest};
use payroll_sync::workflows::submission::{AuditSink, Company, PayrollApi, PayrollRun};
use payroll_sync::workflows::waiting_events::{
    ChangeRecord, ParseReport, ParseSummary, WaitingEventsImporter,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Header carrying the uploaded export's original file name.
pub(crate) const FILE_NAME_HEADER: &str = "x-file-name";

pub(crate) struct SyncState<S, P, A> {
    pub(crate) pipeline: SyncPipeline<S, P, A>,
    pub(crate) payroll: Arc<P>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ParseResponse {
    pub(crate) summary: ParseSummary,
    pub(crate) logical_id_prefix: String,
    pub(crate) report: ParseReport,
    pub(crate) records: Vec<ChangeRecord>,
}

pub(crate) fn with_sync_routes<S, P, A>(
    mappings: Arc<MappingService<S>>,
    sync: Arc<SyncState<S, P, A>>,
) -> axum::Router
where
    S: MappingStore + 'static,
    P: PayrollApi + 'static,
    A: AuditSink + 'static,
{
    let sync_routes = axum::Router::new()
        .route(
            "/api/v1/waiting-events/submit/:legal_entity_id/:frequency/:run",
            post(submit_endpoint::<S, P, A>),
        )
        .route("/api/v1/payroll/companies", get(companies_endpoint::<S, P, A>))
        .route(
            "/api/v1/payroll/companies/:company_id/frequencies",
            get(frequencies_endpoint::<S, P, A>),
        )
        .route(
            "/api/v1/payroll/companies/:company_id/frequencies/:frequency/runs",
            get(runs_endpoint::<S, P, A>),
        )
        .with_state(sync);

    mapping_router(mappings)
        .merge(sync_routes)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/waiting-events/parse", post(parse_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn parse_endpoint(body: Bytes) -> Result<Json<ParseResponse>, AppError> {
    let parsed = WaitingEventsImporter::from_bytes(body.to_vec())?;
    Ok(Json(ParseResponse {
        summary: parsed.summary(),
        logical_id_prefix: parsed.logical_id_prefix,
        report: parsed.report,
        records: parsed.records,
    }))
}

pub(crate) async fn submit_endpoint<S, P, A>(
    State(sync): State<Arc<SyncState<S, P, A>>>,
    Path((legal_entity_id, frequency, run)): Path<(i64, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SyncReport>, AppError>
where
    S: MappingStore + 'static,
    P: PayrollApi + 'static,
    A: AuditSink + 'static,
{
    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let request = SyncRequest {
        legal_entity_id,
        frequency,
        run,
        file_name,
    };

    let report = sync.pipeline.run_bytes(body.to_vec(), &request)?;
    Ok(Json(report))
}

pub(crate) async fn companies_endpoint<S, P, A>(
    State(sync): State<Arc<SyncState<S, P, A>>>,
) -> Result<Json<Vec<Company>>, AppError>
where
    S: MappingStore + 'static,
    P: PayrollApi + 'static,
    A: AuditSink + 'static,
{
    let token = sync.payroll.authorize()?;
    Ok(Json(sync.payroll.companies(&token)?))
}

pub(crate) async fn frequencies_endpoint<S, P, A>(
    State(sync): State<Arc<SyncState<S, P, A>>>,
    Path(company_id): Path<i64>,
) -> Result<Json<Vec<String>>, AppError>
where
    S: MappingStore + 'static,
    P: PayrollApi + 'static,
    A: AuditSink + 'static,
{
    let token = sync.payroll.authorize()?;
    Ok(Json(sync.payroll.frequencies(&token, company_id)?))
}

pub(crate) async fn runs_endpoint<S, P, A>(
    State(sync): State<Arc<SyncState<S, P, A>>>,
    Path((company_id, frequency)): Path<(i64, String)>,
) -> Result<Json<Vec<PayrollRun>>, AppError>
where
    S: MappingStore + 'static,
    P: PayrollApi + 'static,
    A: AuditSink + 'static,
{
    let token = sync.payroll.authorize()?;
    Ok(Json(sync.payroll.runs(&token, company_id, &frequency)?))
}
