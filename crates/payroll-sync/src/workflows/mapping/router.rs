use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::domain::{LegalEntity, MappingEntry, MappingUpdate, NewMapping};
use super::service::MappingService;
use super::store::MappingStore;
use crate::error::AppError;

/// Mapping configuration endpoints.
pub fn mapping_router<S>(service: Arc<MappingService<S>>) -> Router
where
    S: MappingStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/legal-entities/:legal_entity_id/mappings",
            get(list_handler::<S>),
        )
        .route(
            "/api/v1/legal-entities/:legal_entity_id/frequencies",
            get(frequencies_handler::<S>),
        )
        .route(
            "/api/v1/companies/by-logical-id/:prefix",
            get(legal_entity_handler::<S>),
        )
        .route("/api/v1/mappings", axum::routing::post(create_handler::<S>))
        .route(
            "/api/v1/mappings/:id",
            put(update_handler::<S>).delete(delete_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<MappingService<S>>>,
    Path(legal_entity_id): Path<i64>,
) -> Result<Json<Vec<MappingEntry>>, AppError>
where
    S: MappingStore + 'static,
{
    Ok(Json(service.list(legal_entity_id)?))
}

pub(crate) async fn frequencies_handler<S>(
    State(service): State<Arc<MappingService<S>>>,
    Path(legal_entity_id): Path<i64>,
) -> Result<Json<Vec<String>>, AppError>
where
    S: MappingStore + 'static,
{
    Ok(Json(service.frequencies(legal_entity_id)?))
}

pub(crate) async fn legal_entity_handler<S>(
    State(service): State<Arc<MappingService<S>>>,
    Path(prefix): Path<String>,
) -> Result<Json<LegalEntity>, AppError>
where
    S: MappingStore + 'static,
{
    Ok(Json(service.legal_entity_by_prefix(&prefix)?))
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<MappingService<S>>>,
    Json(mapping): Json<NewMapping>,
) -> Result<(StatusCode, Json<MappingEntry>), AppError>
where
    S: MappingStore + 'static,
{
    let entry = service.create(mapping)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<MappingService<S>>>,
    Path(id): Path<i64>,
    Json(update): Json<MappingUpdate>,
) -> Result<Json<MappingEntry>, AppError>
where
    S: MappingStore + 'static,
{
    Ok(Json(service.update(id, update)?))
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<MappingService<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError>
where
    S: MappingStore + 'static,
{
    service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
