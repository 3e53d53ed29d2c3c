use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use common::types::Count;
use models::{DeleteAck, Fields, InsertAck, UpdateAck};
use service::query::ListParams;

use super::auth::{AuthSession, ServerState};
use crate::errors::{JsonApiError, JsonBody};

#[utoipa::path(post, path = "/services", tag = "services", request_body = crate::openapi::ServiceDoc, responses((status = 200, description = "Created", body = crate::openapi::InsertAckDoc)))]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(service), _): JsonBody<Fields>,
) -> Result<Json<InsertAck>, JsonApiError> {
    Ok(Json(state.catalog.create(service).await?))
}

#[utoipa::path(get, path = "/services", tag = "services", params(crate::openapi::ListQueryParams), responses((status = 200, description = "One page of services"), (status = 400, description = "Bad paging or sort")))]
pub async fn list(State(state): State<ServerState>, Query(params): Query<ListParams>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    Ok(Json(state.catalog.list(&params).await?))
}

#[utoipa::path(get, path = "/services/count", tag = "services", params(crate::openapi::ListQueryParams), responses((status = 200, description = "Number of matching services", body = crate::openapi::CountDoc)))]
pub async fn count(State(state): State<ServerState>, Query(params): Query<ListParams>) -> Result<Json<Count>, JsonApiError> {
    let count = state.catalog.count(&params).await?;
    Ok(Json(Count { count }))
}

/// `null` body when nothing has that id.
#[utoipa::path(get, path = "/servicesDetails/{id}", tag = "services", params(("id" = String, Path, description = "Service ObjectId")), responses((status = 200, description = "The service or null"), (status = 400, description = "Malformed id")))]
pub async fn details(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Option<Fields>>, JsonApiError> {
    Ok(Json(state.catalog.get(&id).await?))
}

#[utoipa::path(put, path = "/updateService/{id}", tag = "services", params(("id" = String, Path, description = "Service ObjectId")), request_body = crate::openapi::ServiceDoc, responses((status = 200, description = "Updated or created", body = crate::openapi::UpdateAckDoc)))]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    WithRejection(Json(patch), _): JsonBody<Fields>,
) -> Result<Json<UpdateAck>, JsonApiError> {
    Ok(Json(state.catalog.upsert(&id, patch).await?))
}

#[utoipa::path(delete, path = "/deleteService/{id}", tag = "services", params(("id" = String, Path, description = "Service ObjectId")), responses((status = 200, description = "Deleted", body = crate::openapi::DeleteAckDoc)))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<DeleteAck>, JsonApiError> {
    Ok(Json(state.catalog.delete(&id).await?))
}

#[utoipa::path(get, path = "/popularServices", tag = "services", responses((status = 200, description = "Curated services")))]
pub async fn popular(State(state): State<ServerState>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    Ok(Json(state.catalog.popular().await?))
}

#[utoipa::path(get, path = "/manageService/{email}", tag = "services", params(("email" = String, Path, description = "Provider email"), crate::openapi::ListQueryParams), responses((status = 200, description = "Caller's services"), (status = 401, description = "No session"), (status = 403, description = "Other provider")))]
pub async fn manage(
    State(state): State<ServerState>,
    session: AuthSession,
    Path(email): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Fields>>, JsonApiError> {
    session.ensure_owner(&email)?;
    let page = state.catalog.list_by_provider(&email, &params).await?;
    info!(provider = %email, returned = page.len(), "manage services listed");
    Ok(Json(page))
}

#[utoipa::path(get, path = "/manageService/{email}/count", tag = "services", params(("email" = String, Path, description = "Provider email"), crate::openapi::ListQueryParams), responses((status = 200, description = "Number of the provider's services", body = crate::openapi::CountDoc)))]
pub async fn manage_count(
    State(state): State<ServerState>,
    Path(email): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Count>, JsonApiError> {
    let count = state.catalog.count_by_provider(&email, &params).await?;
    Ok(Json(Count { count }))
}
