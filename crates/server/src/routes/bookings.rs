use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use models::{Fields, InsertAck, UpdateAck};
use service::query::ListParams;

use super::auth::{AuthSession, ServerState};
use crate::errors::{JsonApiError, JsonBody};

/// Body of `PATCH /statusUpdate/:id`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(rename = "servicesStatus", alias = "status", default)]
    pub services_status: Option<String>,
}

#[utoipa::path(post, path = "/booking", tag = "bookings", request_body = crate::openapi::BookingDoc, responses((status = 200, description = "Booked", body = crate::openapi::InsertAckDoc), (status = 400, description = "Missing userEmail or serviceId"), (status = 409, description = "Already booked")))]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(booking), _): JsonBody<Fields>,
) -> Result<Json<InsertAck>, JsonApiError> {
    Ok(Json(state.bookings.create(booking).await?))
}

#[utoipa::path(get, path = "/booking/{email}", tag = "bookings", params(("email" = String, Path, description = "User email"), crate::openapi::ListQueryParams), responses((status = 200, description = "Caller's bookings"), (status = 401, description = "No session"), (status = 403, description = "Other user")))]
pub async fn list_for_user(
    State(state): State<ServerState>,
    session: AuthSession,
    Path(email): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Fields>>, JsonApiError> {
    session.ensure_owner(&email)?;
    Ok(Json(state.bookings.list_for_user(&email, &params).await?))
}

#[utoipa::path(get, path = "/servicesToDo/{email}", tag = "bookings", params(("email" = String, Path, description = "Provider email"), crate::openapi::ListQueryParams), responses((status = 200, description = "Bookings of the caller's services"), (status = 401, description = "No session"), (status = 403, description = "Other provider")))]
pub async fn list_for_provider(
    State(state): State<ServerState>,
    session: AuthSession,
    Path(email): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Fields>>, JsonApiError> {
    session.ensure_owner(&email)?;
    Ok(Json(state.bookings.list_for_provider(&email, &params).await?))
}

#[utoipa::path(patch, path = "/statusUpdate/{id}", tag = "bookings", params(("id" = String, Path, description = "Booking ObjectId")), request_body = crate::openapi::StatusUpdateDoc, responses((status = 200, description = "Status set", body = crate::openapi::UpdateAckDoc), (status = 400, description = "Malformed id or missing status")))]
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    WithRejection(Json(input), _): JsonBody<StatusUpdate>,
) -> Result<Json<UpdateAck>, JsonApiError> {
    let status = input
        .services_status
        .ok_or_else(|| JsonApiError::validation("servicesStatus is required"))?;
    Ok(Json(state.bookings.set_status(&id, &status).await?))
}
