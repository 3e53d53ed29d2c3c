use axum::{
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod auth;
pub mod bookings;
pub mod services;

pub use auth::ServerState;

pub const ROOT_TEXT: &str = "Server is Running!";

#[utoipa::path(get, path = "/", tag = "health", responses((status = 200, description = "Liveness text")))]
pub async fn root() -> &'static str {
    ROOT_TEXT
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public catalog routes, cookie session
/// routes, owner-scoped listings and the API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health));

    let session = Router::new()
        .route("/jwt", post(auth::issue_token))
        .route("/logout", post(auth::logout));

    let catalog = Router::new()
        .route("/services", get(services::list).post(services::create))
        .route("/services/count", get(services::count))
        .route("/servicesDetails/:id", get(services::details))
        .route("/updateService/:id", put(services::update))
        .route("/deleteService/:id", axum::routing::delete(services::delete))
        .route("/popularServices", get(services::popular))
        .route("/manageService/:email", get(services::manage))
        .route("/manageService/:email/count", get(services::manage_count));

    let booking = Router::new()
        .route("/booking", post(bookings::create))
        .route("/booking/:email", get(bookings::list_for_user))
        .route("/servicesToDo/:email", get(bookings::list_for_provider))
        .route("/statusUpdate/:id", patch(bookings::update_status));

    public
        .merge(session)
        .merge(catalog)
        .merge(booking)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
