use serde::Serialize;
use utoipa::{IntoParams, OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct TokenRequestDoc { pub email: String }

/// Fields the listing searches and sorts on. None is required, and any
/// value type or extra field is stored as sent.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDoc {
    pub service_name: Option<String>,
    pub price: Option<f64>,
    pub provider_email: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDoc {
    pub user_email: String,
    pub service_id: String,
    pub provider_email: Option<String>,
    pub services_status: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateDoc { pub services_status: String }

#[derive(Serialize, ToSchema)]
pub struct CountDoc { pub count: u64 }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertAckDoc { pub acknowledged: bool, pub inserted_id: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAckDoc {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAckDoc { pub acknowledged: bool, pub deleted_count: u64 }

/// Listing parameters shared by every list/count route.
#[derive(Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQueryParams {
    /// Case-insensitive substring of `serviceName`
    pub search: Option<String>,
    /// `asc` or `desc` by price
    pub sort: Option<String>,
    /// 1-based page, defaults to 1 when `size` is given
    pub page: Option<u64>,
    /// Page size; omit for the full result
    pub size: Option<u64>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::root,
        crate::routes::health,
        crate::routes::auth::issue_token,
        crate::routes::auth::logout,
        crate::routes::services::create,
        crate::routes::services::list,
        crate::routes::services::count,
        crate::routes::services::details,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::services::popular,
        crate::routes::services::manage,
        crate::routes::services::manage_count,
        crate::routes::bookings::create,
        crate::routes::bookings::list_for_user,
        crate::routes::bookings::list_for_provider,
        crate::routes::bookings::update_status,
    ),
    components(
        schemas(
            HealthResponse,
            TokenRequestDoc,
            ServiceDoc,
            BookingDoc,
            StatusUpdateDoc,
            CountDoc,
            InsertAckDoc,
            UpdateAckDoc,
            DeleteAckDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "services"),
        (name = "bookings")
    )
)]
pub struct ApiDoc;
