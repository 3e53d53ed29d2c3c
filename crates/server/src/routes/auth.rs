use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use tracing::{info, warn};

use common::types::Success;
use configs::AppConfig;
use models::{db::DocumentStore, Fields};
use service::{
    auth::{AuthError, Claims, TokenRequest, TokenService},
    booking::{
        repository::{mock as booking_mock, BookingStore},
        BookingService,
    },
    catalog::{
        repository::{mock as catalog_mock, PopularStore, ServiceStore},
        CatalogService,
    },
    query::ListingLimits,
    storage::mongo::MongoCollection,
};

use crate::errors::{JsonApiError, JsonBody};

/// How the session cookie is written.
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub name: String,
    /// `Secure` + `SameSite=None` for cross-site front-ends served over TLS.
    pub production: bool,
}

impl CookieSettings {
    pub fn session(&self, token: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.name.clone(), token);
        cookie.set_path("/");
        cookie.set_http_only(true);
        if self.production {
            cookie.set_secure(true);
            cookie.set_same_site(SameSite::None);
        } else {
            cookie.set_secure(false);
            cookie.set_same_site(SameSite::Strict);
        }
        cookie
    }

    /// Same name, path and flags as [`Self::session`], already expired.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.session(String::new());
        cookie.make_removal();
        cookie
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<CatalogService>,
    pub bookings: Arc<BookingService>,
    pub tokens: Arc<TokenService>,
    pub cookie: CookieSettings,
}

fn limits(cfg: &AppConfig) -> ListingLimits {
    ListingLimits { max_page_size: cfg.listing.max_page_size, popular_limit: cfg.listing.popular_limit }
}

fn cookie_settings(cfg: &AppConfig) -> CookieSettings {
    CookieSettings { name: cfg.auth.cookie_name.clone(), production: cfg.auth.production }
}

impl ServerState {
    /// Repositories over the MongoDB collections of `store`.
    pub fn from_store(store: &DocumentStore, cfg: &AppConfig) -> Self {
        let limits = limits(cfg);
        let catalog = CatalogService::new(
            Arc::new(ServiceStore::new(MongoCollection::new(store.services.clone()))),
            Arc::new(PopularStore::new(MongoCollection::new(store.popular_services.clone()))),
            limits,
        );
        let bookings = BookingService::new(Arc::new(BookingStore::new(MongoCollection::new(store.bookings.clone()))), limits);
        Self {
            catalog: Arc::new(catalog),
            bookings: Arc::new(bookings),
            tokens: Arc::new(TokenService::new(&cfg.auth.token_secret, cfg.auth.token_ttl_secs)),
            cookie: cookie_settings(cfg),
        }
    }

    /// Everything in process memory; `popular` seeds the curated list.
    pub fn in_memory(cfg: &AppConfig, popular: Vec<Fields>) -> Self {
        let limits = limits(cfg);
        let catalog = CatalogService::new(Arc::new(catalog_mock::services()), Arc::new(catalog_mock::popular(popular)), limits);
        let bookings = BookingService::new(Arc::new(booking_mock::bookings()), limits);
        Self {
            catalog: Arc::new(catalog),
            bookings: Arc::new(bookings),
            tokens: Arc::new(TokenService::new(&cfg.auth.token_secret, cfg.auth.token_ttl_secs)),
            cookie: cookie_settings(cfg),
        }
    }
}

/// Verified caller, extracted from the session cookie or a bearer header.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Claims);

impl AuthSession {
    pub fn ensure_owner(&self, owner: &str) -> Result<(), JsonApiError> {
        TokenService::ensure_owner(&self.0, owner).map_err(JsonApiError::from)
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

#[axum::async_trait]
impl FromRequestParts<ServerState> for AuthSession {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.cookie.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| bearer(&parts.headers));

        let Some(token) = token else {
            warn!(path = %parts.uri.path(), "missing session cookie");
            return Err(AuthError::MissingToken.into());
        };
        // rejection reasons are logged by the token service
        let claims = state.tokens.verify(&token)?;
        Ok(AuthSession(claims))
    }
}

#[utoipa::path(post, path = "/jwt", tag = "auth", request_body = crate::openapi::TokenRequestDoc, responses((status = 200, description = "Session cookie set"), (status = 400, description = "Missing email")))]
pub async fn issue_token(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(input), _): JsonBody<TokenRequest>,
) -> Result<(CookieJar, Json<Success>), JsonApiError> {
    let email = input.email.unwrap_or_default();
    let token = state.tokens.issue(&email)?;
    info!(email = %email.trim(), "session cookie issued");
    Ok((jar.add(state.cookie.session(token)), Json(Success::ok())))
}

#[utoipa::path(post, path = "/logout", tag = "auth", responses((status = 200, description = "Session cookie cleared")))]
pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> (CookieJar, Json<Success>) {
    (jar.add(state.cookie.removal()), Json(Success::ok()))
}
