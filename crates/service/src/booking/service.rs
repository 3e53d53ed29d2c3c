use std::sync::Arc;

use tracing::{info, instrument, warn};

use serde_json::Value;

use models::{
    booking::{PROVIDER_EMAIL, SERVICE_ID, USER_EMAIL},
    id::ID_FIELD,
    text_field, BookingStatus, Fields, InsertAck, UpdateAck,
};

use super::repository::BookingRepository;
use crate::errors::ServiceError;
use crate::query::{ListParams, ListQuery, ListingLimits, Scope};

/// Message returned when a user books the same service twice.
pub const ALREADY_BOOKED: &str = "already booked";

pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    limits: ListingLimits,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, limits: ListingLimits) -> Self {
        Self { repo, limits }
    }

    /// Book a service for a user, rejecting a second booking of the same
    /// service by the same user. `userEmail` and `serviceId` must be
    /// non-blank strings; every other field is stored as sent.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::booking::{repository::mock, BookingService};
    /// use service::errors::ServiceError;
    /// use service::query::ListingLimits;
    /// let svc = BookingService::new(Arc::new(mock::bookings()), ListingLimits::default());
    /// let mut doc = models::Fields::new();
    /// doc.insert("userEmail".into(), "a@x.com".into());
    /// doc.insert("serviceId".into(), "S1".into());
    /// tokio_test::block_on(svc.create(doc.clone())).unwrap();
    /// let again = tokio_test::block_on(svc.create(doc));
    /// assert!(matches!(again, Err(ServiceError::Conflict(_))));
    /// ```
    #[instrument(skip(self, booking), fields(user = ?booking.get(USER_EMAIL), service = ?booking.get(SERVICE_ID)))]
    pub async fn create(&self, mut booking: Fields) -> Result<InsertAck, ServiceError> {
        let user = required(USER_EMAIL, text_field(&booking, USER_EMAIL))?;
        let service_id = required(SERVICE_ID, text_field(&booking, SERVICE_ID))?;
        booking.remove(ID_FIELD);
        booking.insert(USER_EMAIL.to_string(), Value::String(user));
        booking.insert(SERVICE_ID.to_string(), Value::String(service_id));

        // the store checks the (user, service) pair and enforces it atomically
        let ack = self.repo.insert_unique(booking).await.map_err(|e| match e {
            ServiceError::Conflict(_) => {
                warn!("duplicate booking rejected");
                ServiceError::Conflict(ALREADY_BOOKED.into())
            }
            other => other,
        })?;
        info!(id = %ack.inserted_id, "booking_created");
        Ok(ack)
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: &str, status: &str) -> Result<UpdateAck, ServiceError> {
        match BookingStatus::parse(status) {
            Some(known) => info!(status = %known, "booking status change"),
            None => warn!(status, "unrecognised booking status stored as sent"),
        }
        self.repo.set_status(id, status).await
    }

    pub async fn list_for_user(&self, email: &str, params: &ListParams) -> Result<Vec<Fields>, ServiceError> {
        self.list_scoped(params, Scope::new(USER_EMAIL, email)).await
    }

    pub async fn list_for_provider(&self, email: &str, params: &ListParams) -> Result<Vec<Fields>, ServiceError> {
        self.list_scoped(params, Scope::new(PROVIDER_EMAIL, email)).await
    }

    async fn list_scoped(&self, params: &ListParams, scope: Scope) -> Result<Vec<Fields>, ServiceError> {
        let query = ListQuery::build(params, Some(scope), self.limits.max_page_size)?;
        self.repo.list(&query).await
    }
}

fn required(field: &str, value: Option<&str>) -> Result<String, ServiceError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    }
}
