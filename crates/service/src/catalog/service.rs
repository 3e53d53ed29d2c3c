use std::sync::Arc;

use tracing::{debug, info, instrument};

use models::{
    service::{PROVIDER_EMAIL, SERVICE_NAME},
    DeleteAck, Fields, InsertAck, UpdateAck,
};

use super::repository::{PopularRepository, ServiceRepository};
use crate::errors::ServiceError;
use crate::query::{Filter, ListParams, ListQuery, ListingLimits, Scope};

/// Catalog operations behind the `/services`, `/manageService` and
/// `/popularServices` routes.
pub struct CatalogService {
    services: Arc<dyn ServiceRepository>,
    popular: Arc<dyn PopularRepository>,
    limits: ListingLimits,
}

impl CatalogService {
    pub fn new(services: Arc<dyn ServiceRepository>, popular: Arc<dyn PopularRepository>, limits: ListingLimits) -> Self {
        Self { services, popular, limits }
    }

    /// Store a new entry as sent; the id is assigned by the store.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::{repository::mock, CatalogService};
    /// use service::query::{ListParams, ListingLimits};
    /// let svc = CatalogService::new(Arc::new(mock::services()), Arc::new(mock::popular(vec![])), ListingLimits::default());
    /// let mut doc = models::Fields::new();
    /// doc.insert("serviceName".into(), "Dental Checkup".into());
    /// doc.insert("price".into(), 50.into());
    /// let ack = tokio_test::block_on(svc.create(doc)).unwrap();
    /// let found = tokio_test::block_on(svc.list(&ListParams::default().search("dental"))).unwrap();
    /// assert_eq!(found[0]["_id"], ack.inserted_id.as_str());
    /// assert_eq!(found[0]["price"], 50);
    /// ```
    #[instrument(skip(self, service), fields(name = ?service.get(SERVICE_NAME)))]
    pub async fn create(&self, service: Fields) -> Result<InsertAck, ServiceError> {
        let ack = self.services.create(service).await?;
        info!(id = %ack.inserted_id, "service_created");
        Ok(ack)
    }

    pub async fn list(&self, params: &ListParams) -> Result<Vec<Fields>, ServiceError> {
        self.list_scoped(params, None).await
    }

    pub async fn count(&self, params: &ListParams) -> Result<u64, ServiceError> {
        self.count_scoped(params, None).await
    }

    /// Entries offered by one provider.
    pub async fn list_by_provider(&self, email: &str, params: &ListParams) -> Result<Vec<Fields>, ServiceError> {
        self.list_scoped(params, Some(Scope::new(PROVIDER_EMAIL, email))).await
    }

    pub async fn count_by_provider(&self, email: &str, params: &ListParams) -> Result<u64, ServiceError> {
        self.count_scoped(params, Some(Scope::new(PROVIDER_EMAIL, email))).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Fields>, ServiceError> {
        self.services.get(id).await
    }

    /// Merge-patch by id; a missing id is created rather than reported.
    #[instrument(skip(self, patch), fields(id = %id, fields = patch.len()))]
    pub async fn upsert(&self, id: &str, patch: Fields) -> Result<UpdateAck, ServiceError> {
        let ack = self.services.upsert(id, patch).await?;
        if ack.upserted_id.is_some() {
            info!("service_upserted");
        } else {
            debug!(matched = ack.matched_count, modified = ack.modified_count, "service_updated");
        }
        Ok(ack)
    }

    /// Remove an entry. Bookings that reference it are left in place.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<DeleteAck, ServiceError> {
        let ack = self.services.delete(id).await?;
        info!(deleted = ack.deleted_count, "service_deleted");
        Ok(ack)
    }

    pub async fn popular(&self) -> Result<Vec<Fields>, ServiceError> {
        self.popular.list(self.limits.popular_limit).await
    }

    async fn list_scoped(&self, params: &ListParams, scope: Option<Scope>) -> Result<Vec<Fields>, ServiceError> {
        let query = ListQuery::build(params, scope, self.limits.max_page_size)?;
        debug!(?query, "list services");
        self.services.list(&query).await
    }

    async fn count_scoped(&self, params: &ListParams, scope: Option<Scope>) -> Result<u64, ServiceError> {
        self.services.count(&Filter::from_params(params, scope)).await
    }
}
