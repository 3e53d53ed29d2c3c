use async_trait::async_trait;

use models::{booking::{SERVICES_STATUS, UNIQUE_KEY}, Fields, InsertAck, UpdateAck};
use serde_json::Value;

use crate::errors::ServiceError;
use crate::query::{Filter, ListQuery};
use crate::storage::{memory::MemoryCollection, mongo::MongoCollection, DocumentCollection};

/// Persistence for bookings, kept as the free-form documents clients send.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert unless the `(userEmail, serviceId)` pair is already booked,
    /// which is a [`ServiceError::Conflict`].
    async fn insert_unique(&self, booking: Fields) -> Result<InsertAck, ServiceError>;
    async fn list(&self, query: &ListQuery) -> Result<Vec<Fields>, ServiceError>;
    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError>;
    /// Overwrite `servicesStatus`. Never creates a booking.
    async fn set_status(&self, id: &str, status: &str) -> Result<UpdateAck, ServiceError>;
}

pub struct BookingStore<C> {
    coll: C,
}

impl<C: DocumentCollection> BookingStore<C> {
    pub fn new(coll: C) -> Self { Self { coll } }
}

pub type MongoBookingRepository = BookingStore<MongoCollection>;
pub type MemoryBookingRepository = BookingStore<MemoryCollection>;

#[async_trait]
impl<C: DocumentCollection> BookingRepository for BookingStore<C> {
    async fn insert_unique(&self, booking: Fields) -> Result<InsertAck, ServiceError> {
        self.coll.insert_unique(booking, &UNIQUE_KEY).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Fields>, ServiceError> {
        self.coll.find(query).await
    }

    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError> {
        self.coll.count(filter).await
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<UpdateAck, ServiceError> {
        let mut fields = Fields::new();
        fields.insert(SERVICES_STATUS.to_string(), Value::String(status.to_string()));
        self.coll.set_fields(id, fields, false).await
    }
}

/// Simple in-memory repository for tests
pub mod mock {
    use super::*;

    pub fn bookings() -> MemoryBookingRepository {
        BookingStore::new(MemoryCollection::new())
    }
}
