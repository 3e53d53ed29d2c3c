use async_trait::async_trait;

use models::{DeleteAck, Fields, InsertAck, UpdateAck};

use crate::errors::ServiceError;
use crate::query::{Filter, ListQuery};
use crate::storage::{memory::MemoryCollection, mongo::MongoCollection, DocumentCollection};

/// Persistence for catalog entries. Documents go in and come out exactly as
/// stored; no field is required or typed.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: Fields) -> Result<InsertAck, ServiceError>;
    async fn list(&self, query: &ListQuery) -> Result<Vec<Fields>, ServiceError>;
    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<Fields>, ServiceError>;
    /// Merge `patch` into the entry, creating it under `id` when missing.
    async fn upsert(&self, id: &str, patch: Fields) -> Result<UpdateAck, ServiceError>;
    async fn delete(&self, id: &str) -> Result<DeleteAck, ServiceError>;
}

/// Read-only access to the curated highlights.
#[async_trait]
pub trait PopularRepository: Send + Sync {
    async fn list(&self, limit: u64) -> Result<Vec<Fields>, ServiceError>;
}

/// Catalog repository over any document collection.
pub struct ServiceStore<C> {
    coll: C,
}

impl<C: DocumentCollection> ServiceStore<C> {
    pub fn new(coll: C) -> Self { Self { coll } }
}

pub type MongoServiceRepository = ServiceStore<MongoCollection>;
pub type MemoryServiceRepository = ServiceStore<MemoryCollection>;

#[async_trait]
impl<C: DocumentCollection> ServiceRepository for ServiceStore<C> {
    async fn create(&self, service: Fields) -> Result<InsertAck, ServiceError> {
        self.coll.insert(service).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Fields>, ServiceError> {
        self.coll.find(query).await
    }

    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError> {
        self.coll.count(filter).await
    }

    async fn get(&self, id: &str) -> Result<Option<Fields>, ServiceError> {
        self.coll.find_by_id(id).await
    }

    async fn upsert(&self, id: &str, patch: Fields) -> Result<UpdateAck, ServiceError> {
        self.coll.set_fields(id, patch, true).await
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck, ServiceError> {
        self.coll.delete(id).await
    }
}

pub struct PopularStore<C> {
    coll: C,
}

impl<C: DocumentCollection> PopularStore<C> {
    pub fn new(coll: C) -> Self { Self { coll } }
}

pub type MongoPopularRepository = PopularStore<MongoCollection>;
pub type MemoryPopularRepository = PopularStore<MemoryCollection>;

#[async_trait]
impl<C: DocumentCollection> PopularRepository for PopularStore<C> {
    async fn list(&self, limit: u64) -> Result<Vec<Fields>, ServiceError> {
        self.coll.find(&ListQuery::limited(Filter::everything(), limit)).await
    }
}

/// Simple in-memory repositories for tests and doc examples
pub mod mock {
    use super::*;

    pub fn services() -> MemoryServiceRepository {
        ServiceStore::new(MemoryCollection::new())
    }

    /// Popular list seeded with the given entries.
    pub fn popular(entries: Vec<Fields>) -> MemoryPopularRepository {
        PopularStore::new(MemoryCollection::with_documents(entries))
    }
}
