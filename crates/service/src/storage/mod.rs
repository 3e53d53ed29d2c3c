//! Storage abstractions for service layer
//!
//! [`DocumentCollection`] is the handful of operations the repositories need
//! from a collection. [`mongo::MongoCollection`] backs it with a MongoDB
//! collection, [`memory::MemoryCollection`] with an in-process vector for
//! tests and local runs.

use async_trait::async_trait;

use models::{DeleteAck, Fields, InsertAck, UpdateAck};

use crate::errors::ServiceError;
use crate::query::{Filter, ListQuery};

pub mod memory;
pub mod mongo;

#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Insert with a store-generated id. Any `_id` in `doc` is discarded.
    async fn insert(&self, doc: Fields) -> Result<InsertAck, ServiceError>;

    /// Insert unless a document already has equal values for every field in
    /// `key`; that case is a [`ServiceError::Conflict`].
    async fn insert_unique(&self, doc: Fields, key: &[&str]) -> Result<InsertAck, ServiceError>;

    async fn find(&self, query: &ListQuery) -> Result<Vec<Fields>, ServiceError>;

    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Fields>, ServiceError>;

    /// `$set` the given top-level fields on the document with `id`. With
    /// `upsert` a missing document is created under that id.
    async fn set_fields(&self, id: &str, fields: Fields, upsert: bool) -> Result<UpdateAck, ServiceError>;

    async fn delete(&self, id: &str) -> Result<DeleteAck, ServiceError>;
}

/// Equality filter over the `key` fields of `doc`, used for uniqueness checks.
pub(crate) fn key_filter(doc: &Fields, key: &[&str]) -> Result<Filter, ServiceError> {
    key.iter().try_fold(Filter::everything(), |f, field| match doc.get(*field) {
        Some(serde_json::Value::String(v)) => Ok(f.and_equals(*field, v.clone())),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    })
}
