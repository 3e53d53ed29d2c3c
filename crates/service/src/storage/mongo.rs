use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, UpdateOptions},
    Collection,
};
use serde_json::Value;
use tracing::{debug, instrument};

use models::{
    id::{parse_object_id, ID_FIELD},
    DeleteAck, Fields, InsertAck, UpdateAck,
};

use super::{key_filter, DocumentCollection};
use crate::errors::ServiceError;
use crate::query::{Filter, ListQuery, SEARCH_FIELD, SORT_FIELD};

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed collection of free-form documents.
#[derive(Clone, Debug)]
pub struct MongoCollection {
    inner: Collection<Document>,
}

impl MongoCollection {
    pub fn new(inner: Collection<Document>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Translate a [`Filter`] into a query document. The search text is escaped
/// so it matches literally, case-insensitively, anywhere in the field.
pub fn filter_document(filter: &Filter) -> Document {
    let mut clauses: Vec<Document> = Vec::new();
    if let Some(needle) = &filter.search {
        let mut d = Document::new();
        d.insert(SEARCH_FIELD, doc! { "$regex": regex::escape(needle), "$options": "i" });
        clauses.push(d);
    }
    for scope in &filter.scopes {
        let mut d = Document::new();
        d.insert(scope.field.clone(), scope.value.clone());
        clauses.push(d);
    }
    match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses.into_iter().map(Bson::Document).collect::<Vec<_>>() },
    }
}

/// Sort spec for a query, with `_id` as tie-breaker so pages never overlap.
pub fn sort_document(query: &ListQuery) -> Option<Document> {
    query.sort.map(|order| {
        let mut d = Document::new();
        d.insert(SORT_FIELD, order.direction());
        d.insert(ID_FIELD, 1);
        d
    })
}

fn id_filter(oid: ObjectId) -> Document {
    doc! { ID_FIELD: oid }
}

fn encode(mut fields: Fields) -> Result<Document, ServiceError> {
    fields.remove(ID_FIELD);
    bson::to_document(&fields).map_err(|e| ServiceError::Codec(e.to_string()))
}

fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.into_relaxed_extjson().to_string(),
    }
}

/// Stored document to plain JSON fields, with `_id` flattened to its hex form.
fn decode(mut doc: Document) -> Fields {
    let id = doc.remove(ID_FIELD);
    let mut fields = match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Fields::new(),
    };
    if let Some(id) = id {
        fields.insert(ID_FIELD.to_string(), Value::String(id_to_string(id)));
    }
    fields
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    #[instrument(skip(self, doc), fields(collection = %self.name()))]
    async fn insert(&self, doc: Fields) -> Result<InsertAck, ServiceError> {
        let res = self.inner.insert_one(encode(doc)?, None).await?;
        Ok(InsertAck::new(id_to_string(res.inserted_id)))
    }

    /// One pre-check round trip, then the insert. A concurrent insert that
    /// slips between the two is caught by the unique index on `key`.
    #[instrument(skip(self, doc), fields(collection = %self.name()))]
    async fn insert_unique(&self, doc: Fields, key: &[&str]) -> Result<InsertAck, ServiceError> {
        let existing = key_filter(&doc, key)?;
        if self.inner.count_documents(filter_document(&existing), None).await? > 0 {
            return Err(ServiceError::Conflict(format!("duplicate {}", key.join("+"))));
        }
        match self.inner.insert_one(encode(doc)?, None).await {
            Ok(res) => Ok(InsertAck::new(id_to_string(res.inserted_id))),
            Err(e) if is_duplicate_key(&e) => Err(ServiceError::Conflict(format!("duplicate {}", key.join("+")))),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, query), fields(collection = %self.name()))]
    async fn find(&self, query: &ListQuery) -> Result<Vec<Fields>, ServiceError> {
        let filter = filter_document(&query.filter);
        let mut opts = FindOptions::default();
        opts.sort = sort_document(query);
        if let Some(w) = query.window {
            opts.skip = Some(w.skip);
            opts.limit = Some(i64::try_from(w.limit).unwrap_or(i64::MAX));
        }
        debug!(filter = %filter, sort = ?opts.sort, skip = ?opts.skip, limit = ?opts.limit, "find");
        let cursor = self.inner.find(filter, opts).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(decode).collect())
    }

    #[instrument(skip(self, filter), fields(collection = %self.name()))]
    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError> {
        let filter = filter_document(filter);
        debug!(filter = %filter, "count");
        Ok(self.inner.count_documents(filter, None).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Fields>, ServiceError> {
        let oid = parse_object_id(id)?;
        Ok(self.inner.find_one(id_filter(oid), None).await?.map(decode))
    }

    #[instrument(skip(self, fields), fields(collection = %self.name()))]
    async fn set_fields(&self, id: &str, mut fields: Fields, upsert: bool) -> Result<UpdateAck, ServiceError> {
        let oid = parse_object_id(id)?;
        fields.remove(ID_FIELD);

        // An empty `$set` is rejected by older servers; resolve it by hand.
        if fields.is_empty() {
            if self.inner.find_one(id_filter(oid), None).await?.is_some() {
                return Ok(UpdateAck::matched(false));
            }
            if !upsert {
                return Ok(UpdateAck::unmatched());
            }
            self.inner.insert_one(id_filter(oid), None).await?;
            return Ok(UpdateAck::upserted(oid.to_hex()));
        }

        let mut opts = UpdateOptions::default();
        opts.upsert = Some(upsert);
        let res = self
            .inner
            .update_one(id_filter(oid), doc! { "$set": encode(fields)? }, opts)
            .await?;
        Ok(UpdateAck {
            acknowledged: true,
            matched_count: res.matched_count,
            modified_count: res.modified_count,
            upserted_count: u64::from(res.upserted_id.is_some()),
            upserted_id: res.upserted_id.map(id_to_string),
        })
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck, ServiceError> {
        let oid = parse_object_id(id)?;
        let res = self.inner.delete_one(id_filter(oid), None).await?;
        Ok(DeleteAck::new(res.deleted_count))
    }
}
