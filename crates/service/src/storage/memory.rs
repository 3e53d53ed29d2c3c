use std::{cmp::Ordering, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use models::{
    id::{new_id, parse_object_id, ID_FIELD},
    DeleteAck, Fields, InsertAck, UpdateAck,
};

use super::{key_filter, DocumentCollection};
use crate::errors::ServiceError;
use crate::query::{Filter, ListQuery, SortOrder, SORT_FIELD};

/// In-process collection keeping documents in insertion order, which plays
/// the role of the store's natural order.
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<RwLock<Vec<Fields>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with documents; ones without an `_id` get a fresh one.
    pub fn with_documents(docs: Vec<Fields>) -> Self {
        let docs = docs
            .into_iter()
            .map(|mut d| {
                if !matches!(d.get(ID_FIELD), Some(Value::String(_))) {
                    d.insert(ID_FIELD.to_string(), Value::String(new_id()));
                }
                d
            })
            .collect();
        Self { inner: Arc::new(RwLock::new(docs)) }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

fn canonical_id(id: &str) -> Result<String, ServiceError> {
    Ok(parse_object_id(id)?.to_hex())
}

fn has_id(doc: &Fields, id: &str) -> bool {
    matches!(doc.get(ID_FIELD), Some(Value::String(v)) if v == id)
}

fn rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Cross-type ordering following MongoDB's sort order: missing/null, then
/// numbers, then strings.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert(&self, mut doc: Fields) -> Result<InsertAck, ServiceError> {
        let id = new_id();
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        self.inner.write().await.push(doc);
        Ok(InsertAck::new(id))
    }

    async fn insert_unique(&self, mut doc: Fields, key: &[&str]) -> Result<InsertAck, ServiceError> {
        let filter = key_filter(&doc, key)?;
        let mut docs = self.inner.write().await;
        if docs.iter().any(|d| filter.matches(d)) {
            return Err(ServiceError::Conflict(format!("duplicate {}", key.join("+"))));
        }
        let id = new_id();
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        docs.push(doc);
        Ok(InsertAck::new(id))
    }

    async fn find(&self, query: &ListQuery) -> Result<Vec<Fields>, ServiceError> {
        let docs = self.inner.read().await;
        let mut hits: Vec<Fields> = docs.iter().filter(|d| query.filter.matches(d)).cloned().collect();
        drop(docs);

        if let Some(order) = query.sort {
            hits.sort_by(|a, b| {
                let ord = compare_values(a.get(SORT_FIELD), b.get(SORT_FIELD));
                match order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let hits = match query.window {
            Some(w) => hits.into_iter().skip(w.skip as usize).take(w.limit as usize).collect(),
            None => hits,
        };
        Ok(hits)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError> {
        let docs = self.inner.read().await;
        Ok(docs.iter().filter(|d| filter.matches(d)).count() as u64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Fields>, ServiceError> {
        let id = canonical_id(id)?;
        let docs = self.inner.read().await;
        Ok(docs.iter().find(|d| has_id(d, &id)).cloned())
    }

    async fn set_fields(&self, id: &str, mut fields: Fields, upsert: bool) -> Result<UpdateAck, ServiceError> {
        let id = canonical_id(id)?;
        fields.remove(ID_FIELD);
        let mut docs = self.inner.write().await;
        if let Some(doc) = docs.iter_mut().find(|d| has_id(d, &id)) {
            let mut modified = false;
            for (k, v) in fields {
                if doc.get(&k) != Some(&v) {
                    doc.insert(k, v);
                    modified = true;
                }
            }
            return Ok(UpdateAck::matched(modified));
        }
        if !upsert {
            return Ok(UpdateAck::unmatched());
        }
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        docs.push(fields);
        Ok(UpdateAck::upserted(id))
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck, ServiceError> {
        let id = canonical_id(id)?;
        let mut docs = self.inner.write().await;
        let before = docs.len();
        docs.retain(|d| !has_id(d, &id));
        Ok(DeleteAck::new((before - docs.len()) as u64))
    }
}
