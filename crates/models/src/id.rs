//! Document identifiers.
//!
//! Every collection keys documents by a MongoDB `ObjectId`. On the wire and in
//! the domain types the id travels as its 24-char hex form.

use mongodb::bson::oid::ObjectId;

use crate::errors::ModelError;

/// Name of the identifier field in every stored document.
pub const ID_FIELD: &str = "_id";

pub fn parse_object_id(id: &str) -> Result<ObjectId, ModelError> {
    ObjectId::parse_str(id.trim()).map_err(|_| ModelError::InvalidId(id.to_string()))
}

pub fn new_id() -> String {
    ObjectId::new().to_hex()
}
