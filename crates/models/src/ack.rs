//! Write acknowledgements, shaped like the driver results clients already
//! expect (`insertedId`, `matchedCount`, ...).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertAck {
    pub fn new(id: impl Into<String>) -> Self {
        Self { acknowledged: true, inserted_id: id.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateAck {
    pub fn matched(modified: bool) -> Self {
        Self { acknowledged: true, matched_count: 1, modified_count: u64::from(modified), ..Default::default() }
    }

    pub fn unmatched() -> Self {
        Self { acknowledged: true, ..Default::default() }
    }

    pub fn upserted(id: impl Into<String>) -> Self {
        Self { acknowledged: true, upserted_count: 1, upserted_id: Some(id.into()), ..Default::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted: u64) -> Self {
        Self { acknowledged: true, deleted_count: deleted }
    }
}
