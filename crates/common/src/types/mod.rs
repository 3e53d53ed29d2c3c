use serde::{Deserialize, Serialize};

/// `{ "status": "ok" }` liveness body.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// `{ "success": true }` acknowledgement for cookie endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// `{ "count": n }` returned by every count endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Count {
    pub count: u64,
}
