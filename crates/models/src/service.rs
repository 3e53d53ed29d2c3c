//! Field names of catalog documents.
//!
//! Catalog entries and popular highlights are stored as free-form [`Fields`](crate::Fields).
//! Only these keys are ever read by the server, and only through the
//! listing filter and sort; any value type is accepted for them.

pub const SERVICE_NAME: &str = "serviceName";
pub const PRICE: &str = "price";
pub const PROVIDER_EMAIL: &str = "providerEmail";
