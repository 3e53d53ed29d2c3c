//! Services catalog and the curated popular list.

pub mod repository;
pub mod service;

pub use repository::{PopularRepository, ServiceRepository};
pub use service::CatalogService;
