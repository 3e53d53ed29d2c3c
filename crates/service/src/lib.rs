//! Service layer between the HTTP routes and the document store.
//! - Builds list/count queries from request parameters in one place.
//! - Repository traits with MongoDB and in-memory implementations.
//! - Session token issue/verify independent of the web framework.

pub mod errors;
pub mod pagination;
pub mod query;
pub mod storage;
pub mod catalog;
pub mod booking;
pub mod auth;
