//! Session tokens: issue, verify and the owner check.
//!
//! The server keeps no session state. A token stays valid until it expires,
//! clearing the cookie only removes the client's copy.

pub mod domain;
pub mod errors;
pub mod service;

pub use domain::{Claims, TokenRequest};
pub use errors::AuthError;
pub use service::TokenService;
