//! Pieces shared by every crate in the workspace: wire types that are not
//! tied to a collection, logging bootstrap and environment helpers.

pub mod types;
pub mod utils;
pub mod env;
