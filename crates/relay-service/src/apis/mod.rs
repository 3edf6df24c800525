//! Request processing behind the HTTP endpoints.

pub mod query;
pub mod relay;
