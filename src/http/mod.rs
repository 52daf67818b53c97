//! HTTP transport layer

pub mod routes;

pub use routes::build_router;
