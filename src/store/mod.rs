//! Document store integration for the persistence mirror

pub mod elastic;
pub mod mirror;

pub use elastic::{ElasticClient, ElasticError, ShipDocument};
pub use mirror::ShipMirror;
