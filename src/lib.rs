//! Space Combat Server - authoritative simulation for a multiplayer space game
//!
//! Ships live in one shared world that is never ticked: every verb first
//! integrates the ships it touches from their last-update timestamp to "now"
//! (closed-form, so a pinned debug clock can jump by hours), then applies the
//! verb. Exposed over HTTP/JSON:
//! - session verbs: connect / disconnect
//! - ship verbs: accelerate, scan, shoot, shield, getShipInfo
//! - a debug-only sudo endpoint for deterministic tests
//! - optional ElasticSearch mirroring of ship state

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod store;
