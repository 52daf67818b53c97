//! Game simulation modules

pub mod clock;
pub mod combat;
pub mod geometry;
pub mod ship;
pub mod tuning;
pub mod world;

pub use clock::GameClock;
pub use tuning::Tuning;
pub use world::{Contact, GameError, ShipSnapshot, StatePatch, World};
