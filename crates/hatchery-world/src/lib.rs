//! Toroidal world of movers and eggs.
//!
//! Movers drift across a wrapped rectangle, eliminate each other on contact,
//! lay mutated eggs on a fixed period and hatch from eggs once there is room.

pub mod body;
pub mod frame;
pub mod organism;
pub mod rng;
pub mod simulation;
pub mod snapshot;

pub use body::Body;
pub use frame::{shape_colour, DrawItem, Frame, Style, PALETTE};
pub use organism::{BodyKind, Egg, Mover};
pub use simulation::{resolve_collisions, NullObserver, Observer, Phase, Simulation, WorldView};
pub use snapshot::write_snapshot;
