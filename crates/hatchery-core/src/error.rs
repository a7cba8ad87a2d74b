//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Two colliding movers closed in on each other at bit-identical speeds,
    /// so the collision rule cannot pick a loser.
    #[error(
        "ambiguous collision at tick {tick}: movers {first} and {second} share parallel speed {parallel_speed}"
    )]
    AmbiguousCollision {
        tick: u64,
        first: usize,
        second: usize,
        parallel_speed: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// True for errors raised by the collision rule itself rather than I/O or setup.
    pub fn is_ambiguous_collision(&self) -> bool {
        matches!(self, Error::AmbiguousCollision { .. })
    }
}
